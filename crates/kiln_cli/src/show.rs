//! `kiln show`: prints resolved options.

use crate::workspace::load;
use crate::{GlobalArgs, ShowArgs};

/// Runs the `kiln show` command.
///
/// Prints the project's resolved options per configuration as JSON on stdout.
pub fn run(args: &ShowArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let loaded = load(global)?;
    let ws = &loaded.workspace;

    let configs = if args.configs.is_empty() {
        ws.configs().to_vec()
    } else {
        for config in &args.configs {
            if !ws.configs().contains(config) {
                return Err(format!("unknown configuration '{config}'").into());
            }
        }
        args.configs.clone()
    };

    let resolved = ws.materialize(&args.project, &configs)?;
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(0)
}
