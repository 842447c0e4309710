//! `kiln status`: dirty report without writing.

use kiln_engine::{GenerationMode, JsonGenerator};

use crate::workspace::load;
use crate::GlobalArgs;

/// Runs the `kiln status` command.
///
/// Exits with 0 when everything is up to date and 2 when a generate would
/// render something. Explicitly added projects always count as dirty.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let loaded = load(global)?;
    let ctx = loaded.context().with_mode(GenerationMode::DryRun);
    let mut backend = JsonGenerator::new(&loaded.workspace.settings().output_dir);
    let report = kiln_engine::run(&ctx, &loaded.workspace, &mut backend)?;

    for name in &report.dirty {
        println!("dirty      {name}");
    }
    for name in &report.unchanged {
        println!("unchanged  {name}");
    }
    for name in &report.skipped {
        println!("skipped    {name}");
    }
    if report.regenerate_aggregate {
        println!("aggregate  {}", loaded.workspace.name());
    }

    if report.dirty.is_empty() && !report.regenerate_aggregate {
        Ok(0)
    } else {
        Ok(2)
    }
}
