//! `kiln generate`: incremental generation with the JSON backend.

use kiln_engine::{GenerationMode, GenerationReport, JsonGenerator};

use crate::workspace::load;
use crate::{GenerateArgs, GlobalArgs};

/// Runs the `kiln generate` command.
pub fn run(args: &GenerateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let loaded = load(global)?;
    let mode = if args.dry_run {
        GenerationMode::DryRun
    } else if args.force {
        GenerationMode::Full
    } else {
        GenerationMode::Incremental
    };

    for name in &args.projects {
        if !loaded.workspace.contains(name) {
            return Err(format!("unknown project '{name}'").into());
        }
    }

    let ctx = loaded
        .context()
        .with_mode(mode)
        .with_requested(args.projects.iter().cloned())
        .with_prune(args.prune);
    let mut backend = JsonGenerator::new(&loaded.workspace.settings().output_dir);
    let report = kiln_engine::run(&ctx, &loaded.workspace, &mut backend)?;

    if !global.quiet {
        print_summary(&report, args.dry_run);
    }
    Ok(0)
}

fn print_summary(report: &GenerationReport, dry_run: bool) {
    let verb = if dry_run { "Would generate" } else { "Generated" };
    for name in &report.dirty {
        eprintln!("  {verb} {name}");
    }
    if report.regenerate_aggregate {
        eprintln!("  {verb} workspace aggregate");
    }
    eprintln!(
        "{} dirty, {} unchanged, {} skipped",
        report.dirty.len(),
        report.unchanged.len(),
        report.skipped.len()
    );
    if report.pruned > 0 {
        eprintln!("pruned {} stale cache entries", report.pruned);
    }
}
