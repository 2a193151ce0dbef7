//! Resolve command implementation

use std::path::PathBuf;

use console::Style;

use crate::cli::ResolveArgs;
use crate::commands::helpers::build_selector;
use crate::error::{Result, io_error};
use crate::selector::Selection;

pub fn run(config: Option<PathBuf>, classpath: Option<String>, args: ResolveArgs) -> Result<()> {
    let selector = build_selector(config.as_deref(), classpath.as_deref())?;
    let selection = selector.resolve_only(args.identifiers.as_slice())?;

    if args.json {
        let json = serde_json::to_string_pretty(&selection)
            .map_err(|e| io_error(format!("Failed to serialize selection: {e}")))?;
        println!("{json}");
    } else {
        print_selection(&selection, args.detailed);
    }
    Ok(())
}

fn print_selection(selection: &Selection, detailed: bool) {
    println!("{}", Style::new().bold().yellow().apply_to(&selection.name));
    println!("  {} {}", Style::new().bold().apply_to("Bundle:"), selection.bundle);
    let kind = if selection.packaged { "Packaged" } else { "Directory" };
    println!(
        "  {} {}",
        Style::new().bold().apply_to("Type:"),
        Style::new().green().apply_to(kind)
    );
    if let Some(start_class) = &selection.start_class {
        println!("  {} {}", Style::new().bold().apply_to("Start-Class:"), start_class);
    }

    println!(
        "  {} ({})",
        Style::new().bold().apply_to("Classpath:"),
        selection.classpath.len()
    );
    for entry in &selection.classpath {
        println!("    {entry}");
    }

    if detailed && !selection.resolutions.is_empty() {
        println!("  {}", Style::new().bold().apply_to("Dependencies:"));
        for resolution in &selection.resolutions {
            println!(
                "    {} {} {}",
                Style::new().cyan().apply_to(&resolution.declaration),
                Style::new().dim().apply_to(format!("[{}]", resolution.pass)),
                resolution.artifact
            );
        }
    }
}
