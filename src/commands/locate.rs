//! Locate command implementation

use std::path::PathBuf;

use crate::cli::LocateArgs;
use crate::commands::helpers::build_selector;
use crate::error::Result;
use crate::locator::locate;

pub fn run(config: Option<PathBuf>, classpath: Option<String>, args: LocateArgs) -> Result<()> {
    let selector = build_selector(config.as_deref(), classpath.as_deref())?;
    let candidates = selector.candidates()?;
    let artifact = locate(&candidates, args.identifiers.as_slice())?;
    println!("{artifact}");
    Ok(())
}
