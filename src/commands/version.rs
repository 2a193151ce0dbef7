//! Version command implementation

use console::Style;

use crate::config::RunnerConfig;
use crate::config::runner::REPOSITORY_ENV;
use crate::error::Result;
use crate::isolation::BOOTSTRAP_SYMBOL;
use crate::selector::CLASSPATH_ENV;

/// Print the version and where the runner looks for its inputs
pub fn run() -> Result<()> {
    for line in report() {
        println!("{line}");
    }
    Ok(())
}

fn report() -> Vec<String> {
    let bold = Style::new().bold();
    let config = RunnerConfig::default_path().map_or_else(
        || "unavailable (no user config directory)".to_string(),
        |path| {
            let state = if path.is_file() { "" } else { " (not present)" };
            format!("{}{state}", path.display())
        },
    );

    vec![
        format!("isolated-runner {}", env!("CARGO_PKG_VERSION")),
        String::new(),
        format!("{}", bold.apply_to("Runner:")),
        format!("  Bootstrap symbol: {BOOTSTRAP_SYMBOL}"),
        format!("  Config file: {config}"),
        format!("  Host artifacts from: {CLASSPATH_ENV}"),
        format!("  Repository override: {REPOSITORY_ENV}"),
    ]
}
