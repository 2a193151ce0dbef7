use clap::Parser;

/// Arguments for the resolve command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Print the classpath of a bundle:\n    isolated-runner resolve orders service\n\n\
                  Show how each dependency was matched:\n    isolated-runner resolve orders service --detailed\n\n\
                  Emit JSON:\n    isolated-runner resolve orders service --json")]
pub struct ResolveArgs {
    /// Substrings identifying the bundle artifact
    #[arg(required = true)]
    pub identifiers: Vec<String>,

    /// Show the resolution pass behind each dependency
    #[arg(long)]
    pub detailed: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
