use clap::Parser;

/// Arguments for the locate command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Locate an artifact by name fragments:\n    isolated-runner locate junit platform engine\n\n\
                  Locate among an explicit classpath:\n    isolated-runner --classpath lib/a-1.0.jar:lib/b-2.0.jar locate b")]
pub struct LocateArgs {
    /// Substrings that must all appear in the artifact reference
    #[arg(required = true)]
    pub identifiers: Vec<String>,
}
