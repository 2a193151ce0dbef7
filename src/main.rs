//! isolated-runner - inspect isolated bundle classpaths
//!
//! Locates bundles among the host artifacts and prints the dependency set
//! each one would be launched with.

use clap::Parser;

use isolated_runner::cli::{Cli, Commands};
use isolated_runner::commands;
use isolated_runner::logging::{LogConfig, setup_logging};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(&LogConfig::for_verbosity(cli.verbose)) {
        eprintln!("Warning: {e}");
    }

    let result = match cli.command {
        Commands::Locate(args) => commands::locate::run(cli.config, cli.classpath, args),
        Commands::Resolve(args) => commands::resolve::run(cli.config, cli.classpath, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
