use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    isolated-runner completions bash > ~/.bash_completion.d/isolated-runner\n\n\
                  Generate zsh completions:\n    isolated-runner completions zsh > ~/.zfunc/_isolated-runner\n\n\
                  Generate fish completions:\n    isolated-runner completions fish > ~/.config/fish/completions/isolated-runner.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
