use clap::Args;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Args, Debug, Clone)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    specify completions bash > ~/.bash_completion.d/specify\n\n\
                  Generate zsh completions:\n    specify completions zsh > ~/.zfunc/_specify\n\n\
                  Generate fish completions:\n    specify completions fish > ~/.config/fish/completions/specify.fish")]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(value_enum)]
    pub shell: Shell,
}
