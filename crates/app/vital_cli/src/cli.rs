use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "vital_cli", about = "Talk to the Vital AI health assistant from a terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the CLI version
    Version,

    /// Send one message and print the reply
    Ask {
        /// Message text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Start an interactive conversation (type `exit` to leave)
    Chat,
}
