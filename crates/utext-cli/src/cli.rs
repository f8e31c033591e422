use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use utext_config::TokenizeMode;

#[derive(Parser, Debug)]
#[command(name = "utext", version, about = "Extract, normalize and speak text with highlighting")]
pub struct Cli {
    /// JSON profile to load instead of environment settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract text from an accessibility tree dumped as JSON
    Tree { path: PathBuf },

    /// Fetch a web page and extract its text
    Fetch { url: String },

    /// Merge and normalize plain-text files
    Normalize {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Re-tokenize the normalized text
        #[arg(long, value_enum)]
        tokenize: Option<TokenizeArg>,
    },

    /// Speak a plain-text file with a simulated engine, printing highlights
    Speak {
        path: PathBuf,

        /// Overrides the configured speech rate
        #[arg(long)]
        rate: Option<f32>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum TokenizeArg {
    Character,
    Word,
    Sentence,
    Paragraph,
}

impl From<TokenizeArg> for TokenizeMode {
    fn from(arg: TokenizeArg) -> Self {
        match arg {
            TokenizeArg::Character => TokenizeMode::Character,
            TokenizeArg::Word => TokenizeMode::Word,
            TokenizeArg::Sentence => TokenizeMode::Sentence,
            TokenizeArg::Paragraph => TokenizeMode::Paragraph,
        }
    }
}
