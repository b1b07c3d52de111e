use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::role::Role;

#[derive(Debug, Parser)]
#[command(name = "shellama")]
#[command(about = "Ask a local Ollama model from the command line. Piped stdin is prepended to the prompt.")]
#[command(version)]
#[command(group(ArgGroup::new("role").args(["shell", "code", "describe"]).multiple(false)))]
pub struct Cli {
    /// Answer with a single shell command for this OS and shell
    #[arg(short, long)]
    pub shell: bool,

    /// Answer with code only
    #[arg(short, long)]
    pub code: bool,

    /// Describe the given shell command
    #[arg(short, long)]
    pub describe: bool,

    /// Print the messages sent to the model and failure diagnostics
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/shellama/config.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the resolved configuration and exit
    #[arg(long, conflicts_with = "init_config")]
    pub show_config: bool,

    /// Write a config file with the default settings and exit
    #[arg(long)]
    pub init_config: bool,

    /// Overwrite an existing config file with --init-config
    #[arg(long, requires = "init_config")]
    pub force: bool,

    /// Prompt text
    #[arg(value_name = "PROMPT")]
    pub prompt: Vec<String>,
}

impl Cli {
    pub fn role(&self) -> Role {
        Role::from_flags(self.shell, self.code, self.describe)
    }
}
