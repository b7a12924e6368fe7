//! Command-line interface definitions.
//!
//! Every subcommand maps onto one orchestrator action or a read-only helper.
//! Running without a subcommand opens the interactive menu.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

use crate::domain::Action;

/// Control a GPU-accelerated llama.cpp inference server on a Podman machine
#[derive(Parser, Debug)]
#[command(name = "remoting-ctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file [default: ~/.remoting-ctl/config.toml]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive menu offering the actions valid for the machine state
    Menu,

    /// Probe the Podman machine and print its status
    Status,

    /// Launch an inference server
    Launch(LaunchArgs),

    /// Stop the running inference server
    Stop,

    /// Restart the Podman machine
    Restart(RestartArgs),

    /// Print a ramalama command for the current setup
    Show(ShowArgs),

    /// Install the API remoting binaries
    Install,

    /// Remove every installed version of the API remoting binaries
    Uninstall,

    /// List the models found in the models directory
    Models,

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Answers for `remoting-ctl launch`; omitted ones are prompted for.
#[derive(Args, Debug, Default)]
pub struct LaunchArgs {
    /// Catalog key (`family/name`) or path to a .gguf file
    #[arg(long)]
    pub model: Option<String>,

    /// Host port for the inference API (above 1024)
    #[arg(long)]
    pub port: Option<String>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("mode").required(true).args(["accelerated", "default"])))]
pub struct RestartArgs {
    /// Restart with API remoting enabled
    #[arg(long)]
    pub accelerated: bool,

    /// Restart with the default configuration
    #[arg(long)]
    pub default: bool,
}

impl RestartArgs {
    #[must_use]
    pub fn action(&self) -> Action {
        if self.accelerated {
            Action::RestartAccelerated
        } else {
            Action::RestartDefault
        }
    }
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Which command to print
    #[arg(value_enum)]
    pub target: ShowTarget,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ShowTarget {
    /// Run the first catalog model locally
    Run,
    /// Benchmark the first catalog model
    Bench,
    /// Chat with the running server
    Chat,
}

impl ShowTarget {
    #[must_use]
    pub fn action(self) -> Action {
        match self {
            Self::Run => Action::ShowRunCommand,
            Self::Bench => Action::ShowBenchCommand,
            Self::Chat => Action::ShowChatCommand,
        }
    }
}

/// Subcommands for `remoting-ctl config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied
    Show,
    /// Validate the configuration file
    Validate,
}
