use clap::Parser;
use tracing::{error, info};

use remoting_ctl::adapter::inbound::cli::command::{Cli, ColorChoice, Commands, ConfigCommand};
use remoting_ctl::adapter::inbound::cli::output::{self, OutputConfig};
use remoting_ctl::adapter::inbound::cli::{config as config_cmd, diagnostic, paths, run};
use remoting_ctl::infrastructure::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet));
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }

    let config_path = cli.config.clone().unwrap_or_else(paths::default_config);

    if let Some(Commands::Config(ConfigCommand::Validate)) = &cli.command {
        if config_cmd::execute_validate(&config_path).is_err() {
            std::process::exit(1);
        }
        return;
    }

    let config = match Config::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            diagnostic::report(&config_path, &e);
            std::process::exit(1);
        }
    };
    config.logging.clone().with_verbosity(cli.verbose).init();
    info!(config = %config_path.display(), "remoting-ctl starting");

    let result = match cli.command {
        Some(Commands::Config(ConfigCommand::Show)) => {
            config_cmd::execute_show(&config_path, &config)
        }
        command => run::execute(command, &config).await,
    };

    if let Err(e) = result {
        error!(error = %e, "command failed");
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
