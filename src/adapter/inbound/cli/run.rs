//! Dispatch of parsed subcommands.

use std::path::PathBuf;

use serde_json::json;
use tracing::info;

use crate::adapter::inbound::cli::command::{Commands, LaunchArgs};
use crate::adapter::inbound::cli::operator::TerminalOperator;
use crate::adapter::inbound::cli::progress::SpinnerProgress;
use crate::adapter::inbound::cli::{menu, models, output};
use crate::adapter::outbound::podman::PodmanEngine;
use crate::adapter::outbound::shell::ShellScripts;
use crate::application::{provision, FlowOutcome, LaunchChoices, Orchestrator};
use crate::domain::{Action, MachineStatus};
use crate::error::{Error, Result};
use crate::infrastructure::config::Config;

/// Wire the production adapters into an orchestrator.
///
/// # Errors
///
/// Fails when the configuration does not resolve to valid launch settings.
pub fn build_orchestrator(config: &Config) -> Result<Orchestrator> {
    let settings = config.launch_settings()?;
    Ok(Orchestrator::new(
        settings,
        Box::new(PodmanEngine::new(config.engine.podman.clone())),
        Box::new(ShellScripts::new(config.engine.shell.clone())),
        Box::new(TerminalOperator::new()),
    )
    .with_progress(Box::new(SpinnerProgress::new())))
}

/// Execute one subcommand; `None` opens the menu.
///
/// `config` subcommands are handled before the configuration is loaded and
/// never reach this function.
///
/// # Errors
///
/// Returns the fatal error of the flow, already shown to the operator once.
pub async fn execute(command: Option<Commands>, config: &Config) -> Result<()> {
    let command = command.unwrap_or(Commands::Menu);
    info!(command = ?command, "executing");

    if let Commands::Models = command {
        return models::execute(&config.launch_settings()?);
    }

    let mut orchestrator = build_orchestrator(config)?;
    let outcome = match command {
        Commands::Menu => return menu::run(orchestrator, &TerminalOperator::new()).await,
        Commands::Status => {
            let status = orchestrator.attach().await?;
            let installed =
                provision::discover_installations(&orchestrator.settings().storage_root).await?;
            report_status(status, &installed, &orchestrator.available_actions());
            orchestrator.deactivate();
            return Ok(());
        }
        Commands::Launch(LaunchArgs { model, port }) => {
            ensure_available(&mut orchestrator, Action::LaunchServer).await?;
            orchestrator.launch(LaunchChoices { model, port }).await?
        }
        Commands::Stop => run_action(&mut orchestrator, Action::StopServer).await?,
        Commands::Restart(args) => run_action(&mut orchestrator, args.action()).await?,
        Commands::Show(args) => run_action(&mut orchestrator, args.target.action()).await?,
        Commands::Install => orchestrator.reinstall().await?,
        Commands::Uninstall => orchestrator.uninstall().await?,
        Commands::Models | Commands::Config(_) => return Ok(()),
    };

    report_outcome(&outcome);
    orchestrator.deactivate();
    Ok(())
}

async fn ensure_available(orchestrator: &mut Orchestrator, action: Action) -> Result<()> {
    let status = orchestrator.attach().await?;
    if orchestrator.available_actions().contains(&action) {
        return Ok(());
    }
    Err(Error::ActionUnavailable {
        action: action.label().to_string(),
        status: status.label().to_string(),
    })
}

async fn run_action(orchestrator: &mut Orchestrator, action: Action) -> Result<FlowOutcome> {
    ensure_available(orchestrator, action).await?;
    orchestrator.run(action).await
}

fn report_status(status: MachineStatus, installed: &[PathBuf], actions: &[Action]) {
    if output::is_json() {
        output::json_output(json!({
            "command": "status",
            "status": status.label(),
            "code": status.exit_code(),
            "installed": installed.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
            "actions": actions.iter().map(|a| a.label()).collect::<Vec<_>>(),
        }));
        return;
    }

    if !installed.is_empty() {
        output::section("Installations");
        for dir in installed {
            output::note(&dir.display().to_string());
        }
    }

    output::section("Available actions");
    for action in actions {
        output::note(&format!("- {action}"));
    }
}

fn report_outcome(outcome: &FlowOutcome) {
    if output::is_json() {
        output::json_output(outcome_json(outcome));
        return;
    }
    match outcome {
        FlowOutcome::Launched { host_port, .. } => {
            output::success(&format!("Inference server launched on port {host_port}"));
        }
        FlowOutcome::Stopped { .. } => output::success("Inference server stopped"),
        FlowOutcome::Installed { version, .. } => {
            output::success(&format!("Binaries {version} ready"));
        }
        FlowOutcome::Restarted { connection, .. } => {
            output::success(&format!("Machine {connection} restarted"));
        }
        FlowOutcome::InvalidPort { input } => {
            output::hint(&format!("{input:?} is not a port above 1024"));
        }
        _ => {}
    }
}

fn outcome_json(outcome: &FlowOutcome) -> serde_json::Value {
    match outcome {
        FlowOutcome::Launched {
            container,
            host_port,
        } => json!({ "outcome": "launched", "container": container.id, "port": host_port.get() }),
        FlowOutcome::AlreadyRunning { container } => {
            json!({ "outcome": "already_running", "container": container.id })
        }
        FlowOutcome::Stopped { container } => {
            json!({ "outcome": "stopped", "container": container.id })
        }
        FlowOutcome::NoServer => json!({ "outcome": "no_server" }),
        FlowOutcome::Cancelled => json!({ "outcome": "cancelled" }),
        FlowOutcome::InvalidPort { input } => json!({ "outcome": "invalid_port", "input": input }),
        FlowOutcome::Displayed { command } => json!({ "outcome": "displayed", "command": command }),
        FlowOutcome::Restarted {
            connection,
            accelerated,
        } => json!({ "outcome": "restarted", "connection": connection, "accelerated": accelerated }),
        FlowOutcome::Installed {
            version,
            binaries_prepared,
        } => json!({ "outcome": "installed", "version": version, "binaries_prepared": binaries_prepared }),
        FlowOutcome::Uninstalled { removed } => {
            json!({ "outcome": "uninstalled", "removed": removed })
        }
        FlowOutcome::Status(status) => {
            json!({ "outcome": "status", "status": status.label(), "code": status.exit_code() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContainerRef, HostPort};

    #[test]
    fn launched_outcome_serializes_port_and_container() {
        let value = outcome_json(&FlowOutcome::Launched {
            container: ContainerRef::new("0123456789abcdef"),
            host_port: HostPort::parse("8080").expect("port"),
        });
        assert_eq!(value["outcome"], "launched");
        assert_eq!(value["port"], 8080);
        assert_eq!(value["container"], "0123456789abcdef");
    }

    #[test]
    fn status_outcome_carries_probe_code() {
        let value = outcome_json(&FlowOutcome::Status(MachineStatus::NotRunning));
        assert_eq!(value["code"], 11);
    }
}
