//! Interactive menu: probe, offer the actions valid for the status, run the
//! chosen one, repeat until the operator quits.

use tracing::{debug, warn};

use crate::adapter::inbound::cli::output;
use crate::application::Orchestrator;
use crate::error::Result;
use crate::port::Operator;

const QUIT: &str = "Quit";

/// Run the menu until the operator quits or dismisses the prompt.
///
/// The machine is probed again every time the menu opens, so the actions on
/// offer always match its current state. Flow errors have already been shown
/// by the orchestrator; they are reported once more here and the menu
/// continues. A failed status check keeps the last known status.
///
/// # Errors
///
/// Fails when activation fails or the prompt itself breaks.
pub async fn run(mut orchestrator: Orchestrator, prompt: &dyn Operator) -> Result<()> {
    output::header(env!("CARGO_PKG_VERSION"));
    orchestrator.activate().await?;
    let mut probed = true;

    loop {
        if !std::mem::take(&mut probed) {
            if let Err(e) = orchestrator.refresh_status(None, false).await {
                warn!(error = %e, "status check failed");
                output::error(&format!("Status check failed: {e}"));
            }
        }

        let actions = orchestrator.available_actions();
        let mut items: Vec<String> = actions.iter().map(|a| a.label().to_string()).collect();
        items.push(QUIT.to_string());

        let Some(action) = prompt
            .select("What would you like to do?", &items)?
            .and_then(|index| actions.get(index).copied())
        else {
            break;
        };

        match orchestrator.run(action).await {
            Ok(outcome) => debug!(action = ?action, outcome = ?outcome, "action finished"),
            Err(e) => {
                warn!(action = ?action, error = %e, "action failed");
                output::error(&format!("{action} failed: {e}"));
            }
        }
    }

    orchestrator.deactivate();
    Ok(())
}
