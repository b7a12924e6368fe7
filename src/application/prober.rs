//! Machine state probing.
//!
//! Runs the build's status-check script and translates its exit code through
//! [`MachineStatus::from_exit_code`]. The script's stdout is only ever shown
//! to the operator; the exit code is the whole contract.

use tracing::{debug, info, warn};

use crate::domain::build::PROBE_SCRIPT;
use crate::domain::{InstalledBuild, MachineStatus};
use crate::error::{Error, Result};
use crate::port::{Operator, ScriptRunner};

/// Status plus whatever the probe printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub status: MachineStatus,
    pub output: String,
}

impl ProbeReport {
    fn not_installed() -> Self {
        Self {
            status: MachineStatus::NotInstalled,
            output: String::new(),
        }
    }
}

pub struct MachineProber<'a> {
    scripts: &'a dyn ScriptRunner,
    operator: &'a dyn Operator,
}

impl<'a> MachineProber<'a> {
    #[must_use]
    pub fn new(scripts: &'a dyn ScriptRunner, operator: &'a dyn Operator) -> Self {
        Self { scripts, operator }
    }

    /// Probe the machine.
    ///
    /// A missing build or missing probe script is `NotInstalled`, not an
    /// error. Unaccelerated states are reported to the operator as
    /// information. `with_notification` additionally pushes a summary for the
    /// other states; it never changes the returned status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProbeFailed`] when the script exits with a code
    /// outside the contract (or is killed), and the runner's error when the
    /// script cannot be started. Both are shown to the operator first.
    pub async fn probe(
        &self,
        build: Option<&InstalledBuild>,
        with_notification: bool,
    ) -> Result<ProbeReport> {
        let Some(build) = build else {
            debug!("no installed build, probe unavailable");
            return Ok(self.finish(ProbeReport::not_installed(), with_notification));
        };
        let present = tokio::fs::try_exists(build.probe_script())
            .await
            .map_err(|e| self.surface(e.into()))?;
        if !present {
            debug!(root = %build.root.display(), "probe script missing");
            return Ok(self.finish(ProbeReport::not_installed(), with_notification));
        }

        let output = self
            .scripts
            .run(&build.root, PROBE_SCRIPT, &[])
            .await
            .map_err(|e| self.surface(e))?;
        let text = output.combined();
        let status = match output.code.and_then(MachineStatus::from_exit_code) {
            Some(status) => status,
            None => {
                warn!(code = ?output.code, "probe returned an unmodeled exit code");
                return Err(self.surface(Error::ProbeFailed {
                    code: output.code,
                    output: text,
                }));
            }
        };

        info!(status = ?status, code = status.exit_code(), "machine probed");
        Ok(self.finish(
            ProbeReport {
                status,
                output: text,
            },
            with_notification,
        ))
    }

    fn surface(&self, err: Error) -> Error {
        self.operator.error(&err.to_string());
        err
    }

    fn finish(&self, report: ProbeReport, with_notification: bool) -> ProbeReport {
        if report.status.is_unaccelerated() {
            let message = if report.output.is_empty() {
                report.status.label().to_string()
            } else {
                format!("{}\n{}", report.status.label(), report.output)
            };
            self.operator.info(&message);
        } else if with_notification {
            self.operator.info(report.status.label());
        }
        report
    }
}
