//! Inference launch orchestrator.
//!
//! The top-level state machine. Each [`Action`] runs to completion before
//! the next one can start: every flow takes `&mut self`, and all shared state
//! lives in the [`LaunchContext`] this struct owns.
//!
//! Expected dead ends (cancelled prompt, server already running, nothing to
//! stop) return `Ok` with a [`FlowOutcome`] describing them. Fatal conditions
//! are shown to the operator and then returned as `Err`.

use std::path::{Path, PathBuf};

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::domain::build::{
    START_ACCELERATED_SCRIPT, START_DEFAULT_SCRIPT, STOP_MACHINE_SCRIPT,
};
use crate::domain::model::MODEL_EXTENSION;
use crate::domain::{
    Action, ContainerLaunchSpec, ContainerRef, HostPort, InstalledBuild, LaunchRequest,
    MachineStatus,
};
use crate::error::{Error, GatewayError, ProvisionError, Result};
use crate::port::{ContainerEngine, NoProgress, Operator, PullProgress, ScriptOutput, ScriptRunner};

use super::catalog::ModelCatalog;
use super::context::{LaunchContext, LaunchSettings};
use super::gateway::ContainerGateway;
use super::prober::MachineProber;
use super::provision;

/// Placeholder shown in commands when no catalog model exists.
const MODEL_PLACEHOLDER: &str = "<model>";

/// How an action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Launched {
        container: ContainerRef,
        host_port: HostPort,
    },
    /// A marked server was already running; nothing was created.
    AlreadyRunning { container: ContainerRef },
    Stopped { container: ContainerRef },
    /// No marked server is running.
    NoServer,
    /// The operator dismissed a prompt.
    Cancelled,
    /// The host port answer was rejected.
    InvalidPort { input: String },
    /// A command was shown to the operator.
    Displayed { command: String },
    Restarted {
        connection: String,
        accelerated: bool,
    },
    Installed {
        version: String,
        binaries_prepared: bool,
    },
    Uninstalled { removed: usize },
    Status(MachineStatus),
}

/// Answers supplied up front, e.g. from command-line flags. Anything left
/// `None` is asked interactively.
#[derive(Debug, Clone, Default)]
pub struct LaunchChoices {
    /// Catalog key or path of a `.gguf` file.
    pub model: Option<String>,
    pub port: Option<String>,
}

/// The model picked for a launch.
#[derive(Debug, Clone)]
struct ModelChoice {
    name: String,
    catalog_key: Option<String>,
    manual_path: Option<PathBuf>,
}

pub struct Orchestrator {
    settings: LaunchSettings,
    context: LaunchContext,
    engine: Box<dyn ContainerEngine>,
    scripts: Box<dyn ScriptRunner>,
    operator: Box<dyn Operator>,
    progress: Box<dyn PullProgress>,
}

impl Orchestrator {
    /// Create an orchestrator with an empty context. Nothing is probed or
    /// installed until [`activate`](Self::activate) or
    /// [`attach`](Self::attach) is called.
    #[must_use]
    pub fn new(
        settings: LaunchSettings,
        engine: Box<dyn ContainerEngine>,
        scripts: Box<dyn ScriptRunner>,
        operator: Box<dyn Operator>,
    ) -> Self {
        Self {
            settings,
            context: LaunchContext::new(),
            engine,
            scripts,
            operator,
            progress: Box::new(NoProgress),
        }
    }

    /// Replace the image pull progress sink.
    #[must_use]
    pub fn with_progress(mut self, progress: Box<dyn PullProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Install the build if needed, prepare its binaries, scan the model
    /// catalog and probe the machine.
    ///
    /// # Errors
    ///
    /// Fails when a manifest is missing, the copy fails, the binary update
    /// script fails or the probe is fatal.
    pub async fn activate(&mut self) -> Result<MachineStatus> {
        let outcome = provision::ensure_installed(
            &self.settings.build_source,
            &self.settings.storage_root,
            &self.settings.image_manifest,
        )
        .await
        .map_err(|e| self.surface(e))?;
        provision::prepare_binaries(&outcome.build, self.scripts.as_ref())
            .await
            .map_err(|e| self.surface(e))?;
        self.context.set_build(outcome.build);

        self.context.catalog.rescan(&self.settings.models_dir);
        self.refresh_status(None, false).await
    }

    /// Pick up an existing installation without installing anything, scan
    /// the catalog and probe the machine.
    ///
    /// A build source without manifests leaves the context without a build,
    /// which probes as `NotInstalled`.
    ///
    /// # Errors
    ///
    /// Fails when a manifest cannot be read or the probe is fatal.
    pub async fn attach(&mut self) -> Result<MachineStatus> {
        match provision::read_manifest(&self.settings.build_source, &self.settings.image_manifest)
            .await
        {
            Ok(manifest) => {
                let build = InstalledBuild::new(manifest, &self.settings.storage_root);
                let installed = tokio::fs::try_exists(&build.root)
                    .await
                    .map_err(|e| self.surface(e.into()))?;
                if installed {
                    self.context.set_build(build);
                } else {
                    debug!(root = %build.root.display(), "build not installed");
                    self.context.image = Some(build.image);
                }
            }
            Err(Error::Provision(ProvisionError::MissingManifest { path })) => {
                warn!(path = %path.display(), "build source manifest missing");
            }
            Err(e) => return Err(self.surface(e)),
        }

        self.context.catalog.rescan(&self.settings.models_dir);
        self.refresh_status(None, false).await
    }

    /// Tear the orchestrator down, dropping its context.
    pub fn deactivate(self) {
        info!(status = ?self.context.status, "orchestrator deactivated");
    }

    #[must_use]
    pub fn status(&self) -> Option<MachineStatus> {
        self.context.status
    }

    #[must_use]
    pub fn catalog(&self) -> &ModelCatalog {
        &self.context.catalog
    }

    #[must_use]
    pub fn installed_build(&self) -> Option<&InstalledBuild> {
        self.context.build.as_ref()
    }

    #[must_use]
    pub fn settings(&self) -> &LaunchSettings {
        &self.settings
    }

    /// Actions offered for the last known status.
    #[must_use]
    pub fn available_actions(&self) -> Vec<Action> {
        Action::available(self.context.status.unwrap_or(MachineStatus::NotInstalled))
    }

    fn prober(&self) -> MachineProber<'_> {
        MachineProber::new(self.scripts.as_ref(), self.operator.as_ref())
    }

    fn gateway(&self) -> ContainerGateway<'_> {
        ContainerGateway::new(self.engine.as_ref(), self.operator.as_ref())
    }

    /// Show a fatal error to the operator and hand it back for propagation.
    fn surface(&self, err: Error) -> Error {
        self.operator.error(&err.to_string());
        err
    }

    /// Recompute the machine status and push it to the status display.
    ///
    /// `known` skips the probe script when the caller already holds a fresh
    /// result. Accelerated states are always refined against the engine: a
    /// running marked container means `AcceleratedWithServer`.
    ///
    /// # Errors
    ///
    /// Propagates fatal probe and gateway errors.
    pub async fn refresh_status(
        &mut self,
        known: Option<MachineStatus>,
        with_notification: bool,
    ) -> Result<MachineStatus> {
        let mut status = match known {
            Some(status) => status,
            None => {
                self.prober()
                    .probe(self.context.build.as_ref(), with_notification)
                    .await?
                    .status
            }
        };

        if status.is_accelerated() {
            let running = self.gateway().find_running_marked_container().await?;
            status = status.with_server_running(running.is_some());
        }

        self.context.status = Some(status);
        self.operator.show_status(status);
        Ok(status)
    }

    /// Run one menu action to completion.
    ///
    /// # Errors
    ///
    /// Returns fatal errors after they have been shown to the operator.
    pub async fn run(&mut self, action: Action) -> Result<FlowOutcome> {
        debug!(action = ?action, "running action");
        match action {
            Action::LaunchServer => self.launch(LaunchChoices::default()).await,
            Action::ShowRunCommand => self.show_model_command("run").await,
            Action::ShowBenchCommand => self.show_model_command("bench").await,
            Action::ShowChatCommand => self.show_chat_command().await,
            Action::StopServer => self.stop().await,
            Action::RestartAccelerated => self.restart_machine(true).await,
            Action::RestartDefault => self.restart_machine(false).await,
            Action::ReinstallBinaries => self.reinstall().await,
            Action::UninstallBinaries => self.uninstall().await,
            Action::CheckStatus => {
                let status = self.refresh_status(None, true).await?;
                Ok(FlowOutcome::Status(status))
            }
        }
    }

    /// Launch an inference server.
    ///
    /// # Errors
    ///
    /// Fails when the model cannot be resolved, the image pull fails or the
    /// engine rejects the container.
    pub async fn launch(&mut self, choices: LaunchChoices) -> Result<FlowOutcome> {
        if let Some(existing) = self.gateway().find_running_marked_container().await? {
            let container = existing.reference();
            self.operator.warn(&format!(
                "An API Remoting inference server is already running ({}).",
                container.short_id()
            ));
            return Ok(FlowOutcome::AlreadyRunning { container });
        }

        let Some(model) = self.choose_model(choices.model).await? else {
            info!("launch cancelled at model selection");
            return Ok(FlowOutcome::Cancelled);
        };

        let port_input = match choices.port {
            Some(port) => port,
            None => {
                let default = self.settings.default_port.to_string();
                match self
                    .operator
                    .input("Host port for the inference API", Some(&default))?
                {
                    Some(port) => port,
                    None => {
                        info!("launch cancelled at port selection");
                        return Ok(FlowOutcome::Cancelled);
                    }
                }
            }
        };
        let host_port = match HostPort::parse(&port_input) {
            Ok(port) => port,
            Err(e) => {
                info!(error = %e, "launch aborted");
                return Ok(FlowOutcome::InvalidPort { input: port_input });
            }
        };

        let model_path = self.resolve_model_path(&model)?;
        let reference = self.image_reference().await?;

        let image = self
            .gateway()
            .pull_image(&reference, self.progress.as_ref())
            .await?;

        let spec = ContainerLaunchSpec::for_inference(&LaunchRequest {
            image: image.id,
            model_name: model.name,
            model_path,
            host_port,
            gpu_layers: self.settings.gpu_layers,
            tracking_id: tracking_id(),
        });
        let container = self.gateway().create_container(&spec).await?;

        self.operator.info(&format!(
            "Inference server {} listening on port {host_port}.",
            container.short_id()
        ));
        self.refresh_status(Some(MachineStatus::AcceleratedRunning), false)
            .await?;
        Ok(FlowOutcome::Launched {
            container,
            host_port,
        })
    }

    async fn choose_model(&mut self, preset: Option<String>) -> Result<Option<ModelChoice>> {
        self.context.catalog.rescan(&self.settings.models_dir);

        if let Some(preset) = preset {
            if self.context.catalog.resolve(&preset).is_some() {
                return Ok(Some(ModelChoice {
                    name: preset.clone(),
                    catalog_key: Some(preset),
                    manual_path: None,
                }));
            }
            let path = PathBuf::from(&preset);
            if !path.is_file() {
                return Err(self.surface(Error::ModelUnresolved { key: preset }));
            }
            return Ok(Some(manual_choice(path)));
        }

        if self.context.catalog.is_empty() {
            if self.context.take_empty_catalog_warning() {
                self.operator.warn(&format!(
                    "No models found in {}. Select a .{MODEL_EXTENSION} file instead.",
                    self.settings.models_dir.display()
                ));
            }
            let picked = self
                .operator
                .pick_file("Model file to serve", MODEL_EXTENSION)?;
            return Ok(picked.map(manual_choice));
        }

        let keys = self.context.catalog.keys();
        let Some(key) = self
            .operator
            .select("Model to serve", &keys)?
            .and_then(|index| keys.get(index).cloned())
        else {
            return Ok(None);
        };
        Ok(Some(ModelChoice {
            name: key.clone(),
            catalog_key: Some(key),
            manual_path: None,
        }))
    }

    /// Catalog lookup first, then the manually picked path. Neither is an
    /// unreachable state and is treated as fatal.
    fn resolve_model_path(&self, model: &ModelChoice) -> Result<PathBuf> {
        model
            .catalog_key
            .as_deref()
            .and_then(|key| self.context.catalog.resolve(key))
            .map(Path::to_path_buf)
            .or_else(|| model.manual_path.clone())
            .ok_or_else(|| {
                self.surface(Error::ModelUnresolved {
                    key: model.name.clone(),
                })
            })
    }

    async fn image_reference(&mut self) -> Result<String> {
        if let Some(image) = &self.context.image {
            return Ok(image.clone());
        }
        let manifest =
            provision::read_manifest(&self.settings.build_source, &self.settings.image_manifest)
                .await
                .map_err(|e| self.surface(e))?;
        self.context.image = Some(manifest.image.clone());
        Ok(manifest.image)
    }

    /// Stop the running inference server and re-probe.
    ///
    /// # Errors
    ///
    /// Propagates gateway and probe failures.
    pub async fn stop(&mut self) -> Result<FlowOutcome> {
        let Some(running) = self.gateway().find_running_marked_container().await? else {
            self.operator
                .info("No API Remoting inference server is running.");
            return Ok(FlowOutcome::NoServer);
        };

        let container = running.reference();
        self.gateway().stop_container(&container).await?;
        self.operator.info(&format!(
            "Inference server {} stopped.",
            container.short_id()
        ));

        self.refresh_status(None, false).await?;
        Ok(FlowOutcome::Stopped { container })
    }

    async fn show_model_command(&mut self, verb: &str) -> Result<FlowOutcome> {
        let image = self.image_reference().await?;
        let model = self
            .context
            .catalog
            .keys()
            .into_iter()
            .next()
            .unwrap_or_else(|| MODEL_PLACEHOLDER.to_string());
        let command = format!("ramalama --image {image} {verb} {model}");
        self.operator.info(&command);
        Ok(FlowOutcome::Displayed { command })
    }

    async fn show_chat_command(&mut self) -> Result<FlowOutcome> {
        let running = self.gateway().find_running_marked_container().await?;
        let Some(api) = running.as_ref().and_then(|c| c.api_url()) else {
            self.operator
                .info("No API Remoting inference server is running.");
            return Ok(FlowOutcome::NoServer);
        };
        let command = format!("ramalama chat --url {api}");
        self.operator.info(&command);
        Ok(FlowOutcome::Displayed { command })
    }

    /// Restart the Podman machine with or without API remoting.
    ///
    /// # Errors
    ///
    /// Fails when no started connection exists, nothing is installed, or a
    /// script exits non-zero.
    pub async fn restart_machine(&mut self, accelerated: bool) -> Result<FlowOutcome> {
        let Some(connection) = self.gateway().resolve_active_connection(false).await? else {
            return Err(GatewayError::NoActiveConnection.into());
        };
        let Some(root) = self.context.build.as_ref().map(|b| b.root.clone()) else {
            return Err(self.surface(Error::NotInstalled));
        };

        let sequence: &[&str] = if accelerated {
            &[START_ACCELERATED_SCRIPT]
        } else {
            &[STOP_MACHINE_SCRIPT, START_DEFAULT_SCRIPT]
        };
        let args = [connection.name.clone()];
        for script in sequence {
            self.run_script(&root, script, &args).await?;
        }

        let mode = if accelerated {
            "with API Remoting"
        } else {
            "with the default configuration"
        };
        self.operator.info(&format!(
            "Podman machine {} restarted {mode}.",
            connection.name
        ));
        self.refresh_status(None, true).await?;
        Ok(FlowOutcome::Restarted {
            connection: connection.name,
            accelerated,
        })
    }

    async fn run_script(&self, root: &Path, script: &str, args: &[String]) -> Result<ScriptOutput> {
        info!(script, args = ?args, "running script");
        let output = self
            .scripts
            .run(root, script, args)
            .await
            .map_err(|e| self.surface(e))?;
        if !output.success() {
            warn!(script, code = ?output.code, "script failed");
            return Err(self.surface(Error::Script {
                script: script.to_string(),
                code: output.code,
                output: output.combined(),
            }));
        }
        Ok(output)
    }

    /// Install (or finish installing) the build and its binaries.
    ///
    /// # Errors
    ///
    /// Fails on missing manifests, copy errors or a failed update script.
    pub async fn reinstall(&mut self) -> Result<FlowOutcome> {
        let outcome = provision::ensure_installed(
            &self.settings.build_source,
            &self.settings.storage_root,
            &self.settings.image_manifest,
        )
        .await
        .map_err(|e| self.surface(e))?;
        let binaries_prepared = provision::prepare_binaries(&outcome.build, self.scripts.as_ref())
            .await
            .map_err(|e| self.surface(e))?;

        let version = outcome.build.version.clone();
        self.context.set_build(outcome.build);
        self.operator.info(&format!(
            "API Remoting binaries {version} installed."
        ));

        self.refresh_status(None, true).await?;
        Ok(FlowOutcome::Installed {
            version,
            binaries_prepared,
        })
    }

    /// Remove every installation under the storage root.
    ///
    /// # Errors
    ///
    /// Fails when an existing directory cannot be removed.
    pub async fn uninstall(&mut self) -> Result<FlowOutcome> {
        let removed = provision::uninstall(&self.settings.storage_root)
            .await
            .map_err(|e| self.surface(e))?;
        self.context.clear_build();
        self.operator.info(&format!(
            "Removed {removed} API Remoting installation(s)."
        ));

        self.refresh_status(None, true).await?;
        Ok(FlowOutcome::Uninstalled { removed })
    }
}

fn manual_choice(path: PathBuf) -> ModelChoice {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    ModelChoice {
        name,
        catalog_key: None,
        manual_path: Some(path),
    }
}

/// Short random token grouping the containers of one launch. Not a secret.
fn tracking_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_ids_are_short_lowercase_tokens() {
        let id = tracking_id();
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn manual_choice_uses_file_name() {
        let choice = manual_choice(PathBuf::from("/tmp/models/tiny.gguf"));
        assert_eq!(choice.name, "tiny.gguf");
        assert!(choice.catalog_key.is_none());
    }
}
