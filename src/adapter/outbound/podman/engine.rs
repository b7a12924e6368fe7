use std::process::Stdio;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use super::args::run_args;
use super::dto::{PodmanContainer, PodmanImage, PodmanMachine};
use crate::domain::{
    ContainerLaunchSpec, ContainerRef, ContainerSummary, EngineConnection, ImageInfo,
};
use crate::error::EngineError;
use crate::port::{ContainerEngine, PullProgress};

/// [`ContainerEngine`] backed by the `podman` command line.
#[derive(Debug, Clone)]
pub struct PodmanEngine {
    binary: String,
}

impl PodmanEngine {
    #[must_use]
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// `podman <subcommand words>` for logs and errors, without flag values.
    fn describe<S: AsRef<str>>(&self, args: &[S]) -> String {
        let words: Vec<&str> = args
            .iter()
            .map(AsRef::as_ref)
            .take_while(|arg| !arg.starts_with('-'))
            .collect();
        format!("{} {}", self.binary, words.join(" "))
    }

    fn command<S: AsRef<str>>(&self, args: &[S]) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .args(args.iter().map(AsRef::as_ref))
            .stdin(Stdio::null());
        command
    }

    async fn output<S: AsRef<str>>(&self, args: &[S]) -> Result<String, EngineError> {
        let command = self.describe(args);
        debug!(command = %command, "running podman");

        let output = self
            .command(args)
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(EngineError::CommandFailed {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn json_list<T: DeserializeOwned>(&self, args: &[&str]) -> Result<Vec<T>, EngineError> {
        let stdout = self.output(args).await?;
        let stdout = stdout.trim();
        if stdout.is_empty() || stdout == "null" {
            return Ok(Vec::new());
        }
        serde_json::from_str(stdout).map_err(|source| EngineError::Decode {
            command: self.describe(args),
            source,
        })
    }
}

#[async_trait]
impl ContainerEngine for PodmanEngine {
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, EngineError> {
        let containers: Vec<PodmanContainer> = self
            .json_list(&["ps", "--all", "--format", "json"])
            .await?;
        Ok(containers.into_iter().map(ContainerSummary::from).collect())
    }

    async fn list_connections(&self) -> Result<Vec<EngineConnection>, EngineError> {
        let machines: Vec<PodmanMachine> = self
            .json_list(&["machine", "list", "--format", "json"])
            .await?;
        Ok(machines.into_iter().map(EngineConnection::from).collect())
    }

    async fn pull_image(
        &self,
        reference: &str,
        progress: &dyn PullProgress,
    ) -> Result<(), EngineError> {
        let args = ["pull", reference];
        let command = self.describe(&args);

        let spawn_error = |source| EngineError::Spawn {
            command: command.clone(),
            source,
        };
        let mut child = self
            .command(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Podman reports pull progress on stderr and the image id on stdout.
        let read_stdout = async {
            match stdout {
                Some(stdout) => read_text(stdout).await,
                None => String::new(),
            }
        };
        let read_stderr = async {
            let mut captured = Vec::new();
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                loop {
                    match lines.next_line().await {
                        Ok(Some(line)) => {
                            progress.on_line(&line);
                            captured.push(line);
                        }
                        Ok(None) => break,
                        Err(e) => {
                            debug!(error = %e, "pull progress stream ended early");
                            break;
                        }
                    }
                }
            }
            captured
        };
        let (image_id, captured) = tokio::join!(read_stdout, read_stderr);

        let status = child.wait().await.map_err(spawn_error)?;
        if !status.success() {
            return Err(EngineError::CommandFailed {
                command,
                code: status.code(),
                stderr: captured.join("\n"),
            });
        }
        debug!(image = %reference, id = %image_id.trim(), "image pulled");
        Ok(())
    }

    async fn list_images(&self) -> Result<Vec<ImageInfo>, EngineError> {
        let images: Vec<PodmanImage> = self.json_list(&["images", "--format", "json"]).await?;
        Ok(images.into_iter().map(ImageInfo::from).collect())
    }

    async fn create_container(
        &self,
        spec: &ContainerLaunchSpec,
    ) -> Result<ContainerRef, EngineError> {
        let stdout = self.output(&run_args(spec)).await?;
        let id = stdout.lines().last().unwrap_or_default().trim();
        if id.is_empty() {
            return Err(EngineError::CommandFailed {
                command: self.describe(&["run"]),
                code: Some(0),
                stderr: "no container id printed".to_string(),
            });
        }
        Ok(ContainerRef::new(id))
    }

    async fn stop_container(&self, container: &ContainerRef) -> Result<(), EngineError> {
        self.output(&["stop", container.id.as_str()]).await?;
        Ok(())
    }
}

/// Everything `reader` yields until EOF. A read error ends the text early.
async fn read_text<R: AsyncRead + Unpin>(mut reader: R) -> String {
    let mut buf = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buf).await {
        debug!(error = %e, read = buf.len(), "output stream ended early");
    }
    String::from_utf8_lossy(&buf).into_owned()
}
