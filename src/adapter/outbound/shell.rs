//! Runs the build's shell scripts through a configured shell.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::Result;
use crate::port::{ScriptOutput, ScriptRunner};

/// [`ScriptRunner`] invoking `{shell} {script} {args..}` inside the build root.
#[derive(Debug, Clone)]
pub struct ShellScripts {
    shell: String,
}

impl ShellScripts {
    #[must_use]
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

#[async_trait]
impl ScriptRunner for ShellScripts {
    async fn run(&self, workdir: &Path, script: &str, args: &[String]) -> Result<ScriptOutput> {
        debug!(shell = %self.shell, script, workdir = %workdir.display(), "running script");

        let output = Command::new(&self.shell)
            .arg(script)
            .args(args)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .output()
            .await?;

        let result = ScriptOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(script, code = ?result.code, "script finished");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn captures_exit_code_and_streams() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(
            dir.path().join("probe.sh"),
            "echo \"state $1\"\necho oops >&2\nexit 11\n",
        )
        .expect("write script");

        let output = ShellScripts::new("sh")
            .run(dir.path(), "probe.sh", &["vm".to_string()])
            .await
            .expect("run");

        assert_eq!(output.code, Some(11));
        assert_eq!(output.stdout, "state vm\n");
        assert_eq!(output.stderr, "oops\n");
    }

    #[tokio::test]
    async fn runs_inside_the_working_directory() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("where.sh"), "test -f where.sh\n").expect("write script");

        let output = ShellScripts::new("sh")
            .run(dir.path(), "where.sh", &[])
            .await
            .expect("run");
        assert!(output.success());
    }

    #[tokio::test]
    async fn missing_shell_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let result = ShellScripts::new("/nonexistent/shell")
            .run(dir.path(), "x.sh", &[])
            .await;
        assert!(result.is_err());
    }
}
