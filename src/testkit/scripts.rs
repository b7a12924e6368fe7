//! Script runner with scripted replies.

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::build::{SENTINEL_BINARY, UPDATE_BINARIES_SCRIPT};
use crate::error::Result;
use crate::port::{ScriptOutput, ScriptRunner};

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptCall {
    pub workdir: PathBuf,
    pub script: String,
    pub args: Vec<String>,
}

#[derive(Default)]
struct State {
    replies: HashMap<String, VecDeque<ScriptOutput>>,
    unstartable: HashSet<String>,
    calls: Vec<ScriptCall>,
}

/// Replies per script name. Queued replies are consumed in order and the
/// last one repeats; scripts without replies exit 0 silently.
///
/// A successful binary update creates `bin/krunkit` in the working
/// directory, like the real script does.
#[derive(Clone, Default)]
pub struct FakeScripts {
    state: Arc<Mutex<State>>,
}

impl FakeScripts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exit(self, script: &str, code: i32) -> Self {
        self.with_reply(
            script,
            ScriptOutput {
                code: Some(code),
                ..ScriptOutput::default()
            },
        )
    }

    pub fn with_reply(self, script: &str, reply: ScriptOutput) -> Self {
        self.state
            .lock()
            .replies
            .entry(script.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// `script` cannot be started, like a missing interpreter.
    pub fn with_spawn_failure(self, script: &str) -> Self {
        self.state.lock().unstartable.insert(script.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ScriptCall> {
        self.state.lock().calls.clone()
    }

    /// How many times `script` ran.
    pub fn count(&self, script: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.script == script)
            .count()
    }

    fn next_reply(&self, script: &str) -> ScriptOutput {
        let mut state = self.state.lock();
        match state.replies.get_mut(script) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => ScriptOutput {
                code: Some(0),
                ..ScriptOutput::default()
            },
        }
    }
}

#[async_trait]
impl ScriptRunner for FakeScripts {
    async fn run(&self, workdir: &Path, script: &str, args: &[String]) -> Result<ScriptOutput> {
        self.state.lock().calls.push(ScriptCall {
            workdir: workdir.to_path_buf(),
            script: script.to_string(),
            args: args.to_vec(),
        });

        if self.state.lock().unstartable.contains(script) {
            let err = io::Error::new(io::ErrorKind::NotFound, format!("cannot start {script}"));
            return Err(err.into());
        }

        let reply = self.next_reply(script);
        if script == UPDATE_BINARIES_SCRIPT && reply.success() {
            let bin = workdir.join("bin");
            std::fs::create_dir_all(&bin)?;
            std::fs::write(bin.join(SENTINEL_BINARY), b"")?;
        }
        Ok(reply)
    }
}
