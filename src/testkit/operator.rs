//! Operator with queued answers.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::MachineStatus;
use crate::error::Result;
use crate::port::{Notice, NoticeLevel, Operator};

#[derive(Default)]
struct State {
    selections: VecDeque<Option<usize>>,
    inputs: VecDeque<Option<String>>,
    files: VecDeque<Option<PathBuf>>,
    prompts: Vec<String>,
    notices: Vec<Notice>,
    statuses: Vec<MachineStatus>,
}

/// Answers prompts from queues; an empty queue answers as a cancel.
#[derive(Clone, Default)]
pub struct ScriptedOperator {
    state: Arc<Mutex<State>>,
}

impl ScriptedOperator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(self, index: usize) -> Self {
        self.state.lock().selections.push_back(Some(index));
        self
    }

    pub fn with_input(self, answer: &str) -> Self {
        self.state.lock().inputs.push_back(Some(answer.to_string()));
        self
    }

    pub fn with_cancelled_input(self) -> Self {
        self.state.lock().inputs.push_back(None);
        self
    }

    pub fn with_file(self, path: impl Into<PathBuf>) -> Self {
        self.state.lock().files.push_back(Some(path.into()));
        self
    }

    /// Every prompt shown, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.state.lock().prompts.clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.state.lock().notices.clone()
    }

    /// Messages of one level, in order.
    pub fn messages(&self, level: NoticeLevel) -> Vec<String> {
        self.state
            .lock()
            .notices
            .iter()
            .filter(|notice| notice.level == level)
            .map(|notice| notice.message.clone())
            .collect()
    }

    /// Every status pushed to the status display, in order.
    pub fn statuses(&self) -> Vec<MachineStatus> {
        self.state.lock().statuses.clone()
    }
}

impl Operator for ScriptedOperator {
    fn select(&self, prompt: &str, _items: &[String]) -> Result<Option<usize>> {
        let mut state = self.state.lock();
        state.prompts.push(prompt.to_string());
        Ok(state.selections.pop_front().flatten())
    }

    fn input(&self, prompt: &str, _default: Option<&str>) -> Result<Option<String>> {
        let mut state = self.state.lock();
        state.prompts.push(prompt.to_string());
        Ok(state.inputs.pop_front().flatten())
    }

    fn pick_file(&self, prompt: &str, _extension: &str) -> Result<Option<PathBuf>> {
        let mut state = self.state.lock();
        state.prompts.push(prompt.to_string());
        Ok(state.files.pop_front().flatten())
    }

    fn notify(&self, notice: Notice) {
        self.state.lock().notices.push(notice);
    }

    fn show_status(&self, status: MachineStatus) {
        self.state.lock().statuses.push(status);
    }
}
