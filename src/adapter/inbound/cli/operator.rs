//! Terminal implementation of the operator port.

use std::path::{Path, PathBuf};

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

use crate::adapter::inbound::cli::output;
use crate::domain::MachineStatus;
use crate::error::Result;
use crate::port::{Notice, Operator};

/// Asks questions with `dialoguer` and prints through [`output`].
#[derive(Default)]
pub struct TerminalOperator {
    theme: ColorfulTheme,
}

impl TerminalOperator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Operator for TerminalOperator {
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_opt()?)
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> Result<Option<String>> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        let answer = input.interact_text()?;
        let answer = answer.trim();
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    }

    fn pick_file(&self, prompt: &str, extension: &str) -> Result<Option<PathBuf>> {
        let answer = Input::<String>::with_theme(&self.theme)
            .with_prompt(format!("{prompt} (.{extension}, empty to cancel)"))
            .allow_empty(true)
            .validate_with(|input: &String| validate_file(input, extension))
            .interact_text()?;
        let answer = answer.trim();
        Ok((!answer.is_empty()).then(|| PathBuf::from(answer)))
    }

    fn notify(&self, notice: Notice) {
        output::notice(notice.level, &notice.message);
    }

    fn show_status(&self, status: MachineStatus) {
        output::field("Machine", output::highlight(status.label()));
    }
}

fn validate_file(input: &str, extension: &str) -> std::result::Result<(), String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(());
    }
    let path = Path::new(input);
    if !path.is_file() {
        return Err(format!("{input} is not a file"));
    }
    if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
        return Err(format!("expected a .{extension} file"));
    }
    Ok(())
}
