//! CLI module graph.

pub mod command;
pub mod config;
pub mod diagnostic;
pub mod menu;
pub mod models;
pub mod operator;
pub mod output;
pub mod paths;
pub mod progress;
pub mod run;
