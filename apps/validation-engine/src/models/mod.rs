//! Core data types shared across the validation pipeline.

mod command;
mod verdict;

pub use command::{Command, CommandAction, Platform, Side};
pub use verdict::Verdict;
