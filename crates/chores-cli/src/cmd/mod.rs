pub mod add;
pub mod check;
pub mod completions;
pub mod edit;
pub mod list;
pub mod move_cmd;
pub mod rm;
pub mod session;
pub mod shell;
pub mod sort;

use crate::output::OutputMode;
use std::path::PathBuf;
use std::time::Duration;

/// Resolved settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputMode,
    pub quiet: bool,
    pub db_path: PathBuf,
    pub storage_key: String,
    pub lock_timeout: Duration,
}

/// Join trailing words into one item text.
pub(crate) fn join_words(words: &[String]) -> String {
    words.join(" ")
}
