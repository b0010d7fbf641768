//! Input source selection and reading

use std::path::PathBuf;

pub mod source;

pub use source::{set_nonblocking, InputSource, ReadOutcome};

/// Where to read from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputSpec {
    /// The process's standard input
    #[default]
    Stdin,
    /// A named file or FIFO, optionally reopened at end of input
    Path { path: PathBuf, reopen: bool },
}

impl InputSpec {
    /// Name used in diagnostics
    pub fn name(&self) -> String {
        match self {
            InputSpec::Stdin => "STDIN".to_string(),
            InputSpec::Path { path, .. } => path.display().to_string(),
        }
    }
}
