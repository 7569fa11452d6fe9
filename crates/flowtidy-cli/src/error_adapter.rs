//! Error adapter for converting CliError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use flowtidy::FlowtidyError;

use crate::CliError;

/// Adapter rendering a [`CliError`] through miette.
///
/// None of the errors carry source locations, so only the code and the help
/// text are filled in.
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            CliError::Transport(_) => "flowtidy::transport",
            CliError::Config(_) | CliError::Run(FlowtidyError::Config(_)) => "flowtidy::config",
            CliError::Run(FlowtidyError::Connectivity(_)) => "flowtidy::connectivity",
            CliError::Run(FlowtidyError::Snapshot { .. }) => "flowtidy::snapshot",
            CliError::Run(FlowtidyError::Catalog(_)) => "flowtidy::catalog",
            CliError::Run(FlowtidyError::Graph(_)) => "flowtidy::graph",
            CliError::Run(FlowtidyError::Layout(_)) => "flowtidy::layout",
            CliError::Incomplete { .. } => "flowtidy::reconcile",
            CliError::Output(_) => "flowtidy::io",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            CliError::Transport(_) => "the API root must be an absolute http(s) URL ending in /nifi-api",
            CliError::Run(FlowtidyError::Connectivity(_)) => {
                "check that NiFi is running and that the API root and token are correct"
            }
            CliError::Run(FlowtidyError::Snapshot { .. }) => {
                "check the process group id; `root` names the top-level canvas"
            }
            CliError::Incomplete { .. } => {
                "the failed components were logged above; rerun once they are no longer being edited"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}
