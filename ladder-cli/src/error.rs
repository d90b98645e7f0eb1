// ============================================================================
// ladder-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Result alias and exit code mapping
//
// The CLI reuses CoreError; every failure that reaches main ends the process
// with exit code 1.

use ladder_core::{CoreError, CoreResult};

use std::fmt;

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Exit code for any failed run.
pub const EXIT_FAILURE: i32 = 1;

/// Extension trait for adding context to errors in the CLI.
pub trait CliErrorContext<T> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: fmt::Display,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| CoreError::OperationFailed(format!("{context}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_context_prefixes_message() {
        let result: Result<(), String> = Err("boom".to_string());
        let err = result.cli_context("Writing report").unwrap_err();
        assert_eq!(err.to_string(), "Writing report: boom");
    }
}
