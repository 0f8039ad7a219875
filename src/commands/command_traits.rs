//! Command pattern interfaces
//!
//! Each CLI operation is encapsulated in a Command object, created by a
//! factory from the parsed arguments, keeping main.rs free of operation
//! logic.

use crate::errors::PatchResult;

/// Represents an executable command in the application
pub trait Command {
    /// Execute the command
    ///
    /// # Returns
    /// Result indicating success or an error
    fn execute(&self) -> PatchResult<()>;
}

/// Factory for creating commands from CLI arguments
pub trait CommandFactory {
    /// Create a Command instance based on CLI arguments
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    ///
    /// # Returns
    /// A command that implements the Command trait, or an error
    fn create_command(&self, args: &clap::ArgMatches) -> PatchResult<Box<dyn Command>>;
}
