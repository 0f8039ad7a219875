//! Tree indexing command
//!
//! Builds the image tree from the input directory (plus optional patch
//! directory and metadata) and prints a summary. The default command
//! when no other operation is requested.

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::commands::CommonArgs;
use crate::errors::PatchResult;

/// Command for indexing rasters into an image tree
pub struct IndexCommand {
    common: CommonArgs,
}

impl IndexCommand {
    /// Create a new index command from CLI arguments
    pub fn new(args: &ArgMatches) -> PatchResult<Self> {
        Ok(IndexCommand {
            common: CommonArgs::from_matches(args)?,
        })
    }
}

impl Command for IndexCommand {
    fn execute(&self) -> PatchResult<()> {
        let kit = self.common.build_kit()?;

        info!("Indexed {}", self.common.input_dir.display());
        println!("{}", kit.summary());

        self.common.maybe_export(&kit)?;
        Ok(())
    }
}
