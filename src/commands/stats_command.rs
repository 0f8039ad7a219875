//! Pixel statistics command
//!
//! Computes per-channel statistics for every indexed patch, optionally
//! restricted to one parent, then optionally exports the tables.

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::commands::CommonArgs;
use crate::errors::PatchResult;

/// Command for computing patch pixel statistics
pub struct StatsCommand {
    common: CommonArgs,
    parent_id: Option<String>,
}

impl StatsCommand {
    /// Create a new stats command from CLI arguments
    pub fn new(args: &ArgMatches) -> PatchResult<Self> {
        Ok(StatsCommand {
            common: CommonArgs::from_matches(args)?,
            parent_id: args.get_one::<String>("parent-id").cloned(),
        })
    }
}

impl Command for StatsCommand {
    fn execute(&self) -> PatchResult<()> {
        let mut kit = self.common.build_kit()?;

        let updated = kit.calc_pixel_stats(self.parent_id.as_deref())?;
        info!("Pixel statistics available for {} patches", updated);

        self.common.maybe_export(&kit)?;
        Ok(())
    }
}
