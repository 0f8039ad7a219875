//! Georeferencing command
//!
//! Reads every parent's header, derives geographic bounds, physical
//! pixel sizes, coordinate increments and center coordinates at both
//! levels, then optionally exports the augmented tables.

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::commands::CommonArgs;
use crate::coordinate::DistanceMethod;
use crate::errors::PatchResult;
use crate::tree::TreeLevel;

/// Command for adding geographic information to the tree
pub struct GeorefCommand {
    common: CommonArgs,
    distance_method: DistanceMethod,
}

impl GeorefCommand {
    /// Create a new georeference command from CLI arguments
    pub fn new(args: &ArgMatches) -> PatchResult<Self> {
        let distance_method = args
            .get_one::<String>("distance-method")
            .map(|m| DistanceMethod::parse(m))
            .transpose()?
            .unwrap_or(DistanceMethod::GreatCircle);

        Ok(GeorefCommand {
            common: CommonArgs::from_matches(args)?,
            distance_method,
        })
    }
}

impl Command for GeorefCommand {
    fn execute(&self) -> PatchResult<()> {
        let mut kit = self.common.build_kit()?;

        let georeferenced = kit.add_geo_info(self.distance_method)?;
        kit.add_coord_increments()?;
        kit.add_center_coords(TreeLevel::Parent)?;
        kit.add_center_coords(TreeLevel::Child)?;

        info!(
            "Geographic bounds available for {} of {} parents",
            georeferenced,
            kit.tree().count(TreeLevel::Parent)
        );

        self.common.maybe_export(&kit)?;
        Ok(())
    }
}
