//! Slicing command
//!
//! Cuts every indexed parent into patches under the requested policy and
//! registers the results, optionally exporting the resulting tables.

use std::path::PathBuf;

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::commands::CommonArgs;
use crate::coordinate::DistanceMethod;
use crate::errors::{PatchError, PatchResult};
use crate::slicer::{SliceMethod, SliceOptions};

/// Command for slicing parents into patches
pub struct SliceCommand {
    common: CommonArgs,
    options: SliceOptions,
    distance_method: DistanceMethod,
    id_start: usize,
    id_end: i64,
}

impl SliceCommand {
    /// Create a new slice command from CLI arguments
    pub fn new(args: &ArgMatches) -> PatchResult<Self> {
        let common = CommonArgs::from_matches(args)?;

        let method = args
            .get_one::<String>("method")
            .map(|m| SliceMethod::parse(m))
            .transpose()?
            .unwrap_or(SliceMethod::Pixels);

        let tile_size = args
            .get_one::<String>("slice-size")
            .map(|s| {
                s.parse::<f64>().map_err(|_| {
                    PatchError::GenericError(format!("Invalid slice size: {}", s))
                })
            })
            .transpose()?
            .unwrap_or(100.0);

        let resize_factor = args
            .get_one::<String>("resize")
            .map(|s| {
                s.parse::<f64>().map_err(|_| {
                    PatchError::GenericError(format!("Invalid resize factor: {}", s))
                })
            })
            .transpose()?;

        let output_dir = args
            .get_one::<String>("output")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("sliced_images"));

        let output_format = args
            .get_one::<String>("format")
            .cloned()
            .unwrap_or_else(|| "png".to_string());

        let distance_method = args
            .get_one::<String>("distance-method")
            .map(|m| DistanceMethod::parse(m))
            .transpose()?
            .unwrap_or(DistanceMethod::GreatCircle);

        let (id_start, id_end) = parse_range(args.get_one::<String>("range"))?;

        Ok(SliceCommand {
            common,
            options: SliceOptions {
                method,
                tile_size,
                output_dir,
                square_cuts: args.get_flag("square-cuts"),
                resize_factor,
                output_format,
                rewrite: args.get_flag("rewrite"),
            },
            distance_method,
            id_start,
            id_end,
        })
    }
}

impl Command for SliceCommand {
    fn execute(&self) -> PatchResult<()> {
        let mut kit = self.common.build_kit()?;

        let registered = kit.slice_all(
            self.options.clone(),
            self.distance_method,
            self.id_start,
            self.id_end,
        )?;
        info!(
            "Registered {} patches under {}",
            registered,
            self.options.output_dir.display()
        );

        self.common.maybe_export(&kit)?;
        Ok(())
    }
}

/// Parse a "start,end" parent range; end defaults to -1 (open)
fn parse_range(range: Option<&String>) -> PatchResult<(usize, i64)> {
    let Some(text) = range else {
        return Ok((0, -1));
    };
    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() != 2 {
        return Err(PatchError::InvalidRange(format!(
            "Range must be 'start,end': {}",
            text
        )));
    }
    let start = parts[0].trim().parse::<usize>().map_err(|_| {
        PatchError::InvalidRange(format!("Invalid range start: {}", parts[0]))
    })?;
    let end = parts[1].trim().parse::<i64>().map_err(|_| {
        PatchError::InvalidRange(format!("Invalid range end: {}", parts[1]))
    })?;
    Ok((start, end))
}
