//! CLI command implementations
//!
//! Implementations of the operations supported by the CLI application
//! using the Command pattern.

pub mod command_traits;
pub mod index_command;
pub mod slice_command;
pub mod georef_command;
pub mod stats_command;

pub use command_traits::{Command, CommandFactory};
pub use index_command::IndexCommand;
pub use slice_command::SliceCommand;
pub use georef_command::GeorefCommand;
pub use stats_command::StatsCommand;

use clap::ArgMatches;

use crate::errors::PatchResult;

/// Factory creating command instances based on CLI arguments
pub struct PatchkitCommandFactory;

impl PatchkitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        PatchkitCommandFactory
    }
}

impl Default for PatchkitCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for PatchkitCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> PatchResult<Box<dyn Command>> {
        if args.get_flag("slice") {
            Ok(Box::new(SliceCommand::new(args)?))
        } else if args.get_flag("georef") {
            Ok(Box::new(GeorefCommand::new(args)?))
        } else if args.get_flag("stats") {
            Ok(Box::new(StatsCommand::new(args)?))
        } else {
            // Default to indexing the input directory
            Ok(Box::new(IndexCommand::new(args)?))
        }
    }
}

/// Arguments shared by every command
#[derive(Debug, Clone)]
pub(crate) struct CommonArgs {
    /// Directory holding the parent rasters
    pub input_dir: std::path::PathBuf,
    /// Optional file-name filter
    pub pattern: Option<String>,
    /// Optional directory holding existing patch files
    pub patches_dir: Option<std::path::PathBuf>,
    /// Optional metadata table to merge
    pub metadata: Option<std::path::PathBuf>,
    /// Tree level the metadata rows describe
    pub metadata_level: crate::tree::TreeLevel,
    /// Table column delimiter
    pub delimiter: char,
    /// Directory receiving exported tables, when exporting
    pub export_dir: Option<std::path::PathBuf>,
}

impl CommonArgs {
    pub fn from_matches(args: &ArgMatches) -> PatchResult<Self> {
        let input_dir = args
            .get_one::<String>("input")
            .map(std::path::PathBuf::from)
            .ok_or_else(|| crate::errors::PatchError::GenericError(
                "Missing input directory".to_string(),
            ))?;

        let delimiter = args
            .get_one::<String>("delimiter")
            .and_then(|d| d.chars().next())
            .unwrap_or(crate::tree::DEFAULT_DELIMITER);

        let metadata_level = args
            .get_one::<String>("metadata-level")
            .map(|level| crate::tree::TreeLevel::parse(level))
            .transpose()?
            .unwrap_or(crate::tree::TreeLevel::Parent);

        Ok(CommonArgs {
            input_dir,
            pattern: args.get_one::<String>("pattern").cloned(),
            patches_dir: args
                .get_one::<String>("patches")
                .map(std::path::PathBuf::from),
            metadata: args
                .get_one::<String>("metadata")
                .map(std::path::PathBuf::from),
            metadata_level,
            delimiter,
            export_dir: args
                .get_one::<String>("export-dir")
                .map(std::path::PathBuf::from),
        })
    }

    /// Build a tree per these arguments: parents, patches, metadata
    pub fn build_kit(&self) -> PatchResult<crate::api::PatchKit> {
        let mut kit = crate::api::PatchKit::new();
        kit.load_parents(&self.input_dir, self.pattern.as_deref())?;
        if let Some(dir) = &self.patches_dir {
            kit.load_patches(dir, None)?;
        }
        if let Some(path) = &self.metadata {
            kit.add_metadata(path, self.metadata_level, self.delimiter, None)?;
        }
        Ok(kit)
    }

    /// Export the tree when an export directory was requested
    pub fn maybe_export(&self, kit: &crate::api::PatchKit) -> PatchResult<()> {
        if let Some(dir) = &self.export_dir {
            std::fs::create_dir_all(dir)?;
            kit.export_to_files(
                &dir.join("parents.csv"),
                &dir.join("patches.csv"),
                self.delimiter,
            )?;
        }
        Ok(())
    }
}
