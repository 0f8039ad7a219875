pub mod errors;
pub mod io;
pub mod tiff;
pub mod coordinate;
pub mod naming;
pub mod tree;
pub mod slicer;
pub mod georef;
pub mod stats;
pub mod utils;
pub mod commands;
pub mod api;

pub use crate::api::PatchKit;

pub use errors::{PatchError, PatchResult};
pub use coordinate::{DistanceMethod, GeoBounds, PixelBounds};
pub use georef::GeoReferencer;
pub use slicer::{Patchifier, SliceMethod, SliceOptions};
pub use stats::StatsComputer;
pub use tree::{ImageRecord, ImageTree, Table, TreeLevel};
