//! Coordinate Reference System handling

use std::collections::HashMap;
use lazy_static::lazy_static;

use crate::errors::{PatchError, PatchResult};

lazy_static! {
    // Parse the catalog at startup; an unreadable catalog only costs
    // the human-readable names, never an operation.
    static ref CRS_CATALOG: HashMap<u32, String> = {
        let content = include_str!("../../crs_catalog.toml");
        parse_catalog(content).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to parse CRS catalog: {}", e);
            HashMap::new()
        })
    };
}

/// Parse the EPSG catalog from a TOML string
fn parse_catalog(content: &str) -> PatchResult<HashMap<u32, String>> {
    let toml_value: toml::Value = content
        .parse()
        .map_err(|e| PatchError::GenericError(format!("Failed to parse TOML: {}", e)))?;

    let mut names = HashMap::new();
    if let Some(table) = toml_value.get("epsg_names").and_then(|v| v.as_table()) {
        for (k, v) in table {
            if let (Ok(code), Some(name)) = (k.parse::<u32>(), v.as_str()) {
                names.insert(code, name.to_string());
            }
        }
    }
    Ok(names)
}

/// Look up the catalog name for an EPSG code
pub fn epsg_name(code: u32) -> Option<&'static str> {
    CRS_CATALOG.get(&code).map(|s| s.as_str())
}

/// Identifier for common coordinate systems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// WGS 84 (EPSG:4326)
    WGS84,
    /// Web Mercator (EPSG:3857)
    WebMercator,
    /// Other EPSG code
    Other(u32),
}

impl CoordinateSystem {
    /// Get the EPSG code for this coordinate system
    pub fn epsg_code(&self) -> u32 {
        match self {
            CoordinateSystem::WGS84 => 4326,
            CoordinateSystem::WebMercator => 3857,
            CoordinateSystem::Other(code) => *code,
        }
    }

    /// Get a description of this coordinate system
    ///
    /// Uses the embedded EPSG catalog when it knows the code.
    pub fn description(&self) -> String {
        let code = self.epsg_code();
        match epsg_name(code) {
            Some(name) => format!("{} (EPSG:{})", name, code),
            None => format!("EPSG:{}", code),
        }
    }
}

/// Factory for creating coordinate systems
pub struct CoordinateSystemFactory;

impl CoordinateSystemFactory {
    /// Create a coordinate system from an EPSG code
    pub fn from_epsg(epsg: u32) -> CoordinateSystem {
        match epsg {
            4326 => CoordinateSystem::WGS84,
            3857 | 900913 => CoordinateSystem::WebMercator,
            _ => CoordinateSystem::Other(epsg),
        }
    }

    /// Parse a coordinate system from a string (e.g. "EPSG:4326")
    pub fn from_string(crs_str: &str) -> PatchResult<CoordinateSystem> {
        let crs_str = crs_str.trim().to_uppercase();

        if let Some(epsg_str) = crs_str.strip_prefix("EPSG:") {
            match epsg_str.parse::<u32>() {
                Ok(epsg) => Ok(Self::from_epsg(epsg)),
                Err(_) => Err(PatchError::GenericError(format!(
                    "Invalid EPSG code: {}",
                    epsg_str
                ))),
            }
        } else if let Ok(epsg) = crs_str.parse::<u32>() {
            Ok(Self::from_epsg(epsg))
        } else {
            Err(PatchError::GenericError(format!(
                "Unsupported CRS format: {}",
                crs_str
            )))
        }
    }
}
