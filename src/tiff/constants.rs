//! Tag and key constants for the header reader

/// TIFF tag identifiers
pub mod tags {
    /// Image width in pixels
    pub const IMAGE_WIDTH: u16 = 256;
    /// Image height in pixels
    pub const IMAGE_LENGTH: u16 = 257;
    /// Number of samples (channels) per pixel
    pub const SAMPLES_PER_PIXEL: u16 = 277;
    /// GeoTIFF model pixel scale (3 doubles)
    pub const MODEL_PIXEL_SCALE: u16 = 33550;
    /// GeoTIFF model tiepoint (6 doubles per point)
    pub const MODEL_TIEPOINT: u16 = 33922;
    /// GeoTIFF key directory (shorts)
    pub const GEO_KEY_DIRECTORY: u16 = 34735;
}

/// TIFF field type identifiers
pub mod field_types {
    pub const BYTE: u16 = 1;
    pub const ASCII: u16 = 2;
    pub const SHORT: u16 = 3;
    pub const LONG: u16 = 4;
    pub const RATIONAL: u16 = 5;
    pub const DOUBLE: u16 = 12;
    pub const LONG8: u16 = 16;
}

/// GeoKey identifiers
pub mod geo_keys {
    /// Model type: 1 = projected, 2 = geographic
    pub const GT_MODEL_TYPE: u16 = 1024;
    /// EPSG code of a geographic coordinate system
    pub const GEOGRAPHIC_TYPE: u16 = 2048;
    /// EPSG code of a projected coordinate system
    pub const PROJECTED_CS_TYPE: u16 = 3072;

    /// Model type code for projected systems
    pub const MODEL_TYPE_PROJECTED: u16 = 1;
    /// Model type code for geographic systems
    pub const MODEL_TYPE_GEOGRAPHIC: u16 = 2;

    /// "User defined" sentinel, carries no EPSG code
    pub const USER_DEFINED: u16 = 32767;
}
