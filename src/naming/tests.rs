//! Tests for the patch name codec

extern crate std;

use crate::coordinate::PixelBounds;
use crate::naming::{decode_patch_name, encode_patch_name, BOUNDS_DELIMITER, PARENT_DELIMITER};

#[test]
fn test_encode_layout() {
    let bounds = PixelBounds::new(0, 100, 100, 200);
    let name = encode_patch_name("sheet_074.png", &bounds, "png");
    std::assert_eq!(name, "patch#sheet_074.png#-0-100-100-200-.png");
}

#[test]
fn test_round_trip() {
    let cases = [
        PixelBounds::new(0, 0, 1, 1),
        PixelBounds::new(0, 100, 100, 200),
        PixelBounds::new(4900, 6900, 5000, 7000),
    ];
    for bounds in cases {
        let name = encode_patch_name("map.tif", &bounds, "png");
        let (parent, decoded) =
            decode_patch_name(&name, PARENT_DELIMITER, BOUNDS_DELIMITER).unwrap();
        std::assert_eq!(parent, "map.tif");
        std::assert_eq!(decoded, bounds);
    }
}

#[test]
fn test_decode_is_positional_not_semantic() {
    // A name with extra trailing fields still decodes from the leading
    // positions
    let (parent, bounds) =
        decode_patch_name("patch#map.png#-5-6-7-8-extra-9.png", "#", "-").unwrap();
    std::assert_eq!(parent, "map.png");
    std::assert_eq!(bounds, PixelBounds::new(5, 6, 7, 8));
}

#[test]
fn test_decode_rejects_missing_fields() {
    std::assert!(decode_patch_name("map.png", "#", "-").is_err());
    std::assert!(decode_patch_name("patch#map.png#-1-2.png", "#", "-").is_err());
}

#[test]
fn test_decode_rejects_non_integer_bounds() {
    std::assert!(decode_patch_name("patch#map.png#-a-b-c-d-.png", "#", "-").is_err());
}

#[test]
fn test_decode_performs_no_ordering_validation() {
    // max before min decodes fine; validation is the owner's job
    let (_, bounds) = decode_patch_name("patch#map.png#-9-9-1-1-.png", "#", "-").unwrap();
    std::assert!(bounds.validate().is_err());
}
