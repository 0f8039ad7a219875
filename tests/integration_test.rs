//! Integration tests for the patch workflow

extern crate std;

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use patchkit::coordinate::CoordinateSystem;
use patchkit::georef::GeoReferencer;
use patchkit::tiff::RasterHeader;
use patchkit::tree::TreeLevel;
use patchkit::{DistanceMethod, ImageRecord, PatchKit, SliceMethod, SliceOptions};

/// A scratch workspace under the system temp directory
struct Workspace {
    root: PathBuf,
}

impl Workspace {
    fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!(
            "patchkit-it-{}-{}",
            std::process::id(),
            name
        ));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        Workspace { root }
    }

    fn dir(&self, name: &str) -> PathBuf {
        let dir = self.root.join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// Write a 55x40 gradient sheet and return its directory
fn write_parent_sheet(dir: &Path) -> PathBuf {
    let mut img = RgbImage::new(55, 40);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgb([(x * 4) as u8, (y * 6) as u8, 128]);
    }
    let path = dir.join("sheet.png");
    img.save(&path).unwrap();
    path
}

/// Write a pipe-delimited metadata table assigning coordinates
fn write_metadata(dir: &Path) -> PathBuf {
    let path = dir.join("metadata.csv");
    fs::write(
        &path,
        "name|coord|county\nsheet.png|(-1.0, 1.0, 50.0, 52.0)|Ayrshire\n",
    )
    .unwrap();
    path
}

fn slice_options(output_dir: PathBuf) -> SliceOptions {
    SliceOptions {
        method: SliceMethod::Pixels,
        tile_size: 16.0,
        output_dir,
        square_cuts: false,
        resize_factor: None,
        output_format: "png".to_string(),
        rewrite: false,
    }
}

#[test]
fn test_slice_rescan_georeference_stats_export() {
    let workspace = Workspace::new("workflow");
    let maps = workspace.dir("maps");
    let patches = workspace.dir("patches");
    let exports = workspace.dir("exports");
    write_parent_sheet(&maps);
    let metadata = write_metadata(&workspace.root);

    // --- Index and slice
    let mut kit = PatchKit::new();
    std::assert_eq!(kit.load_parents(&maps, None).unwrap(), 1);
    kit.add_metadata(&metadata, TreeLevel::Parent, '|', None)
        .unwrap();

    let registered = kit
        .slice_all(
            slice_options(patches.clone()),
            DistanceMethod::GreatCircle,
            0,
            -1,
        )
        .unwrap();
    // 55x40 with 16px tiles: 4 columns x 3 rows
    std::assert_eq!(registered, 12);
    std::assert_eq!(kit.tree().count(TreeLevel::Child), 12);

    let patch_files: Vec<_> = fs::read_dir(&patches).unwrap().collect();
    std::assert_eq!(patch_files.len(), 12);

    // --- Idempotence: a second identical run changes nothing
    let ids_before = kit.tree().list_children();
    kit.slice_all(
        slice_options(patches.clone()),
        DistanceMethod::GreatCircle,
        0,
        -1,
    )
    .unwrap();
    std::assert_eq!(kit.tree().list_children(), ids_before);
    std::assert_eq!(kit.tree().count(TreeLevel::Child), 12);

    // --- Geographic augmentation
    kit.add_coord_increments().unwrap();
    kit.add_center_coords(TreeLevel::Parent).unwrap();
    kit.add_center_coords(TreeLevel::Child).unwrap();

    let parent = kit.tree().get_parent("sheet.png").unwrap();
    let (dlon, dlat) = parent.pixel_deg.unwrap();
    std::assert!((dlon - 2.0 / 55.0).abs() < 1e-12);
    std::assert!((dlat - 2.0 / 40.0).abs() < 1e-12);

    for id in kit.tree().list_children() {
        let (lon, lat) = kit.tree().get_child(&id).unwrap().center.unwrap();
        std::assert!(lon > -1.0 && lon < 1.0, "center_lon {} out of bounds", lon);
        std::assert!(lat > 50.0 && lat < 52.0, "center_lat {} out of bounds", lat);
    }

    // --- Statistics
    let computed = kit.calc_pixel_stats(None).unwrap();
    std::assert_eq!(computed, 12);
    for id in kit.tree().list_children() {
        let stats = kit.tree().get_child(&id).unwrap().pixel_stats.unwrap();
        // The blue channel is constant across the gradient
        std::assert!((stats.mean.blue - 128.0 / 255.0).abs() < 1e-9);
        std::assert!(stats.std_dev.blue.abs() < 1e-9);
        std::assert!(stats.mean.alpha.is_none());
    }

    // --- Export and reload
    kit.export_to_files(
        &exports.join("parents.csv"),
        &exports.join("patches.csv"),
        '|',
    )
    .unwrap();

    let mut reloaded = PatchKit::new();
    reloaded
        .load_table_files(
            Some(&exports.join("parents.csv")),
            Some(&exports.join("patches.csv")),
            '|',
            true,
        )
        .unwrap();
    std::assert_eq!(reloaded.tree().count(TreeLevel::Parent), 1);
    std::assert_eq!(reloaded.tree().count(TreeLevel::Child), 12);

    let parent = reloaded.tree().get_parent("sheet.png").unwrap();
    std::assert_eq!(parent.children.len(), 12);
    std::assert_eq!(
        parent.extra.get("county").map(String::as_str),
        Some("Ayrshire")
    );
    let reloaded_stats = reloaded
        .tree()
        .get_child(&reloaded.tree().list_children()[0])
        .unwrap()
        .pixel_stats
        .unwrap();
    std::assert!((reloaded_stats.mean.blue - 128.0 / 255.0).abs() < 1e-9);
}

#[test]
fn test_rescanning_patch_files_rebuilds_the_children() {
    let workspace = Workspace::new("rescan");
    let maps = workspace.dir("maps");
    let patches = workspace.dir("patches");
    write_parent_sheet(&maps);

    let mut kit = PatchKit::new();
    kit.load_parents(&maps, None).unwrap();
    kit.slice_all(
        slice_options(patches.clone()),
        DistanceMethod::GreatCircle,
        0,
        -1,
    )
    .unwrap();
    let original_ids = kit.tree().list_children();

    // A fresh tree built only from the patch directory
    let mut rescanned = PatchKit::new();
    std::assert_eq!(rescanned.load_patches(&patches, None).unwrap(), 12);
    std::assert_eq!(rescanned.tree().list_children(), original_ids);

    // The parent exists as a placeholder until its directory is scanned
    let placeholder = rescanned.tree().get_parent("sheet.png").unwrap();
    std::assert!(placeholder.path.is_none());
    std::assert_eq!(placeholder.children.len(), 12);

    rescanned.load_parents(&maps, None).unwrap();
    std::assert!(rescanned.tree().get_parent("sheet.png").unwrap().path.is_some());
}

#[test]
fn test_square_cuts_write_full_size_patches() {
    let workspace = Workspace::new("square");
    let maps = workspace.dir("maps");
    let patches = workspace.dir("patches");
    write_parent_sheet(&maps);

    let mut kit = PatchKit::new();
    kit.load_parents(&maps, None).unwrap();
    let mut options = slice_options(patches.clone());
    options.square_cuts = true;
    kit.slice_all(options, DistanceMethod::GreatCircle, 0, -1)
        .unwrap();

    for id in kit.tree().list_children() {
        let child = kit.tree().get_child(&id).unwrap();
        let bounds = child.pixel_bounds.unwrap();
        std::assert_eq!(bounds.width(), 16);
        std::assert_eq!(bounds.height(), 16);
        let (width, height) = image::image_dimensions(child.path.as_ref().unwrap()).unwrap();
        std::assert_eq!((width, height), (16, 16));
    }
}

#[test]
fn test_invalid_range_aborts_before_any_work() {
    let workspace = Workspace::new("range");
    let maps = workspace.dir("maps");
    let patches = workspace.dir("patches");
    write_parent_sheet(&maps);

    let mut kit = PatchKit::new();
    kit.load_parents(&maps, None).unwrap();
    let result = kit.slice_all(
        slice_options(patches.clone()),
        DistanceMethod::GreatCircle,
        2,
        1,
    );
    std::assert!(result.is_err());
    std::assert_eq!(kit.tree().count(TreeLevel::Child), 0);
    std::assert_eq!(fs::read_dir(&patches).unwrap().count(), 0);
}

/// Build a little-endian GeoTIFF header declaring EPSG:4326 bounds
fn write_geotiff_header(path: &Path) {
    let mut buffer: Vec<u8> = Vec::new();
    let entry_count: u16 = 6;
    let data_start: u32 = 8 + 2 + entry_count as u32 * 12 + 4;

    buffer.extend_from_slice(&[0x49, 0x49]); // "II"
    buffer.extend_from_slice(&42u16.to_le_bytes());
    buffer.extend_from_slice(&8u32.to_le_bytes());

    buffer.extend_from_slice(&entry_count.to_le_bytes());
    // ImageWidth / ImageLength as LONGs
    for (tag, value) in [(256u16, 100u32), (257, 200)] {
        buffer.extend_from_slice(&tag.to_le_bytes());
        buffer.extend_from_slice(&4u16.to_le_bytes());
        buffer.extend_from_slice(&1u32.to_le_bytes());
        buffer.extend_from_slice(&value.to_le_bytes());
    }
    // SamplesPerPixel as SHORT
    buffer.extend_from_slice(&277u16.to_le_bytes());
    buffer.extend_from_slice(&3u16.to_le_bytes());
    buffer.extend_from_slice(&1u32.to_le_bytes());
    buffer.extend_from_slice(&3u16.to_le_bytes());
    buffer.extend_from_slice(&[0u8, 0]);
    // Pixel scale, tiepoint and GeoKey directory as offset arrays
    let scale_offset = data_start;
    let tiepoint_offset = scale_offset + 24;
    let keys_offset = tiepoint_offset + 48;
    for (tag, field_type, count, offset) in [
        (33550u16, 12u16, 3u32, scale_offset),
        (33922, 12, 6, tiepoint_offset),
        (34735, 3, 16, keys_offset),
    ] {
        buffer.extend_from_slice(&tag.to_le_bytes());
        buffer.extend_from_slice(&field_type.to_le_bytes());
        buffer.extend_from_slice(&count.to_le_bytes());
        buffer.extend_from_slice(&offset.to_le_bytes());
    }
    buffer.extend_from_slice(&0u32.to_le_bytes()); // no next IFD

    for value in [0.02f64, 0.01, 0.0] {
        buffer.extend_from_slice(&value.to_le_bytes());
    }
    for value in [0.0f64, 0.0, 0.0, -1.0, 52.0, 0.0] {
        buffer.extend_from_slice(&value.to_le_bytes());
    }
    for value in [1u16, 1, 0, 3, 1024, 0, 1, 2, 1025, 0, 1, 1, 2048, 0, 1, 4326] {
        buffer.extend_from_slice(&value.to_le_bytes());
    }

    fs::write(path, buffer).unwrap();
}

#[test]
fn test_georeferencing_a_geotiff_header() {
    let workspace = Workspace::new("geotiff");
    let maps = workspace.dir("maps");
    let tiff_path = maps.join("sheet.tif");
    write_geotiff_header(&tiff_path);

    // The header alone is enough; georeferencing never decodes pixels
    let header = RasterHeader::read_file(&tiff_path).unwrap();
    std::assert_eq!(header.crs, Some(CoordinateSystem::WGS84));

    let mut record = ImageRecord::parent("sheet.tif", tiff_path);
    let referencer = GeoReferencer::default();
    let bounds = referencer.georeference(&mut record).unwrap();

    std::assert!((bounds.lon_min - -1.0).abs() < 1e-9);
    std::assert!((bounds.lon_max - 1.0).abs() < 1e-9);
    std::assert!((bounds.lat_min - 50.0).abs() < 1e-9);
    std::assert!((bounds.lat_max - 52.0).abs() < 1e-9);
    std::assert_eq!(record.shape.map(|s| (s.height, s.width)), Some((200, 100)));
}
