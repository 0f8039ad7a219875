//! Tests for metadata merging and table import

extern crate std;

use std::path::PathBuf;

use crate::coordinate::{GeoBounds, PixelBounds};
use crate::tree::{ImageRecord, ImageTree, Table, TreeLevel};

fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
    let mut table = Table::new(columns.iter().map(|c| c.to_string()).collect());
    for row in rows {
        table.push_row(row.iter().map(|c| c.to_string()).collect());
    }
    table
}

fn tree_with_parent(id: &str) -> ImageTree {
    let mut tree = ImageTree::new();
    tree.register(ImageRecord::parent(id, PathBuf::from(format!("/maps/{}", id))))
        .unwrap();
    tree
}

#[test]
fn test_merge_parses_coord_into_geo_bounds() {
    let mut tree = tree_with_parent("sheet.png");
    let metadata = table(
        &["name", "coord", "county"],
        &[&["sheet.png", "(-1.0, 1.0, 50.0, 52.0)", "Ayrshire"]],
    );

    let matched = tree
        .merge_metadata(&metadata, TreeLevel::Parent, None)
        .unwrap();
    std::assert_eq!(matched, 1);

    let parent = tree.get_parent("sheet.png").unwrap();
    std::assert_eq!(
        parent.geo_bounds,
        Some(GeoBounds::new(-1.0, 1.0, 50.0, 52.0))
    );
    std::assert_eq!(parent.extra.get("county").map(String::as_str), Some("Ayrshire"));
}

#[test]
fn test_merge_unknown_keys_change_nothing() {
    let mut tree = tree_with_parent("sheet.png");
    let metadata = table(
        &["name", "coord"],
        &[&["other.png", "(-1.0, 1.0, 50.0, 52.0)"]],
    );

    let matched = tree
        .merge_metadata(&metadata, TreeLevel::Parent, None)
        .unwrap();
    std::assert_eq!(matched, 0);
    std::assert_eq!(tree.len(), 1);
    std::assert!(tree.get_parent("sheet.png").unwrap().geo_bounds.is_none());
}

#[test]
fn test_merge_prefers_name_over_image_id() {
    let mut tree = tree_with_parent("by-name.png");
    let metadata = table(
        &["image_id", "name", "surveyed"],
        &[&["by-image-id.png", "by-name.png", "1894"]],
    );

    let matched = tree
        .merge_metadata(&metadata, TreeLevel::Parent, None)
        .unwrap();
    std::assert_eq!(matched, 1);
    std::assert_eq!(
        tree.get_parent("by-name.png").unwrap().extra.get("surveyed").map(String::as_str),
        Some("1894")
    );
}

#[test]
fn test_merge_requires_an_identity_column() {
    let mut tree = tree_with_parent("sheet.png");
    let metadata = table(&["county"], &[&["Ayrshire"]]);
    std::assert!(tree
        .merge_metadata(&metadata, TreeLevel::Parent, None)
        .is_err());
}

#[test]
fn test_merge_normalizes_polygon_columns() {
    let mut tree = tree_with_parent("sheet.png");
    let metadata = table(
        &["name", "polygon"],
        &[&["sheet.png", "[[0.5 1.5]; [2.0 3.0]]"]],
    );

    tree.merge_metadata(&metadata, TreeLevel::Parent, None)
        .unwrap();
    std::assert_eq!(
        tree.get_parent("sheet.png").unwrap().extra.get("polygon").map(String::as_str),
        Some("(0.5, 1.5, 2.0, 3.0)")
    );
}

#[test]
fn test_merge_respects_column_selection() {
    let mut tree = tree_with_parent("sheet.png");
    let metadata = table(
        &["name", "county", "surveyed"],
        &[&["sheet.png", "Ayrshire", "1894"]],
    );

    let wanted = vec!["county".to_string()];
    tree.merge_metadata(&metadata, TreeLevel::Parent, Some(&wanted))
        .unwrap();

    let parent = tree.get_parent("sheet.png").unwrap();
    std::assert!(parent.extra.contains_key("county"));
    std::assert!(!parent.extra.contains_key("surveyed"));
}

#[test]
fn test_export_import_round_trip() {
    let mut tree = ImageTree::new();
    let mut parent = ImageRecord::parent("sheet.png", PathBuf::from("/maps/sheet.png"));
    parent.geo_bounds = Some(GeoBounds::new(-1.0, 1.0, 50.0, 52.0));
    parent.pixel_deg = Some((0.02, 0.01));
    tree.register(parent).unwrap();
    tree.register(ImageRecord::child(
        "patch#sheet.png#-0-0-100-100-.png",
        PathBuf::from("/patches/patch#sheet.png#-0-0-100-100-.png"),
        "sheet.png",
        PixelBounds::new(0, 0, 100, 100),
    ))
    .unwrap();
    tree.link_children();

    let (parents, children) = tree.export();

    let mut rebuilt = ImageTree::new();
    rebuilt
        .load_tables(Some(&parents), Some(&children), true)
        .unwrap();

    std::assert_eq!(rebuilt.count(TreeLevel::Parent), 1);
    std::assert_eq!(rebuilt.count(TreeLevel::Child), 1);

    let parent = rebuilt.get_parent("sheet.png").unwrap();
    std::assert_eq!(parent.geo_bounds, Some(GeoBounds::new(-1.0, 1.0, 50.0, 52.0)));
    std::assert_eq!(parent.pixel_deg, Some((0.02, 0.01)));
    std::assert_eq!(parent.children.len(), 1);

    let child = rebuilt
        .get_child("patch#sheet.png#-0-0-100-100-.png")
        .unwrap();
    std::assert_eq!(child.parent_id.as_deref(), Some("sheet.png"));
    std::assert_eq!(child.pixel_bounds, Some(PixelBounds::new(0, 0, 100, 100)));
}
