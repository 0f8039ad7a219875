//! Tests for registration and linkage

extern crate std;

use std::path::PathBuf;

use crate::coordinate::PixelBounds;
use crate::tree::{ImageRecord, ImageTree, TreeLevel};

fn child(id: &str, parent: &str) -> ImageRecord {
    ImageRecord::child(
        id,
        PathBuf::from(format!("/tmp/{}", id)),
        parent,
        PixelBounds::new(0, 0, 100, 100),
    )
}

#[test]
fn test_register_child_creates_placeholder_parent() {
    let mut tree = ImageTree::new();
    tree.register(child("patch-a", "sheet.png")).unwrap();

    let parent = tree.get_parent("sheet.png").unwrap();
    std::assert_eq!(parent.level, TreeLevel::Parent);
    std::assert!(parent.path.is_none());
    std::assert_eq!(tree.count(TreeLevel::Parent), 1);
    std::assert_eq!(tree.count(TreeLevel::Child), 1);
}

#[test]
fn test_placeholder_parent_is_backfilled() {
    let mut tree = ImageTree::new();
    tree.register(child("patch-a", "sheet.png")).unwrap();
    tree.register(ImageRecord::parent("sheet.png", PathBuf::from("/maps/sheet.png")))
        .unwrap();

    let parent = tree.get_parent("sheet.png").unwrap();
    std::assert_eq!(parent.path, Some(PathBuf::from("/maps/sheet.png")));
    std::assert_eq!(tree.count(TreeLevel::Parent), 1);
}

#[test]
fn test_reregistration_keeps_derived_caches() {
    let mut tree = ImageTree::new();
    tree.register(child("patch-a", "sheet.png")).unwrap();
    tree.child_mut("patch-a").unwrap().center = Some((0.5, 51.0));

    // Re-registering the same id must not wipe the computed center
    tree.register(child("patch-a", "sheet.png")).unwrap();
    std::assert_eq!(
        tree.get_child("patch-a").unwrap().center,
        Some((0.5, 51.0))
    );
    std::assert_eq!(tree.count(TreeLevel::Child), 1);
}

#[test]
fn test_child_without_parent_is_rejected() {
    let mut tree = ImageTree::new();
    let mut record = child("patch-a", "sheet.png");
    record.parent_id = None;
    std::assert!(tree.register(record).is_err());
}

#[test]
fn test_link_children_is_idempotent() {
    let mut tree = ImageTree::new();
    tree.register(ImageRecord::parent("sheet.png", PathBuf::from("/maps/sheet.png")))
        .unwrap();
    for id in ["patch-a", "patch-b", "patch-c"] {
        tree.register(child(id, "sheet.png")).unwrap();
    }

    tree.link_children();
    tree.link_children();

    let parent = tree.get_parent("sheet.png").unwrap();
    std::assert_eq!(parent.children.len(), 3);
    std::assert!(parent.children.contains("patch-a"));
    std::assert!(parent.children.contains("patch-b"));
    std::assert!(parent.children.contains("patch-c"));
}

#[test]
fn test_clear_empties_both_levels() {
    let mut tree = ImageTree::new();
    tree.register(child("patch-a", "sheet.png")).unwrap();
    tree.clear();
    std::assert!(tree.is_empty());
}

#[test]
fn test_listing_order_is_stable() {
    let mut tree = ImageTree::new();
    for id in ["b.png", "a.png", "c.png"] {
        tree.register(ImageRecord::parent(id, PathBuf::from(id))).unwrap();
    }
    std::assert_eq!(tree.list_parents(), vec!["a.png", "b.png", "c.png"]);
}
