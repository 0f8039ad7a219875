//! Tests for batch range selection

extern crate std;

use crate::slicer::patchifier::select_range;

fn ids() -> Vec<String> {
    ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_negative_end_means_all_remaining() {
    let ids = ids();
    let selected = select_range(&ids, 1, -1).unwrap();
    std::assert_eq!(selected, &ids[1..]);
}

#[test]
fn test_explicit_range() {
    let ids = ids();
    let selected = select_range(&ids, 1, 3).unwrap();
    std::assert_eq!(selected, &ids[1..3]);
}

#[test]
fn test_end_before_start_is_a_range_error() {
    let ids = ids();
    std::assert!(select_range(&ids, 2, 1).is_err());
}

#[test]
fn test_end_past_the_last_id_is_clamped() {
    let ids = ids();
    let selected = select_range(&ids, 0, 100).unwrap();
    std::assert_eq!(selected.len(), 4);
}
