//! Tests for the image tree

mod registry_tests;
mod metadata_tests;
