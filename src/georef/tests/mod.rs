//! Tests for the georeferencer
