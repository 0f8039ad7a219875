//! Tests for pixel statistics
