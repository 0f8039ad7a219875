//! I/O utilities for raster header reading
//!
//! This module provides traits and implementations for the low-level
//! read operations used by the header reader.

pub mod seekable;
pub mod byte_order;
