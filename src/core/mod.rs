//! Shared leaf utilities used by every subsystem.
//!
//! This module is intentionally free of drawing state; everything here is a
//! pure function over small value types.

pub mod color;
pub mod errors;
pub mod geometry;
