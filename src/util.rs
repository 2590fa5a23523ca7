//! Utility functions and structures.

pub mod value;
