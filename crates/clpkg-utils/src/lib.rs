//! Low-level helpers shared by the clpkg crates: path resolution, filesystem
//! operations and duration parsing.

pub mod error;
pub mod fs;
pub mod path;
pub mod time;
