//! CLI command implementations.

pub mod init;
pub mod line;
pub mod section;
pub mod station;
