//! Line topology engine for a subway network.
//!
//! A line is stored as an unordered set of directed, distance-weighted
//! [`Section`]s. [`Sections`] reassembles them into a single simple path and
//! keeps that path valid while sections are inserted (splitting an existing
//! edge when the new one lands inside it) or stations are deleted (merging the
//! two neighbouring edges).
//!
//! The engine performs no I/O. Callers load every section of one line, apply
//! one operation through [`Line`], and persist the change described by the
//! returned [`Insertion`] or [`UpdatedSection`].
//!
//! # Concurrency
//!
//! Operations take `&mut self` and assume a single writer per line. Two callers
//! mutating the same line must be serialized by the persistence layer (one
//! lock or transaction around load, mutate, and store); otherwise both may
//! compute a split against the same stale edge.

pub mod error;
pub mod line;
pub mod section;
pub mod sections;
pub mod station;
pub mod updated;

pub use error::{TopologyError, ValidationError};
pub use line::{Line, LineId};
pub use section::{Distance, Section, SectionId};
pub use sections::Sections;
pub use station::{Station, StationId};
pub use updated::{Insertion, UpdatedSection};
