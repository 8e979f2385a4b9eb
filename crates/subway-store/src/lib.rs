//! Persistence collaborator for the subway line topology engine.
//!
//! The engine in `subway-core` never touches storage. This crate supplies the
//! other half of each request:
//!
//! 1. load every section row of one line and rebuild the [`Line`](subway_core::Line);
//! 2. run one topology operation on it;
//! 3. turn the engine's result into a minimal [`SectionChanges`] and apply it.
//!
//! [`NetworkService`] runs that cycle against any [`NetworkRepository`].
//! [`FileStore`] keeps a whole network in one checksummed file and wraps each
//! mutation in [`FileStore::transaction`], which holds an exclusive writer
//! lock for the whole load, mutate, save cycle. That lock is what serializes
//! writers to the same line.

pub mod changes;
pub mod error;
pub mod file;
pub mod repository;
pub mod rows;
pub mod service;
pub mod store;

pub use changes::SectionChanges;
pub use error::{Result, StoreError};
pub use file::NetworkFile;
pub use repository::{MemoryRepository, NetworkRepository, NetworkSnapshot};
pub use rows::{LineRow, SectionRow};
pub use service::{LineChange, NetworkService, NewLine, NewSection};
pub use store::{FileStore, StoreLock};
