//! Row-level delta derived from a topology result.

use log::debug;
use subway_core::{Insertion, Section, SectionId, UpdatedSection};

use crate::error::{Result, StoreError};
use crate::repository::NetworkRepository;
use crate::rows::SectionRow;

/// The section rows one operation inserts, updates, and deletes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionChanges {
    pub inserted: Vec<SectionRow>,
    pub updated: Vec<SectionRow>,
    pub deleted: Vec<SectionId>,
}

impl SectionChanges {
    /// One new row, plus the shortened row when the insert split a section.
    pub fn for_insertion(new_section: &Section, outcome: &Insertion) -> Self {
        Self {
            inserted: vec![SectionRow::from(new_section)],
            updated: outcome
                .split_section()
                .map(SectionRow::from)
                .into_iter()
                .collect(),
            deleted: Vec::new(),
        }
    }

    /// One deleted row, plus the extended survivor after a merge.
    pub fn for_removal(outcome: &UpdatedSection) -> Self {
        Self {
            inserted: Vec::new(),
            updated: outcome
                .survivor()
                .map(SectionRow::from)
                .into_iter()
                .collect(),
            deleted: vec![outcome.removed_section_id()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Write the delta. Deletes run first so a merged row never coexists with
    /// the row it absorbed.
    pub fn apply<R: NetworkRepository + ?Sized>(&self, repo: &mut R) -> Result<()> {
        for &id in &self.deleted {
            if !repo.delete_section(id)? {
                return Err(StoreError::SectionNotFound(id));
            }
        }
        for row in &self.updated {
            repo.update_section(row.clone())?;
        }
        for row in &self.inserted {
            repo.insert_section(row.clone())?;
        }
        debug!(
            "applied section changes: {} inserted, {} updated, {} deleted",
            self.inserted.len(),
            self.updated.len(),
            self.deleted.len()
        );
        Ok(())
    }
}
