//! Change descriptors returned by topology mutations.
//!
//! They tell the store which rows to touch without re-deriving the change
//! from the before and after edge sets.

use serde::Serialize;

use crate::section::{Section, SectionId};

/// Outcome of inserting a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "section", rename_all = "snake_case")]
pub enum Insertion {
    /// The section extended the path at its head or tail. No existing
    /// section changed.
    Extended,
    /// The section landed inside an existing one. Carries that section in its
    /// shortened state.
    Split(Section),
}

impl Insertion {
    /// The existing section that was shortened, if any.
    pub fn split_section(&self) -> Option<&Section> {
        match self {
            Insertion::Extended => None,
            Insertion::Split(section) => Some(section),
        }
    }
}

/// Outcome of deleting a station from a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatedSection {
    removed_section_id: SectionId,
    survivor: Option<Section>,
}

impl UpdatedSection {
    /// A head or tail section was dropped outright.
    pub fn removed(removed_section_id: SectionId) -> Self {
        Self {
            removed_section_id,
            survivor: None,
        }
    }

    /// Two sections around an interior station were merged. `survivor` is the
    /// left section in its extended state.
    pub fn merged(removed_section_id: SectionId, survivor: Section) -> Self {
        Self {
            removed_section_id,
            survivor: Some(survivor),
        }
    }

    pub fn removed_section_id(&self) -> SectionId {
        self.removed_section_id
    }

    pub fn survivor(&self) -> Option<&Section> {
        self.survivor.as_ref()
    }

    pub fn is_merge(&self) -> bool {
        self.survivor.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::LineId;
    use crate::station::{Station, StationId};

    fn survivor() -> Section {
        Section::new(
            SectionId(1),
            LineId(1),
            Station::new(StationId(1), "A"),
            Station::new(StationId(3), "C"),
            8,
        )
        .unwrap()
    }

    #[test]
    fn pure_removal() {
        let updated = UpdatedSection::removed(SectionId(4));
        assert_eq!(updated.removed_section_id(), SectionId(4));
        assert!(updated.survivor().is_none());
        assert!(!updated.is_merge());
    }

    #[test]
    fn merge_carries_survivor() {
        let updated = UpdatedSection::merged(SectionId(2), survivor());
        assert!(updated.is_merge());
        assert_eq!(updated.survivor().unwrap().distance(), 8);
    }

    #[test]
    fn insertion_split_section() {
        assert!(Insertion::Extended.split_section().is_none());
        let split = Insertion::Split(survivor());
        assert_eq!(split.split_section().unwrap().id(), SectionId(1));
    }

    #[test]
    fn insertion_serializes_tagged() {
        let json = serde_json::to_value(Insertion::Extended).unwrap();
        assert_eq!(json["kind"], "extended");
    }
}
