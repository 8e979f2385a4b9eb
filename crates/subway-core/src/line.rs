//! The line aggregate.
//!
//! A [`Line`] owns its [`Sections`] and forwards every topology operation to
//! them. Lines compare and hash by name alone: two `Line` values with the same
//! name are the same line, whatever their ids or colors.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{TopologyError, ValidationError};
use crate::section::Section;
use crate::sections::Sections;
use crate::station::Station;
use crate::updated::{Insertion, UpdatedSection};

/// Stable line identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub u64);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A subway line: identity, display attributes, and its path of sections.
#[derive(Debug, Clone)]
pub struct Line {
    id: LineId,
    name: String,
    color: String,
    sections: Sections,
}

impl Line {
    /// A new line consisting of its first section, which must belong to `id`.
    pub fn new(
        id: LineId,
        name: impl Into<String>,
        color: impl Into<String>,
        section: Section,
    ) -> Result<Self, ValidationError> {
        if section.line_id() != id {
            return Err(ValidationError::ForeignLine {
                expected: id,
                actual: section.line_id(),
            });
        }
        Ok(Self {
            id,
            name: name.into(),
            color: color.into(),
            sections: Sections::of(section),
        })
    }

    /// Rebuild a line from its stored, unordered sections.
    pub fn from_sections(
        id: LineId,
        name: impl Into<String>,
        color: impl Into<String>,
        sections: Vec<Section>,
    ) -> Result<Self, TopologyError> {
        let sections = Sections::assemble(sections)?;
        if sections.line_id() != id {
            return Err(TopologyError::MixedLines);
        }
        Ok(Self {
            id,
            name: name.into(),
            color: color.into(),
            sections,
        })
    }

    /// Rename and recolor. Topology is untouched.
    pub fn update(&mut self, name: impl Into<String>, color: impl Into<String>) {
        self.name = name.into();
        self.color = color.into();
    }

    pub fn insert_section(&mut self, section: Section) -> Result<Insertion, ValidationError> {
        self.sections.insert(section)
    }

    pub fn delete_station(&mut self, station: &Station) -> Result<UpdatedSection, ValidationError> {
        self.sections.delete(station)
    }

    /// Stations from head to tail.
    pub fn stations(&self) -> Vec<Station> {
        self.sections.stations()
    }

    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }
}

// Identity is the name. Renaming a line changes which lines it equals.
impl PartialEq for Line {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Line {}

impl Hash for Line {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{}, {})", self.name, self.id, self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::SectionId;
    use crate::station::StationId;
    use std::collections::HashSet;

    fn st(id: u64, name: &str) -> Station {
        Station::new(StationId(id), name)
    }

    fn sec(id: u64, line: u64, up: &Station, down: &Station, distance: u32) -> Section {
        Section::new(SectionId(id), LineId(line), up.clone(), down.clone(), distance).unwrap()
    }

    #[test]
    fn equality_by_name_only() {
        let a = st(1, "A");
        let b = st(2, "B");
        let line2 = Line::new(LineId(1), "Line 2", "green", sec(1, 1, &a, &b, 5)).unwrap();
        let same_name = Line::new(LineId(7), "Line 2", "red", sec(2, 7, &b, &a, 3)).unwrap();
        let other = Line::new(LineId(1), "Line 3", "green", sec(1, 1, &a, &b, 5)).unwrap();

        assert_eq!(line2, same_name);
        assert_ne!(line2, other);

        let set: HashSet<Line> = [line2, same_name, other].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn update_changes_identity() {
        let a = st(1, "A");
        let b = st(2, "B");
        let mut line = Line::new(LineId(1), "Line 2", "green", sec(1, 1, &a, &b, 5)).unwrap();
        let renamed = Line::new(LineId(2), "Line 9", "blue", sec(2, 2, &a, &b, 5)).unwrap();
        assert_ne!(line, renamed);

        line.update("Line 9", "orange");
        assert_eq!(line.name(), "Line 9");
        assert_eq!(line.color(), "orange");
        assert_eq!(line, renamed);
        assert_eq!(line.stations().len(), 2);
    }

    #[test]
    fn from_sections_assembles() {
        let a = st(1, "A");
        let b = st(2, "B");
        let c = st(3, "C");
        let line = Line::from_sections(
            LineId(1),
            "Line 2",
            "green",
            vec![sec(2, 1, &b, &c, 3), sec(1, 1, &a, &b, 5)],
        )
        .unwrap();
        assert_eq!(line.stations(), vec![a, b, c]);
        assert_eq!(line.sections().total_distance(), 8);
    }

    #[test]
    fn from_sections_rejects_corrupt_state() {
        let result = Line::from_sections(LineId(1), "Line 2", "green", vec![]);
        assert!(matches!(result, Err(TopologyError::Empty)));

        let a = st(1, "A");
        let b = st(2, "B");
        let result = Line::from_sections(LineId(1), "Line 2", "green", vec![sec(1, 2, &a, &b, 5)]);
        assert!(matches!(result, Err(TopologyError::MixedLines)));
    }

    #[test]
    fn new_rejects_section_of_another_line() {
        let a = st(1, "A");
        let b = st(2, "B");
        let result = Line::new(LineId(1), "Line 2", "green", sec(1, 7, &a, &b, 5));
        assert_eq!(
            result.unwrap_err(),
            ValidationError::ForeignLine {
                expected: LineId(1),
                actual: LineId(7),
            }
        );
    }

    #[test]
    fn new_line_accepts_its_own_sections() {
        let a = st(1, "A");
        let b = st(2, "B");
        let c = st(3, "C");
        let mut line = Line::new(LineId(1), "Line 2", "green", sec(1, 1, &a, &b, 5)).unwrap();
        assert_eq!(line.sections().line_id(), line.id());
        assert_eq!(
            line.insert_section(sec(2, 1, &b, &c, 3)).unwrap(),
            Insertion::Extended
        );
    }

    #[test]
    fn delegates_insert_and_delete() {
        let a = st(1, "A");
        let b = st(2, "B");
        let c = st(3, "C");
        let mut line = Line::new(LineId(1), "Line 2", "green", sec(1, 1, &a, &b, 5)).unwrap();

        let outcome = line.insert_section(sec(2, 1, &b, &c, 3)).unwrap();
        assert_eq!(outcome, Insertion::Extended);
        assert_eq!(line.stations(), vec![a.clone(), b.clone(), c.clone()]);

        let updated = line.delete_station(&b).unwrap();
        assert_eq!(updated.removed_section_id(), SectionId(2));
        assert_eq!(line.stations(), vec![a.clone(), c]);

        assert_eq!(
            line.delete_station(&a).unwrap_err(),
            ValidationError::LastSection
        );
    }

    #[test]
    fn display() {
        let line = Line::new(
            LineId(4),
            "Line 2",
            "green",
            sec(1, 4, &st(1, "A"), &st(2, "B"), 5),
        )
        .unwrap();
        assert_eq!(line.to_string(), "Line 2 (#4, green)");
    }
}
