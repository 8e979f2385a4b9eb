//! Row shapes as the repository stores them.
//!
//! Section rows reference stations by id. [`crate::NetworkService`] hydrates
//! them into [`Section`] values before handing them to the engine.

use serde::{Deserialize, Serialize};
use subway_core::{Distance, LineId, Section, SectionId, StationId};

/// A line's attributes without its sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRow {
    pub id: LineId,
    pub name: String,
    pub color: String,
}

/// One stored section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRow {
    pub id: SectionId,
    pub line_id: LineId,
    pub up_station_id: StationId,
    pub down_station_id: StationId,
    pub distance: Distance,
}

impl From<&Section> for SectionRow {
    fn from(section: &Section) -> Self {
        SectionRow {
            id: section.id(),
            line_id: section.line_id(),
            up_station_id: section.up_station().id,
            down_station_id: section.down_station().id,
            distance: section.distance(),
        }
    }
}
