//! Repository trait and the in-memory implementation.
//!
//! The `NetworkRepository` trait is the storage seam: the service only ever
//! talks to stations, lines, and section rows through it. `MemoryRepository`
//! backs both tests and the file store, which snapshots it to disk.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use subway_core::{LineId, SectionId, Station, StationId};

use crate::error::{Result, StoreError};
use crate::rows::{LineRow, SectionRow};

/// Storage operations for one subway network.
pub trait NetworkRepository {
    /// Store a station under a freshly allocated id.
    fn insert_station(&mut self, name: &str) -> Result<Station>;

    fn find_station(&self, id: StationId) -> Result<Option<Station>>;

    /// All stations ordered by id.
    fn stations(&self) -> Result<Vec<Station>>;

    /// Returns `false` if there was no such station.
    fn delete_station(&mut self, id: StationId) -> Result<bool>;

    /// True if any section row references the station.
    fn station_in_use(&self, id: StationId) -> Result<bool>;

    /// Store a line under a freshly allocated id.
    fn insert_line(&mut self, name: &str, color: &str) -> Result<LineRow>;

    fn find_line(&self, id: LineId) -> Result<Option<LineRow>>;

    /// All lines ordered by id.
    fn lines(&self) -> Result<Vec<LineRow>>;

    fn update_line(&mut self, row: &LineRow) -> Result<()>;

    /// Delete a line together with its section rows.
    fn delete_line(&mut self, id: LineId) -> Result<bool>;

    /// Reserve an id for a section that is about to be inserted.
    fn next_section_id(&mut self) -> Result<SectionId>;

    fn insert_section(&mut self, row: SectionRow) -> Result<()>;

    /// Section rows of one line, in no particular order.
    fn sections_by_line(&self, line_id: LineId) -> Result<Vec<SectionRow>>;

    fn update_section(&mut self, row: SectionRow) -> Result<()>;

    fn delete_section(&mut self, id: SectionId) -> Result<bool>;
}

/// Serializable contents of a [`MemoryRepository`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub stations: Vec<Station>,
    pub lines: Vec<LineRow>,
    pub sections: Vec<SectionRow>,
    /// Last id handed out per table. Ids are never reused.
    pub sequences: Sequences,
}

/// Last allocated id per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequences {
    pub station: u64,
    pub line: u64,
    pub section: u64,
}

/// A network held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    stations: BTreeMap<StationId, Station>,
    lines: BTreeMap<LineId, LineRow>,
    sections: BTreeMap<SectionId, SectionRow>,
    sequences: Sequences,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a snapshot. Sequences are raised to at least the largest
    /// id present so a hand-edited snapshot cannot hand out duplicates.
    pub fn from_snapshot(snapshot: NetworkSnapshot) -> Self {
        let mut sequences = snapshot.sequences;
        for station in &snapshot.stations {
            sequences.station = sequences.station.max(station.id.0);
        }
        for line in &snapshot.lines {
            sequences.line = sequences.line.max(line.id.0);
        }
        for section in &snapshot.sections {
            sequences.section = sequences.section.max(section.id.0);
        }

        Self {
            stations: snapshot.stations.into_iter().map(|s| (s.id, s)).collect(),
            lines: snapshot.lines.into_iter().map(|l| (l.id, l)).collect(),
            sections: snapshot.sections.into_iter().map(|s| (s.id, s)).collect(),
            sequences,
        }
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            stations: self.stations.values().cloned().collect(),
            lines: self.lines.values().cloned().collect(),
            sections: self.sections.values().cloned().collect(),
            sequences: self.sequences,
        }
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}

impl NetworkRepository for MemoryRepository {
    fn insert_station(&mut self, name: &str) -> Result<Station> {
        self.sequences.station += 1;
        let station = Station::new(StationId(self.sequences.station), name);
        self.stations.insert(station.id, station.clone());
        Ok(station)
    }

    fn find_station(&self, id: StationId) -> Result<Option<Station>> {
        Ok(self.stations.get(&id).cloned())
    }

    fn stations(&self) -> Result<Vec<Station>> {
        Ok(self.stations.values().cloned().collect())
    }

    fn delete_station(&mut self, id: StationId) -> Result<bool> {
        Ok(self.stations.remove(&id).is_some())
    }

    fn station_in_use(&self, id: StationId) -> Result<bool> {
        Ok(self
            .sections
            .values()
            .any(|s| s.up_station_id == id || s.down_station_id == id))
    }

    fn insert_line(&mut self, name: &str, color: &str) -> Result<LineRow> {
        self.sequences.line += 1;
        let row = LineRow {
            id: LineId(self.sequences.line),
            name: name.to_string(),
            color: color.to_string(),
        };
        self.lines.insert(row.id, row.clone());
        Ok(row)
    }

    fn find_line(&self, id: LineId) -> Result<Option<LineRow>> {
        Ok(self.lines.get(&id).cloned())
    }

    fn lines(&self) -> Result<Vec<LineRow>> {
        Ok(self.lines.values().cloned().collect())
    }

    fn update_line(&mut self, row: &LineRow) -> Result<()> {
        let stored = self
            .lines
            .get_mut(&row.id)
            .ok_or(StoreError::LineNotFound(row.id))?;
        *stored = row.clone();
        Ok(())
    }

    fn delete_line(&mut self, id: LineId) -> Result<bool> {
        if self.lines.remove(&id).is_none() {
            return Ok(false);
        }
        self.sections.retain(|_, s| s.line_id != id);
        Ok(true)
    }

    fn next_section_id(&mut self) -> Result<SectionId> {
        self.sequences.section += 1;
        Ok(SectionId(self.sequences.section))
    }

    fn insert_section(&mut self, row: SectionRow) -> Result<()> {
        self.sequences.section = self.sequences.section.max(row.id.0);
        self.sections.insert(row.id, row);
        Ok(())
    }

    fn sections_by_line(&self, line_id: LineId) -> Result<Vec<SectionRow>> {
        Ok(self
            .sections
            .values()
            .filter(|s| s.line_id == line_id)
            .cloned()
            .collect())
    }

    fn update_section(&mut self, row: SectionRow) -> Result<()> {
        let stored = self
            .sections
            .get_mut(&row.id)
            .ok_or(StoreError::SectionNotFound(row.id))?;
        *stored = row;
        Ok(())
    }

    fn delete_section(&mut self, id: SectionId) -> Result<bool> {
        Ok(self.sections.remove(&id).is_some())
    }
}
