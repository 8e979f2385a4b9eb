//! Request orchestration over a [`NetworkRepository`].
//!
//! Every topology request follows the same cycle: load the line's rows,
//! rebuild the [`Line`], run one engine operation, and apply the resulting
//! [`SectionChanges`]. The service borrows the repository mutably for its
//! whole lifetime, so within one process a line has a single writer. Across
//! processes that guarantee comes from [`crate::FileStore::transaction`].

use log::{info, warn};
use subway_core::{
    Distance, Insertion, Line, LineId, Section, SectionId, Station, StationId, ValidationError,
};

use crate::changes::SectionChanges;
use crate::error::{Result, StoreError};
use crate::repository::NetworkRepository;
use crate::rows::LineRow;

/// Attributes and first section of a line to create.
#[derive(Debug, Clone)]
pub struct NewLine {
    pub name: String,
    pub color: String,
    pub section: NewSection,
}

/// A section to add, by station id.
#[derive(Debug, Clone, Copy)]
pub struct NewSection {
    pub up_station_id: StationId,
    pub down_station_id: StationId,
    pub distance: Distance,
}

/// A line after a topology change, with the rows that were written.
#[derive(Debug, Clone)]
pub struct LineChange {
    pub line: Line,
    pub changes: SectionChanges,
}

/// Station, line, and section operations for one network.
pub struct NetworkService<'a, R: NetworkRepository + ?Sized> {
    repo: &'a mut R,
}

impl<'a, R: NetworkRepository + ?Sized> NetworkService<'a, R> {
    pub fn new(repo: &'a mut R) -> Self {
        Self { repo }
    }

    // --- Stations ---

    pub fn create_station(&mut self, name: &str) -> Result<Station> {
        let name = non_blank(name, "station name")?;
        if self.repo.stations()?.iter().any(|s| s.name == name) {
            return Err(StoreError::DuplicateStationName(name.to_string()));
        }
        let station = self.repo.insert_station(name)?;
        info!("created station {station}");
        Ok(station)
    }

    pub fn stations(&self) -> Result<Vec<Station>> {
        self.repo.stations()
    }

    pub fn station(&self, id: StationId) -> Result<Station> {
        self.repo
            .find_station(id)?
            .ok_or(StoreError::StationNotFound(id))
    }

    /// Returns `false` if the station did not exist. Stations still on a line
    /// must be removed from it first.
    pub fn delete_station(&mut self, id: StationId) -> Result<bool> {
        if self.repo.station_in_use(id)? {
            warn!("refusing to delete station {id}: still on a line");
            return Err(StoreError::StationInUse(id));
        }
        let deleted = self.repo.delete_station(id)?;
        if deleted {
            info!("deleted station {id}");
        }
        Ok(deleted)
    }

    // --- Lines ---

    pub fn create_line(&mut self, new_line: NewLine) -> Result<Line> {
        let name = non_blank(&new_line.name, "line name")?;
        let color = non_blank(&new_line.color, "line color")?;
        if self.repo.lines()?.iter().any(|row| row.name == name) {
            return Err(StoreError::DuplicateLineName(name.to_string()));
        }

        let NewSection {
            up_station_id,
            down_station_id,
            distance,
        } = new_line.section;
        let up = self.station(up_station_id)?;
        let down = self.station(down_station_id)?;
        if distance == 0 {
            return Err(ValidationError::NonPositiveDistance.into());
        }
        if up == down {
            return Err(ValidationError::SameEndpoints(up.id).into());
        }

        let row = self.repo.insert_line(name, color)?;
        let section_id = self.repo.next_section_id()?;
        let section = Section::new(section_id, row.id, up, down, distance)?;
        let changes = SectionChanges::for_insertion(&section, &Insertion::Extended);
        changes.apply(&mut *self.repo)?;

        let line = Line::new(row.id, row.name, row.color, section)?;
        info!("created line {line}");
        Ok(line)
    }

    /// All lines, each rebuilt from its stored sections.
    pub fn lines(&self) -> Result<Vec<Line>> {
        self.repo
            .lines()?
            .into_iter()
            .map(|row| self.hydrate(row))
            .collect()
    }

    pub fn load_line(&self, id: LineId) -> Result<Line> {
        let row = self.repo.find_line(id)?.ok_or(StoreError::LineNotFound(id))?;
        self.hydrate(row)
    }

    /// Rename and/or recolor a line. Line names stay unique.
    pub fn update_line(
        &mut self,
        id: LineId,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<Line> {
        let mut line = self.load_line(id)?;
        let name = match name {
            Some(name) => non_blank(name, "line name")?.to_string(),
            None => line.name().to_string(),
        };
        let color = match color {
            Some(color) => non_blank(color, "line color")?.to_string(),
            None => line.color().to_string(),
        };
        line.update(name, color);

        let clash = self
            .lines()?
            .into_iter()
            .any(|other| other.id() != id && other == line);
        if clash {
            return Err(StoreError::DuplicateLineName(line.name().to_string()));
        }

        self.repo.update_line(&LineRow {
            id,
            name: line.name().to_string(),
            color: line.color().to_string(),
        })?;
        info!("updated line {line}");
        Ok(line)
    }

    pub fn delete_line(&mut self, id: LineId) -> Result<bool> {
        let deleted = self.repo.delete_line(id)?;
        if deleted {
            info!("deleted line {id}");
        }
        Ok(deleted)
    }

    // --- Topology ---

    /// Insert a section into a line, splitting an existing one if it lands
    /// inside it.
    pub fn add_section(&mut self, line_id: LineId, new_section: NewSection) -> Result<LineChange> {
        let mut line = self.load_line(line_id)?;
        let up = self.station(new_section.up_station_id)?;
        let down = self.station(new_section.down_station_id)?;

        let section_id = self.repo.next_section_id()?;
        let section = Section::new(section_id, line_id, up, down, new_section.distance)?;
        let outcome = line
            .insert_section(section.clone())
            .inspect_err(|e| warn!("refused {section} on line {line_id}: {e}"))?;

        let changes = SectionChanges::for_insertion(&section, &outcome);
        changes.apply(&mut *self.repo)?;
        info!("added {section} to line {line_id}");
        Ok(LineChange { line, changes })
    }

    /// Take a station off a line, merging its neighbouring sections if it was
    /// interior.
    pub fn remove_station(&mut self, line_id: LineId, station_id: StationId) -> Result<LineChange> {
        let mut line = self.load_line(line_id)?;
        let station = self.station(station_id)?;

        let outcome = line
            .delete_station(&station)
            .inspect_err(|e| warn!("refused removing {station} from line {line_id}: {e}"))?;

        let changes = SectionChanges::for_removal(&outcome);
        changes.apply(&mut *self.repo)?;
        info!("removed {station} from line {line_id}");
        Ok(LineChange { line, changes })
    }

    fn hydrate(&self, row: LineRow) -> Result<Line> {
        let sections = self
            .repo
            .sections_by_line(row.id)?
            .into_iter()
            .map(|s| {
                let up = self.stored_station(s.id, s.up_station_id)?;
                let down = self.stored_station(s.id, s.down_station_id)?;
                Section::new(s.id, s.line_id, up, down, s.distance)
                    .map_err(|reason| StoreError::InvalidSectionRow { id: s.id, reason })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Line::from_sections(row.id, row.name, row.color, sections)?)
    }

    fn stored_station(&self, section: SectionId, id: StationId) -> Result<Station> {
        self.repo
            .find_station(id)?
            .ok_or(StoreError::DanglingStation {
                section,
                station: id,
            })
    }
}

fn non_blank<'s>(value: &'s str, field: &'static str) -> Result<&'s str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::BlankName { field });
    }
    Ok(trimmed)
}
