//! The ordered path of sections that makes up one line.
//!
//! [`Sections`] is the only place that decides section order. It is rebuilt
//! from the stored, unordered edge set with [`Sections::assemble`] and keeps
//! the following true after every successful mutation:
//!
//! - adjacent sections share a station (`s[i].down == s[i + 1].up`);
//! - no station appears twice;
//! - at least one section remains.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::error::{TopologyError, ValidationError};
use crate::line::LineId;
use crate::section::Section;
use crate::station::{Station, StationId};
use crate::updated::{Insertion, UpdatedSection};

/// Fewest sections a line may have.
const MIN_SIZE: usize = 1;

/// A line's sections in head-to-tail order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sections {
    line_id: LineId,
    sections: Vec<Section>,
}

impl Sections {
    /// A path made of a single section.
    pub fn of(section: Section) -> Self {
        Self {
            line_id: section.line_id(),
            sections: vec![section],
        }
    }

    /// Order an unordered edge set into a path.
    ///
    /// Each edge is keyed by its up station. The head is the up station that
    /// no edge arrives at. From there the path follows `up -> down` until it
    /// runs out of edges. Any leftover edge, branch, or cycle means the stored
    /// state is corrupt.
    pub fn assemble(sections: Vec<Section>) -> Result<Self, TopologyError> {
        let line_id = sections.first().ok_or(TopologyError::Empty)?.line_id();
        if sections.iter().any(|s| s.line_id() != line_id) {
            return Err(TopologyError::MixedLines);
        }

        let total = sections.len();
        let mut by_up: HashMap<StationId, Section> = HashMap::with_capacity(total);
        for section in sections {
            let up = section.up_station().id;
            if by_up.insert(up, section).is_some() {
                return Err(TopologyError::Branch(up));
            }
        }

        let downs: HashSet<StationId> = by_up.values().map(|s| s.down_station().id).collect();
        let head = by_up
            .keys()
            .filter(|id| !downs.contains(id))
            .min()
            .copied()
            .ok_or(TopologyError::NoHead)?;

        let mut ordered = Vec::with_capacity(total);
        let mut visited = HashSet::with_capacity(total + 1);
        visited.insert(head);
        let mut cursor = head;
        while let Some(section) = by_up.remove(&cursor) {
            cursor = section.down_station().id;
            ordered.push(section);
            if !visited.insert(cursor) {
                return Err(TopologyError::Cycle(cursor));
            }
        }

        if ordered.len() != total {
            return Err(TopologyError::Disconnected {
                assembled: ordered.len(),
                total,
            });
        }

        debug!("assembled line {line_id} from {total} sections, head station {head}");
        Ok(Self {
            line_id,
            sections: ordered,
        })
    }

    pub fn line_id(&self) -> LineId {
        self.line_id
    }

    /// Sections in path order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// First section of the path.
    pub fn head(&self) -> &Section {
        &self.sections[0]
    }

    /// Last section of the path.
    pub fn tail(&self) -> &Section {
        &self.sections[self.sections.len() - 1]
    }

    /// Stations from head to tail, each once.
    pub fn stations(&self) -> Vec<Station> {
        let mut seen = HashSet::with_capacity(self.sections.len() + 1);
        let mut stations = Vec::with_capacity(self.sections.len() + 1);
        for section in &self.sections {
            for station in [section.up_station(), section.down_station()] {
                if seen.insert(station.id) {
                    stations.push(station.clone());
                }
            }
        }
        stations
    }

    pub fn contains_station(&self, station: &Station) -> bool {
        self.sections.iter().any(|s| s.has_station(station))
    }

    /// Sum of all section distances.
    pub fn total_distance(&self) -> u64 {
        self.sections.iter().map(|s| u64::from(s.distance())).sum()
    }

    /// Add `section` to the path.
    ///
    /// If it shares its up (or down) station with an existing, strictly longer
    /// section, that section is split: it keeps its id but now starts (or
    /// ends) at the new section's other station, with the difference as its
    /// distance. Otherwise the section must extend the path at the tail or the
    /// head.
    pub fn insert(&mut self, section: Section) -> Result<Insertion, ValidationError> {
        if section.line_id() != self.line_id {
            return Err(ValidationError::ForeignLine {
                expected: self.line_id,
                actual: section.line_id(),
            });
        }
        self.check_not_connected(&section)?;

        for index in 0..self.sections.len() {
            let existing = &self.sections[index];
            let splits_up = splits_from_up(existing, &section);
            let splits_down = splits_from_down(existing, &section);

            if splits_up && !splits_down {
                let remainder = existing.shrink_from_up(
                    section.down_station().clone(),
                    existing.distance() - section.distance(),
                )?;
                debug!("split {existing} at its up end, remainder {remainder}");
                self.sections[index] = remainder.clone();
                self.sections.insert(index, section);
                return Ok(Insertion::Split(remainder));
            }
            if splits_down && !splits_up {
                let remainder = existing.shrink_from_down(
                    section.up_station().clone(),
                    existing.distance() - section.distance(),
                )?;
                debug!("split {existing} at its down end, remainder {remainder}");
                self.sections[index] = remainder.clone();
                self.sections.insert(index + 1, section);
                return Ok(Insertion::Split(remainder));
            }
        }

        if self.tail().has_down_station(section.up_station()) {
            debug!("extend line {} at tail with {section}", self.line_id);
            self.sections.push(section);
            return Ok(Insertion::Extended);
        }
        if self.head().has_up_station(section.down_station()) {
            debug!("extend line {} at head with {section}", self.line_id);
            self.sections.insert(0, section);
            return Ok(Insertion::Extended);
        }

        let blocking = self.sections.iter().find(|s| {
            s.has_up_station(section.up_station()) || s.has_down_station(section.down_station())
        });
        match blocking {
            Some(existing) => Err(ValidationError::SplitTooLong {
                existing: existing.distance(),
                requested: section.distance(),
            }),
            None => Err(ValidationError::Unconnectable),
        }
    }

    /// Remove `station` from the path.
    ///
    /// The head and tail stations take their only section with them. An
    /// interior station merges its two sections into the left one, which keeps
    /// its id.
    pub fn delete(&mut self, station: &Station) -> Result<UpdatedSection, ValidationError> {
        if self.sections.len() <= MIN_SIZE {
            return Err(ValidationError::LastSection);
        }

        if self.head().has_up_station(station) {
            let removed = self.sections.remove(0);
            debug!("drop head section {removed}");
            return Ok(UpdatedSection::removed(removed.id()));
        }

        let last_index = self.sections.len() - 1;
        if self.tail().has_down_station(station) {
            let removed = self.sections.remove(last_index);
            debug!("drop tail section {removed}");
            return Ok(UpdatedSection::removed(removed.id()));
        }

        let index = self.sections[..last_index]
            .iter()
            .position(|s| s.has_down_station(station))
            .ok_or(ValidationError::StationNotInLine(station.id))?;

        let merged = self.sections[index].merge_with(&self.sections[index + 1])?;
        let right = self.sections.remove(index + 1);
        debug!("merge {right} into {merged}");
        self.sections[index] = merged.clone();
        Ok(UpdatedSection::merged(right.id(), merged))
    }

    fn check_not_connected(&self, section: &Section) -> Result<(), ValidationError> {
        let up = section.up_station();
        let down = section.down_station();
        if self.contains_station(up) && self.contains_station(down) {
            return Err(ValidationError::AlreadyConnected {
                up: up.id,
                down: down.id,
            });
        }
        Ok(())
    }
}

fn splits_from_up(existing: &Section, new: &Section) -> bool {
    existing.has_up_station(new.up_station()) && existing.is_longer_than(new.distance())
}

fn splits_from_down(existing: &Section, new: &Section) -> bool {
    existing.has_down_station(new.down_station()) && existing.is_longer_than(new.distance())
}
