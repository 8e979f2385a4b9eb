//! Directed, distance-weighted edges between two stations of one line.
//!
//! A [`Section`] is an immutable record. Splitting and merging produce a new
//! value that keeps the original [`SectionId`], so the store can update the
//! row in place.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::line::LineId;
use crate::station::Station;

/// Stable section identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub u64);

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Section length. Always positive.
pub type Distance = u32;

/// An edge from `up_station` to `down_station` on line `line_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    id: SectionId,
    line_id: LineId,
    up_station: Station,
    down_station: Station,
    distance: Distance,
}

impl Section {
    /// Create a section, rejecting zero distance and loops.
    pub fn new(
        id: SectionId,
        line_id: LineId,
        up_station: Station,
        down_station: Station,
        distance: Distance,
    ) -> Result<Self, ValidationError> {
        if distance == 0 {
            return Err(ValidationError::NonPositiveDistance);
        }
        if up_station == down_station {
            return Err(ValidationError::SameEndpoints(up_station.id));
        }
        Ok(Self {
            id,
            line_id,
            up_station,
            down_station,
            distance,
        })
    }

    pub fn id(&self) -> SectionId {
        self.id
    }

    pub fn line_id(&self) -> LineId {
        self.line_id
    }

    pub fn up_station(&self) -> &Station {
        &self.up_station
    }

    pub fn down_station(&self) -> &Station {
        &self.down_station
    }

    pub fn distance(&self) -> Distance {
        self.distance
    }

    pub fn has_up_station(&self, station: &Station) -> bool {
        self.up_station == *station
    }

    pub fn has_down_station(&self, station: &Station) -> bool {
        self.down_station == *station
    }

    /// True when this section touches `station` at either end.
    pub fn has_station(&self, station: &Station) -> bool {
        self.has_up_station(station) || self.has_down_station(station)
    }

    /// Strict comparison: an equal distance is not longer.
    pub fn is_longer_than(&self, distance: Distance) -> bool {
        self.distance > distance
    }

    /// The remainder of this section after a shorter one is carved off its
    /// up end: it now starts at `new_up_station`.
    pub fn shrink_from_up(
        &self,
        new_up_station: Station,
        new_distance: Distance,
    ) -> Result<Self, ValidationError> {
        self.check_shrink(new_distance)?;
        Self::new(
            self.id,
            self.line_id,
            new_up_station,
            self.down_station.clone(),
            new_distance,
        )
    }

    /// The remainder of this section after a shorter one is carved off its
    /// down end: it now ends at `new_down_station`.
    pub fn shrink_from_down(
        &self,
        new_down_station: Station,
        new_distance: Distance,
    ) -> Result<Self, ValidationError> {
        self.check_shrink(new_distance)?;
        Self::new(
            self.id,
            self.line_id,
            self.up_station.clone(),
            new_down_station,
            new_distance,
        )
    }

    /// Absorb the section that directly follows this one. The result keeps
    /// this section's id and runs to `right`'s down station.
    pub fn merge_with(&self, right: &Section) -> Result<Self, ValidationError> {
        if self.down_station != right.up_station {
            return Err(ValidationError::NotAdjacent {
                left: self.id,
                right: right.id,
            });
        }
        let distance = self
            .distance
            .checked_add(right.distance)
            .ok_or(ValidationError::DistanceOverflow)?;
        Self::new(
            self.id,
            self.line_id,
            self.up_station.clone(),
            right.down_station.clone(),
            distance,
        )
    }

    fn check_shrink(&self, new_distance: Distance) -> Result<(), ValidationError> {
        if new_distance == 0 {
            return Err(ValidationError::NonPositiveDistance);
        }
        if new_distance >= self.distance {
            return Err(ValidationError::NotShorter {
                current: self.distance,
                requested: new_distance,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Section({} -({})-> {})",
            self.up_station.name, self.distance, self.down_station.name
        )
    }
}
