//! Error types for the topology engine.
//!
//! [`ValidationError`] is caller-correctable. [`TopologyError`] means the
//! persisted edge set no longer forms a simple path and the request cannot
//! proceed.

use crate::line::LineId;
use crate::section::{Distance, SectionId};
use crate::station::StationId;

/// A request that cannot be applied to the line as it stands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("section distance must be positive")]
    NonPositiveDistance,

    #[error("section cannot start and end at station {0}")]
    SameEndpoints(StationId),

    #[error("new distance {requested} must be shorter than current distance {current}")]
    NotShorter {
        current: Distance,
        requested: Distance,
    },

    #[error("sections {left} and {right} are not adjacent")]
    NotAdjacent { left: SectionId, right: SectionId },

    #[error("merged distance overflows")]
    DistanceOverflow,

    #[error("section belongs to line {actual}, expected line {expected}")]
    ForeignLine { expected: LineId, actual: LineId },

    #[error("stations {up} and {down} are both already on the line")]
    AlreadyConnected { up: StationId, down: StationId },

    #[error("section of distance {requested} must be shorter than the section it splits ({existing})")]
    SplitTooLong {
        existing: Distance,
        requested: Distance,
    },

    #[error("section cannot be connected to the line")]
    Unconnectable,

    #[error("the last remaining section cannot be removed")]
    LastSection,

    #[error("station {0} is not on the line")]
    StationNotInLine(StationId),
}

/// The stored sections do not form a single simple path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("line has no sections")]
    Empty,

    #[error("sections belong to more than one line")]
    MixedLines,

    #[error("no head station found: every up station is also a down station")]
    NoHead,

    #[error("more than one section leaves station {0}")]
    Branch(StationId),

    #[error("path revisits station {0}")]
    Cycle(StationId),

    #[error("path covers {assembled} of {total} sections")]
    Disconnected { assembled: usize, total: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display() {
        let err = ValidationError::StationNotInLine(StationId(7));
        assert_eq!(err.to_string(), "station 7 is not on the line");

        let err = ValidationError::SplitTooLong {
            existing: 5,
            requested: 5,
        };
        assert!(err.to_string().contains("shorter"));
    }

    #[test]
    fn topology_display() {
        let err = TopologyError::Disconnected {
            assembled: 2,
            total: 3,
        };
        assert_eq!(err.to_string(), "path covers 2 of 3 sections");
        assert!(TopologyError::Branch(StationId(1)).to_string().contains("station 1"));
    }
}
