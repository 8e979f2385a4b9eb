//! Network file format (`.sln`).
//!
//! A whole network lives in one binary file: a fixed header, a JSON payload
//! holding a [`NetworkSnapshot`], and a SHA-256 over everything before it.
//!
//! Layout:
//!   [magic: 4 bytes "SLN\0"] [version_major: 1] [version_minor: 1]
//!   [flags: 1] [reserved: 1] [station_count: u32 LE] [line_count: u32 LE]
//!   [section_count: u32 LE] [payload_length: u32 LE] [json_payload: N bytes]
//!   [sha256: 32 bytes]

use sha2::{Digest, Sha256};

use crate::error::{Result, StoreError};
use crate::repository::{MemoryRepository, NetworkSnapshot};

/// Magic bytes: "SLN\0"
const SLN_MAGIC: [u8; 4] = [0x53, 0x4C, 0x4E, 0x00];

const VERSION_MAJOR: u8 = 1;
const VERSION_MINOR: u8 = 0;

/// magic + version + flags + reserved + three counts + payload length
const HEADER_SIZE: usize = 4 + 1 + 1 + 1 + 1 + 4 + 4 + 4 + 4; // 24 bytes

const HASH_SIZE: usize = 32;

/// A decoded network file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkFile {
    pub snapshot: NetworkSnapshot,
}

impl NetworkFile {
    pub fn new(snapshot: NetworkSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_repository(repo: &MemoryRepository) -> Self {
        Self::new(repo.snapshot())
    }

    pub fn into_repository(self) -> MemoryRepository {
        MemoryRepository::from_snapshot(self.snapshot)
    }

    /// Serialize to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(&self.snapshot)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let station_count = count(self.snapshot.stations.len())?;
        let line_count = count(self.snapshot.lines.len())?;
        let section_count = count(self.snapshot.sections.len())?;
        let payload_len = count(json.len())?;

        let mut buf = Vec::with_capacity(HEADER_SIZE + json.len() + HASH_SIZE);
        buf.extend_from_slice(&SLN_MAGIC);
        buf.push(VERSION_MAJOR);
        buf.push(VERSION_MINOR);
        // Flags
        buf.push(0);
        // Reserved
        buf.push(0);
        buf.extend_from_slice(&station_count.to_le_bytes());
        buf.extend_from_slice(&line_count.to_le_bytes());
        buf.extend_from_slice(&section_count.to_le_bytes());
        buf.extend_from_slice(&payload_len.to_le_bytes());
        buf.extend_from_slice(&json);

        let hash = Sha256::digest(&buf);
        buf.extend_from_slice(&hash);

        Ok(buf)
    }

    /// Deserialize from bytes, verifying header, checksum, and counts.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE + HASH_SIZE {
            return Err(StoreError::TooShort {
                expected: HEADER_SIZE + HASH_SIZE,
                actual: data.len(),
            });
        }

        if data[0..4] != SLN_MAGIC {
            return Err(StoreError::InvalidMagic);
        }

        let major = data[4];
        let minor = data[5];
        if major != VERSION_MAJOR {
            return Err(StoreError::UnsupportedVersion { major, minor });
        }

        let station_count = read_u32(data, 8);
        let line_count = read_u32(data, 12);
        let section_count = read_u32(data, 16);
        let payload_len = read_u32(data, 20) as usize;

        let payload_end = HEADER_SIZE + payload_len;
        let expected_total = payload_end + HASH_SIZE;
        if data.len() < expected_total {
            return Err(StoreError::TooShort {
                expected: expected_total,
                actual: data.len(),
            });
        }

        let stored_hash = &data[payload_end..expected_total];
        let computed_hash = Sha256::digest(&data[..payload_end]);
        if computed_hash.as_slice() != stored_hash {
            return Err(StoreError::IntegrityFailed {
                expected: hex_encode(stored_hash),
                actual: hex_encode(computed_hash.as_slice()),
            });
        }

        let snapshot: NetworkSnapshot = serde_json::from_slice(&data[HEADER_SIZE..payload_end])
            .map_err(|e| StoreError::Deserialization(e.to_string()))?;

        check_count("station", station_count, snapshot.stations.len())?;
        check_count("line", line_count, snapshot.lines.len())?;
        check_count("section", section_count, snapshot.sections.len())?;

        Ok(Self { snapshot })
    }
}

fn count(n: usize) -> Result<u32> {
    u32::try_from(n).map_err(|_| StoreError::Serialization(format!("{n} exceeds u32 range")))
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn check_count(what: &str, header: u32, payload: usize) -> Result<()> {
    if header as usize != payload {
        return Err(StoreError::Deserialization(format!(
            "{what} count mismatch: header says {header}, payload has {payload}"
        )));
    }
    Ok(())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::NetworkRepository;
    use crate::rows::SectionRow;
    use subway_core::{LineId, SectionId};

    fn sample() -> MemoryRepository {
        let mut repo = MemoryRepository::new();
        let a = repo.insert_station("A").unwrap();
        let b = repo.insert_station("B").unwrap();
        let line = repo.insert_line("Line 2", "green").unwrap();
        let id = repo.next_section_id().unwrap();
        repo.insert_section(SectionRow {
            id,
            line_id: line.id,
            up_station_id: a.id,
            down_station_id: b.id,
            distance: 5,
        })
        .unwrap();
        repo
    }

    #[test]
    fn empty_file() {
        let bytes = NetworkFile::default().to_bytes().unwrap();
        let file = NetworkFile::from_bytes(&bytes).unwrap();
        assert_eq!(file.snapshot, NetworkSnapshot::default());
    }

    #[test]
    fn restores_network() {
        let repo = sample();
        let bytes = NetworkFile::from_repository(&repo).to_bytes().unwrap();
        let restored = NetworkFile::from_bytes(&bytes).unwrap().into_repository();

        assert_eq!(restored.station_count(), 2);
        assert_eq!(restored.line_count(), 1);
        let rows = restored.sections_by_line(LineId(1)).unwrap();
        assert_eq!(rows[0].id, SectionId(1));
        assert_eq!(rows[0].distance, 5);
        assert_eq!(restored.snapshot().sequences, repo.snapshot().sequences);
    }

    #[test]
    fn header_layout() {
        let bytes = NetworkFile::from_repository(&sample()).to_bytes().unwrap();
        assert_eq!(&bytes[0..4], b"SLN\0");
        assert_eq!(bytes[4], VERSION_MAJOR);
        assert_eq!(read_u32(&bytes, 8), 2);
        assert_eq!(read_u32(&bytes, 12), 1);
        assert_eq!(read_u32(&bytes, 16), 1);
    }

    #[test]
    fn invalid_magic() {
        let mut data = vec![0x00; 100];
        data[0..4].copy_from_slice(b"BAD\0");
        assert!(matches!(
            NetworkFile::from_bytes(&data),
            Err(StoreError::InvalidMagic)
        ));
    }

    #[test]
    fn unsupported_version() {
        let mut bytes = NetworkFile::default().to_bytes().unwrap();
        bytes[4] = 9;
        assert!(matches!(
            NetworkFile::from_bytes(&bytes),
            Err(StoreError::UnsupportedVersion { major: 9, .. })
        ));
    }

    #[test]
    fn corruption_detected() {
        let mut bytes = NetworkFile::from_repository(&sample()).to_bytes().unwrap();
        bytes[HEADER_SIZE + 1] ^= 0xFF;
        let err = NetworkFile::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, StoreError::IntegrityFailed { .. }));
        assert!(err.is_corruption());
    }

    #[test]
    fn count_mismatch() {
        let mut bytes = NetworkFile::from_repository(&sample()).to_bytes().unwrap();
        let end = bytes.len() - HASH_SIZE;
        bytes[8] = 7;
        let hash = Sha256::digest(&bytes[..end]);
        bytes[end..].copy_from_slice(&hash);
        assert!(matches!(
            NetworkFile::from_bytes(&bytes),
            Err(StoreError::Deserialization(_))
        ));
    }

    #[test]
    fn too_short() {
        let data = b"SLN\0".to_vec();
        assert!(matches!(
            NetworkFile::from_bytes(&data),
            Err(StoreError::TooShort { .. })
        ));
    }
}
