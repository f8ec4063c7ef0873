//! BIF (trickplay sprite) encode/decode (spec.md §4.G, §6).

use nexa_contracts::error::{CoreError, CoreResult};

const BIF_MAGIC: &[u8; 4] = b"BIF\0";
const HEADER_LEN: usize = 12;
const ENTRY_HEADER_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BifEntry {
    pub timestamp_ms: u32,
    pub jpeg: Vec<u8>,
}

/// An ordered list of `(timestamp-ms, jpeg-bytes)` snapshots for one
/// `MediaPart`, keyed by timestamp, per spec.md §6 "BIF on-disk format".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bif {
    pub version: u32,
    pub entries: Vec<BifEntry>,
}

impl Bif {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.entries.len() * 64);
        out.extend_from_slice(BIF_MAGIC);
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());
        for entry in &self.entries {
            out.extend_from_slice(&entry.timestamp_ms.to_le_bytes());
            out.extend_from_slice(&(entry.jpeg.len() as u32).to_le_bytes());
            out.extend_from_slice(&entry.jpeg);
        }
        out
    }

    pub fn decode(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() < HEADER_LEN || &bytes[0..4] != BIF_MAGIC {
            return Err(CoreError::invalid_argument("not a BIF file"));
        }
        let version = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        let count = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;

        let mut entries = Vec::with_capacity(count);
        let mut cursor = HEADER_LEN;
        for _ in 0..count {
            if bytes.len() < cursor + ENTRY_HEADER_LEN {
                return Err(CoreError::invalid_argument("truncated BIF entry header"));
            }
            let timestamp_ms = u32::from_le_bytes(bytes[cursor..cursor + 4].try_into().unwrap());
            let len = u32::from_le_bytes(bytes[cursor + 4..cursor + 8].try_into().unwrap()) as usize;
            cursor += ENTRY_HEADER_LEN;
            if bytes.len() < cursor + len {
                return Err(CoreError::invalid_argument("truncated BIF jpeg payload"));
            }
            entries.push(BifEntry { timestamp_ms, jpeg: bytes[cursor..cursor + len].to_vec() });
            cursor += len;
        }
        Ok(Self { version, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_is_identity() {
        let bif = Bif {
            version: 0,
            entries: vec![
                BifEntry { timestamp_ms: 0, jpeg: vec![0xff, 0xd8, 0xff, 0xd9] },
                BifEntry { timestamp_ms: 2000, jpeg: vec![1, 2, 3] },
                BifEntry { timestamp_ms: 4000, jpeg: vec![] },
            ],
        };
        let decoded = Bif::decode(&bif.encode()).unwrap();
        assert_eq!(bif, decoded);
    }

    #[test]
    fn decode_rejects_bad_magic() {
        assert!(Bif::decode(&[0u8; 16]).is_err());
    }

    #[test]
    fn decode_rejects_truncated_payload() {
        let bif = Bif { version: 1, entries: vec![BifEntry { timestamp_ms: 0, jpeg: vec![1, 2, 3, 4] }] };
        let mut bytes = bif.encode();
        bytes.truncate(bytes.len() - 2);
        assert!(Bif::decode(&bytes).is_err());
    }
}
