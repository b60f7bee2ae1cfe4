use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::types::Position;

const MAGIC: &[u8; 4] = b"RVPT";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 16;
const BOARD_SIZE: usize = 8;
const PAYLOAD_SIZE: usize = BOARD_SIZE * BOARD_SIZE * 4;

/// Per-square integer weights used by the static evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionalTable([[i32; BOARD_SIZE]; BOARD_SIZE]);

impl PositionalTable {
    pub const fn new(weights: [[i32; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self(weights)
    }

    pub fn weight(&self, pos: Position) -> i32 {
        self.0[pos.row as usize][pos.col as usize]
    }

    /// Deserialize a table from the `RVPT` blob format:
    /// magic, version, CRC32 of payload, reserved word, then 64 little-endian `i32` weights.
    pub fn from_bytes(data: &[u8]) -> Result<Self, TableError> {
        if data.len() < HEADER_SIZE {
            return Err(TableError::TooShort {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        if &data[0..4] != MAGIC {
            return Err(TableError::BadMagic);
        }

        let version = read_u32_le(&data[4..8]);
        if version != VERSION {
            return Err(TableError::UnsupportedVersion {
                expected: VERSION,
                actual: version,
            });
        }

        let expected_crc = read_u32_le(&data[8..12]);
        let payload = &data[HEADER_SIZE..];
        let actual_crc = crc32fast::hash(payload);
        if actual_crc != expected_crc {
            return Err(TableError::CrcMismatch {
                expected: expected_crc,
                actual: actual_crc,
            });
        }

        if payload.len() != PAYLOAD_SIZE {
            return Err(TableError::PayloadLength {
                expected: PAYLOAD_SIZE,
                actual: payload.len(),
            });
        }

        let mut weights = [[0i32; BOARD_SIZE]; BOARD_SIZE];
        for (idx, chunk) in payload.chunks_exact(4).enumerate() {
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(chunk);
            weights[idx / BOARD_SIZE][idx % BOARD_SIZE] = i32::from_le_bytes(bytes);
        }

        Ok(Self(weights))
    }

    /// Serialize into the `RVPT` blob format accepted by [`PositionalTable::from_bytes`].
    pub fn to_bytes(&self) -> Vec<u8> {
        let payload: Vec<u8> = self
            .0
            .iter()
            .flatten()
            .flat_map(|w| w.to_le_bytes())
            .collect();

        let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&payload);
        out
    }
}

impl Default for PositionalTable {
    /// Corner-heavy table: corners are prized, squares next to them are penalized.
    fn default() -> Self {
        Self([
            [200, -30, 30, 10, 10, 30, -30, 200],
            [-30, -50, -10, -10, -10, -10, -50, -30],
            [30, -10, 20, 5, 5, 20, -10, 30],
            [10, -10, 5, 5, 5, 5, -10, 10],
            [10, -10, 5, 5, 5, 5, -10, 10],
            [30, -10, 20, 5, 5, 20, -10, 30],
            [-30, -50, -10, -10, -10, -10, -50, -30],
            [200, -30, 30, 10, 10, 30, -30, 200],
        ])
    }
}

fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(bytes);
    u32::from_le_bytes(word)
}
