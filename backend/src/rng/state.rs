//! Fixed-layout engine state blob
//!
//! Version 1 layout, all multi-byte fields big-endian:
//!
//! | Offset | Size      | Field                                   |
//! |--------|-----------|-----------------------------------------|
//! | 0      | 1         | layout version (`1`)                    |
//! | 1      | 624 × 4   | state words (int32)                     |
//! | 2497   | 2 × 4     | twist constants `mag01` (int32)         |
//! | 2505   | 4         | index (int32, 0..=624)                  |
//! | 2509   | 8         | cached Gaussian (float64, 0.0 if none)  |
//! | 2517   | 1         | cache-valid flag (0 or 1)               |
//!
//! Total: [`STATE_BLOB_LEN`] bytes. Decoding rejects any other length instead
//! of truncating or padding.

use super::mersenne::{MAG01, N};
use super::RngError;

/// Current blob layout version
pub const STATE_VERSION: u8 = 1;

/// Exact length of a version-1 blob
pub const STATE_BLOB_LEN: usize = 1 + N * 4 + 2 * 4 + 4 + 8 + 1;

/// Engine fields recovered from a blob
#[derive(Debug, Clone)]
pub(crate) struct DecodedState {
    pub words: [u32; N],
    pub mag01: [u32; 2],
    pub index: usize,
    pub gaussian_cache: Option<f64>,
}

pub(crate) fn encode(
    words: &[u32; N],
    mag01: &[u32; 2],
    index: usize,
    gaussian_cache: Option<f64>,
) -> Vec<u8> {
    let mut blob = Vec::with_capacity(STATE_BLOB_LEN);
    blob.push(STATE_VERSION);
    for word in words {
        blob.extend_from_slice(&word.to_be_bytes());
    }
    for constant in mag01 {
        blob.extend_from_slice(&constant.to_be_bytes());
    }
    blob.extend_from_slice(&(index as u32).to_be_bytes());
    blob.extend_from_slice(&gaussian_cache.unwrap_or(0.0).to_be_bytes());
    blob.push(u8::from(gaussian_cache.is_some()));
    blob
}

/// Sequential big-endian reader over a length-checked blob
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take<const W: usize>(&mut self) -> [u8; W] {
        let mut out = [0u8; W];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + W]);
        self.pos += W;
        out
    }

    fn u32(&mut self) -> u32 {
        u32::from_be_bytes(self.take::<4>())
    }

    fn f64(&mut self) -> f64 {
        f64::from_be_bytes(self.take::<8>())
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }
}

pub(crate) fn decode(blob: &[u8]) -> Result<DecodedState, RngError> {
    if blob.len() != STATE_BLOB_LEN {
        return Err(RngError::MalformedState {
            expected: STATE_BLOB_LEN,
            actual: blob.len(),
        });
    }

    let mut cursor = Cursor { bytes: blob, pos: 0 };

    let version = cursor.u8();
    if version != STATE_VERSION {
        return Err(RngError::UnsupportedStateVersion(version));
    }

    let mut words = [0u32; N];
    for word in words.iter_mut() {
        *word = cursor.u32();
    }
    let mag01 = [cursor.u32(), cursor.u32()];
    let index = cursor.u32() as usize;
    let cached = cursor.f64();
    let valid = cursor.u8();

    validate_fields(&words, &mag01, index)?;

    let gaussian_cache = match valid {
        0 => None,
        1 => Some(cached),
        other => {
            return Err(RngError::InvalidStateField(format!(
                "cache-valid flag must be 0 or 1, got {}",
                other
            )))
        }
    };

    Ok(DecodedState {
        words,
        mag01,
        index,
        gaussian_cache,
    })
}

/// Check the invariants every seeded engine satisfies
pub(crate) fn validate_fields(words: &[u32], mag01: &[u32; 2], index: usize) -> Result<(), RngError> {
    if words.len() != N {
        return Err(RngError::InvalidStateField(format!(
            "expected {} state words, got {}",
            N,
            words.len()
        )));
    }
    if index > N {
        return Err(RngError::InvalidStateField(format!(
            "index {} exceeds {}",
            index, N
        )));
    }
    if *mag01 != MAG01 {
        return Err(RngError::InvalidStateField(format!(
            "unexpected twist constants {:#x}, {:#x}",
            mag01[0], mag01[1]
        )));
    }
    if words.iter().all(|&w| w == 0) {
        return Err(RngError::InvalidStateField(
            "state vector is all zero".to_string(),
        ));
    }
    Ok(())
}
