//! Distribution derivation layer
//!
//! Every draw here is derived from [`RandomEngine::next_bits`]; nothing in
//! this module touches engine state directly. The exact number of words each
//! operation consumes is part of its contract, since reproducibility depends
//! on it.

use super::engine::RandomEngine;
use super::RngError;

const TWO_POW_24: f32 = (1u32 << 24) as f32;
const TWO_POW_53: f64 = (1u64 << 53) as f64;

/// Derived draws available on every [`RandomEngine`]
pub trait Distributions: RandomEngine {
    /// Next 64-bit value: two consecutive words, the first in the high half
    fn next_u64(&mut self) -> u64 {
        let high = self.next_u32() as u64;
        let low = self.next_u32() as u64;
        (high << 32) | low
    }

    /// Full-range signed 32-bit draw (one word)
    fn next_i32(&mut self) -> i32 {
        self.next_u32() as i32
    }

    /// Full-range signed 64-bit draw (two words)
    fn next_i64(&mut self) -> i64 {
        Distributions::next_u64(self) as i64
    }

    /// Uniform integer in `[0, n)`
    ///
    /// Powers of two take a single 31-bit draw and a multiply-shift; every
    /// other bound rejection-samples, retrying while `bits - val + (n - 1)`
    /// overflows the signed 31-bit range. That overflow test is what removes
    /// the modulo bias.
    ///
    /// # Errors
    /// [`RngError::InvalidArgument`] if `n <= 0`.
    fn next_int(&mut self, n: i32) -> Result<i32, RngError> {
        if n <= 0 {
            return Err(RngError::InvalidArgument(format!(
                "bound must be positive, got {}",
                n
            )));
        }

        if (n & n.wrapping_neg()) == n {
            let bits = self.next_bits(31) as u64;
            return Ok(((n as u64 * bits) >> 31) as i32);
        }

        loop {
            let bits = self.next_bits(31) as i32;
            let val = bits % n;
            if (bits - val).checked_add(n - 1).is_some() {
                return Ok(val);
            }
        }
    }

    /// Uniform long in `[0, n)`
    ///
    /// Two words are combined into 64 bits and shifted right by one, then the
    /// same overflow-based rejection rule is applied at 64-bit width.
    ///
    /// # Errors
    /// [`RngError::InvalidArgument`] if `n <= 0`.
    fn next_long(&mut self, n: i64) -> Result<i64, RngError> {
        if n <= 0 {
            return Err(RngError::InvalidArgument(format!(
                "bound must be positive, got {}",
                n
            )));
        }

        loop {
            let bits = (Distributions::next_u64(self) >> 1) as i64;
            let val = bits % n;
            if (bits - val).checked_add(n - 1).is_some() {
                return Ok(val);
            }
        }
    }

    /// Uniform double in `[0, 1)` with 53 bits of precision (two words)
    fn next_double(&mut self) -> f64 {
        let high = self.next_bits(26) as u64;
        let low = self.next_bits(27) as u64;
        ((high << 27) + low) as f64 / TWO_POW_53
    }

    /// Uniform double with configurable interval ends
    ///
    /// `(false, false)` → `(0, 1)`, `(true, false)` → `[0, 1)`,
    /// `(false, true)` → `(0, 1]`, `(true, true)` → `[0, 1]`.
    ///
    /// When `include_one` is set a fair coin lifts the draw into `[1, 2)`;
    /// anything above 1.0 is rejected and redrawn, as is 0.0 when zero is
    /// excluded. A run of boundary hits simply loops again.
    fn next_double_in(&mut self, include_zero: bool, include_one: bool) -> f64 {
        loop {
            let mut d = self.next_double();
            if include_one && self.next_boolean() {
                d += 1.0;
            }
            if d > 1.0 || (!include_zero && d == 0.0) {
                continue;
            }
            return d;
        }
    }

    /// Uniform float in `[0, 1)` with 24 bits of precision (one word)
    fn next_float(&mut self) -> f32 {
        self.next_bits(24) as f32 / TWO_POW_24
    }

    /// Uniform float with configurable interval ends, see
    /// [`Distributions::next_double_in`]
    fn next_float_in(&mut self, include_zero: bool, include_one: bool) -> f32 {
        loop {
            let mut d = self.next_float();
            if include_one && self.next_boolean() {
                d += 1.0;
            }
            if d > 1.0 || (!include_zero && d == 0.0) {
                continue;
            }
            return d;
        }
    }

    /// Fair coin (one word)
    fn next_boolean(&mut self) -> bool {
        self.next_bits(1) != 0
    }

    /// `true` with probability `p`
    ///
    /// `p == 0.0` and `p == 1.0` return without consuming a draw.
    ///
    /// # Errors
    /// [`RngError::InvalidArgument`] if `p` is outside `[0, 1]` (or NaN).
    fn next_boolean_with(&mut self, p: f64) -> Result<bool, RngError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(RngError::InvalidArgument(format!(
                "probability must be between 0.0 and 1.0 inclusive, got {}",
                p
            )));
        }
        if p == 0.0 {
            return Ok(false);
        }
        if p == 1.0 {
            return Ok(true);
        }
        Ok(self.next_double() < p)
    }

    /// Standard normal deviate (Marsaglia polar method)
    ///
    /// Each accepted trial yields two deviates: the first is returned, the
    /// second is cached and returned by the next call without drawing.
    fn next_gaussian(&mut self) -> f64 {
        if let Some(cached) = self.take_cached_gaussian() {
            return cached;
        }

        loop {
            let v1 = 2.0 * self.next_double() - 1.0;
            let v2 = 2.0 * self.next_double() - 1.0;
            let s = v1 * v1 + v2 * v2;
            if s >= 1.0 || s == 0.0 {
                continue;
            }
            let multiplier = (-2.0 * s.ln() / s).sqrt();
            self.cache_gaussian(v2 * multiplier);
            return v1 * multiplier;
        }
    }

    /// Fill `buf` with one 8-bit draw per byte (one word per byte)
    fn fill_bytes(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            *byte = self.next_bits(8) as u8;
        }
    }
}

impl<E: RandomEngine + ?Sized> Distributions for E {}
