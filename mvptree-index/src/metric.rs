// SPDX-License-Identifier: AGPL-3.0-or-later
// MVPTree - Fingerprint Similarity Index
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Distance metrics over fingerprint payloads.
//!
//! A [`Metric`] is a capability selected at tree construction time. For the
//! tree's triangle-inequality pruning to be correct the metric must be
//! deterministic, symmetric, non-negative and (at least approximately)
//! satisfy the triangle inequality. The tree validates every returned value
//! and surfaces NaN or negative results as `BadDistVal`.

use mvptree_core::{MvpError, Point, Result};

/// Persistent tag identifying a metric in the file header. Custom metrics
/// cannot be reconstructed from a file; loading such a file requires the
/// caller to supply the metric again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MetricKind {
    Custom = 0,
    BitHamming = 1,
    BitLevenshtein = 2,
}

impl MetricKind {
    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(MetricKind::Custom),
            1 => Some(MetricKind::BitHamming),
            2 => Some(MetricKind::BitLevenshtein),
            _ => None,
        }
    }
}

/// Distance capability between two fingerprint payloads.
pub trait Metric {
    /// Distance between two points. Must be >= 0; a NaN or negative return
    /// aborts the enclosing tree operation with `BadDistVal`.
    fn distance(&self, a: &Point, b: &Point) -> f32;

    /// Tag written to the file header so built-in metrics survive a
    /// save/load round trip.
    fn kind(&self) -> MetricKind {
        MetricKind::Custom
    }
}

/// Bit-Hamming distance: population count of the XOR of two equal-length
/// payloads. Unequal lengths yield the -1.0 sentinel, which the tree
/// surfaces as `BadDistVal`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitHamming;

impl Metric for BitHamming {
    fn distance(&self, a: &Point, b: &Point) -> f32 {
        let (pa, pb) = (a.payload(), b.payload());
        if pa.len() != pb.len() {
            return -1.0;
        }
        let bits: u32 = pa
            .iter()
            .zip(pb.iter())
            .map(|(x, y)| (x ^ y).count_ones())
            .sum();
        bits as f32
    }

    fn kind(&self) -> MetricKind {
        MetricKind::BitHamming
    }
}

/// Bit-edit distance: Hamming over the common prefix, plus 8 bits for every
/// byte the shorter payload is missing. Tolerates unequal lengths.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitLevenshtein;

impl Metric for BitLevenshtein {
    fn distance(&self, a: &Point, b: &Point) -> f32 {
        let (pa, pb) = (a.payload(), b.payload());
        let common = pa.len().min(pb.len());
        let longest = pa.len().max(pb.len());
        let mut bits: u32 = pa[..common]
            .iter()
            .zip(pb[..common].iter())
            .map(|(x, y)| (x ^ y).count_ones())
            .sum();
        bits += 8 * (longest - common) as u32;
        bits as f32
    }

    fn kind(&self) -> MetricKind {
        MetricKind::BitLevenshtein
    }
}

/// Metric invocation with the engine's result contract applied.
pub(crate) fn checked_distance(metric: &dyn Metric, a: &Point, b: &Point) -> Result<f32> {
    let d = metric.distance(a, b);
    if !d.is_finite() || d < 0.0 {
        return Err(MvpError::BadDistVal);
    }
    Ok(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(payload: &[u8]) -> Point {
        Point::new(b"t".to_vec(), payload.to_vec()).unwrap()
    }

    #[test]
    fn test_hamming_known_values() {
        let m = BitHamming;
        assert_eq!(m.distance(&pt(b"AAAA"), &pt(b"AAAA")), 0.0);
        // 'A' = 0x41, 'B' = 0x42, xor = 0x03 -> 2 bits per byte
        assert_eq!(m.distance(&pt(b"AAAA"), &pt(b"BBBB")), 8.0);
        assert_eq!(m.distance(&pt(&[0x00; 4]), &pt(&[0xFF; 4])), 32.0);
    }

    #[test]
    fn test_hamming_symmetry() {
        let m = BitHamming;
        let (a, b) = (pt(b"\x12\x34"), pt(b"\xAB\xCD"));
        assert_eq!(m.distance(&a, &b), m.distance(&b, &a));
    }

    #[test]
    fn test_hamming_length_mismatch_is_sentinel() {
        let m = BitHamming;
        assert_eq!(m.distance(&pt(b"AA"), &pt(b"AAAA")), -1.0);
        assert!(matches!(
            checked_distance(&m, &pt(b"AA"), &pt(b"AAAA")),
            Err(MvpError::BadDistVal)
        ));
    }

    #[test]
    fn test_bitlevenshtein_pads_missing_bytes() {
        let m = BitLevenshtein;
        // Equal lengths degenerate to Hamming.
        assert_eq!(m.distance(&pt(b"AAAA"), &pt(b"BBBB")), 8.0);
        // Two missing bytes cost 16 bits.
        assert_eq!(m.distance(&pt(b"AA"), &pt(b"AAAA")), 16.0);
        assert_eq!(m.distance(&pt(b"AAAA"), &pt(b"AA")), 16.0);
    }

    #[test]
    fn test_metric_kind_tags_round_trip() {
        for kind in [
            MetricKind::Custom,
            MetricKind::BitHamming,
            MetricKind::BitLevenshtein,
        ] {
            assert_eq!(MetricKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(MetricKind::from_tag(9), None);
    }

    #[test]
    fn test_checked_distance_rejects_nan() {
        struct Broken;
        impl Metric for Broken {
            fn distance(&self, _: &Point, _: &Point) -> f32 {
                f32::NAN
            }
        }
        assert!(matches!(
            checked_distance(&Broken, &pt(b"A"), &pt(b"B")),
            Err(MvpError::BadDistVal)
        ));
    }
}
