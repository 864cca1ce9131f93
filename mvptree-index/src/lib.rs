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

//! MVP-tree similarity index over binary fingerprints.
//!
//! A multi-vantage-point tree partitions a metric space by distance to
//! selected vantage points. Every internal node carries two of them; each
//! point's distances to the vantage points along its placement path are
//! cached, so retrieval can discard most candidates with the triangle
//! inequality before paying for an exact distance computation.
//!
//! The index works for any metric the caller can express as a
//! [`Metric`]; bit-Hamming and bit-Levenshtein over raw byte payloads are
//! built in, which covers perceptual image hashes and similar
//! fixed-width fingerprints.
//!
//! ```no_run
//! use mvptree_index::{Point, Tree};
//!
//! # fn main() -> mvptree_index::Result<()> {
//! let mut tree = Tree::with_defaults();
//! tree.insert(vec![Point::new(b"img-1".to_vec(), vec![0xC3; 8])?])?;
//! let near = tree.retrieve(&Point::new(b"q".to_vec(), vec![0xC2; 8])?, 10, 4.0)?;
//! tree.save("fingerprints.mvp")?;
//! # Ok(())
//! # }
//! ```

pub mod metric;
mod node;
mod persistence;
pub mod tree;

pub use mvptree_core::{Datatype, MvpError, Point, Result};

pub use crate::metric::{BitHamming, BitLevenshtein, Metric, MetricKind};
pub use crate::tree::{Tree, TreeConfig, TreeStats};
