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

//! MVPTree Core
//!
//! Shared records and the engine error taxonomy. The actual tree engine
//! lives in `mvptree-index`; this crate carries what every layer needs:
//!
//! - [`Point`]: an opaque `(identifier, payload)` fingerprint record with
//!   its cached vantage-point path.
//! - [`Datatype`]: the payload element width, fixed per tree.
//! - [`MvpError`]: the full engine error taxonomy with I/O and benign-signal
//!   classification.

pub mod error;
pub mod point;

pub use error::{MvpError, Result};
pub use point::{Datatype, Point};
