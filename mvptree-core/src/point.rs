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

//! Fingerprint records.
//!
//! A [`Point`] is an immutable `(identifier, payload)` pair plus a cached
//! array of distances to the vantage points it was compared against while
//! descending the tree (its *path*). Identifiers are caller-opaque byte
//! strings; the engine never interprets them beyond equality.

use std::fmt;

use smallvec::SmallVec;

use crate::error::{MvpError, Result};

/// Payload element width. All points in one tree share the same datatype.
///
/// Tag values match the historical engine (`MVP_BYTEARRAY` family) and are
/// what the on-disk header stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Datatype {
    Byte = 1,
    U16 = 2,
    U32 = 4,
    U64 = 8,
}

impl Datatype {
    /// Element width in bytes; doubles as the persistent tag.
    pub const fn width(self) -> usize {
        self as usize
    }

    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Datatype::Byte),
            2 => Some(Datatype::U16),
            4 => Some(Datatype::U32),
            8 => Some(Datatype::U64),
            _ => None,
        }
    }
}

/// Inline capacity for the path cache. Covers the default shape
/// (pathlength 5, two vantage points per level) without spilling.
const PATH_INLINE: usize = 16;

/// An immutable fingerprint record.
///
/// Equality is identifier + payload + datatype; the path is a cache and
/// never participates in comparisons.
#[derive(Clone)]
pub struct Point {
    id: Vec<u8>,
    payload: Vec<u8>,
    datatype: Datatype,
    path: SmallVec<[f32; PATH_INLINE]>,
}

impl Point {
    /// Create a byte-array point. The payload must be non-empty.
    pub fn new(id: impl Into<Vec<u8>>, payload: impl Into<Vec<u8>>) -> Result<Self> {
        Self::with_datatype(id, payload, Datatype::Byte)
    }

    /// Create a point with an explicit element width. The payload length
    /// must be a non-zero multiple of the element width.
    pub fn with_datatype(
        id: impl Into<Vec<u8>>,
        payload: impl Into<Vec<u8>>,
        datatype: Datatype,
    ) -> Result<Self> {
        let id = id.into();
        let payload = payload.into();
        if payload.is_empty() {
            return Err(MvpError::ArgErr("payload must be non-empty".into()));
        }
        if payload.len() % datatype.width() != 0 {
            return Err(MvpError::ArgErr(format!(
                "payload length {} is not a multiple of element width {}",
                payload.len(),
                datatype.width()
            )));
        }
        Ok(Point {
            id,
            payload,
            datatype,
            path: SmallVec::new(),
        })
    }

    pub fn id(&self) -> &[u8] {
        &self.id
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn datatype(&self) -> Datatype {
        self.datatype
    }

    /// Cached distances to ancestor vantage points, two per tree level,
    /// in root-to-leaf order.
    pub fn path(&self) -> &[f32] {
        &self.path
    }

    pub fn push_path(&mut self, distance: f32) {
        self.path.push(distance);
    }

    /// Rebuild the path wholesale; used when reloading a persisted tree.
    pub fn set_path(&mut self, path: impl IntoIterator<Item = f32>) {
        self.path.clear();
        self.path.extend(path);
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.payload == other.payload && self.datatype == other.datatype
    }
}

impl Eq for Point {}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Point")
            .field("id", &String::from_utf8_lossy(&self.id))
            .field("payload_len", &self.payload.len())
            .field("datatype", &self.datatype)
            .field("path_len", &self.path.len())
            .finish()
    }
}
