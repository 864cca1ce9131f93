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

//! Error taxonomy for the MVP-tree engine.
//!
//! Every engine operation surfaces one of these discriminants. Three classes
//! matter for propagation:
//!
//! - I/O-class codes ([`is_io`](MvpError::is_io)) are recoverable environment
//!   failures and map to filesystem-style errors in embedding systems.
//! - Benign codes ([`is_benign`](MvpError::is_benign)): `EmptyTree` is a
//!   "no data" signal, `KNearestCap` an informational truncation signal.
//! - Everything else is a programmer or data error that aborts the current
//!   operation.
//!
//! Several codes (`MemAlloc`, `NoLeaf`, `NoInternal`, `PathAlloc`, `Munmap`,
//! `MremapFail`, `NoSort`) exist for binding compatibility with the
//! historical engine ABI; safe-Rust code paths cannot produce them.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MvpError {
    #[error("argument error: {0}")]
    ArgErr(String),

    #[error("no distance function found")]
    NoDistanceFunc,

    #[error("memory allocation failure")]
    MemAlloc,

    #[error("could not allocate leaf node")]
    NoLeaf,

    #[error("could not allocate internal node")]
    NoInternal,

    #[error("could not allocate point path")]
    PathAlloc,

    #[error("could not select vantage points")]
    VpNoSelect,

    #[error("could not calculate range of points from sv1")]
    NoSv1Range,

    #[error("could not calculate range of points from sv2")]
    NoSv2Range,

    #[error("points too compact to split")]
    NoSpace,

    #[error("unable to sort points")]
    NoSort,

    #[error("trouble opening file: {0}")]
    FileOpen(String),

    #[error("trouble closing file: {0}")]
    FileClose(String),

    #[error("memory map failure: {0}")]
    MemMap(String),

    #[error("memory unmap failure")]
    Munmap,

    #[error("could not write to file: {0}")]
    NoWrite(String),

    #[error("could not extend file: {0}")]
    FileTruncate(String),

    #[error("unable to remap file")]
    MremapFail,

    #[error("datapoint datatype does not match tree datatype")]
    TypeMismatch,

    #[error("number of results reached the knearest limit")]
    KNearestCap,

    #[error("tree is empty")]
    EmptyTree,

    #[error("unable to calculate split points")]
    NoSplits,

    #[error("distance function returned NaN or a negative value")]
    BadDistVal,

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unrecognized node in file")]
    Unrecognized,
}

impl MvpError {
    /// Canonical short description of the discriminant, independent of any
    /// payload the variant carries. Counterpart of the historical engine's
    /// `mvp_errstr`.
    pub const fn description(&self) -> &'static str {
        match self {
            MvpError::ArgErr(_) => "argument error",
            MvpError::NoDistanceFunc => "no distance function found",
            MvpError::MemAlloc => "memory allocation failure",
            MvpError::NoLeaf => "could not allocate leaf node",
            MvpError::NoInternal => "could not allocate internal node",
            MvpError::PathAlloc => "could not allocate point path",
            MvpError::VpNoSelect => "could not select vantage points",
            MvpError::NoSv1Range => "could not calculate range of points from sv1",
            MvpError::NoSv2Range => "could not calculate range of points from sv2",
            MvpError::NoSpace => "points too compact to split",
            MvpError::NoSort => "unable to sort points",
            MvpError::FileOpen(_) => "trouble opening file",
            MvpError::FileClose(_) => "trouble closing file",
            MvpError::MemMap(_) => "memory map failure",
            MvpError::Munmap => "memory unmap failure",
            MvpError::NoWrite(_) => "could not write to file",
            MvpError::FileTruncate(_) => "could not extend file",
            MvpError::MremapFail => "unable to remap file",
            MvpError::TypeMismatch => "datapoint datatype does not match tree datatype",
            MvpError::KNearestCap => "number of results reached the knearest limit",
            MvpError::EmptyTree => "tree is empty",
            MvpError::NoSplits => "unable to calculate split points",
            MvpError::BadDistVal => "distance function returned NaN or a negative value",
            MvpError::FileNotFound(_) => "file not found",
            MvpError::Unrecognized => "unrecognized node in file",
        }
    }

    /// True for recoverable environment failures around file I/O and
    /// memory mapping.
    pub const fn is_io(&self) -> bool {
        matches!(
            self,
            MvpError::FileOpen(_)
                | MvpError::FileClose(_)
                | MvpError::FileNotFound(_)
                | MvpError::NoWrite(_)
                | MvpError::FileTruncate(_)
                | MvpError::MemMap(_)
                | MvpError::Munmap
                | MvpError::MremapFail
        )
    }

    /// True for codes that signal an empty or truncated result rather than
    /// a failure.
    pub const fn is_benign(&self) -> bool {
        matches!(self, MvpError::EmptyTree | MvpError::KNearestCap)
    }
}

pub type Result<T> = std::result::Result<T, MvpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_classification() {
        assert!(MvpError::FileOpen("x".into()).is_io());
        assert!(MvpError::FileNotFound("x".into()).is_io());
        assert!(MvpError::MemMap("x".into()).is_io());
        assert!(!MvpError::TypeMismatch.is_io());
        assert!(!MvpError::EmptyTree.is_io());
    }

    #[test]
    fn test_benign_classification() {
        assert!(MvpError::EmptyTree.is_benign());
        assert!(MvpError::KNearestCap.is_benign());
        assert!(!MvpError::NoSpace.is_benign());
        assert!(!MvpError::BadDistVal.is_benign());
    }

    #[test]
    fn test_descriptions_are_distinct_enough() {
        // Display includes the payload, description never does.
        let err = MvpError::ArgErr("leafcap must be >= 1".into());
        assert!(err.to_string().contains("leafcap"));
        assert_eq!(err.description(), "argument error");
    }
}
