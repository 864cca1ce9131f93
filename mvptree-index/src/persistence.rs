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

//! Binary persistence for the whole node graph.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! header:  "MVPTREE\0" | u32 version | u32 branchfactor | u32 pathlength |
//!          u32 leafcap | u8 datatype tag (0 = unset) | u8 metric tag |
//!          u64 root offset (0 = empty) | u64 total file size
//! node:    u8 tag (1 = internal, 2 = leaf)
//!   internal: sv1 | sv2 | m1 (bf-1 f32) | m2 (bf*(bf-1) f32) |
//!             bf^2 u64 child offsets (0 = absent)
//!   leaf:     u8 sv1 present [sv1] | u8 sv2 present [sv2] |
//!             u32 count | count * (point, f32 d1, f32 d2)
//! point:   u32 id len + bytes | u32 payload len + bytes |
//!          u16 path len + path f32s
//! ```
//!
//! Nodes are written post-order so every parent knows its children's
//! absolute offsets; on load this doubles as a cycle guard (a child
//! offset must be strictly below its parent's). Points are stored inline
//! in their owning node, paths included, which is what makes a loaded
//! tree reproduce bit-identical retrieval results.
//!
//! The write path is plain buffered I/O; the read path goes through a
//! read-only memory map. The map is an implementation detail, not part of
//! the format contract.

use std::fs::File;
use std::io::{self, BufWriter, Cursor, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use memmap2::Mmap;
use tracing::debug;

use mvptree_core::{Datatype, MvpError, Point, Result};

use crate::metric::{BitHamming, BitLevenshtein, Metric, MetricKind};
use crate::node::{InternalNode, LeafNode, Node};
use crate::tree::{Tree, TreeConfig};

const MAGIC: &[u8; 8] = b"MVPTREE\0";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 8 + 4 + 4 + 4 + 4 + 1 + 1 + 8 + 8;

const TAG_INTERNAL: u8 = 1;
const TAG_LEAF: u8 = 2;

impl Tree {
    /// Serialize the whole tree to `path`.
    ///
    /// The file is written in place; callers wanting atomic replacement
    /// should save to a temporary path and rename on success.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut body = Vec::new();
        let root_offset = match &self.root {
            Some(root) => encode_node(&mut body, root, self.config.branchfactor)
                .map_err(|e| MvpError::NoWrite(e.to_string()))?,
            None => 0,
        };
        let total = (HEADER_LEN + body.len()) as u64;

        let mut header = Vec::with_capacity(HEADER_LEN);
        encode_header(&mut header, self, root_offset, total)
            .map_err(|e| MvpError::NoWrite(e.to_string()))?;

        let file = File::create(path.as_ref()).map_err(|e| MvpError::FileOpen(e.to_string()))?;
        file.set_len(total)
            .map_err(|e| MvpError::FileTruncate(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(&header)
            .and_then(|_| writer.write_all(&body))
            .map_err(|e| MvpError::NoWrite(e.to_string()))?;
        writer
            .flush()
            .and_then(|_| writer.get_ref().sync_all())
            .map_err(|e| MvpError::FileClose(e.to_string()))?;

        debug!(
            path = %path.as_ref().display(),
            bytes = total,
            points = self.count,
            "saved mvp tree"
        );
        Ok(())
    }

    /// Load a tree whose metric is one of the built-ins (the metric tag in
    /// the header says which). Files written with a custom metric need
    /// [`load_with_metric`](Tree::load_with_metric).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Tree> {
        load_inner(path.as_ref(), None)
    }

    /// Load a tree, supplying the metric. Required for custom metrics,
    /// which cannot be reconstructed from the file; for built-in metric
    /// tags the supplied metric takes precedence over the tag.
    pub fn load_with_metric<P: AsRef<Path>>(path: P, metric: Box<dyn Metric>) -> Result<Tree> {
        load_inner(path.as_ref(), Some(metric))
    }
}

fn encode_header(w: &mut impl Write, tree: &Tree, root_offset: u64, total: u64) -> io::Result<()> {
    w.write_all(MAGIC)?;
    w.write_u32::<LittleEndian>(VERSION)?;
    w.write_u32::<LittleEndian>(tree.config.branchfactor as u32)?;
    w.write_u32::<LittleEndian>(tree.config.pathlength as u32)?;
    w.write_u32::<LittleEndian>(tree.config.leafcap as u32)?;
    w.write_u8(tree.datatype.map(Datatype::tag).unwrap_or(0))?;
    w.write_u8(tree.metric.kind().tag())?;
    w.write_u64::<LittleEndian>(root_offset)?;
    w.write_u64::<LittleEndian>(total)?;
    Ok(())
}

fn encode_point(w: &mut impl Write, point: &Point) -> io::Result<()> {
    w.write_u32::<LittleEndian>(point.id().len() as u32)?;
    w.write_all(point.id())?;
    w.write_u32::<LittleEndian>(point.payload().len() as u32)?;
    w.write_all(point.payload())?;
    w.write_u16::<LittleEndian>(point.path().len() as u16)?;
    for &d in point.path() {
        w.write_f32::<LittleEndian>(d)?;
    }
    Ok(())
}

/// Append a node (children first) and return its absolute offset.
fn encode_node(body: &mut Vec<u8>, node: &Node, branchfactor: usize) -> io::Result<u64> {
    match node {
        Node::Internal(internal) => {
            let mut offsets = Vec::with_capacity(internal.children.len());
            for child in &internal.children {
                match child {
                    Some(child) => offsets.push(encode_node(body, child, branchfactor)?),
                    None => offsets.push(0),
                }
            }
            let offset = (HEADER_LEN + body.len()) as u64;
            body.write_u8(TAG_INTERNAL)?;
            encode_point(body, &internal.sv1)?;
            encode_point(body, &internal.sv2)?;
            for &cut in &internal.m1 {
                body.write_f32::<LittleEndian>(cut)?;
            }
            for &cut in &internal.m2 {
                body.write_f32::<LittleEndian>(cut)?;
            }
            for child_offset in offsets {
                body.write_u64::<LittleEndian>(child_offset)?;
            }
            Ok(offset)
        }
        Node::Leaf(leaf) => {
            let offset = (HEADER_LEN + body.len()) as u64;
            body.write_u8(TAG_LEAF)?;
            for sv in [&leaf.sv1, &leaf.sv2] {
                match sv {
                    Some(point) => {
                        body.write_u8(1)?;
                        encode_point(body, point)?;
                    }
                    None => body.write_u8(0)?,
                }
            }
            body.write_u32::<LittleEndian>(leaf.points.len() as u32)?;
            for (i, point) in leaf.points.iter().enumerate() {
                encode_point(body, point)?;
                body.write_f32::<LittleEndian>(leaf.d1[i])?;
                body.write_f32::<LittleEndian>(leaf.d2[i])?;
            }
            Ok(offset)
        }
    }
}

fn load_inner(path: &Path, metric: Option<Box<dyn Metric>>) -> Result<Tree> {
    if !path.exists() {
        return Err(MvpError::FileNotFound(path.display().to_string()));
    }
    let file = File::open(path).map_err(|e| MvpError::FileOpen(e.to_string()))?;
    let map = unsafe { Mmap::map(&file) }.map_err(|e| MvpError::MemMap(e.to_string()))?;
    let bytes: &[u8] = &map;
    if bytes.len() < HEADER_LEN {
        return Err(MvpError::Unrecognized);
    }

    let mut cursor = Cursor::new(bytes);
    let mut magic = [0u8; 8];
    cursor
        .read_exact(&mut magic)
        .map_err(|_| MvpError::Unrecognized)?;
    if &magic != MAGIC {
        return Err(MvpError::Unrecognized);
    }
    if read_u32(&mut cursor)? != VERSION {
        return Err(MvpError::Unrecognized);
    }
    let config = TreeConfig {
        branchfactor: read_u32(&mut cursor)? as usize,
        pathlength: read_u32(&mut cursor)? as usize,
        leafcap: read_u32(&mut cursor)? as usize,
    };
    config.validate().map_err(|_| MvpError::Unrecognized)?;

    let datatype_tag = read_u8(&mut cursor)?;
    let datatype = if datatype_tag == 0 {
        None
    } else {
        Some(Datatype::from_tag(datatype_tag).ok_or(MvpError::Unrecognized)?)
    };
    let metric_tag = read_u8(&mut cursor)?;
    let metric: Box<dyn Metric> = match MetricKind::from_tag(metric_tag) {
        None => return Err(MvpError::Unrecognized),
        Some(MetricKind::Custom) => metric.ok_or(MvpError::NoDistanceFunc)?,
        Some(MetricKind::BitHamming) => metric.unwrap_or_else(|| Box::new(BitHamming)),
        Some(MetricKind::BitLevenshtein) => metric.unwrap_or_else(|| Box::new(BitLevenshtein)),
    };

    let root_offset = read_u64(&mut cursor)?;
    let total = read_u64(&mut cursor)?;
    if total != bytes.len() as u64 {
        return Err(MvpError::Unrecognized);
    }

    let root = if root_offset == 0 {
        None
    } else {
        if datatype.is_none() {
            // Points on disk but no datatype recorded.
            return Err(MvpError::Unrecognized);
        }
        let node = decode_node(
            bytes,
            root_offset,
            &config,
            datatype.ok_or(MvpError::Unrecognized)?,
            0,
        )?;
        Some(Box::new(node))
    };
    let count = root.as_ref().map(|r| r.point_count()).unwrap_or(0);

    debug!(
        path = %path.display(),
        bytes = bytes.len(),
        points = count,
        "loaded mvp tree"
    );
    Ok(Tree {
        config,
        metric,
        datatype,
        root,
        count,
    })
}

fn decode_node(
    bytes: &[u8],
    offset: u64,
    config: &TreeConfig,
    datatype: Datatype,
    depth: usize,
) -> Result<Node> {
    if offset < HEADER_LEN as u64 || offset >= bytes.len() as u64 {
        return Err(MvpError::Unrecognized);
    }
    let mut cursor = Cursor::new(bytes);
    cursor.set_position(offset);

    let bf = config.branchfactor;
    match read_u8(&mut cursor)? {
        TAG_INTERNAL => {
            // Splitting never places an internal node at or beyond
            // `pathlength` levels, so a deeper chain cannot come from a
            // saved tree; rejecting it here also bounds the recursion.
            if depth >= config.pathlength {
                return Err(MvpError::Unrecognized);
            }
            let sv1 = decode_point(&mut cursor, datatype)?;
            let sv2 = decode_point(&mut cursor, datatype)?;
            let mut m1 = Vec::with_capacity(bf - 1);
            for _ in 0..bf - 1 {
                m1.push(read_f32(&mut cursor)?);
            }
            let mut m2 = Vec::with_capacity(bf * (bf - 1));
            for _ in 0..bf * (bf - 1) {
                m2.push(read_f32(&mut cursor)?);
            }
            let mut children = Vec::with_capacity(bf * bf);
            for _ in 0..bf * bf {
                let child_offset = read_u64(&mut cursor)?;
                if child_offset == 0 {
                    children.push(None);
                } else if child_offset >= offset {
                    // Post-order writing puts children strictly before
                    // their parent; anything else is corruption.
                    return Err(MvpError::Unrecognized);
                } else {
                    children.push(Some(Box::new(decode_node(
                        bytes,
                        child_offset,
                        config,
                        datatype,
                        depth + 1,
                    )?)));
                }
            }
            Ok(Node::Internal(InternalNode {
                sv1,
                sv2,
                m1,
                m2,
                children,
            }))
        }
        TAG_LEAF => {
            let sv1 = decode_optional_point(&mut cursor, datatype)?;
            let sv2 = decode_optional_point(&mut cursor, datatype)?;
            let count = read_u32(&mut cursor)? as usize;
            // A leaf stores at most `leafcap - 1` points beyond its two
            // vantage points; see `LeafNode::try_add`.
            if count >= config.leafcap {
                return Err(MvpError::Unrecognized);
            }
            let mut points = Vec::with_capacity(count);
            let mut d1 = Vec::with_capacity(count);
            let mut d2 = Vec::with_capacity(count);
            for _ in 0..count {
                points.push(decode_point(&mut cursor, datatype)?);
                d1.push(read_f32(&mut cursor)?);
                d2.push(read_f32(&mut cursor)?);
            }
            Ok(Node::Leaf(LeafNode {
                sv1,
                sv2,
                points,
                d1,
                d2,
            }))
        }
        _ => Err(MvpError::Unrecognized),
    }
}

fn decode_optional_point(cursor: &mut Cursor<&[u8]>, datatype: Datatype) -> Result<Option<Point>> {
    match read_u8(cursor)? {
        0 => Ok(None),
        1 => Ok(Some(decode_point(cursor, datatype)?)),
        _ => Err(MvpError::Unrecognized),
    }
}

fn decode_point(cursor: &mut Cursor<&[u8]>, datatype: Datatype) -> Result<Point> {
    let id = read_bytes(cursor)?;
    let payload = read_bytes(cursor)?;
    let path_len = read_u16(cursor)? as usize;
    let mut path = Vec::with_capacity(path_len);
    for _ in 0..path_len {
        path.push(read_f32(cursor)?);
    }
    let mut point =
        Point::with_datatype(id, payload, datatype).map_err(|_| MvpError::Unrecognized)?;
    point.set_path(path);
    Ok(point)
}

fn read_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Vec<u8>> {
    let len = read_u32(cursor)? as usize;
    let remaining = cursor.get_ref().len() as u64 - cursor.position();
    if len as u64 > remaining {
        return Err(MvpError::Unrecognized);
    }
    let mut buf = vec![0u8; len];
    cursor
        .read_exact(&mut buf)
        .map_err(|_| MvpError::Unrecognized)?;
    Ok(buf)
}

fn read_u8(cursor: &mut Cursor<&[u8]>) -> Result<u8> {
    cursor.read_u8().map_err(|_| MvpError::Unrecognized)
}

fn read_u16(cursor: &mut Cursor<&[u8]>) -> Result<u16> {
    cursor
        .read_u16::<LittleEndian>()
        .map_err(|_| MvpError::Unrecognized)
}

fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32> {
    cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| MvpError::Unrecognized)
}

fn read_u64(cursor: &mut Cursor<&[u8]>) -> Result<u64> {
    cursor
        .read_u64::<LittleEndian>()
        .map_err(|_| MvpError::Unrecognized)
}

fn read_f32(cursor: &mut Cursor<&[u8]>) -> Result<f32> {
    cursor
        .read_f32::<LittleEndian>()
        .map_err(|_| MvpError::Unrecognized)
}
