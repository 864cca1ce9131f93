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

//! Node layout and the capacity-driven splitting algorithm.
//!
//! The tree is a sum type over two node shapes. Internal nodes hold two
//! vantage points and partition their subtree into `branchfactor²` buckets
//! by distance bands from each vantage point; leaves hold the two points
//! that arrived first (serving as the leaf's vantage points) plus up to
//! `leafcap - 1` further points with cached distances to both.
//!
//! When a leaf overflows it is rebuilt as an internal node: two vantage
//! points are selected far apart, every other point's distances to them are
//! computed (and appended to the point's path), cut distances are taken as
//! order statistics over those distance lists, and the points are dealt
//! into the resulting buckets one level deeper.

use tracing::{debug, trace};

use mvptree_core::{MvpError, Point, Result};

use crate::metric::{checked_distance, Metric};
use crate::tree::TreeConfig;

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Internal(InternalNode),
    Leaf(LeafNode),
}

#[derive(Debug, Clone)]
pub(crate) struct InternalNode {
    pub sv1: Point,
    pub sv2: Point,
    /// `branchfactor - 1` cut distances banding children by distance
    /// from `sv1`.
    pub m1: Vec<f32>,
    /// Per sv1-band cut distances for `sv2`, stored flat:
    /// `branchfactor` rows of `branchfactor - 1` values.
    pub m2: Vec<f32>,
    /// `branchfactor²` exclusively-owned child slots.
    pub children: Vec<Option<Box<Node>>>,
}

impl InternalNode {
    pub fn m2_row(&self, band1: usize, branchfactor: usize) -> &[f32] {
        let w = branchfactor - 1;
        &self.m2[band1 * w..band1 * w + w]
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LeafNode {
    pub sv1: Option<Point>,
    pub sv2: Option<Point>,
    pub points: Vec<Point>,
    /// Cached distance of `points[i]` to `sv1`.
    pub d1: Vec<f32>,
    /// Cached distance of `points[i]` to `sv2`.
    pub d2: Vec<f32>,
}

impl LeafNode {
    pub fn empty() -> Self {
        LeafNode {
            sv1: None,
            sv2: None,
            points: Vec::new(),
            d1: Vec::new(),
            d2: Vec::new(),
        }
    }

    /// Total records held, vantage points included.
    pub fn len(&self) -> usize {
        self.sv1.iter().count() + self.sv2.iter().count() + self.points.len()
    }

    /// Append a point if capacity allows; hands the point back when the
    /// leaf is full and must split. The first two arrivals become the
    /// leaf's vantage points; later arrivals are stored with their cached
    /// distances to both.
    pub fn try_add(
        &mut self,
        point: Point,
        metric: &dyn Metric,
        leafcap: usize,
    ) -> Result<Option<Point>> {
        if self.sv1.is_none() {
            self.sv1 = Some(point);
            return Ok(None);
        }
        if self.sv2.is_none() {
            self.sv2 = Some(point);
            return Ok(None);
        }
        if self.points.len() + 1 >= leafcap {
            return Ok(Some(point));
        }
        let sv1 = self.sv1.as_ref().ok_or(MvpError::NoSv1Range)?;
        let sv2 = self.sv2.as_ref().ok_or(MvpError::NoSv2Range)?;
        let d1 = checked_distance(metric, sv1, &point)?;
        let d2 = checked_distance(metric, sv2, &point)?;
        self.points.push(point);
        self.d1.push(d1);
        self.d2.push(d2);
        Ok(None)
    }

    /// Drain the leaf into a flat point list, vantage points first.
    fn into_points(self) -> Vec<Point> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.sv1);
        out.extend(self.sv2);
        out.extend(self.points);
        out
    }
}

impl Node {
    pub fn point_count(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.len(),
            Node::Internal(node) => {
                let mut count = 2;
                for child in node.children.iter().flatten() {
                    count += child.point_count();
                }
                count
            }
        }
    }
}

/// Largest number of records a leaf may hold before it must split:
/// two vantage points plus `leafcap - 1` stored points.
pub(crate) fn leaf_capacity(leafcap: usize) -> usize {
    leafcap + 1
}

/// Band index for a distance given ascending cut values. Distances at or
/// below a cut fall in the lower band.
pub(crate) fn band_of(distance: f32, cuts: &[f32]) -> usize {
    cuts.iter().take_while(|&&cut| distance > cut).count()
}

/// Inclusive-ish distance range covered by a band: `(low, high]`, with
/// band 0 starting at zero and the last band unbounded.
pub(crate) fn band_range(band: usize, cuts: &[f32]) -> (f32, f32) {
    let low = if band == 0 { 0.0 } else { cuts[band - 1] };
    let high = if band == cuts.len() {
        f32::INFINITY
    } else {
        cuts[band]
    };
    (low, high)
}

/// Equal-count cut distances: `branchfactor - 1` order statistics dividing
/// the list into `branchfactor` bands of roughly equal size. A cut that
/// lands on the maximum value would swallow the whole list into the lowest
/// bands (distances at a cut fall low), so such cuts are lowered to the
/// largest value strictly below the maximum.
fn cut_points(distances: &[f32], branchfactor: usize) -> Result<Vec<f32>> {
    if distances.is_empty() {
        return Err(MvpError::NoSplits);
    }
    let mut sorted = distances.to_vec();
    sorted.sort_by(f32::total_cmp);
    let n = sorted.len();
    let max = sorted[n - 1];
    let below_max = sorted.iter().rev().find(|&&d| d < max).copied();
    let mut cuts = Vec::with_capacity(branchfactor - 1);
    for i in 1..branchfactor {
        let pos = ((i * n) / branchfactor).max(1);
        let mut cut = sorted[pos - 1];
        if cut >= max {
            // All-equal lists have no value below the max; the degenerate
            // cuts put every point in the lowest band and the caller's
            // progress checks take over.
            cut = below_max.unwrap_or(cut);
        }
        cuts.push(cut);
    }
    Ok(cuts)
}

/// Replace an overflowing leaf with an internal node one level deeper.
pub(crate) fn split_leaf(
    leaf: LeafNode,
    incoming: Point,
    level: usize,
    config: &TreeConfig,
    metric: &dyn Metric,
) -> Result<Node> {
    let mut candidates = leaf.into_points();
    candidates.push(incoming);
    debug!(
        candidates = candidates.len(),
        level, "splitting leaf into internal node"
    );
    build_internal(candidates, level, config, metric)
}

/// Build an internal node (and its subtree) from a flat candidate set.
/// `level` counts internal levels from the root; each consumes two path
/// entries, and `pathlength` levels exhaust the tree's depth budget.
pub(crate) fn build_internal(
    mut candidates: Vec<Point>,
    level: usize,
    config: &TreeConfig,
    metric: &dyn Metric,
) -> Result<Node> {
    if level >= config.pathlength {
        return Err(MvpError::NoSpace);
    }
    if candidates.len() < 2 {
        return Err(MvpError::VpNoSelect);
    }

    let (sv1, sv2) = select_vantage_points(&mut candidates, metric)?;
    let remaining = candidates;
    if remaining.is_empty() {
        return Err(MvpError::NoSv1Range);
    }

    // Distances to both vantage points extend every surviving point's path.
    let mut scored = Vec::with_capacity(remaining.len());
    for mut point in remaining {
        let d1 = checked_distance(metric, &sv1, &point)?;
        let d2 = checked_distance(metric, &sv2, &point)?;
        point.push_path(d1);
        point.push_path(d2);
        scored.push((point, d1, d2));
    }

    let bf = config.branchfactor;
    let d1_all: Vec<f32> = scored.iter().map(|(_, d1, _)| *d1).collect();
    if d1_all.len() >= 2 && d1_all.iter().all(|&d| d == d1_all[0]) {
        // Every point equidistant from sv1: too compact to partition.
        return Err(MvpError::NoSpace);
    }
    let m1 = cut_points(&d1_all, bf)?;

    // Group by sv1-band, then cut each band by sv2 distance.
    let mut banded: Vec<Vec<(Point, f32)>> = (0..bf).map(|_| Vec::new()).collect();
    for (point, d1, d2) in scored {
        banded[band_of(d1, &m1)].push((point, d2));
    }

    let mut m2 = vec![0.0f32; bf * (bf - 1)];
    let mut buckets: Vec<Vec<Point>> = (0..bf * bf).map(|_| Vec::new()).collect();
    for (band1, group) in banded.into_iter().enumerate() {
        if group.is_empty() {
            continue;
        }
        let d2_band: Vec<f32> = group.iter().map(|(_, d2)| *d2).collect();
        let cuts = cut_points(&d2_band, bf)?;
        m2[band1 * (bf - 1)..(band1 + 1) * (bf - 1)].copy_from_slice(&cuts);
        for (point, d2) in group {
            buckets[band1 * bf + band_of(d2, &cuts)].push(point);
        }
    }

    let capacity = leaf_capacity(config.leafcap);
    let total = buckets.iter().map(Vec::len).sum::<usize>();
    let mut children: Vec<Option<Box<Node>>> = Vec::with_capacity(bf * bf);
    for bucket in buckets {
        if bucket.is_empty() {
            children.push(None);
        } else if bucket.len() <= capacity {
            children.push(Some(Box::new(Node::Leaf(leaf_from_bucket(
                bucket, metric,
            )?))));
        } else if bucket.len() == total {
            // Every point landed in one bucket: the set is too compact for
            // these vantage points and deeper levels cannot do better.
            return Err(MvpError::NoSpace);
        } else {
            trace!(bucket = bucket.len(), level = level + 1, "re-splitting bucket");
            children.push(Some(Box::new(build_internal(
                bucket,
                level + 1,
                config,
                metric,
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

/// Far-apart vantage-point selection: seed with an arbitrary candidate,
/// take the point farthest from the seed as `sv1`, then the point farthest
/// from `sv1` as `sv2`.
fn select_vantage_points(
    candidates: &mut Vec<Point>,
    metric: &dyn Metric,
) -> Result<(Point, Point)> {
    let seed = candidates[0].clone();
    let idx1 = farthest_from(&seed, candidates, metric)?;
    let sv1 = candidates.swap_remove(idx1);

    let idx2 = farthest_from(&sv1, candidates, metric)?;
    let sv2 = candidates.swap_remove(idx2);
    Ok((sv1, sv2))
}

fn farthest_from(origin: &Point, candidates: &[Point], metric: &dyn Metric) -> Result<usize> {
    if candidates.is_empty() {
        return Err(MvpError::VpNoSelect);
    }
    let mut best = 0;
    let mut best_d = f32::MIN;
    for (i, candidate) in candidates.iter().enumerate() {
        let d = checked_distance(metric, origin, candidate)?;
        if d > best_d {
            best_d = d;
            best = i;
        }
    }
    Ok(best)
}

/// Build a leaf from a bucket: first two points become the leaf's vantage
/// points, the rest are stored with cached distances to both.
fn leaf_from_bucket(bucket: Vec<Point>, metric: &dyn Metric) -> Result<LeafNode> {
    let mut leaf = LeafNode::empty();
    for point in bucket {
        if leaf.sv1.is_none() {
            leaf.sv1 = Some(point);
        } else if leaf.sv2.is_none() {
            leaf.sv2 = Some(point);
        } else {
            let sv1 = leaf.sv1.as_ref().ok_or(MvpError::NoSv1Range)?;
            let sv2 = leaf.sv2.as_ref().ok_or(MvpError::NoSv2Range)?;
            let d1 = checked_distance(metric, sv1, &point)?;
            let d2 = checked_distance(metric, sv2, &point)?;
            leaf.points.push(point);
            leaf.d1.push(d1);
            leaf.d2.push(d2);
        }
    }
    Ok(leaf)
}
