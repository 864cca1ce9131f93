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

//! The MVP-tree: insertion and radius / k-nearest retrieval.
//!
//! The tree owns its root node, its immutable shape parameters and the
//! metric capability. Mutation goes through `&mut self`, which is also how
//! the single-writer discipline of the engine is enforced: there is no
//! internal locking, and concurrent readers must work against a shared
//! immutable borrow.
//!
//! Retrieval is a depth-first descent that prunes subtrees with the
//! triangle inequality: at an internal node a distance band can be skipped
//! when the query's distance to the vantage point, widened by the current
//! search radius, cannot intersect it; at a leaf the cached per-point
//! distances (path entries plus `d1`/`d2`) lower-bound the true distance
//! before the exact metric is paid for.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use mvptree_core::{Datatype, MvpError, Point, Result};

use crate::metric::{checked_distance, BitHamming, Metric};
use crate::node::{band_of, band_range, split_leaf, LeafNode, Node};

/// Tree shape parameters, fixed at construction. Defaults match the
/// historical engine binding (branchfactor 2, pathlength 5, leafcap 25).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    /// Distance bands per vantage point; an internal node has
    /// `branchfactor²` children.
    pub branchfactor: usize,
    /// Maximum internal levels before leaf placement is forced; each level
    /// consumes two path entries.
    pub pathlength: usize,
    /// Leaf capacity driving splits.
    pub leafcap: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            branchfactor: 2,
            pathlength: 5,
            leafcap: 25,
        }
    }
}

impl TreeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.branchfactor < 2 {
            return Err(MvpError::ArgErr("branchfactor must be >= 2".into()));
        }
        if self.pathlength < 1 {
            return Err(MvpError::ArgErr("pathlength must be >= 1".into()));
        }
        if self.leafcap < 1 {
            return Err(MvpError::ArgErr("leafcap must be >= 1".into()));
        }
        Ok(())
    }
}

/// Structural counters, mostly for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    pub points: usize,
    pub leaves: usize,
    pub internals: usize,
    pub max_depth: usize,
}

/// A metric-space index over fingerprint records.
pub struct Tree {
    pub(crate) config: TreeConfig,
    pub(crate) metric: Box<dyn Metric>,
    pub(crate) datatype: Option<Datatype>,
    pub(crate) root: Option<Box<Node>>,
    pub(crate) count: usize,
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("config", &self.config)
            .field("datatype", &self.datatype)
            .field("root", &self.root)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

impl Tree {
    /// Create an empty tree with the given shape and metric.
    pub fn new(config: TreeConfig, metric: Box<dyn Metric>) -> Result<Self> {
        config.validate()?;
        Ok(Tree {
            config,
            metric,
            datatype: None,
            root: None,
            count: 0,
        })
    }

    /// Default shape with the bit-Hamming metric.
    pub fn with_defaults() -> Self {
        Tree {
            config: TreeConfig::default(),
            metric: Box::new(BitHamming),
            datatype: None,
            root: None,
            count: 0,
        }
    }

    pub fn config(&self) -> TreeConfig {
        self.config
    }

    /// Datatype accepted by this tree; `None` until the first insertion.
    pub fn datatype(&self) -> Option<Datatype> {
        self.datatype
    }

    /// Number of points held, vantage points included.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Insert a batch of points.
    ///
    /// The whole batch is datatype-checked up front: a mismatch aborts with
    /// `TypeMismatch` and no mutation. Structural errors partway through
    /// (a failed split, a bad distance value) abort the batch but do not
    /// roll back points already placed.
    ///
    /// The engine does not deduplicate: equal points inserted twice are
    /// stored twice. Callers wanting duplicate suppression should check
    /// [`exists`](Tree::exists) first.
    pub fn insert(&mut self, points: Vec<Point>) -> Result<usize> {
        if points.is_empty() {
            return Ok(0);
        }
        let expected = self.datatype.unwrap_or_else(|| points[0].datatype());
        if points.iter().any(|p| p.datatype() != expected) {
            return Err(MvpError::TypeMismatch);
        }
        self.datatype = Some(expected);

        let mut inserted = 0;
        for point in points {
            self.insert_one(point)?;
            inserted += 1;
        }
        Ok(inserted)
    }

    fn insert_one(&mut self, mut point: Point) -> Result<()> {
        // Points may arrive with a stale path (e.g. a clone returned by an
        // earlier retrieval); the path is rebuilt during descent.
        point.set_path(std::iter::empty());
        match &mut self.root {
            None => {
                let mut leaf = LeafNode::empty();
                leaf.try_add(point, self.metric.as_ref(), self.config.leafcap)?;
                self.root = Some(Box::new(Node::Leaf(leaf)));
            }
            Some(root) => {
                insert_into(root, point, 0, &self.config, self.metric.as_ref())?;
            }
        }
        self.count += 1;
        Ok(())
    }

    /// Retrieve stored points within `radius` of `query`, at most
    /// `knearest` of them.
    ///
    /// When more than `knearest` points fall inside the radius, the result
    /// is the true `knearest` nearest; at the boundary distance the point
    /// encountered first during traversal is kept. Results are owned
    /// copies sorted by ascending distance, safe to retain across later
    /// mutation of the tree.
    ///
    /// An empty tree yields `Err(EmptyTree)`, a benign "no data" signal
    /// (see [`MvpError::is_benign`]).
    pub fn retrieve(&self, query: &Point, knearest: usize, radius: f32) -> Result<Vec<Point>> {
        if knearest == 0 {
            return Err(MvpError::ArgErr("knearest must be >= 1".into()));
        }
        if radius.is_nan() || radius < 0.0 {
            return Err(MvpError::ArgErr("radius must be >= 0".into()));
        }
        let root = match &self.root {
            None => return Err(MvpError::EmptyTree),
            Some(root) => root,
        };
        if let Some(datatype) = self.datatype {
            if datatype != query.datatype() {
                return Err(MvpError::TypeMismatch);
            }
        }

        let mut results = ResultSet::new(knearest, radius);
        let mut query_path: Vec<f32> = Vec::with_capacity(2 * self.config.pathlength);
        match walk(
            root,
            query,
            &mut query_path,
            &mut results,
            &self.config,
            self.metric.as_ref(),
        ) {
            Ok(()) => {}
            // Informational: the candidate set is full and cannot improve.
            Err(MvpError::KNearestCap) => {
                debug!(knearest, "retrieval stopped at knearest cap");
            }
            Err(e) => return Err(e),
        }
        Ok(results.into_sorted_points())
    }

    /// Retrieve the stored copy of `point` (identifier and payload both
    /// equal), if present.
    pub fn get(&self, point: &Point) -> Result<Option<Point>> {
        match self.retrieve(point, usize::MAX, 0.0) {
            Ok(found) => Ok(found.into_iter().find(|p| p == point)),
            Err(ref e) if *e == MvpError::EmptyTree => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn exists(&self, point: &Point) -> Result<bool> {
        Ok(self.get(point)?.is_some())
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        if let Some(root) = &self.root {
            collect_stats(root, 1, &mut stats);
        }
        stats
    }
}

fn collect_stats(node: &Node, depth: usize, stats: &mut TreeStats) {
    stats.max_depth = stats.max_depth.max(depth);
    match node {
        Node::Leaf(leaf) => {
            stats.leaves += 1;
            stats.points += leaf.len();
        }
        Node::Internal(internal) => {
            stats.internals += 1;
            stats.points += 2;
            for child in internal.children.iter().flatten() {
                collect_stats(child, depth + 1, stats);
            }
        }
    }
}

fn insert_into(
    node: &mut Node,
    point: Point,
    level: usize,
    config: &TreeConfig,
    metric: &dyn Metric,
) -> Result<()> {
    match node {
        Node::Leaf(leaf) => {
            match leaf.try_add(point, metric, config.leafcap)? {
                None => Ok(()),
                Some(point) => {
                    // A failed split must leave the leaf untouched, so the
                    // split works on the drained original and the snapshot
                    // restores it on error.
                    let snapshot = leaf.clone();
                    let full = std::mem::replace(leaf, LeafNode::empty());
                    match split_leaf(full, point, level, config, metric) {
                        Ok(new_node) => {
                            *node = new_node;
                            Ok(())
                        }
                        Err(e) => {
                            *node = Node::Leaf(snapshot);
                            Err(e)
                        }
                    }
                }
            }
        }
        Node::Internal(internal) => {
            let mut point = point;
            let d1 = checked_distance(metric, &internal.sv1, &point)?;
            let d2 = checked_distance(metric, &internal.sv2, &point)?;
            point.push_path(d1);
            point.push_path(d2);
            let bf = config.branchfactor;
            let b1 = band_of(d1, &internal.m1);
            let b2 = band_of(d2, internal.m2_row(b1, bf));
            match &mut internal.children[b1 * bf + b2] {
                Some(child) => insert_into(child, point, level + 1, config, metric),
                slot => {
                    let mut leaf = LeafNode::empty();
                    leaf.try_add(point, metric, config.leafcap)?;
                    *slot = Some(Box::new(Node::Leaf(leaf)));
                    Ok(())
                }
            }
        }
    }
}

/// Candidate entry for the bounded result heap (max-heap by distance, so
/// the worst kept candidate is at the top).
struct Candidate {
    distance: f32,
    point: Point,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
    }
}

/// Bounded candidate set: at most `limit` points, all within `radius`.
/// Once full, the worst kept distance tightens the effective search
/// radius, which is what makes the final set the true k nearest.
struct ResultSet {
    heap: BinaryHeap<Candidate>,
    limit: usize,
    radius: f32,
}

impl ResultSet {
    fn new(limit: usize, radius: f32) -> Self {
        ResultSet {
            heap: BinaryHeap::new(),
            limit,
            radius,
        }
    }

    /// Current effective search radius.
    fn bound(&self) -> f32 {
        if self.heap.len() >= self.limit {
            match self.heap.peek() {
                Some(worst) => worst.distance.min(self.radius),
                None => self.radius,
            }
        } else {
            self.radius
        }
    }

    /// Offer a candidate. `Err(KNearestCap)` is the early-stop signal:
    /// the set is full and no remaining point can improve it.
    fn offer(&mut self, point: &Point, distance: f32) -> Result<()> {
        if distance <= self.radius {
            if self.heap.len() < self.limit {
                self.heap.push(Candidate {
                    distance,
                    point: point.clone(),
                });
            } else if let Some(worst) = self.heap.peek() {
                // Ties keep the earlier-encountered point.
                if distance < worst.distance {
                    self.heap.pop();
                    self.heap.push(Candidate {
                        distance,
                        point: point.clone(),
                    });
                }
            }
            if self.heap.len() >= self.limit && self.bound() == 0.0 {
                return Err(MvpError::KNearestCap);
            }
        }
        Ok(())
    }

    fn into_sorted_points(self) -> Vec<Point> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| c.point)
            .collect()
    }
}

fn walk(
    node: &Node,
    query: &Point,
    query_path: &mut Vec<f32>,
    results: &mut ResultSet,
    config: &TreeConfig,
    metric: &dyn Metric,
) -> Result<()> {
    match node {
        Node::Leaf(leaf) => {
            let dq1 = match &leaf.sv1 {
                Some(sv) => {
                    let d = checked_distance(metric, query, sv)?;
                    results.offer(sv, d)?;
                    Some(d)
                }
                None => None,
            };
            let dq2 = match &leaf.sv2 {
                Some(sv) => {
                    let d = checked_distance(metric, query, sv)?;
                    results.offer(sv, d)?;
                    Some(d)
                }
                None => None,
            };
            'points: for (i, point) in leaf.points.iter().enumerate() {
                let bound = results.bound();
                // Path entries lower-bound the distance for every shared
                // ancestor vantage point.
                let shared = point.path().len().min(query_path.len());
                for j in 0..shared {
                    if (point.path()[j] - query_path[j]).abs() > bound {
                        continue 'points;
                    }
                }
                if let Some(dq1) = dq1 {
                    if (dq1 - leaf.d1[i]).abs() > bound {
                        continue;
                    }
                }
                if let Some(dq2) = dq2 {
                    if (dq2 - leaf.d2[i]).abs() > bound {
                        continue;
                    }
                }
                let d = checked_distance(metric, query, point)?;
                results.offer(point, d)?;
            }
            Ok(())
        }
        Node::Internal(internal) => {
            let dq1 = checked_distance(metric, query, &internal.sv1)?;
            results.offer(&internal.sv1, dq1)?;
            let dq2 = checked_distance(metric, query, &internal.sv2)?;
            results.offer(&internal.sv2, dq2)?;

            query_path.push(dq1);
            query_path.push(dq2);
            let bf = config.branchfactor;
            for b1 in 0..bf {
                let (low1, high1) = band_range(b1, &internal.m1);
                let bound = results.bound();
                if dq1 - bound > high1 || dq1 + bound < low1 {
                    continue;
                }
                let row = internal.m2_row(b1, bf);
                for b2 in 0..bf {
                    let (low2, high2) = band_range(b2, row);
                    let bound = results.bound();
                    if dq2 - bound > high2 || dq2 + bound < low2 {
                        continue;
                    }
                    if let Some(child) = &internal.children[b1 * bf + b2] {
                        walk(child, query, query_path, results, config, metric)?;
                    }
                }
            }
            query_path.truncate(query_path.len() - 2);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(id: &[u8], payload: &[u8]) -> Point {
        Point::new(id.to_vec(), payload.to_vec()).unwrap()
    }

    fn small_tree() -> Tree {
        Tree::new(
            TreeConfig {
                branchfactor: 2,
                pathlength: 5,
                leafcap: 3,
            },
            Box::new(BitHamming),
        )
        .unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(TreeConfig::default().validate().is_ok());
        for bad in [
            TreeConfig {
                branchfactor: 1,
                pathlength: 5,
                leafcap: 25,
            },
            TreeConfig {
                branchfactor: 2,
                pathlength: 0,
                leafcap: 25,
            },
            TreeConfig {
                branchfactor: 2,
                pathlength: 5,
                leafcap: 0,
            },
        ] {
            assert!(matches!(
                Tree::new(bad, Box::new(BitHamming)),
                Err(MvpError::ArgErr(_))
            ));
        }
    }

    #[test]
    fn test_empty_tree_retrieve() {
        let tree = small_tree();
        let err = tree
            .retrieve(&pt(b"q", &[0; 4]), usize::MAX, 10.0)
            .unwrap_err();
        assert_eq!(err, MvpError::EmptyTree);
        assert!(err.is_benign());
    }

    #[test]
    fn test_five_point_split_scenario() {
        // branchfactor 2, pathlength 5, leafcap 3, Hamming over 4-byte
        // payloads: four points fill the root leaf, the fifth forces one
        // split, and a radius-32 query sees everything (32 is the maximum
        // Hamming distance for 4 bytes).
        let mut tree = small_tree();
        let points: Vec<Point> = (0u32..5)
            .map(|i| pt(&[i as u8], &i.to_le_bytes()))
            .collect();
        assert_eq!(tree.insert(points).unwrap(), 5);
        assert_eq!(tree.len(), 5);

        let stats = tree.stats();
        assert_eq!(stats.internals, 1, "fifth insert should split exactly once");
        assert_eq!(stats.points, 5);

        let found = tree.retrieve(&pt(b"q", &[0; 4]), usize::MAX, 32.0).unwrap();
        assert_eq!(found.len(), 5);
    }

    #[test]
    fn test_four_points_do_not_split() {
        let mut tree = small_tree();
        let points: Vec<Point> = (0u32..4)
            .map(|i| pt(&[i as u8], &i.to_le_bytes()))
            .collect();
        tree.insert(points).unwrap();
        assert_eq!(tree.stats().internals, 0);
        assert_eq!(tree.stats().leaves, 1);
    }

    #[test]
    fn test_duplicate_payload_distinct_ids() {
        let mut tree = small_tree();
        tree.insert(vec![pt(b"a", b"AAAA"), pt(b"b", b"AAAA")])
            .unwrap();
        let found = tree.retrieve(&pt(b"q", b"AAAA"), usize::MAX, 0.0).unwrap();
        assert_eq!(found.len(), 2);
        let mut ids: Vec<&[u8]> = found.iter().map(|p| p.id()).collect();
        ids.sort();
        assert_eq!(ids, vec![b"a".as_slice(), b"b".as_slice()]);
    }

    #[test]
    fn test_no_payload_dedup() {
        // Identical id AND payload inserted twice stays twice; dedup is the
        // caller's job.
        let mut tree = small_tree();
        tree.insert(vec![pt(b"a", b"AAAA")]).unwrap();
        tree.insert(vec![pt(b"a", b"AAAA")]).unwrap();
        assert_eq!(tree.len(), 2);
        let found = tree.retrieve(&pt(b"q", b"AAAA"), usize::MAX, 0.0).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_datatype_mismatch_aborts_batch() {
        let mut tree = small_tree();
        tree.insert(vec![pt(b"a", b"AAAA")]).unwrap();
        let mixed = vec![
            pt(b"b", b"BBBB"),
            Point::with_datatype(b"c".to_vec(), vec![0u8; 4], Datatype::U32).unwrap(),
        ];
        assert_eq!(tree.insert(mixed).unwrap_err(), MvpError::TypeMismatch);
        // Nothing from the failed batch landed.
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_retrieve_datatype_mismatch() {
        let mut tree = small_tree();
        tree.insert(vec![pt(b"a", b"AAAA")]).unwrap();
        let query = Point::with_datatype(b"q".to_vec(), vec![0u8; 4], Datatype::U32).unwrap();
        assert_eq!(
            tree.retrieve(&query, usize::MAX, 1.0).unwrap_err(),
            MvpError::TypeMismatch
        );
    }

    #[test]
    fn test_radius_filters() {
        let mut tree = small_tree();
        tree.insert(vec![
            pt(b"zero", &[0x00, 0, 0, 0]),
            pt(b"one", &[0x01, 0, 0, 0]),
            pt(b"far", &[0xFF, 0xFF, 0xFF, 0xFF]),
        ])
        .unwrap();
        let found = tree.retrieve(&pt(b"q", &[0; 4]), usize::MAX, 1.0).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.id() != b"far"));
    }

    #[test]
    fn test_knearest_bound_and_order() {
        let mut tree = small_tree();
        // Distances from zero: 0, 1, 2, 8, 16 bits.
        tree.insert(vec![
            pt(b"d0", &[0x00, 0, 0, 0]),
            pt(b"d1", &[0x01, 0, 0, 0]),
            pt(b"d2", &[0x03, 0, 0, 0]),
            pt(b"d8", &[0xFF, 0, 0, 0]),
            pt(b"d16", &[0xFF, 0xFF, 0, 0]),
        ])
        .unwrap();
        let found = tree.retrieve(&pt(b"q", &[0; 4]), 3, 32.0).unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].id(), b"d0");
        assert_eq!(found[1].id(), b"d1");
        assert_eq!(found[2].id(), b"d2");
    }

    #[test]
    fn test_knearest_zero_is_argerr() {
        let mut tree = small_tree();
        tree.insert(vec![pt(b"a", b"AAAA")]).unwrap();
        assert!(matches!(
            tree.retrieve(&pt(b"q", b"AAAA"), 0, 1.0),
            Err(MvpError::ArgErr(_))
        ));
        assert!(matches!(
            tree.retrieve(&pt(b"q", b"AAAA"), 1, -1.0),
            Err(MvpError::ArgErr(_))
        ));
    }

    #[test]
    fn test_get_and_exists() {
        let mut tree = small_tree();
        let a = pt(b"a", b"AAAA");
        let b = pt(b"b", b"AAAA");
        tree.insert(vec![a.clone()]).unwrap();
        assert!(tree.exists(&a).unwrap());
        // Same payload, different identifier: not the same point.
        assert!(!tree.exists(&b).unwrap());
        assert_eq!(tree.get(&a).unwrap(), Some(a));

        let empty = small_tree();
        assert!(!empty.exists(&b).unwrap());
    }

    #[test]
    fn test_results_survive_mutation() {
        let mut tree = small_tree();
        let points: Vec<Point> = (0u32..4)
            .map(|i| pt(&[i as u8], &i.to_le_bytes()))
            .collect();
        tree.insert(points).unwrap();
        let found = tree.retrieve(&pt(b"q", &[0; 4]), usize::MAX, 32.0).unwrap();
        // Force a split after retrieval; earlier results stay valid copies.
        tree.insert(vec![pt(&[9], &9u32.to_le_bytes())]).unwrap();
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn test_reinserting_retrieved_point_resets_path() {
        let mut tree = small_tree();
        let points: Vec<Point> = (0u32..5)
            .map(|i| pt(&[i as u8], &i.to_le_bytes()))
            .collect();
        tree.insert(points).unwrap();
        let found = tree.retrieve(&pt(b"q", &[0; 4]), 1, 0.0).unwrap();
        assert_eq!(found.len(), 1);

        let mut other = small_tree();
        other.insert(found).unwrap();
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_larger_population_against_linear_scan() {
        let config = TreeConfig {
            branchfactor: 2,
            pathlength: 6,
            leafcap: 5,
        };
        let mut tree = Tree::new(config, Box::new(BitHamming)).unwrap();
        let metric = BitHamming;

        let points: Vec<Point> = (0u32..200)
            .map(|i| {
                let payload = (i.wrapping_mul(2654435761)).to_le_bytes();
                pt(&i.to_le_bytes(), &payload)
            })
            .collect();
        tree.insert(points.clone()).unwrap();

        let query = pt(b"q", &[0x5A, 0x5A, 0x5A, 0x5A]);
        for radius in [0.0, 4.0, 10.0, 16.0] {
            let mut expected: Vec<&Point> = points
                .iter()
                .filter(|p| metric.distance(&query, p) <= radius)
                .collect();
            let found = tree.retrieve(&query, usize::MAX, radius).unwrap();
            assert_eq!(found.len(), expected.len(), "radius {}", radius);
            expected.sort_by(|a, b| a.id().cmp(b.id()));
            let mut got: Vec<&Point> = found.iter().collect();
            got.sort_by(|a, b| a.id().cmp(b.id()));
            for (e, g) in expected.iter().zip(got.iter()) {
                assert_eq!(*e, *g);
            }
        }
    }

    #[test]
    fn test_stats_counts() {
        let mut tree = small_tree();
        assert_eq!(tree.stats(), TreeStats::default());
        let points: Vec<Point> = (0u32..20)
            .map(|i| pt(&[i as u8], &(i * 7 + 1).to_le_bytes()))
            .collect();
        tree.insert(points).unwrap();
        let stats = tree.stats();
        assert_eq!(stats.points, 20);
        assert!(stats.leaves >= 1);
        assert!(stats.max_depth >= 2);
    }
}
