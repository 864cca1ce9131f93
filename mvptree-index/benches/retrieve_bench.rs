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

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mvptree_index::{BitHamming, Point, Tree, TreeConfig};

fn random_points(rng: &mut StdRng, n: usize) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let payload: Vec<u8> = (0..8).map(|_| rng.gen()).collect();
            Point::new((i as u32).to_le_bytes().to_vec(), payload).unwrap()
        })
        .collect()
}

fn populated(points: Vec<Point>) -> Tree {
    let mut tree = Tree::new(TreeConfig::default(), Box::new(BitHamming)).unwrap();
    tree.insert(points).unwrap();
    tree
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for n in [1_000usize, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut rng = StdRng::seed_from_u64(7);
            let points = random_points(&mut rng, n);
            b.iter(|| {
                let tree = populated(black_box(points.clone()));
                black_box(tree.len())
            });
        });
    }
    group.finish();
}

fn bench_retrieve(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let tree = populated(random_points(&mut rng, 10_000));
    let queries: Vec<Point> = random_points(&mut rng, 64)
        .into_iter()
        .map(|p| Point::new(b"q".to_vec(), p.payload().to_vec()).unwrap())
        .collect();

    let mut group = c.benchmark_group("retrieve");
    for radius in [4.0f32, 10.0, 20.0] {
        group.bench_with_input(
            BenchmarkId::from_parameter(radius as u32),
            &radius,
            |b, &radius| {
                let mut i = 0usize;
                b.iter(|| {
                    let query = &queries[i % queries.len()];
                    i += 1;
                    black_box(tree.retrieve(black_box(query), usize::MAX, radius).unwrap())
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_retrieve);
criterion_main!(benches);
