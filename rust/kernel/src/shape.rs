// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed boundary mesh and the queries run against it.

use crate::placement::Placement;
use crate::triangulation::newell_vector;
use crate::Point3;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Boundary mesh: a vertex array and facets given as vertex id cycles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    pub vertices: Vec<Point3<f64>>,
    pub facets: Vec<Vec<u32>>,
}

impl Shape {
    pub fn new(vertices: Vec<Point3<f64>>, facets: Vec<Vec<u32>>) -> Self {
        Self { vertices, facets }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    #[inline]
    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Positions of one facet's vertex cycle
    pub fn facet_points(&self, index: usize) -> Vec<Point3<f64>> {
        self.facets
            .get(index)
            .map(|facet| facet.iter().map(|&v| self.vertices[v as usize]).collect())
            .unwrap_or_default()
    }

    /// All coordinates are finite
    pub fn is_finite(&self) -> bool {
        self.vertices
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
    }

    /// Signed enclosed volume; positive when facets wind counter-clockwise
    /// seen from outside
    pub fn volume(&self) -> f64 {
        let mut six_volume = 0.0;
        for i in 0..self.facets.len() {
            let points = self.facet_points(i);
            if points.len() < 3 {
                continue;
            }
            six_volume += points[0].coords.dot(&newell_vector(&points));
        }
        six_volume / 6.0
    }

    /// Every edge, after welding vertices closer than `tolerance`, is shared
    /// by exactly two facets
    pub fn is_manifold(&self, tolerance: f64) -> bool {
        if self.facets.is_empty() {
            return false;
        }

        let (_, remap) = weld_points(&self.vertices, tolerance);
        let mut edges: FxHashMap<(u32, u32), u32> = FxHashMap::default();

        for facet in &self.facets {
            let ids: SmallVec<[u32; 8]> = facet.iter().map(|&v| remap[v as usize]).collect();
            let n = ids.len();
            for i in 0..n {
                let a = ids[i];
                let b = ids[(i + 1) % n];
                if a == b {
                    continue;
                }
                let key = if a < b { (a, b) } else { (b, a) };
                *edges.entry(key).or_insert(0) += 1;
            }
        }

        !edges.is_empty() && edges.values().all(|&count| count == 2)
    }

    /// Axis-aligned bounds as (min, max)
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &self.vertices[1..] {
            min = min.inf(p);
            max = max.sup(p);
        }
        Some((min, max))
    }

    /// Copy with every vertex placed; mirroring placements also flip facets
    pub fn transformed(&self, placement: &Placement) -> Shape {
        let vertices = self.vertices.iter().map(|p| placement.apply(p)).collect();
        let shape = Shape::new(vertices, self.facets.clone());
        if placement.determinant() < 0.0 {
            shape.reversed()
        } else {
            shape
        }
    }

    /// Copy with every facet's winding reversed
    pub fn reversed(&self) -> Shape {
        Shape::new(
            self.vertices.clone(),
            self.facets
                .iter()
                .map(|f| f.iter().rev().copied().collect())
                .collect(),
        )
    }

    /// Append another shape's vertices and facets
    pub fn merge(&mut self, other: &Shape) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.facets.extend(
            other
                .facets
                .iter()
                .map(|f| f.iter().map(|v| v + offset).collect::<Vec<u32>>()),
        );
    }
}

impl Shape {
    /// Axis-aligned box with shared vertices and outward facets
    pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> Shape {
        let corner = |i: usize| {
            Point3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            )
        };
        Shape::new(
            (0..8).map(corner).collect(),
            vec![
                vec![0, 2, 3, 1],
                vec![4, 5, 7, 6],
                vec![0, 1, 5, 4],
                vec![1, 3, 7, 5],
                vec![3, 2, 6, 7],
                vec![2, 0, 4, 6],
            ],
        )
    }
}

/// Merge points closer than `tolerance` (per coordinate)
///
/// Returns the surviving points and, for every input point, the index of
/// the point it was merged into. Earlier points win.
pub fn weld_points(points: &[Point3<f64>], tolerance: f64) -> (Vec<Point3<f64>>, Vec<u32>) {
    let cell = if tolerance > 0.0 { tolerance } else { 1e-9 };
    let key = |p: &Point3<f64>| {
        (
            (p.x / cell).floor() as i64,
            (p.y / cell).floor() as i64,
            (p.z / cell).floor() as i64,
        )
    };

    let mut grid: FxHashMap<(i64, i64, i64), SmallVec<[u32; 2]>> = FxHashMap::default();
    let mut welded: Vec<Point3<f64>> = Vec::with_capacity(points.len());
    let mut remap = Vec::with_capacity(points.len());

    for p in points {
        let (kx, ky, kz) = key(p);
        let mut found = None;
        'search: for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(bucket) = grid.get(&(kx + dx, ky + dy, kz + dz)) {
                        for &id in bucket {
                            let q = &welded[id as usize];
                            if (p.x - q.x).abs() <= tolerance
                                && (p.y - q.y).abs() <= tolerance
                                && (p.z - q.z).abs() <= tolerance
                            {
                                found = Some(id);
                                break 'search;
                            }
                        }
                    }
                }
            }
        }

        let id = match found {
            Some(id) => id,
            None => {
                let id = welded.len() as u32;
                welded.push(*p);
                grid.entry((kx, ky, kz)).or_default().push(id);
                id
            }
        };
        remap.push(id);
    }

    (welded, remap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Unit cube with shared vertices and outward facets
    fn unit_cube() -> Shape {
        let v = |x: f64, y: f64, z: f64| Point3::new(x, y, z);
        Shape::new(
            vec![
                v(0.0, 0.0, 0.0),
                v(1.0, 0.0, 0.0),
                v(1.0, 1.0, 0.0),
                v(0.0, 1.0, 0.0),
                v(0.0, 0.0, 1.0),
                v(1.0, 0.0, 1.0),
                v(1.0, 1.0, 1.0),
                v(0.0, 1.0, 1.0),
            ],
            vec![
                vec![0, 3, 2, 1],
                vec![4, 5, 6, 7],
                vec![0, 1, 5, 4],
                vec![1, 2, 6, 5],
                vec![2, 3, 7, 6],
                vec![3, 0, 4, 7],
            ],
        )
    }

    #[test]
    fn test_cube_volume_and_manifold() {
        let cube = unit_cube();
        assert_relative_eq!(cube.volume(), 1.0, epsilon = 1e-12);
        assert!(cube.is_manifold(1e-9));
        assert_relative_eq!(cube.reversed().volume(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_open_box_is_not_manifold() {
        let mut cube = unit_cube();
        cube.facets.pop();
        assert!(!cube.is_manifold(1e-9));
        assert!(!Shape::default().is_manifold(1e-9));
    }

    #[test]
    fn test_manifold_check_welds_duplicated_vertices() {
        let cube = unit_cube();
        let mut vertices: Vec<Point3<f64>> = Vec::new();
        let mut facets: Vec<Vec<u32>> = Vec::new();
        for i in 0..cube.facet_count() {
            let start = vertices.len() as u32;
            let points = cube.facet_points(i);
            facets.push((start..start + points.len() as u32).collect());
            vertices.extend(points);
        }
        let split = Shape::new(vertices, facets);
        assert_eq!(split.vertex_count(), 24);
        assert!(split.is_manifold(1e-9));
    }

    #[test]
    fn test_transform_and_bounds() {
        let moved = unit_cube().transformed(&Placement::translation(2.0, 0.0, -1.0));
        let (min, max) = moved.bounds().unwrap();
        assert_relative_eq!(min, Point3::new(2.0, 0.0, -1.0));
        assert_relative_eq!(max, Point3::new(3.0, 1.0, 0.0));
        assert_relative_eq!(moved.volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mirroring_keeps_outward_facets() {
        let mut m = Placement::identity();
        m.0[(0, 0)] = -1.0;
        let mirrored = unit_cube().transformed(&m);
        assert_relative_eq!(mirrored.volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cuboid() {
        let cuboid = Shape::cuboid(Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(cuboid.volume(), 12.0, epsilon = 1e-12);
        assert!(cuboid.is_manifold(1e-9));
    }

    #[test]
    fn test_weld_points() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1e-10, 0.0, 0.0),
        ];
        let (welded, remap) = weld_points(&points, 1e-9);
        assert_eq!(welded.len(), 2);
        assert_eq!(remap, vec![0, 1, 0]);
    }
}
