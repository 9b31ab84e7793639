// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point loop cleanup and validation.

use crate::containers::Wire;
use crate::triangulation::newell_vector;
use crate::{Error, Point3, Result, Vector3};

/// Coordinate-wise equality within an absolute tolerance
#[inline]
pub fn almost_the_same(a: &Point3<f64>, b: &Point3<f64>, tolerance: f64) -> bool {
    (a.x - b.x).abs() < tolerance && (a.y - b.y).abs() < tolerance && (a.z - b.z).abs() < tolerance
}

/// Collapse runs of cyclically adjacent near-identical points onto the first
/// point of each run.
///
/// A run that wraps from the end of the loop back to its start collapses onto
/// the start.
pub fn remove_duplicate_points_from_loop(wire: &mut Wire, tolerance: f64) {
    let points = &mut wire.points;
    if points.len() < 2 {
        return;
    }

    let mut kept: Vec<Point3<f64>> = Vec::with_capacity(points.len());
    for p in points.iter() {
        match kept.last() {
            Some(last) if almost_the_same(last, p, tolerance) => {}
            _ => kept.push(*p),
        }
    }

    while kept.len() > 1 {
        match kept.last() {
            Some(last) if almost_the_same(last, &kept[0], tolerance) => {
                kept.pop();
            }
            _ => break,
        }
    }

    *points = kept;
}

/// Drop points lying on the segment between their neighbours
pub fn remove_collinear_points(points: &[Point3<f64>], tolerance: f64) -> Vec<Point3<f64>> {
    let mut result: Vec<Point3<f64>> = points.to_vec();
    let mut changed = true;

    while changed && result.len() >= 3 {
        changed = false;
        let n = result.len();
        for i in 0..n {
            let prev = result[(i + n - 1) % n];
            let next = result[(i + 1) % n];
            let p = result[i];

            let span = next - prev;
            let len = span.norm();
            if len <= tolerance {
                continue;
            }
            let offset = (p - prev).cross(&span).norm() / len;
            let along = (p - prev).dot(&span) / (len * len);
            if offset <= tolerance && along > 0.0 && along < 1.0 {
                result.remove(i);
                changed = true;
                break;
            }
        }
    }

    result
}

/// Unit normal and maximum distance of any point from the best-fit plane
///
/// Fails when the loop encloses no area.
pub fn plane_deviation(points: &[Point3<f64>], area_tolerance: f64) -> Result<(Vector3<f64>, f64)> {
    if points.len() < 3 {
        return Err(Error::degenerate(format!(
            "Loop has {} distinct points, need at least 3",
            points.len()
        )));
    }

    let area_vector = newell_vector(points);
    let area = area_vector.norm() / 2.0;
    if area <= area_tolerance {
        return Err(Error::degenerate("Loop encloses zero area"));
    }
    let normal = area_vector / (2.0 * area);

    let centroid = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / points.len() as f64;
    let deviation = points
        .iter()
        .map(|p| (p.coords - centroid).dot(&normal).abs())
        .fold(0.0, f64::max);

    Ok((normal, deviation))
}
