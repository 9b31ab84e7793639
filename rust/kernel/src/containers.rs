// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wires, faces and curve samples.

use crate::triangulation::{
    calculate_polygon_normal, project_to_2d, project_to_2d_with_basis,
    triangulate_polygon_with_holes,
};
use crate::{Point2, Point3, Result, Vector3};

/// Ordered point loop; point order defines the winding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wire {
    pub points: Vec<Point3<f64>>,
}

impl Wire {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Same points, opposite winding
    pub fn reversed(&self) -> Self {
        Self::new(self.points.iter().rev().copied().collect())
    }

    /// Unit normal by Newell's method
    pub fn normal(&self) -> Vector3<f64> {
        calculate_polygon_normal(&self.points)
    }
}

/// Planar face: one outer loop and zero or more holes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Face {
    pub outer: Wire,
    pub inner: Vec<Wire>,
}

impl Face {
    pub fn new(outer: Wire) -> Self {
        Self {
            outer,
            inner: Vec::new(),
        }
    }

    pub fn with_holes(outer: Wire, inner: Vec<Wire>) -> Self {
        Self { outer, inner }
    }

    pub fn has_holes(&self) -> bool {
        !self.inner.is_empty()
    }

    /// Unit normal of the outer loop
    pub fn normal(&self) -> Vector3<f64> {
        self.outer.normal()
    }

    /// Reverse the winding of every loop
    pub fn reversed(&self) -> Self {
        Self {
            outer: self.outer.reversed(),
            inner: self.inner.iter().map(Wire::reversed).collect(),
        }
    }

    /// Split into hole-free triangles with the outer loop's winding
    ///
    /// Faces without holes are returned as they are.
    pub fn triangulate(&self) -> Result<Vec<Face>> {
        if self.inner.is_empty() {
            return Ok(vec![self.clone()]);
        }

        let normal = self.normal();
        let (outer_2d, u_axis, v_axis, origin) = project_to_2d(&self.outer.points, &normal);
        let holes_2d: Vec<Vec<Point2<f64>>> = self
            .inner
            .iter()
            .filter(|w| w.len() >= 3)
            .map(|w| project_to_2d_with_basis(&w.points, &u_axis, &v_axis, &origin))
            .collect();

        let indices = triangulate_polygon_with_holes(&outer_2d, &holes_2d)?;

        let combined: Vec<Point3<f64>> = self
            .outer
            .points
            .iter()
            .chain(self.inner.iter().filter(|w| w.len() >= 3).flat_map(|w| w.points.iter()))
            .copied()
            .collect();

        Ok(indices
            .chunks_exact(3)
            .map(|tri| Face::new(Wire::new(vec![combined[tri[0]], combined[tri[1]], combined[tri[2]]])))
            .collect())
    }
}

/// Sampled curve
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Curve {
    pub points: Vec<Point3<f64>>,
    pub closed: bool,
}

impl Curve {
    pub fn new(points: Vec<Point3<f64>>, closed: bool) -> Self {
        Self { points, closed }
    }

    /// Reuse the samples as a loop
    pub fn to_wire(&self) -> Wire {
        Wire::new(self.points.clone())
    }
}
