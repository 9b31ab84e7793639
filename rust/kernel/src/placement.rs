// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Affine placement applied to points and shapes.

use crate::{Point3, Vector3};
use nalgebra::Matrix4;
use std::ops::Mul;

/// Affine transform in homogeneous coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement(pub Matrix4<f64>);

impl Placement {
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self(Matrix4::new_translation(&Vector3::new(x, y, z)))
    }

    /// Build from origin and orthonormal axes
    pub fn from_axes(
        origin: Point3<f64>,
        x_axis: Vector3<f64>,
        y_axis: Vector3<f64>,
        z_axis: Vector3<f64>,
    ) -> Self {
        let mut m = Matrix4::identity();
        for (col, axis) in [x_axis, y_axis, z_axis].iter().enumerate() {
            m[(0, col)] = axis.x;
            m[(1, col)] = axis.y;
            m[(2, col)] = axis.z;
        }
        m[(0, 3)] = origin.x;
        m[(1, 3)] = origin.y;
        m[(2, 3)] = origin.z;
        Self(m)
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.0
    }

    /// Inverse transform, `None` for singular matrices
    pub fn inverse(&self) -> Option<Self> {
        self.0.try_inverse().map(Self)
    }

    #[inline]
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.0.transform_point(point)
    }

    /// Origin of the placed frame
    pub fn origin(&self) -> Point3<f64> {
        Point3::new(self.0[(0, 3)], self.0[(1, 3)], self.0[(2, 3)])
    }

    /// Z axis of the placed frame, not normalized
    pub fn z_axis(&self) -> Vector3<f64> {
        Vector3::new(self.0[(0, 2)], self.0[(1, 2)], self.0[(2, 2)])
    }

    /// Determinant of the linear part; negative for mirroring transforms
    pub fn determinant(&self) -> f64 {
        self.0.fixed_view::<3, 3>(0, 0).determinant()
    }

    /// Every matrix entry within `tolerance` of the identity
    pub fn is_identity(&self, tolerance: f64) -> bool {
        let identity = Matrix4::<f64>::identity();
        self.0
            .iter()
            .zip(identity.iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Placement {
    type Output = Placement;

    fn mul(self, rhs: Placement) -> Placement {
        Placement(self.0 * rhs.0)
    }
}

impl From<Matrix4<f64>> for Placement {
    fn from(m: Matrix4<f64>) -> Self {
        Self(m)
    }
}
