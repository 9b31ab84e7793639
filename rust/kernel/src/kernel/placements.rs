// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement conversion: local placement chains, axis placements and
//! cartesian transformation operators.

use super::Kernel;
use crate::placement::Placement;
use crate::{Error, Point3, Result, Vector3};
use ifc_brep_core::{DecodedEntity, IfcType};

/// Depth limit for PlacementRelTo chains
const MAX_PLACEMENT_DEPTH: usize = 100;

/// Orthonormal right-handed frame from a Z axis and an approximate X axis
fn frame(z_axis: Vector3<f64>, ref_x: Vector3<f64>) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
    let z_axis = z_axis.normalize();
    let mut x_axis = ref_x - z_axis * ref_x.dot(&z_axis);
    if x_axis.norm() < 1e-12 {
        // RefDirection parallel to Axis: pick any perpendicular
        let helper = if z_axis.x.abs() < 0.9 {
            Vector3::new(1.0, 0.0, 0.0)
        } else {
            Vector3::new(0.0, 1.0, 0.0)
        };
        x_axis = helper - z_axis * helper.dot(&z_axis);
    }
    let x_axis = x_axis.normalize();
    let y_axis = z_axis.cross(&x_axis);
    (x_axis, y_axis, z_axis)
}

impl Kernel<'_> {
    /// Convert a placement entity into a transform
    ///
    /// Supports IfcLocalPlacement (following PlacementRelTo),
    /// IfcAxis2Placement3D, IfcAxis2Placement2D and
    /// IfcCartesianTransformationOperator3D.
    pub fn convert_placement(&self, entity: &DecodedEntity) -> Result<Placement> {
        self.convert_placement_with_depth(entity, 0)
    }

    fn convert_placement_with_depth(&self, entity: &DecodedEntity, depth: usize) -> Result<Placement> {
        match entity.ifc_type {
            IfcType::IfcLocalPlacement => {
                if depth > MAX_PLACEMENT_DEPTH {
                    tracing::warn!(id = entity.id, "Placement chain too deep, truncating");
                    return Ok(Placement::identity());
                }

                // 0: PlacementRelTo, 1: RelativePlacement
                let parent = match self.resolve_optional(entity, 0)? {
                    Some(parent) => self.convert_placement_with_depth(&parent, depth + 1)?,
                    None => Placement::identity(),
                };
                let local = match self.resolve_optional(entity, 1)? {
                    Some(relative) => self.convert_placement_with_depth(&relative, depth + 1)?,
                    None => Placement::identity(),
                };
                Ok(parent * local)
            }
            IfcType::IfcAxis2Placement3D => self.parse_axis2_placement_3d(entity),
            IfcType::IfcAxis2Placement2D => self.parse_axis2_placement_2d(entity),
            IfcType::IfcCartesianTransformationOperator3D => {
                self.parse_cartesian_transformation_operator(entity)
            }
            _ => Err(Error::UnsupportedEntity {
                id: entity.id,
                ifc_type: entity.ifc_type,
            }),
        }
    }

    /// True when the placement is the identity within the kernel precision
    pub fn is_identity_transform(&self, entity: &DecodedEntity) -> Result<bool> {
        Ok(self.convert_placement(entity)?.is_identity(self.settings.precision))
    }

    /// IfcAxis2Placement3D: Location, Axis, RefDirection
    fn parse_axis2_placement_3d(&self, entity: &DecodedEntity) -> Result<Placement> {
        let location = self.parse_cartesian_point(&self.resolve(entity, 0, "Location")?)?;

        let z_axis = match self.resolve_optional(entity, 1)? {
            Some(axis) => self.parse_direction(&axis)?,
            None => Vector3::new(0.0, 0.0, 1.0),
        };
        let ref_x = match self.resolve_optional(entity, 2)? {
            Some(dir) => self.parse_direction(&dir)?,
            None => Vector3::new(1.0, 0.0, 0.0),
        };

        let (x_axis, y_axis, z_axis) = frame(z_axis, ref_x);
        Ok(Placement::from_axes(location, x_axis, y_axis, z_axis))
    }

    /// IfcAxis2Placement2D: Location, RefDirection
    fn parse_axis2_placement_2d(&self, entity: &DecodedEntity) -> Result<Placement> {
        let location = self.parse_cartesian_point(&self.resolve(entity, 0, "Location")?)?;
        let ref_x = match self.resolve_optional(entity, 1)? {
            Some(dir) => self.parse_direction(&dir)?,
            None => Vector3::new(1.0, 0.0, 0.0),
        };

        let x_axis = Vector3::new(ref_x.x, ref_x.y, 0.0)
            .try_normalize(1e-12)
            .ok_or_else(|| Error::degenerate(format!("IfcAxis2Placement2D #{} has no in-plane direction", entity.id)))?;
        let y_axis = Vector3::new(-x_axis.y, x_axis.x, 0.0);
        Ok(Placement::from_axes(
            Point3::new(location.x, location.y, 0.0),
            x_axis,
            y_axis,
            Vector3::new(0.0, 0.0, 1.0),
        ))
    }

    /// IfcCartesianTransformationOperator3D:
    /// 0 Axis1, 1 Axis2, 2 LocalOrigin, 3 Scale, 4 Axis3
    fn parse_cartesian_transformation_operator(&self, entity: &DecodedEntity) -> Result<Placement> {
        let origin = match self.resolve_optional(entity, 2)? {
            Some(point) => self.parse_cartesian_point(&point)?,
            None => Point3::origin(),
        };
        let scale = entity.get_float(3).unwrap_or(1.0);

        let x_axis = match self.resolve_optional(entity, 0)? {
            Some(dir) => self.parse_direction(&dir)?,
            None => Vector3::new(1.0, 0.0, 0.0),
        };
        let z_axis = match self.resolve_optional(entity, 4)? {
            Some(dir) => self.parse_direction(&dir)?,
            None => Vector3::new(0.0, 0.0, 1.0),
        };

        let (x_axis, y_axis, z_axis) = frame(z_axis, x_axis);
        Ok(Placement::from_axes(
            origin,
            x_axis * scale,
            y_axis * scale,
            z_axis * scale,
        ))
    }

    /// ObjectPlacement (attribute 5) of a product, identity when absent
    pub(super) fn product_placement(&self, product: &DecodedEntity) -> Result<Placement> {
        match self.resolve_optional(product, 5)? {
            Some(placement) => self.convert_placement(&placement),
            None => Ok(Placement::identity()),
        }
    }
}
