// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Faces and profiles.

use super::Kernel;
use crate::containers::{Face, Wire};
use crate::loops::plane_deviation;
use crate::placement::Placement;
use crate::{Error, Point3, Result};
use ifc_brep_core::{DecodedEntity, IfcType};

impl Kernel<'_> {
    /// Convert a face or profile entity, consulting the cache first
    ///
    /// Profiles come back in the XY plane of their Position.
    pub fn convert_face(&self, entity: &DecodedEntity) -> Result<Face> {
        let cached = self.cache.borrow().face(entity.id);
        if let Some(face) = cached {
            tracing::trace!(id = entity.id, "Face cache hit");
            return Ok(face);
        }

        let face = match entity.ifc_type {
            IfcType::IfcFace => self.convert_ifc_face(entity)?,
            IfcType::IfcArbitraryClosedProfileDef => {
                let outer = self.resolve(entity, 2, "OuterCurve")?;
                self.convert_wire_to_face(&self.convert_wire(&outer)?)?
            }
            IfcType::IfcArbitraryProfileDefWithVoids => {
                let outer = self.resolve(entity, 2, "OuterCurve")?;
                let mut face = self.convert_wire_to_face(&self.convert_wire(&outer)?)?;
                for curve in self.resolve_list(entity, 3, "InnerCurves")? {
                    face.inner.push(self.profile_loop(&curve)?);
                }
                face
            }
            IfcType::IfcRectangleProfileDef => {
                let x = self.positive_dimension(entity, 3, "XDim")? / 2.0;
                let y = self.positive_dimension(entity, 4, "YDim")? / 2.0;
                let outer = Wire::new(vec![
                    Point3::new(-x, -y, 0.0),
                    Point3::new(x, -y, 0.0),
                    Point3::new(x, y, 0.0),
                    Point3::new(-x, y, 0.0),
                ]);
                self.place_profile(entity, Face::new(outer))?
            }
            IfcType::IfcCircleProfileDef => {
                let radius = self.positive_dimension(entity, 3, "Radius")?;
                let outer = Wire::new(self.circle_points(radius));
                self.place_profile(entity, Face::new(outer))?
            }
            _ => {
                return Err(Error::UnsupportedEntity {
                    id: entity.id,
                    ifc_type: entity.ifc_type,
                })
            }
        };

        self.cache.borrow_mut().store_face(entity.id, face.clone());
        Ok(face)
    }

    /// Treat a wire as the outer loop of a face without holes
    ///
    /// Fails with fewer than three distinct points, a loop enclosing no area,
    /// or a point further than the planarity tolerance from the loop's plane.
    pub fn convert_wire_to_face(&self, wire: &Wire) -> Result<Face> {
        let mut outer = wire.clone();
        self.remove_duplicate_points_from_loop(&mut outer);

        if outer.len() < 3 {
            return Err(Error::degenerate(format!(
                "Loop has {} distinct points, need at least 3",
                outer.len()
            )));
        }

        let (_, deviation) = plane_deviation(&outer.points, self.settings.precision)?;
        if deviation > self.settings.planarity_tolerance {
            return Err(Error::NonPlanar { deviation });
        }

        Ok(Face::new(outer))
    }

    /// IfcFace: Bounds; the IfcFaceOuterBound (or the first bound) is the
    /// outer loop
    fn convert_ifc_face(&self, entity: &DecodedEntity) -> Result<Face> {
        let bounds = self.resolve_list(entity, 0, "Bounds")?;
        if bounds.is_empty() {
            return Err(Error::degenerate(format!("IfcFace #{} has no bounds", entity.id)));
        }

        let outer_index = bounds
            .iter()
            .position(|b| b.ifc_type == IfcType::IfcFaceOuterBound)
            .unwrap_or(0);

        let mut face = self.convert_wire_to_face(&self.convert_wire(&bounds[outer_index])?)?;
        for (i, bound) in bounds.iter().enumerate() {
            if i == outer_index {
                continue;
            }
            let inner = self.convert_wire(bound)?;
            if inner.len() < 3 {
                tracing::debug!(face = entity.id, bound = bound.id, "Dropping degenerate inner bound");
                continue;
            }
            face.inner.push(inner);
        }
        Ok(face)
    }

    /// Closed curve used as a profile hole
    fn profile_loop(&self, curve: &DecodedEntity) -> Result<Wire> {
        let wire = self.convert_wire(curve)?;
        if wire.len() < 3 {
            return Err(Error::degenerate(format!(
                "Inner curve #{} has {} distinct points",
                curve.id,
                wire.len()
            )));
        }
        Ok(wire)
    }

    pub(super) fn positive_dimension(&self, entity: &DecodedEntity, index: usize, name: &str) -> Result<f64> {
        match entity.get_float(index) {
            Some(value) if value > 0.0 => Ok(value),
            Some(value) => Err(Error::degenerate(format!(
                "{} #{} has {} = {}",
                entity.ifc_type, entity.id, name, value
            ))),
            None => Err(Error::geometry(format!(
                "{} #{} missing {}",
                entity.ifc_type, entity.id, name
            ))),
        }
    }

    /// Apply a parameterized profile's Position (attribute 2)
    fn place_profile(&self, entity: &DecodedEntity, face: Face) -> Result<Face> {
        let placement = match self.resolve_optional(entity, 2)? {
            Some(position) => self.convert_placement(&position)?,
            None => Placement::identity(),
        };
        let place = |w: &Wire| Wire::new(w.points.iter().map(|p| placement.apply(p)).collect());
        Ok(Face::with_holes(
            place(&face.outer),
            face.inner.iter().map(place).collect(),
        ))
    }
}
