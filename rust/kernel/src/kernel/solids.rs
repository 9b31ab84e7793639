// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solid items: faceted breps, shells, extrusions and boolean results.

use super::Kernel;
use crate::containers::{Face, Wire};
use crate::nef::{create_polyhedron, NefPolyhedron};
use crate::placement::Placement;
use crate::results::ConversionResults;
use crate::shape::Shape;
use crate::{Error, Point3, Result, Vector3};
use ifc_brep_core::{DecodedEntity, IfcType};

/// IfcBooleanOperator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BooleanOperator {
    Difference,
    Union,
    Intersection,
}

impl BooleanOperator {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "DIFFERENCE" => Some(Self::Difference),
            "UNION" => Some(Self::Union),
            "INTERSECTION" => Some(Self::Intersection),
            _ => None,
        }
    }
}

impl Kernel<'_> {
    /// Convert a single solid item into one result
    pub(super) fn convert_solid(&self, entity: &DecodedEntity) -> Result<ConversionResults> {
        let shape = match entity.ifc_type {
            IfcType::IfcFacetedBrep => {
                let outer = self.resolve(entity, 0, "Outer")?;
                self.closed_shell(&outer)?
            }
            IfcType::IfcClosedShell => self.closed_shell(entity)?,
            IfcType::IfcOpenShell => self.face_set(entity)?,
            IfcType::IfcExtrudedAreaSolid => self.convert_extrusion(entity)?,
            IfcType::IfcBooleanResult | IfcType::IfcBooleanClippingResult => {
                self.convert_boolean(entity)?
            }
            _ => {
                return Err(Error::UnsupportedEntity {
                    id: entity.id,
                    ifc_type: entity.ifc_type,
                })
            }
        };
        Ok(self.single_result(entity, shape))
    }

    /// Shell whose facets are flipped outward when they wind inward
    fn closed_shell(&self, shell: &DecodedEntity) -> Result<Shape> {
        let shape = self.face_set(shell)?;
        if shape.volume() < 0.0 {
            tracing::debug!(id = shell.id, "Reversing inward-facing shell");
            Ok(shape.reversed())
        } else {
            Ok(shape)
        }
    }

    /// Boundary mesh of a face set (CfsFaces, attribute 0)
    ///
    /// Faces that fail to convert are skipped.
    pub(super) fn face_set(&self, entity: &DecodedEntity) -> Result<Shape> {
        let mut faces = Vec::new();
        for face in self.resolve_list(entity, 0, "CfsFaces")? {
            match self.convert_face(&face) {
                Ok(converted) => faces.push(converted),
                Err(e) => {
                    tracing::warn!(shell = entity.id, face = face.id, error = %e, "Skipping face");
                }
            }
        }

        if faces.is_empty() {
            return Err(Error::degenerate(format!(
                "{} #{} has no usable faces",
                entity.ifc_type, entity.id
            )));
        }
        create_polyhedron(&faces)
    }

    /// IfcExtrudedAreaSolid: SweptArea, Position, ExtrudedDirection, Depth
    fn convert_extrusion(&self, entity: &DecodedEntity) -> Result<Shape> {
        let profile = self.convert_face(&self.resolve(entity, 0, "SweptArea")?)?;
        let position = match self.resolve_optional(entity, 1)? {
            Some(position) => self.convert_placement(&position)?,
            None => Placement::identity(),
        };
        let direction = self.parse_direction(&self.resolve(entity, 2, "ExtrudedDirection")?)?;
        let depth = self.positive_dimension(entity, 3, "Depth")?;

        let shape = extrude_face(&profile, direction * depth).map_err(|e| match e {
            Error::DegenerateGeometry(msg) => {
                Error::degenerate(format!("IfcExtrudedAreaSolid #{}: {}", entity.id, msg))
            }
            other => other,
        })?;
        Ok(shape.transformed(&position))
    }

    /// IfcBooleanResult: Operator, FirstOperand, SecondOperand
    fn convert_boolean(&self, entity: &DecodedEntity) -> Result<Shape> {
        let operator_name = entity.get_enum(0).unwrap_or("DIFFERENCE");
        let operator = BooleanOperator::parse(operator_name).ok_or_else(|| {
            Error::geometry(format!(
                "{} #{} has unknown operator {}",
                entity.ifc_type, entity.id, operator_name
            ))
        })?;

        let first = self.operand_shape(&self.resolve(entity, 1, "FirstOperand")?)?;
        let second_entity = self.resolve(entity, 2, "SecondOperand")?;
        let second = if second_entity.ifc_type == IfcType::IfcHalfSpaceSolid {
            self.half_space_box(&second_entity, &first)?
        } else {
            self.operand_shape(&second_entity)?
        };

        let precision = self.settings.precision;
        let a = NefPolyhedron::from_shape(&first, precision)?;
        let b = NefPolyhedron::from_shape(&second, precision)?;
        let combined = match operator {
            BooleanOperator::Difference => a.difference(&b),
            BooleanOperator::Union => a.union(&b),
            BooleanOperator::Intersection => a.intersection(&b),
        };

        let shape = combined.to_shape(self.settings.weld_tolerance);
        if shape.is_empty() || !shape.is_finite() {
            tracing::warn!(id = entity.id, operator = ?operator, "Boolean produced no solid");
            return Err(Error::BooleanFailure(format!(
                "{:?} of #{} produced no solid",
                operator, entity.id
            )));
        }
        Ok(shape)
    }

    /// Operand converted through the shape cache, placements applied
    fn operand_shape(&self, operand: &DecodedEntity) -> Result<Shape> {
        let results = self.convert_shape(operand)?;
        let mut shape = Shape::default();
        for result in results.iter() {
            shape.merge(&result.placed_shape());
        }
        if shape.is_empty() {
            return Err(Error::degenerate(format!(
                "Boolean operand {} #{} has no geometry",
                operand.ifc_type, operand.id
            )));
        }
        Ok(shape)
    }

    /// IfcHalfSpaceSolid as a box covering `reference`
    ///
    /// BaseSurface must be an IfcPlane. With AgreementFlag true the material
    /// lies on the side opposite the plane normal.
    fn half_space_box(&self, half_space: &DecodedEntity, reference: &Shape) -> Result<Shape> {
        let surface = self.resolve(half_space, 0, "BaseSurface")?;
        if surface.ifc_type != IfcType::IfcPlane {
            return Err(Error::UnsupportedEntity {
                id: surface.id,
                ifc_type: surface.ifc_type,
            });
        }
        let plane = self.convert_placement(&self.resolve(&surface, 0, "Position")?)?;
        let to_plane = plane.inverse().ok_or_else(|| {
            Error::degenerate(format!("IfcPlane #{} has a singular position", surface.id))
        })?;
        let agreement = half_space.get_bool(1).unwrap_or(true);

        let (min, max) = reference
            .bounds()
            .ok_or_else(|| Error::degenerate("Boolean operand has no vertices"))?;
        let mut lo = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut hi = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for i in 0..8 {
            let corner = Point3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            );
            let local = to_plane.apply(&corner);
            lo = lo.inf(&local);
            hi = hi.sup(&local);
        }

        let margin = (hi - lo).norm().max(1.0) * 0.5;
        let (bottom, top) = if agreement {
            (lo.z.min(0.0) - margin, 0.0)
        } else {
            (0.0, hi.z.max(0.0) + margin)
        };
        let local = Shape::cuboid(
            Point3::new(lo.x - margin, lo.y - margin, bottom),
            Point3::new(hi.x + margin, hi.y + margin, top),
        );
        Ok(local.transformed(&plane))
    }
}

/// Sweep a planar face along `extrusion`
///
/// The profile is re-oriented so the result winds outward whatever the
/// winding of its loops.
pub(crate) fn extrude_face(profile: &Face, extrusion: Vector3<f64>) -> Result<Shape> {
    let length = extrusion.norm();
    let along = profile.normal().dot(&extrusion);
    if length <= 0.0 || along.abs() <= length * 1e-9 {
        return Err(Error::degenerate("extrusion direction lies in the profile plane"));
    }

    let outer = if along > 0.0 {
        profile.outer.clone()
    } else {
        profile.outer.reversed()
    };
    let holes: Vec<Wire> = profile
        .inner
        .iter()
        .map(|hole| {
            if hole.normal().dot(&extrusion) < 0.0 {
                hole.clone()
            } else {
                hole.reversed()
            }
        })
        .collect();
    let base = Face::with_holes(outer, holes);

    let shift = |wire: &Wire| Wire::new(wire.points.iter().map(|p| p + extrusion).collect());
    let top = Face::with_holes(shift(&base.outer), base.inner.iter().map(shift).collect());

    let mut faces = base.reversed().triangulate()?;
    faces.extend(top.triangulate()?);

    for wire in std::iter::once(&base.outer).chain(base.inner.iter()) {
        let n = wire.len();
        for i in 0..n {
            let p = wire.points[i];
            let q = wire.points[(i + 1) % n];
            faces.push(Face::new(Wire::new(vec![p, q, q + extrusion, p + extrusion])));
        }
    }

    create_polyhedron(&faces)
}
