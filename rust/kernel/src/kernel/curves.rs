// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Points, directions, curves and loops.

use super::{shape_type, Kernel, ShapeType};
use crate::containers::{Curve, Wire};
use crate::loops::almost_the_same;
use crate::{Error, Point3, Result, Vector3};
use ifc_brep_core::{AttributeValue, DecodedEntity, IfcType};
use std::f64::consts::PI;

/// Read up to three coordinates from a list attribute, missing ones are 0
fn coordinates(values: &[AttributeValue]) -> Option<[f64; 3]> {
    if values.is_empty() {
        return None;
    }
    let mut coords = [0.0; 3];
    for (slot, value) in coords.iter_mut().zip(values) {
        *slot = value.as_float()?;
    }
    Some(coords)
}

impl Kernel<'_> {
    /// Parse IfcCartesianPoint; 2D points get z = 0
    pub(super) fn parse_cartesian_point(&self, point: &DecodedEntity) -> Result<Point3<f64>> {
        if point.ifc_type != IfcType::IfcCartesianPoint {
            return Err(Error::geometry(format!(
                "Expected IfcCartesianPoint, got {} #{}",
                point.ifc_type, point.id
            )));
        }

        let [x, y, z] = point
            .get_list(0)
            .and_then(coordinates)
            .ok_or_else(|| Error::geometry(format!("IfcCartesianPoint #{} has no coordinates", point.id)))?;
        Ok(Point3::new(x, y, z))
    }

    /// Parse IfcDirection into a unit vector
    pub(super) fn parse_direction(&self, direction: &DecodedEntity) -> Result<Vector3<f64>> {
        if direction.ifc_type != IfcType::IfcDirection {
            return Err(Error::geometry(format!(
                "Expected IfcDirection, got {} #{}",
                direction.ifc_type, direction.id
            )));
        }

        let [x, y, z] = direction
            .get_list(0)
            .and_then(coordinates)
            .ok_or_else(|| Error::geometry(format!("IfcDirection #{} has no ratios", direction.id)))?;
        Vector3::new(x, y, z)
            .try_normalize(1e-12)
            .ok_or_else(|| Error::degenerate(format!("IfcDirection #{} has zero length", direction.id)))
    }

    /// Resolve and parse a point list attribute
    fn parse_point_list(&self, entity: &DecodedEntity, index: usize) -> Result<Vec<Point3<f64>>> {
        self.resolve_list(entity, index, "Points")?
            .iter()
            .map(|p| self.parse_cartesian_point(p))
            .collect()
    }

    /// Convert a curve entity into samples, consulting the cache first
    pub fn convert_curve(&self, entity: &DecodedEntity) -> Result<Curve> {
        let cached = self.cache.borrow().curve(entity.id);
        if let Some(curve) = cached {
            tracing::trace!(id = entity.id, "Curve cache hit");
            return Ok(curve);
        }

        let curve = match entity.ifc_type {
            IfcType::IfcPolyline => {
                let points = self.parse_point_list(entity, 0)?;
                self.close_if_repeated(points)
            }
            IfcType::IfcIndexedPolyCurve => self.convert_indexed_poly_curve(entity)?,
            IfcType::IfcCircle => self.convert_circle(entity)?,
            _ => {
                return Err(Error::UnsupportedEntity {
                    id: entity.id,
                    ifc_type: entity.ifc_type,
                })
            }
        };

        self.cache.borrow_mut().store_curve(entity.id, curve.clone());
        Ok(curve)
    }

    /// Closed when the last point repeats the first; the repeat is dropped
    fn close_if_repeated(&self, mut points: Vec<Point3<f64>>) -> Curve {
        let closed = points.len() > 2
            && almost_the_same(&points[0], &points[points.len() - 1], self.settings.precision);
        if closed {
            points.pop();
        }
        Curve::new(points, closed)
    }

    /// IfcIndexedPolyCurve over an IfcCartesianPointList2D/3D
    ///
    /// Segments are followed as straight lines through the listed points.
    fn convert_indexed_poly_curve(&self, entity: &DecodedEntity) -> Result<Curve> {
        let list = self.resolve(entity, 0, "Points")?;
        if !matches!(
            list.ifc_type,
            IfcType::IfcCartesianPointList2D | IfcType::IfcCartesianPointList3D
        ) {
            return Err(Error::geometry(format!(
                "IfcIndexedPolyCurve #{} points are a {}",
                entity.id, list.ifc_type
            )));
        }

        let rows = list
            .get_list(0)
            .ok_or_else(|| Error::geometry(format!("{} #{} has no CoordList", list.ifc_type, list.id)))?;
        let all: Vec<Point3<f64>> = rows
            .iter()
            .map(|row| {
                row.as_list()
                    .and_then(coordinates)
                    .map(|[x, y, z]| Point3::new(x, y, z))
                    .ok_or_else(|| Error::geometry(format!("Malformed coordinate in #{}", list.id)))
            })
            .collect::<Result<_>>()?;

        let points = match entity.get_list(1) {
            Some(segments) => {
                let mut ordered: Vec<Point3<f64>> = Vec::new();
                for segment in segments {
                    let indices = segment.as_list().unwrap_or(&[]);
                    for index in indices.iter().filter_map(|v| v.as_int()) {
                        let point = usize::try_from(index - 1)
                            .ok()
                            .and_then(|i| all.get(i))
                            .ok_or_else(|| {
                                Error::geometry(format!(
                                    "IfcIndexedPolyCurve #{} index {} out of range",
                                    entity.id, index
                                ))
                            })?;
                        if ordered.last() != Some(point) {
                            ordered.push(*point);
                        }
                    }
                }
                if ordered.is_empty() {
                    all
                } else {
                    ordered
                }
            }
            None => all,
        };

        Ok(self.close_if_repeated(points))
    }

    /// Number of segments for a full circle so the chord deviation stays
    /// below the deflection tolerance
    pub(super) fn circle_segments(&self, radius: f64) -> usize {
        let settings = &self.settings;
        let deflection = settings.deflection_tolerance;
        let segments = if deflection > 0.0 && deflection < radius {
            (PI / (1.0 - deflection / radius).acos()).ceil() as usize
        } else {
            settings.min_circle_segments
        };
        segments.clamp(settings.min_circle_segments, settings.max_circle_segments)
    }

    /// Counter-clockwise circle samples in the XY plane of its position
    pub(super) fn circle_points(&self, radius: f64) -> Vec<Point3<f64>> {
        let n = self.circle_segments(radius);
        (0..n)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / n as f64;
                Point3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
            })
            .collect()
    }

    /// IfcCircle: Position (IfcAxis2Placement2D/3D), Radius
    fn convert_circle(&self, entity: &DecodedEntity) -> Result<Curve> {
        let radius = entity
            .get_float(1)
            .ok_or_else(|| Error::geometry(format!("IfcCircle #{} missing Radius", entity.id)))?;
        if radius <= 0.0 {
            return Err(Error::degenerate(format!("IfcCircle #{} has radius {}", entity.id, radius)));
        }

        let position = self.resolve(entity, 0, "Position")?;
        let placement = self.convert_placement(&position)?;
        let points = self
            .circle_points(radius)
            .iter()
            .map(|p| placement.apply(p))
            .collect();
        Ok(Curve::new(points, true))
    }

    /// Convert a loop entity into a wire, consulting the cache first
    ///
    /// Duplicate points are removed. `IfcFaceBound` with a false Orientation
    /// yields the reversed loop.
    pub fn convert_wire(&self, entity: &DecodedEntity) -> Result<Wire> {
        let cached = self.cache.borrow().wire(entity.id);
        if let Some(wire) = cached {
            tracing::trace!(id = entity.id, "Wire cache hit");
            return Ok(wire);
        }

        let mut wire = match entity.ifc_type {
            IfcType::IfcPolyLoop => Wire::new(self.parse_point_list(entity, 0)?),
            IfcType::IfcFaceBound | IfcType::IfcFaceOuterBound => {
                let bound = self.resolve(entity, 0, "Bound")?;
                let wire = self.convert_wire(&bound)?;
                if entity.get_bool(1).unwrap_or(true) {
                    wire
                } else {
                    wire.reversed()
                }
            }
            _ if shape_type(entity) == ShapeType::Curve => self.convert_curve(entity)?.to_wire(),
            _ => {
                return Err(Error::UnsupportedEntity {
                    id: entity.id,
                    ifc_type: entity.ifc_type,
                })
            }
        };

        self.remove_duplicate_points_from_loop(&mut wire);
        self.cache.borrow_mut().store_wire(entity.id, wire.clone());
        Ok(wire)
    }
}
