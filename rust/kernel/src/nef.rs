// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boolean-capable polyhedral sets backed by the csgrs BSP kernel, and the
//! explicit conversions between them and boundary meshes.

use crate::builder::MeshBuilder;
use crate::containers::Face;
use crate::loops::remove_collinear_points;
use crate::shape::{weld_points, Shape};
use crate::triangulation::{is_convex, newell_vector, project_to_2d, triangulate_polygon};
use crate::{Error, Point3, Result, Vector3};
use csgrs::mesh::{polygon::Polygon, vertex::Vertex, Mesh as CSGMesh};
use csgrs::traits::CSG;
use smallvec::SmallVec;

/// Solid that supports union, intersection and difference
#[derive(Debug, Clone)]
pub struct NefPolyhedron {
    mesh: CSGMesh<()>,
}

impl NefPolyhedron {
    pub fn empty() -> Self {
        Self {
            mesh: CSGMesh::from_polygons(&[], None),
        }
    }

    /// Convert a boundary mesh; facets must wind counter-clockwise seen from
    /// outside
    ///
    /// Non-convex facets are triangulated, degenerate facets are dropped.
    pub fn from_shape(shape: &Shape, tolerance: f64) -> Result<Self> {
        let mut polygons = Vec::with_capacity(shape.facet_count());

        for index in 0..shape.facet_count() {
            let points = remove_collinear_points(&shape.facet_points(index), tolerance);
            if points.len() < 3 {
                continue;
            }

            let normal = match newell_vector(&points).try_normalize(1e-12) {
                Some(n) => n,
                None => continue,
            };

            let (points_2d, _, _, _) = project_to_2d(&points, &normal);
            if is_convex(&points_2d) {
                polygons.push(make_polygon(&points, &normal));
                continue;
            }

            let indices = triangulate_polygon(&points_2d)?;
            for tri in indices.chunks_exact(3) {
                let triangle = [points[tri[0]], points[tri[1]], points[tri[2]]];
                polygons.push(make_polygon(&triangle, &normal));
            }
        }

        if polygons.is_empty() {
            return Err(Error::degenerate("Shape has no valid facets"));
        }

        Ok(Self {
            mesh: CSGMesh::from_polygons(&polygons, None),
        })
    }

    /// Convert back to a boundary mesh
    ///
    /// Vertices closer than `weld_tolerance` are merged and T-junctions left
    /// by polygon splitting are stitched, so the result of a boolean between
    /// closed solids is itself closed.
    pub fn to_shape(&self, weld_tolerance: f64) -> Shape {
        let mut positions = Vec::new();
        let mut cycles: Vec<(usize, usize)> = Vec::with_capacity(self.mesh.polygons.len());

        for polygon in &self.mesh.polygons {
            if polygon.vertices.len() < 3 {
                continue;
            }
            let start = positions.len();
            positions.extend(
                polygon
                    .vertices
                    .iter()
                    .map(|v| Point3::new(v.pos[0], v.pos[1], v.pos[2])),
            );
            cycles.push((start, positions.len()));
        }

        let (vertices, remap) = weld_points(&positions, weld_tolerance);

        let mut facets: Vec<Vec<u32>> = Vec::with_capacity(cycles.len());
        for (start, end) in cycles {
            let mut facet: Vec<u32> = Vec::with_capacity(end - start);
            for &id in &remap[start..end] {
                if facet.last() != Some(&id) {
                    facet.push(id);
                }
            }
            while facet.len() > 1 && facet.first() == facet.last() {
                facet.pop();
            }
            if facet.len() < 3 {
                continue;
            }
            let points: Vec<Point3<f64>> = facet.iter().map(|&v| vertices[v as usize]).collect();
            if remove_collinear_points(&points, weld_tolerance).len() < 3 {
                continue;
            }
            facets.push(facet);
        }

        stitch_t_junctions(&vertices, &mut facets, weld_tolerance);
        Shape::new(vertices, facets)
    }

    pub fn polygon_count(&self) -> usize {
        self.mesh.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.polygons.is_empty()
    }

    pub fn difference(&self, other: &NefPolyhedron) -> NefPolyhedron {
        Self {
            mesh: self.mesh.difference(&other.mesh),
        }
    }

    pub fn union(&self, other: &NefPolyhedron) -> NefPolyhedron {
        Self {
            mesh: self.mesh.union(&other.mesh),
        }
    }

    pub fn intersection(&self, other: &NefPolyhedron) -> NefPolyhedron {
        Self {
            mesh: self.mesh.intersection(&other.mesh),
        }
    }
}

fn make_polygon(points: &[Point3<f64>], normal: &Vector3<f64>) -> Polygon<()> {
    let vertices = points.iter().map(|p| Vertex::new(*p, *normal)).collect();
    Polygon::new(vertices, None)
}

/// Insert vertices that lie strictly inside a facet edge into that edge
fn stitch_t_junctions(vertices: &[Point3<f64>], facets: &mut [Vec<u32>], tolerance: f64) {
    let tolerance = tolerance.max(1e-12);

    for facet in facets.iter_mut() {
        let n = facet.len();
        let mut stitched: Vec<u32> = Vec::with_capacity(n);

        for i in 0..n {
            let a = facet[i];
            let b = facet[(i + 1) % n];
            stitched.push(a);

            let pa = vertices[a as usize];
            let pb = vertices[b as usize];
            let edge = pb - pa;
            let length = edge.norm();
            if length <= tolerance {
                continue;
            }
            let min = pa.inf(&pb);
            let max = pa.sup(&pb);

            let mut on_edge: SmallVec<[(f64, u32); 4]> = SmallVec::new();
            for (v, p) in vertices.iter().enumerate() {
                let v = v as u32;
                if v == a || v == b {
                    continue;
                }
                if p.x < min.x - tolerance
                    || p.y < min.y - tolerance
                    || p.z < min.z - tolerance
                    || p.x > max.x + tolerance
                    || p.y > max.y + tolerance
                    || p.z > max.z + tolerance
                {
                    continue;
                }
                let offset = p - pa;
                let along = offset.dot(&edge) / length;
                if along <= tolerance || along >= length - tolerance {
                    continue;
                }
                let distance = (offset - edge * (along / length)).norm();
                if distance <= tolerance {
                    on_edge.push((along, v));
                }
            }

            on_edge.sort_by(|x, y| x.0.total_cmp(&y.0));
            stitched.extend(on_edge.iter().map(|&(_, v)| v));
        }

        *facet = stitched;
    }
}

/// Boundary mesh from faces; faces with holes are triangulated first
pub fn create_polyhedron(faces: &[Face]) -> Result<Shape> {
    let mut builder = MeshBuilder::default();
    for face in faces {
        for piece in face.triangulate()? {
            builder.add_face(piece);
        }
    }
    Ok(builder.build())
}

/// Boundary mesh from a polyhedral set
pub fn create_polyhedron_from_nef(nef: &NefPolyhedron, weld_tolerance: f64) -> Shape {
    nef.to_shape(weld_tolerance)
}

/// Polyhedral set from faces
pub fn create_nef_polyhedron(faces: &[Face], tolerance: f64) -> Result<NefPolyhedron> {
    NefPolyhedron::from_shape(&create_polyhedron(faces)?, tolerance)
}

/// Polyhedral set from a boundary mesh
pub fn create_nef_polyhedron_from_shape(shape: &Shape, tolerance: f64) -> Result<NefPolyhedron> {
    NefPolyhedron::from_shape(shape, tolerance)
}
