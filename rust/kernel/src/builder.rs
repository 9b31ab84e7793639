// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Incremental boundary mesh construction from faces.

use crate::containers::Face;
use crate::shape::Shape;

/// Builds a [`Shape`] from an ordered face list
///
/// Vertex identity is local to one [`MeshBuilder::build`] call: every point of
/// every outer loop gets a new vertex id, even when an earlier face already
/// produced a vertex at the same coordinates. Inner loops are not emitted;
/// faces with holes must be triangulated first (see [`Face::triangulate`]).
/// The result is not checked for closure or manifoldness.
#[derive(Debug, Clone, Default)]
pub struct MeshBuilder {
    faces: Vec<Face>,
}

impl MeshBuilder {
    pub fn new(faces: Vec<Face>) -> Self {
        Self { faces }
    }

    /// Queue one more face
    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    pub fn build(&self) -> Shape {
        let vertex_count = self.faces.iter().map(|f| f.outer.len()).sum();
        let mut vertices = Vec::with_capacity(vertex_count);
        let mut facets = Vec::with_capacity(self.faces.len());

        for face in &self.faces {
            let mut facet = Vec::with_capacity(face.outer.len());
            for point in &face.outer.points {
                facet.push(vertices.len() as u32);
                vertices.push(*point);
            }
            facets.push(facet);
        }

        Shape::new(vertices, facets)
    }
}
