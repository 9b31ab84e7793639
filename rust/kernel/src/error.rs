// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ifc_brep_core::IfcType;
use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting entities to solids
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Unsupported entity #{id} of type {ifc_type}")]
    UnsupportedEntity { id: u32, ifc_type: IfcType },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Loop is not planar (deviation {deviation:.3e})")]
    NonPlanar { deviation: f64 },

    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Boolean operation failed: {0}")]
    BooleanFailure(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Entity graph error: {0}")]
    CoreError(#[from] ifc_brep_core::Error),
}

impl Error {
    /// Create a geometry error for missing or malformed attributes
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Create a degenerate geometry error
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateGeometry(msg.into())
    }
}
