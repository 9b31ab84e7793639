// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-BRep Kernel
//!
//! Converts IFC geometric entities into boundary-represented solids and
//! subtracts opening elements from their host products.
//!
//! - [`Kernel`]: classification, dispatch and per-entity memoization
//! - [`Wire`], [`Face`], [`Curve`]: intermediate containers
//! - [`Shape`] and [`ConversionResults`]: conversion output
//! - [`NefPolyhedron`]: boolean-capable solids backed by `csgrs`
//!
//! ## Quick Start
//!
//! ```rust
//! use ifc_brep_core::{EntitySource, EntityStore};
//! use ifc_brep_kernel::Kernel;
//!
//! let mut store = EntityStore::new();
//! let brep = store.add_box_brep([0.0; 3], [2.0, 2.0, 2.0]);
//!
//! let kernel = Kernel::new(&store);
//! let entity = store.decode_by_id(brep).unwrap();
//! let results = kernel.convert_shapes(&entity).unwrap();
//! assert!((results.total_volume() - 8.0).abs() < 1e-9);
//! ```

pub mod batch;
pub mod builder;
pub mod cache;
pub mod containers;
pub mod error;
pub mod kernel;
pub mod loops;
pub mod nef;
pub mod placement;
pub mod results;
pub mod settings;
pub mod shape;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use batch::convert_products_parallel;
pub use builder::MeshBuilder;
pub use cache::{CacheEntry, CacheKind, ConversionCache};
pub use containers::{Curve, Face, Wire};
pub use error::{Error, Result};
pub use kernel::{shape_type, Kernel, ShapeType};
pub use loops::remove_duplicate_points_from_loop;
pub use nef::{
    create_nef_polyhedron, create_nef_polyhedron_from_shape, create_polyhedron,
    create_polyhedron_from_nef, NefPolyhedron,
};
pub use placement::Placement;
pub use results::{ConversionResult, ConversionResults, SurfaceStyle};
pub use settings::KernelSettings;
pub use shape::Shape;
