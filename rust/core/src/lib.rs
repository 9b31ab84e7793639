// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-BRep Core
//!
//! The entity graph boundary consumed by the B-rep conversion kernel.
//!
//! Parsing STEP files is not part of this crate. Instead it defines the
//! opaque entity API the kernel works against:
//!
//! - [`IfcType`]: closed set of the IFC types the kernel understands
//! - [`AttributeValue`] / [`DecodedEntity`]: positional STEP attributes
//! - [`EntitySource`]: id lookup, reference resolution and the two inverse
//!   relations the kernel needs (voids and styled items)
//! - [`EntityStore`]: an in-memory [`EntitySource`] that can be filled
//!   programmatically
//!
//! ## Quick Start
//!
//! ```rust
//! use ifc_brep_core::{AttributeValue, EntitySource, EntityStore, IfcType};
//!
//! let mut store = EntityStore::new();
//! let point = store.add_cartesian_point(1.0, 2.0, 3.0);
//! let entity = store.decode_by_id(point).unwrap();
//! assert_eq!(entity.ifc_type, IfcType::IfcCartesianPoint);
//! assert!(matches!(entity.get(0), Some(AttributeValue::List(_))));
//! ```

pub mod entity;
pub mod error;
pub mod schema;
pub mod store;

pub use entity::{AttributeValue, DecodedEntity};
pub use error::{Error, Result};
pub use schema::IfcType;
pub use store::{EntitySource, EntityStore};
