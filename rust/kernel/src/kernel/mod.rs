// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion kernel: classifies entities and dispatches them to the curve,
//! wire, face and shape converters, memoizing every result per entity id.
//!
//! A [`Kernel`] is single-threaded. Its cache lives in a `RefCell`, so all
//! conversion methods take `&self`; run one kernel per worker thread for
//! parallel batches (see [`crate::convert_products_parallel`]).

mod composites;
mod curves;
mod faces;
mod openings;
mod placements;
mod solids;
mod styles;

#[cfg(test)]
mod tests;

use crate::cache::{CacheEntry, CacheKind, ConversionCache};
use crate::containers::{Face, Wire};
use crate::results::{ConversionResult, ConversionResults};
use crate::settings::KernelSettings;
use crate::shape::Shape;
use crate::nef::create_polyhedron;
use crate::{Error, Result};
use ifc_brep_core::{DecodedEntity, EntitySource, IfcType};
use std::cell::{Cell, RefCell};

/// Nesting limit for recursive shape conversion (booleans, mapped items)
const MAX_SHAPE_DEPTH: usize = 64;

/// Conversion path selected for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    /// Sampled into a [`crate::Curve`]
    Curve,
    /// Point loop, converted to a [`Wire`]
    Wire,
    /// Planar face or profile, converted to a [`Face`]
    Face,
    /// Single solid item
    Solid,
    /// Container of several items (representations, products, surface models)
    Composite,
    /// Not supported; skipped by composite callers
    Unknown,
}

/// Classify an entity into its conversion path
pub fn shape_type(entity: &DecodedEntity) -> ShapeType {
    match entity.ifc_type {
        IfcType::IfcPolyline | IfcType::IfcCircle | IfcType::IfcIndexedPolyCurve => {
            ShapeType::Curve
        }

        IfcType::IfcPolyLoop | IfcType::IfcFaceBound | IfcType::IfcFaceOuterBound => {
            ShapeType::Wire
        }

        IfcType::IfcFace
        | IfcType::IfcArbitraryClosedProfileDef
        | IfcType::IfcArbitraryProfileDefWithVoids
        | IfcType::IfcRectangleProfileDef
        | IfcType::IfcCircleProfileDef => ShapeType::Face,

        IfcType::IfcFacetedBrep
        | IfcType::IfcClosedShell
        | IfcType::IfcOpenShell
        | IfcType::IfcExtrudedAreaSolid
        | IfcType::IfcBooleanResult
        | IfcType::IfcBooleanClippingResult => ShapeType::Solid,

        IfcType::IfcShapeRepresentation
        | IfcType::IfcProductDefinitionShape
        | IfcType::IfcMappedItem
        | IfcType::IfcShellBasedSurfaceModel
        | IfcType::IfcFaceBasedSurfaceModel
        | IfcType::IfcConnectedFaceSet => ShapeType::Composite,

        ty if ty.is_product() => ShapeType::Composite,

        _ => ShapeType::Unknown,
    }
}

/// Entity-to-solid converter with a per-instance conversion cache
pub struct Kernel<'s> {
    source: &'s dyn EntitySource,
    settings: KernelSettings,
    cache: RefCell<ConversionCache>,
    depth: Cell<usize>,
}

/// Decrements the nesting depth when a shape conversion returns
struct DepthGuard<'a>(&'a Cell<usize>);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

impl<'s> Kernel<'s> {
    /// Create a kernel with default settings
    pub fn new(source: &'s dyn EntitySource) -> Self {
        Self::with_settings(source, KernelSettings::default())
    }

    pub fn with_settings(source: &'s dyn EntitySource, settings: KernelSettings) -> Self {
        Self {
            source,
            settings,
            cache: RefCell::new(ConversionCache::new()),
            depth: Cell::new(0),
        }
    }

    pub fn settings(&self) -> &KernelSettings {
        &self.settings
    }

    pub fn source(&self) -> &'s dyn EntitySource {
        self.source
    }

    /// Classify an entity into its conversion path
    pub fn shape_type(&self, entity: &DecodedEntity) -> ShapeType {
        shape_type(entity)
    }

    /// Drop every cached conversion
    ///
    /// Results already returned are unaffected. Must not be called while a
    /// conversion is running.
    pub fn purge_cache(&self) {
        let dropped = self.cache.borrow_mut().purge();
        tracing::debug!(dropped, "Purged conversion cache");
    }

    /// Cached value for `(kind, id)` without converting anything
    pub fn cached(&self, kind: CacheKind, id: u32) -> Option<CacheEntry> {
        self.cache.borrow().lookup(kind, id)
    }

    /// Number of cached entries of all kinds
    pub fn cache_len(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Convert any supported entity into shapes
    ///
    /// This is the primary entry point. Products come back in world
    /// coordinates with their openings cut; representation items come back
    /// in their own frame.
    pub fn convert_shapes(&self, entity: &DecodedEntity) -> Result<ConversionResults> {
        match shape_type(entity) {
            ShapeType::Unknown => {
                tracing::warn!(id = entity.id, ifc_type = %entity.ifc_type, "Skipping unsupported entity");
                Err(Error::UnsupportedEntity {
                    id: entity.id,
                    ifc_type: entity.ifc_type,
                })
            }
            _ => self.convert_shape(entity),
        }
    }

    /// Convert by id, see [`Kernel::convert_shapes`]
    pub fn convert_shapes_by_id(&self, id: u32) -> Result<ConversionResults> {
        let entity = self.source.decode_by_id(id)?;
        self.convert_shapes(&entity)
    }

    /// Convert a solid or composite entity, consulting the cache first
    ///
    /// Faces and wires yield single-sheet surface shapes. Failed conversions
    /// are not cached and are recomputed on the next request.
    pub fn convert_shape(&self, entity: &DecodedEntity) -> Result<ConversionResults> {
        let cached = self.cache.borrow().shape(entity.id);
        if let Some(results) = cached {
            tracing::trace!(id = entity.id, "Shape cache hit");
            return Ok(results);
        }

        let _guard = self.enter(entity)?;
        let results = match shape_type(entity) {
            ShapeType::Solid => self.convert_solid(entity)?,
            ShapeType::Composite => self.convert_composite(entity)?,
            ShapeType::Face => {
                let face = self.convert_face(entity)?;
                self.surface_result(entity, &[face])?
            }
            ShapeType::Wire => {
                let face = self.convert_wire_to_face(&self.convert_wire(entity)?)?;
                self.surface_result(entity, &[face])?
            }
            ShapeType::Curve => {
                return Err(Error::geometry(format!(
                    "{} #{} is a curve and bounds no surface",
                    entity.ifc_type, entity.id
                )))
            }
            ShapeType::Unknown => {
                return Err(Error::UnsupportedEntity {
                    id: entity.id,
                    ifc_type: entity.ifc_type,
                })
            }
        };

        self.cache.borrow_mut().store_shape(entity.id, results.clone());
        Ok(results)
    }

    /// Track recursion depth so cyclic or absurdly nested graphs fail cleanly
    fn enter(&self, entity: &DecodedEntity) -> Result<DepthGuard<'_>> {
        let depth = self.depth.get() + 1;
        if depth > MAX_SHAPE_DEPTH {
            return Err(Error::geometry(format!(
                "Nesting depth {} exceeded at {} #{}",
                MAX_SHAPE_DEPTH, entity.ifc_type, entity.id
            )));
        }
        self.depth.set(depth);
        Ok(DepthGuard(&self.depth))
    }

    /// One open surface result built from faces
    fn surface_result(&self, entity: &DecodedEntity, faces: &[Face]) -> Result<ConversionResults> {
        let shape = create_polyhedron(faces)?;
        Ok(self.single_result(entity, shape))
    }

    /// Wrap a shape produced from `entity`, attaching its style
    fn single_result(&self, entity: &DecodedEntity, shape: Shape) -> ConversionResults {
        let mut results = ConversionResults::new();
        results.push(ConversionResult::new(entity.id, shape).with_style(self.style_for(entity.id)));
        results
    }

    /// Resolve a required reference attribute
    fn resolve(&self, entity: &DecodedEntity, index: usize, name: &str) -> Result<DecodedEntity> {
        let attr = entity.get(index).ok_or_else(|| {
            Error::geometry(format!("{} #{} missing {}", entity.ifc_type, entity.id, name))
        })?;
        self.source.resolve_ref(attr)?.ok_or_else(|| {
            Error::geometry(format!(
                "{} #{}: {} is not an entity reference",
                entity.ifc_type, entity.id, name
            ))
        })
    }

    /// Resolve an optional reference attribute
    fn resolve_optional(&self, entity: &DecodedEntity, index: usize) -> Result<Option<DecodedEntity>> {
        match entity.get(index) {
            Some(attr) => Ok(self.source.resolve_ref(attr)?),
            None => Ok(None),
        }
    }

    /// Resolve a required list of references
    fn resolve_list(&self, entity: &DecodedEntity, index: usize, name: &str) -> Result<Vec<DecodedEntity>> {
        let attr = entity.get(index).ok_or_else(|| {
            Error::geometry(format!("{} #{} missing {}", entity.ifc_type, entity.id, name))
        })?;
        Ok(self.source.resolve_ref_list(attr)?)
    }

    /// Clean a loop in place with the kernel's precision
    pub fn remove_duplicate_points_from_loop(&self, wire: &mut Wire) {
        crate::loops::remove_duplicate_points_from_loop(wire, self.settings.precision);
    }
}
