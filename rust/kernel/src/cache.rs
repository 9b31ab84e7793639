// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-entity memoization of converted geometry.
//!
//! One map per geometric kind, keyed by entity id. Entries live until
//! [`ConversionCache::purge`]; there is no partial eviction.

use crate::containers::{Curve, Face, Wire};
use crate::results::ConversionResults;
use rustc_hash::FxHashMap;

/// Geometric kind of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Wire,
    Face,
    Curve,
    Shape,
}

/// Cached value of one kind
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry {
    Wire(Wire),
    Face(Face),
    Curve(Curve),
    Shape(ConversionResults),
}

impl CacheEntry {
    pub fn kind(&self) -> CacheKind {
        match self {
            CacheEntry::Wire(_) => CacheKind::Wire,
            CacheEntry::Face(_) => CacheKind::Face,
            CacheEntry::Curve(_) => CacheKind::Curve,
            CacheEntry::Shape(_) => CacheKind::Shape,
        }
    }
}

#[derive(Debug, Default)]
pub struct ConversionCache {
    wires: FxHashMap<u32, Wire>,
    faces: FxHashMap<u32, Face>,
    curves: FxHashMap<u32, Curve>,
    shapes: FxHashMap<u32, ConversionResults>,
}

impl ConversionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `(kind, id)`, `None` when not yet computed
    pub fn lookup(&self, kind: CacheKind, id: u32) -> Option<CacheEntry> {
        match kind {
            CacheKind::Wire => self.wire(id).map(CacheEntry::Wire),
            CacheKind::Face => self.face(id).map(CacheEntry::Face),
            CacheKind::Curve => self.curve(id).map(CacheEntry::Curve),
            CacheKind::Shape => self.shape(id).map(CacheEntry::Shape),
        }
    }

    /// Store a value under its own kind, replacing an earlier one
    pub fn store(&mut self, id: u32, entry: CacheEntry) {
        match entry {
            CacheEntry::Wire(w) => self.store_wire(id, w),
            CacheEntry::Face(f) => self.store_face(id, f),
            CacheEntry::Curve(c) => self.store_curve(id, c),
            CacheEntry::Shape(s) => self.store_shape(id, s),
        }
    }

    /// Drop every entry; returns how many were dropped
    pub fn purge(&mut self) -> usize {
        let dropped = self.len();
        self.wires.clear();
        self.faces.clear();
        self.curves.clear();
        self.shapes.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.wires.len() + self.faces.len() + self.curves.len() + self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn wire(&self, id: u32) -> Option<Wire> {
        self.wires.get(&id).cloned()
    }

    pub fn face(&self, id: u32) -> Option<Face> {
        self.faces.get(&id).cloned()
    }

    pub fn curve(&self, id: u32) -> Option<Curve> {
        self.curves.get(&id).cloned()
    }

    pub fn shape(&self, id: u32) -> Option<ConversionResults> {
        self.shapes.get(&id).cloned()
    }

    pub fn store_wire(&mut self, id: u32, wire: Wire) {
        self.wires.insert(id, wire);
    }

    pub fn store_face(&mut self, id: u32, face: Face) {
        self.faces.insert(id, face);
    }

    pub fn store_curve(&mut self, id: u32, curve: Curve) {
        self.curves.insert(id, curve);
    }

    pub fn store_shape(&mut self, id: u32, shape: ConversionResults) {
        self.shapes.insert(id, shape);
    }
}
