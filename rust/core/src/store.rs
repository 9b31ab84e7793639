// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity graph access.
//!
//! [`EntitySource`] is the only way the conversion kernel reads the model:
//! lookup by id, reference resolution and the two inverse relations it needs
//! (`IfcRelVoidsElement` by host and `IfcStyledItem` by item).
//!
//! [`EntityStore`] is an in-memory implementation whose inverse indices are
//! maintained on insert.

use crate::entity::{AttributeValue, DecodedEntity};
use crate::error::{Error, Result};
use crate::schema::IfcType;
use rustc_hash::FxHashMap;

/// Read access to a parsed entity graph
pub trait EntitySource {
    /// Decode entity by id
    fn decode_by_id(&self, id: u32) -> Result<DecodedEntity>;

    /// Ids of the `IfcRelVoidsElement` relations whose RelatingBuildingElement
    /// is `host_id`, in the order the relations were defined
    fn voids_of(&self, host_id: u32) -> Vec<u32>;

    /// Id of the `IfcStyledItem` attached to a representation item
    fn style_of(&self, item_id: u32) -> Option<u32>;

    /// Resolve an entity reference attribute
    ///
    /// Null and non-reference values resolve to `None`.
    fn resolve_ref(&self, attr: &AttributeValue) -> Result<Option<DecodedEntity>> {
        match attr.as_entity_ref() {
            Some(id) => Ok(Some(self.decode_by_id(id)?)),
            None => Ok(None),
        }
    }

    /// Resolve a list of entity references, skipping non-reference members
    fn resolve_ref_list(&self, attr: &AttributeValue) -> Result<Vec<DecodedEntity>> {
        let list = attr
            .as_list()
            .ok_or_else(|| Error::invalid("Expected a list of entity references"))?;

        let mut entities = Vec::with_capacity(list.len());
        for item in list {
            if let Some(id) = item.as_entity_ref() {
                entities.push(self.decode_by_id(id)?);
            }
        }
        Ok(entities)
    }
}

impl<T: EntitySource + ?Sized> EntitySource for &T {
    fn decode_by_id(&self, id: u32) -> Result<DecodedEntity> {
        (**self).decode_by_id(id)
    }

    fn voids_of(&self, host_id: u32) -> Vec<u32> {
        (**self).voids_of(host_id)
    }

    fn style_of(&self, item_id: u32) -> Option<u32> {
        (**self).style_of(item_id)
    }
}

/// In-memory entity graph
#[derive(Debug, Default, Clone)]
pub struct EntityStore {
    entities: FxHashMap<u32, DecodedEntity>,
    next_id: u32,
    /// host id -> IfcRelVoidsElement ids
    voids: FxHashMap<u32, Vec<u32>>,
    /// representation item id -> IfcStyledItem id
    styles: FxHashMap<u32, u32>,
}

impl EntityStore {
    /// Create an empty store; ids are assigned from 1
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the store holds no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Add an entity with the next free id
    pub fn add(&mut self, ifc_type: IfcType, attributes: Vec<AttributeValue>) -> u32 {
        let id = self.next_id.max(1);
        self.insert(DecodedEntity::new(id, ifc_type, attributes));
        id
    }

    /// Insert an entity with an explicit id, replacing any previous one
    pub fn insert(&mut self, entity: DecodedEntity) {
        let id = entity.id;
        self.next_id = self.next_id.max(id + 1);
        if let Some(previous) = self.entities.remove(&id) {
            self.unindex(&previous, &entity);
        }

        match entity.ifc_type {
            // IfcRelVoidsElement: 4 RelatingBuildingElement, 5 RelatedOpeningElement
            IfcType::IfcRelVoidsElement => {
                if let (Some(host), Some(_)) = (entity.get_ref(4), entity.get_ref(5)) {
                    let relations = self.voids.entry(host).or_default();
                    if !relations.contains(&id) {
                        relations.push(id);
                    }
                }
            }
            // IfcStyledItem: 0 Item
            IfcType::IfcStyledItem => {
                if let Some(item) = entity.get_ref(0) {
                    self.styles.insert(item, id);
                }
            }
            _ => {}
        }

        self.entities.insert(id, entity);
    }

    /// Drop the inverse index entries of an entity that is being replaced
    ///
    /// A void relation that keeps its host keeps its slot in the host's list.
    fn unindex(&mut self, previous: &DecodedEntity, replacement: &DecodedEntity) {
        match previous.ifc_type {
            IfcType::IfcRelVoidsElement => {
                let Some(host) = previous.get_ref(4) else {
                    return;
                };
                let same_host = replacement.ifc_type == IfcType::IfcRelVoidsElement
                    && replacement.get_ref(4) == Some(host)
                    && replacement.get_ref(5).is_some();
                if same_host {
                    return;
                }
                if let Some(relations) = self.voids.get_mut(&host) {
                    relations.retain(|&r| r != previous.id);
                    if relations.is_empty() {
                        self.voids.remove(&host);
                    }
                }
            }
            IfcType::IfcStyledItem => {
                if let Some(item) = previous.get_ref(0) {
                    if self.styles.get(&item) == Some(&previous.id) {
                        self.styles.remove(&item);
                    }
                }
            }
            _ => {}
        }
    }

    /// Ids of all entities of one type, ascending
    pub fn ids_of_type(&self, ifc_type: IfcType) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .entities
            .values()
            .filter(|e| e.ifc_type == ifc_type)
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Add IfcCartesianPoint
    pub fn add_cartesian_point(&mut self, x: f64, y: f64, z: f64) -> u32 {
        self.add(IfcType::IfcCartesianPoint, vec![AttributeValue::floats(&[x, y, z])])
    }

    /// Add a two-dimensional IfcCartesianPoint
    pub fn add_cartesian_point_2d(&mut self, x: f64, y: f64) -> u32 {
        self.add(IfcType::IfcCartesianPoint, vec![AttributeValue::floats(&[x, y])])
    }

    /// Add IfcDirection
    pub fn add_direction(&mut self, x: f64, y: f64, z: f64) -> u32 {
        self.add(IfcType::IfcDirection, vec![AttributeValue::floats(&[x, y, z])])
    }

    /// Add IfcAxis2Placement3D with default axes
    pub fn add_axis2_placement_3d(&mut self, location: [f64; 3]) -> u32 {
        let point = self.add_cartesian_point(location[0], location[1], location[2]);
        self.add(
            IfcType::IfcAxis2Placement3D,
            vec![
                AttributeValue::EntityRef(point),
                AttributeValue::Null,
                AttributeValue::Null,
            ],
        )
    }

    /// Add IfcLocalPlacement relative to an optional parent placement
    pub fn add_local_placement(&mut self, parent: Option<u32>, location: [f64; 3]) -> u32 {
        let relative = self.add_axis2_placement_3d(location);
        self.add(
            IfcType::IfcLocalPlacement,
            vec![
                parent.map_or(AttributeValue::Null, AttributeValue::EntityRef),
                AttributeValue::EntityRef(relative),
            ],
        )
    }

    /// Add IfcPolyLoop over freshly created points
    pub fn add_poly_loop(&mut self, points: &[[f64; 3]]) -> u32 {
        let ids: Vec<u32> = points
            .iter()
            .map(|p| self.add_cartesian_point(p[0], p[1], p[2]))
            .collect();
        self.add(IfcType::IfcPolyLoop, vec![AttributeValue::refs(&ids)])
    }

    /// Add IfcRelVoidsElement between a host element and an opening
    pub fn add_void_relation(&mut self, host: u32, opening: u32) -> u32 {
        self.add(
            IfcType::IfcRelVoidsElement,
            vec![
                AttributeValue::String(format!("void-{}-{}", host, opening)),
                AttributeValue::Null,
                AttributeValue::Null,
                AttributeValue::Null,
                AttributeValue::EntityRef(host),
                AttributeValue::EntityRef(opening),
            ],
        )
    }

    /// Add IfcFace with a single IfcFaceOuterBound over `points`
    pub fn add_face(&mut self, points: &[[f64; 3]]) -> u32 {
        let poly_loop = self.add_poly_loop(points);
        let bound = self.add(
            IfcType::IfcFaceOuterBound,
            vec![AttributeValue::EntityRef(poly_loop), AttributeValue::boolean(true)],
        );
        self.add(IfcType::IfcFace, vec![AttributeValue::refs(&[bound])])
    }

    /// Add IfcFacetedBrep over an IfcClosedShell of polygonal faces
    pub fn add_faceted_brep(&mut self, faces: &[Vec<[f64; 3]>]) -> u32 {
        let face_ids: Vec<u32> = faces.iter().map(|f| self.add_face(f)).collect();
        let shell = self.add(IfcType::IfcClosedShell, vec![AttributeValue::refs(&face_ids)]);
        self.add(IfcType::IfcFacetedBrep, vec![AttributeValue::EntityRef(shell)])
    }

    /// Add an axis-aligned box as IfcFacetedBrep with outward faces
    pub fn add_box_brep(&mut self, min: [f64; 3], max: [f64; 3]) -> u32 {
        let p = |x: usize, y: usize, z: usize| {
            [
                if x == 0 { min[0] } else { max[0] },
                if y == 0 { min[1] } else { max[1] },
                if z == 0 { min[2] } else { max[2] },
            ]
        };
        let faces = vec![
            vec![p(0, 0, 0), p(0, 1, 0), p(1, 1, 0), p(1, 0, 0)],
            vec![p(0, 0, 1), p(1, 0, 1), p(1, 1, 1), p(0, 1, 1)],
            vec![p(0, 0, 0), p(1, 0, 0), p(1, 0, 1), p(0, 0, 1)],
            vec![p(1, 0, 0), p(1, 1, 0), p(1, 1, 1), p(1, 0, 1)],
            vec![p(1, 1, 0), p(0, 1, 0), p(0, 1, 1), p(1, 1, 1)],
            vec![p(0, 1, 0), p(0, 0, 0), p(0, 0, 1), p(0, 1, 1)],
        ];
        self.add_faceted_brep(&faces)
    }

    /// Add IfcExtrudedAreaSolid of a centred IfcRectangleProfileDef, extruded
    /// along +Z from `location`
    pub fn add_rectangle_extrusion(&mut self, x_dim: f64, y_dim: f64, depth: f64, location: [f64; 3]) -> u32 {
        let profile = self.add(
            IfcType::IfcRectangleProfileDef,
            vec![
                AttributeValue::Enum("AREA".to_string()),
                AttributeValue::Null,
                AttributeValue::Null,
                AttributeValue::Float(x_dim),
                AttributeValue::Float(y_dim),
            ],
        );
        let position = self.add_axis2_placement_3d(location);
        let direction = self.add_direction(0.0, 0.0, 1.0);
        self.add(
            IfcType::IfcExtrudedAreaSolid,
            vec![
                AttributeValue::EntityRef(profile),
                AttributeValue::EntityRef(position),
                AttributeValue::EntityRef(direction),
                AttributeValue::Float(depth),
            ],
        )
    }

    /// Add IfcShapeRepresentation with the given identifier
    pub fn add_shape_representation(&mut self, identifier: &str, items: &[u32]) -> u32 {
        self.add(
            IfcType::IfcShapeRepresentation,
            vec![
                AttributeValue::Null,
                AttributeValue::String(identifier.to_string()),
                AttributeValue::String("Brep".to_string()),
                AttributeValue::refs(items),
            ],
        )
    }

    /// Add IfcProductDefinitionShape with one Body representation of `items`
    pub fn add_body_representation(&mut self, items: &[u32]) -> u32 {
        let representation = self.add_shape_representation("Body", items);
        self.add(
            IfcType::IfcProductDefinitionShape,
            vec![
                AttributeValue::Null,
                AttributeValue::Null,
                AttributeValue::refs(&[representation]),
            ],
        )
    }

    /// Add a product (wall, opening, ...) with placement and representation
    pub fn add_product(&mut self, ifc_type: IfcType, placement: Option<u32>, representation: Option<u32>) -> u32 {
        let global_id = format!("product-{}", self.next_id);
        self.add(
            ifc_type,
            vec![
                AttributeValue::String(global_id),
                AttributeValue::Null,
                AttributeValue::Null,
                AttributeValue::Null,
                AttributeValue::Null,
                placement.map_or(AttributeValue::Null, AttributeValue::EntityRef),
                representation.map_or(AttributeValue::Null, AttributeValue::EntityRef),
                AttributeValue::Null,
            ],
        )
    }

    /// Add IfcStyledItem giving `item` an IfcSurfaceStyleRendering colour
    pub fn add_surface_colour(&mut self, item: u32, rgb: [f64; 3], transparency: f64) -> u32 {
        let colour = self.add(
            IfcType::IfcColourRgb,
            vec![
                AttributeValue::Null,
                AttributeValue::Float(rgb[0]),
                AttributeValue::Float(rgb[1]),
                AttributeValue::Float(rgb[2]),
            ],
        );
        let rendering = self.add(
            IfcType::IfcSurfaceStyleRendering,
            vec![AttributeValue::EntityRef(colour), AttributeValue::Float(transparency)],
        );
        let style = self.add(
            IfcType::IfcSurfaceStyle,
            vec![
                AttributeValue::String("Surface".to_string()),
                AttributeValue::Enum("BOTH".to_string()),
                AttributeValue::refs(&[rendering]),
            ],
        );
        self.add(
            IfcType::IfcStyledItem,
            vec![
                AttributeValue::EntityRef(item),
                AttributeValue::refs(&[style]),
                AttributeValue::Null,
            ],
        )
    }
}

impl EntitySource for EntityStore {
    fn decode_by_id(&self, id: u32) -> Result<DecodedEntity> {
        self.entities
            .get(&id)
            .cloned()
            .ok_or(Error::EntityNotFound(id))
    }

    fn voids_of(&self, host_id: u32) -> Vec<u32> {
        self.voids.get(&host_id).cloned().unwrap_or_default()
    }

    fn style_of(&self, item_id: u32) -> Option<u32> {
        self.styles.get(&item_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_decode() {
        let mut store = EntityStore::new();
        let p = store.add_cartesian_point(1.0, 2.0, 3.0);
        let entity = store.decode_by_id(p).unwrap();
        assert_eq!(entity.id, p);
        assert_eq!(entity.ifc_type, IfcType::IfcCartesianPoint);
        assert_eq!(store.decode_by_id(999), Err(Error::EntityNotFound(999)));
    }

    #[test]
    fn test_resolve_ref_and_list() {
        let mut store = EntityStore::new();
        let loop_id = store.add_poly_loop(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]);
        let poly_loop = store.decode_by_id(loop_id).unwrap();

        let points = store.resolve_ref_list(poly_loop.get(0).unwrap()).unwrap();
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| p.ifc_type == IfcType::IfcCartesianPoint));

        assert_eq!(store.resolve_ref(&AttributeValue::Null).unwrap(), None);
        assert!(store.resolve_ref_list(&AttributeValue::Float(1.0)).is_err());
    }

    #[test]
    fn test_void_index_keeps_relation_order() {
        let mut store = EntityStore::new();
        let host = store.add(IfcType::IfcWall, vec![]);
        let a = store.add(IfcType::IfcOpeningElement, vec![]);
        let b = store.add(IfcType::IfcOpeningElement, vec![]);
        let rel_b = store.add_void_relation(host, b);
        let rel_a = store.add_void_relation(host, a);

        assert_eq!(store.voids_of(host), vec![rel_b, rel_a]);
        assert!(store.voids_of(a).is_empty());
    }

    #[test]
    fn test_reinserting_relation_does_not_duplicate_it() {
        let mut store = EntityStore::new();
        let host = store.add(IfcType::IfcWall, vec![]);
        let other = store.add(IfcType::IfcWall, vec![]);
        let opening = store.add(IfcType::IfcOpeningElement, vec![]);
        let first = store.add_void_relation(host, opening);
        let second = store.add_void_relation(host, opening);

        let unchanged = store.decode_by_id(first).unwrap();
        store.insert(unchanged);
        assert_eq!(store.voids_of(host), vec![first, second]);

        // Moving the relation to another host leaves no stale entry
        let mut moved = store.decode_by_id(first).unwrap();
        moved.attributes[4] = AttributeValue::EntityRef(other);
        store.insert(moved);
        assert_eq!(store.voids_of(host), vec![second]);
        assert_eq!(store.voids_of(other), vec![first]);

        store.insert(DecodedEntity::new(second, IfcType::IfcWall, vec![]));
        assert!(store.voids_of(host).is_empty());
    }

    #[test]
    fn test_replacing_styled_item_moves_style() {
        let mut store = EntityStore::new();
        let a = store.add(IfcType::IfcFacetedBrep, vec![AttributeValue::Null]);
        let b = store.add(IfcType::IfcFacetedBrep, vec![AttributeValue::Null]);
        let styled = store.add(
            IfcType::IfcStyledItem,
            vec![AttributeValue::EntityRef(a), AttributeValue::refs(&[]), AttributeValue::Null],
        );
        store.insert(DecodedEntity::new(
            styled,
            IfcType::IfcStyledItem,
            vec![AttributeValue::EntityRef(b), AttributeValue::refs(&[]), AttributeValue::Null],
        ));
        assert_eq!(store.style_of(a), None);
        assert_eq!(store.style_of(b), Some(styled));
    }

    #[test]
    fn test_style_index() {
        let mut store = EntityStore::new();
        let item = store.add(IfcType::IfcFacetedBrep, vec![AttributeValue::Null]);
        let styled = store.add(
            IfcType::IfcStyledItem,
            vec![AttributeValue::EntityRef(item), AttributeValue::refs(&[]), AttributeValue::Null],
        );
        assert_eq!(store.style_of(item), Some(styled));
        assert_eq!(store.style_of(styled), None);
    }

    #[test]
    fn test_box_brep_structure() {
        let mut store = EntityStore::new();
        let brep = store.add_box_brep([0.0; 3], [1.0; 3]);
        let entity = store.decode_by_id(brep).unwrap();
        let shell = store.resolve_ref(entity.get(0).unwrap()).unwrap().unwrap();
        assert_eq!(shell.ifc_type, IfcType::IfcClosedShell);
        assert_eq!(shell.get_refs(0).len(), 6);
    }

    #[test]
    fn test_product_attributes() {
        let mut store = EntityStore::new();
        let placement = store.add_local_placement(None, [1.0, 2.0, 3.0]);
        let item = store.add_rectangle_extrusion(1.0, 1.0, 1.0, [0.0; 3]);
        let shape = store.add_body_representation(&[item]);
        let wall = store.add_product(IfcType::IfcWall, Some(placement), Some(shape));

        let entity = store.decode_by_id(wall).unwrap();
        assert_eq!(entity.get_ref(5), Some(placement));
        assert_eq!(entity.get_ref(6), Some(shape));
    }

    #[test]
    fn test_explicit_ids_advance_counter() {
        let mut store = EntityStore::new();
        store.insert(DecodedEntity::new(41, IfcType::IfcWall, vec![]));
        let next = store.add(IfcType::IfcSlab, vec![]);
        assert_eq!(next, 42);
        assert_eq!(store.ids_of_type(IfcType::IfcWall), vec![41]);
    }
}
