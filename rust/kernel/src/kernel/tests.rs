// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;
use crate::Point3;
use approx::assert_relative_eq;
use ifc_brep_core::{AttributeValue, EntityStore};

fn decode(store: &EntityStore, id: u32) -> DecodedEntity {
    store.decode_by_id(id).unwrap()
}

fn box_faces(min: [f64; 3], max: [f64; 3]) -> Vec<Vec<[f64; 3]>> {
    let p = |x: usize, y: usize, z: usize| {
        [
            if x == 0 { min[0] } else { max[0] },
            if y == 0 { min[1] } else { max[1] },
            if z == 0 { min[2] } else { max[2] },
        ]
    };
    vec![
        vec![p(0, 0, 0), p(0, 1, 0), p(1, 1, 0), p(1, 0, 0)],
        vec![p(0, 0, 1), p(1, 0, 1), p(1, 1, 1), p(0, 1, 1)],
        vec![p(0, 0, 0), p(1, 0, 0), p(1, 0, 1), p(0, 0, 1)],
        vec![p(1, 0, 0), p(1, 1, 0), p(1, 1, 1), p(1, 0, 1)],
        vec![p(1, 1, 0), p(0, 1, 0), p(0, 1, 1), p(1, 1, 1)],
        vec![p(0, 1, 0), p(0, 0, 0), p(0, 0, 1), p(0, 1, 1)],
    ]
}

fn boolean(store: &mut EntityStore, ty: IfcType, operator: &str, first: u32, second: u32) -> u32 {
    store.add(
        ty,
        vec![
            AttributeValue::Enum(operator.to_string()),
            AttributeValue::EntityRef(first),
            AttributeValue::EntityRef(second),
        ],
    )
}

fn half_space(store: &mut EntityStore, origin: [f64; 3], agreement: bool) -> u32 {
    let position = store.add_axis2_placement_3d(origin);
    let plane = store.add(IfcType::IfcPlane, vec![AttributeValue::EntityRef(position)]);
    store.add(
        IfcType::IfcHalfSpaceSolid,
        vec![AttributeValue::EntityRef(plane), AttributeValue::boolean(agreement)],
    )
}

#[test]
fn test_shape_type_classification() {
    let of = |ty| shape_type(&DecodedEntity::new(1, ty, vec![]));
    assert_eq!(of(IfcType::IfcPolyline), ShapeType::Curve);
    assert_eq!(of(IfcType::IfcFaceOuterBound), ShapeType::Wire);
    assert_eq!(of(IfcType::IfcRectangleProfileDef), ShapeType::Face);
    assert_eq!(of(IfcType::IfcBooleanClippingResult), ShapeType::Solid);
    assert_eq!(of(IfcType::IfcMappedItem), ShapeType::Composite);
    assert_eq!(of(IfcType::IfcWall), ShapeType::Composite);
    assert_eq!(of(IfcType::IfcOpeningElement), ShapeType::Composite);
    assert_eq!(of(IfcType::IfcCartesianPoint), ShapeType::Unknown);
    assert_eq!(of(IfcType::Unknown(7)), ShapeType::Unknown);
}

#[test]
fn test_unsupported_entity_is_an_error() {
    let mut store = EntityStore::new();
    let point = store.add_cartesian_point(0.0, 0.0, 0.0);
    let kernel = Kernel::new(&store);

    let result = kernel.convert_shapes(&decode(&store, point));
    assert!(matches!(
        result,
        Err(Error::UnsupportedEntity { ifc_type: IfcType::IfcCartesianPoint, .. })
    ));
}

#[test]
fn test_convert_wire_removes_duplicates() {
    let mut store = EntityStore::new();
    let poly_loop = store.add_poly_loop(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 0.0, 0.0],
    ]);
    let kernel = Kernel::new(&store);

    let wire = kernel.convert_wire(&decode(&store, poly_loop)).unwrap();
    assert_eq!(wire.len(), 3);
}

#[test]
fn test_face_bound_with_false_orientation_is_reversed() {
    let mut store = EntityStore::new();
    let poly_loop = store.add_poly_loop(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]);
    let bound = store.add(
        IfcType::IfcFaceBound,
        vec![AttributeValue::EntityRef(poly_loop), AttributeValue::boolean(false)],
    );
    let kernel = Kernel::new(&store);

    let forward = kernel.convert_wire(&decode(&store, poly_loop)).unwrap();
    let reversed = kernel.convert_wire(&decode(&store, bound)).unwrap();
    assert_eq!(reversed, forward.reversed());
}

#[test]
fn test_wire_to_face_rejects_bad_loops() {
    let store = EntityStore::new();
    let kernel = Kernel::new(&store);

    let bent = Wire::new(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.1),
        Point3::new(0.0, 1.0, 0.0),
    ]);
    assert!(matches!(kernel.convert_wire_to_face(&bent), Err(Error::NonPlanar { .. })));

    let segment = Wire::new(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
    ]);
    assert!(matches!(
        kernel.convert_wire_to_face(&segment),
        Err(Error::DegenerateGeometry(_))
    ));
}

#[test]
fn test_indexed_poly_curve_follows_segments() {
    let mut store = EntityStore::new();
    let points = store.add(
        IfcType::IfcCartesianPointList2D,
        vec![AttributeValue::List(vec![
            AttributeValue::floats(&[0.0, 0.0]),
            AttributeValue::floats(&[2.0, 0.0]),
            AttributeValue::floats(&[2.0, 1.0]),
            AttributeValue::floats(&[0.0, 1.0]),
        ])],
    );
    let segment = |ids: &[i64]| AttributeValue::List(ids.iter().map(|i| AttributeValue::Integer(*i)).collect());
    let curve = store.add(
        IfcType::IfcIndexedPolyCurve,
        vec![
            AttributeValue::EntityRef(points),
            AttributeValue::List(vec![segment(&[1, 2, 3]), segment(&[3, 4, 1])]),
        ],
    );
    let kernel = Kernel::new(&store);

    let converted = kernel.convert_curve(&decode(&store, curve)).unwrap();
    assert!(converted.closed);
    assert_eq!(converted.points.len(), 4);
    assert_eq!(converted.points[2], Point3::new(2.0, 1.0, 0.0));
}

#[test]
fn test_curve_bounds_no_shape() {
    let mut store = EntityStore::new();
    let a = store.add_cartesian_point(0.0, 0.0, 0.0);
    let b = store.add_cartesian_point(1.0, 0.0, 0.0);
    let polyline = store.add(IfcType::IfcPolyline, vec![AttributeValue::refs(&[a, b])]);
    let kernel = Kernel::new(&store);

    assert!(matches!(
        kernel.convert_shape(&decode(&store, polyline)),
        Err(Error::Geometry(_))
    ));
}

#[test]
fn test_faceted_brep_volume() {
    let mut store = EntityStore::new();
    let brep = store.add_box_brep([0.0; 3], [2.0, 3.0, 4.0]);
    let kernel = Kernel::new(&store);

    let results = kernel.convert_shapes(&decode(&store, brep)).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results.as_slice()[0].item_id, brep);
    assert_relative_eq!(results.total_volume(), 24.0, epsilon = 1e-9);
    assert!(results.as_slice()[0].shape.is_manifold(1e-9));
}

#[test]
fn test_inward_shell_is_reversed() {
    let mut store = EntityStore::new();
    let inward: Vec<Vec<[f64; 3]>> = box_faces([0.0; 3], [1.0; 3])
        .into_iter()
        .map(|mut face| {
            face.reverse();
            face
        })
        .collect();
    let brep = store.add_faceted_brep(&inward);
    let kernel = Kernel::new(&store);

    let results = kernel.convert_shapes(&decode(&store, brep)).unwrap();
    assert_relative_eq!(results.total_volume(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_extrusion_is_placed() {
    let mut store = EntityStore::new();
    let solid = store.add_rectangle_extrusion(2.0, 4.0, 3.0, [10.0, 0.0, 0.0]);
    let kernel = Kernel::new(&store);

    let results = kernel.convert_shapes(&decode(&store, solid)).unwrap();
    let shape = &results.as_slice()[0].shape;
    assert_relative_eq!(shape.volume(), 24.0, epsilon = 1e-9);

    let (min, max) = shape.bounds().unwrap();
    assert_relative_eq!(min, Point3::new(9.0, -2.0, 0.0), epsilon = 1e-9);
    assert_relative_eq!(max, Point3::new(11.0, 2.0, 3.0), epsilon = 1e-9);
}

#[test]
fn test_circle_profile_extrusion() {
    let mut store = EntityStore::new();
    let profile = store.add(
        IfcType::IfcCircleProfileDef,
        vec![
            AttributeValue::Enum("AREA".to_string()),
            AttributeValue::Null,
            AttributeValue::Null,
            AttributeValue::Float(1.0),
        ],
    );
    let position = store.add_axis2_placement_3d([0.0; 3]);
    let direction = store.add_direction(0.0, 0.0, 1.0);
    let solid = store.add(
        IfcType::IfcExtrudedAreaSolid,
        vec![
            AttributeValue::EntityRef(profile),
            AttributeValue::EntityRef(position),
            AttributeValue::EntityRef(direction),
            AttributeValue::Float(1.0),
        ],
    );
    let kernel = Kernel::new(&store);

    let volume = kernel.convert_shapes(&decode(&store, solid)).unwrap().total_volume();
    assert!(volume > 3.13 && volume < std::f64::consts::PI, "volume {}", volume);
}

#[test]
fn test_zero_depth_extrusion_fails_and_is_not_cached() {
    let mut store = EntityStore::new();
    let solid = store.add_rectangle_extrusion(1.0, 1.0, 0.0, [0.0; 3]);
    let kernel = Kernel::new(&store);

    assert!(kernel.convert_shapes(&decode(&store, solid)).is_err());
    assert!(kernel.cached(CacheKind::Shape, solid).is_none());
}

#[test]
fn test_boolean_difference() {
    let mut store = EntityStore::new();
    let outer = store.add_box_brep([0.0; 3], [10.0; 3]);
    let inner = store.add_box_brep([3.0; 3], [7.0; 3]);
    let result = boolean(&mut store, IfcType::IfcBooleanResult, "DIFFERENCE", outer, inner);
    let kernel = Kernel::new(&store);

    let results = kernel.convert_shapes(&decode(&store, result)).unwrap();
    assert_relative_eq!(results.total_volume(), 936.0, epsilon = 1e-6);
    assert!(results.as_slice()[0].shape.is_manifold(1e-6));
}

#[test]
fn test_half_space_clipping_keeps_side_away_from_material() {
    let mut store = EntityStore::new();
    let body = store.add_box_brep([0.0; 3], [10.0; 3]);
    let below = half_space(&mut store, [0.0, 0.0, 5.0], true);
    let above = half_space(&mut store, [0.0, 0.0, 5.0], false);
    let keep_top = boolean(&mut store, IfcType::IfcBooleanClippingResult, "DIFFERENCE", body, below);
    let keep_bottom = boolean(&mut store, IfcType::IfcBooleanClippingResult, "DIFFERENCE", body, above);
    let kernel = Kernel::new(&store);

    let top = kernel.convert_shapes(&decode(&store, keep_top)).unwrap();
    assert_relative_eq!(top.total_volume(), 500.0, epsilon = 1e-6);
    let (min, _) = top.as_slice()[0].shape.bounds().unwrap();
    assert_relative_eq!(min.z, 5.0, epsilon = 1e-6);

    let bottom = kernel.convert_shapes(&decode(&store, keep_bottom)).unwrap();
    assert_relative_eq!(bottom.total_volume(), 500.0, epsilon = 1e-6);
    let (_, max) = bottom.as_slice()[0].shape.bounds().unwrap();
    assert_relative_eq!(max.z, 5.0, epsilon = 1e-6);
}

#[test]
fn test_self_referencing_boolean_fails_cleanly() {
    let mut store = EntityStore::new();
    let body = store.add_box_brep([0.0; 3], [1.0; 3]);
    store.insert(DecodedEntity::new(
        500,
        IfcType::IfcBooleanResult,
        vec![
            AttributeValue::Enum("UNION".to_string()),
            AttributeValue::EntityRef(500),
            AttributeValue::EntityRef(body),
        ],
    ));
    let kernel = Kernel::new(&store);

    assert!(kernel.convert_shapes(&decode(&store, 500)).is_err());
}

#[test]
fn test_mapped_item_is_placed_by_target() {
    let mut store = EntityStore::new();
    let body = store.add_box_brep([0.0; 3], [1.0; 3]);
    let representation = store.add_shape_representation("Body", &[body]);
    let origin = store.add_axis2_placement_3d([0.0; 3]);
    let map = store.add(
        IfcType::IfcRepresentationMap,
        vec![AttributeValue::EntityRef(origin), AttributeValue::EntityRef(representation)],
    );
    let local_origin = store.add_cartesian_point(5.0, 0.0, 0.0);
    let target = store.add(
        IfcType::IfcCartesianTransformationOperator3D,
        vec![
            AttributeValue::Null,
            AttributeValue::Null,
            AttributeValue::EntityRef(local_origin),
            AttributeValue::Null,
            AttributeValue::Null,
        ],
    );
    let mapped = store.add(
        IfcType::IfcMappedItem,
        vec![AttributeValue::EntityRef(map), AttributeValue::EntityRef(target)],
    );
    let kernel = Kernel::new(&store);

    let results = kernel.convert_shapes(&decode(&store, mapped)).unwrap();
    assert_eq!(results.len(), 1);
    let (min, _) = results.as_slice()[0].placed_shape().bounds().unwrap();
    assert_relative_eq!(min, Point3::new(5.0, 0.0, 0.0), epsilon = 1e-9);

    // The mapped representation itself stays unplaced in the cache
    let plain = kernel.convert_shapes(&decode(&store, representation)).unwrap();
    assert!(plain.as_slice()[0].placement.is_none());
}

#[test]
fn test_representation_skips_failing_items() {
    let mut store = EntityStore::new();
    let good = store.add_box_brep([0.0; 3], [1.0; 3]);
    let flat = store.add_rectangle_extrusion(1.0, 1.0, -1.0, [0.0; 3]);
    let point = store.add_cartesian_point(0.0, 0.0, 0.0);
    let representation = store.add_shape_representation("Body", &[good, flat, point]);
    let kernel = Kernel::new(&store);

    let results = kernel.convert_shapes(&decode(&store, representation)).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results.as_slice()[0].item_id, good);
}

#[test]
fn test_representation_without_any_converted_item_fails() {
    let mut store = EntityStore::new();
    let flat = store.add_rectangle_extrusion(1.0, 1.0, 0.0, [0.0; 3]);
    let point = store.add_cartesian_point(0.0, 0.0, 0.0);
    let representation = store.add_shape_representation("Body", &[flat, point]);
    let kernel = Kernel::new(&store);

    let err = kernel.convert_shapes(&decode(&store, representation)).unwrap_err();
    assert!(matches!(err, Error::DegenerateGeometry(_)), "{}", err);
    assert!(kernel.cached(CacheKind::Shape, representation).is_none());
}

#[test]
fn test_product_with_only_degenerate_geometry_fails() {
    let mut store = EntityStore::new();
    let placement = store.add_local_placement(None, [0.0; 3]);
    let flat = store.add_rectangle_extrusion(1.0, 1.0, 0.0, [0.0; 3]);
    let shape = store.add_body_representation(&[flat]);
    let wall = store.add_product(IfcType::IfcWall, Some(placement), Some(shape));
    let kernel = Kernel::new(&store);

    assert!(kernel.convert_shapes(&decode(&store, wall)).is_err());
    assert!(kernel.cached(CacheKind::Shape, wall).is_none());
    assert!(kernel.cached(CacheKind::Shape, shape).is_none());
}

#[test]
fn test_product_with_only_non_body_representations_fails() {
    let mut store = EntityStore::new();
    let bounding = store.add_box_brep([0.0; 3], [1.0; 3]);
    let box_rep = store.add_shape_representation("Box", &[bounding]);
    let definition = store.add(
        IfcType::IfcProductDefinitionShape,
        vec![AttributeValue::Null, AttributeValue::Null, AttributeValue::refs(&[box_rep])],
    );
    let column = store.add_product(IfcType::IfcColumn, None, Some(definition));
    let bare = store.add_product(IfcType::IfcColumn, None, None);
    let kernel = Kernel::new(&store);

    assert!(kernel.convert_shapes(&decode(&store, column)).is_err());
    assert!(kernel.convert_shapes(&decode(&store, bare)).unwrap().is_empty());
}

#[test]
fn test_product_definition_prefers_body() {
    let mut store = EntityStore::new();
    let body = store.add_box_brep([0.0; 3], [1.0; 3]);
    let bounding = store.add_box_brep([0.0; 3], [2.0; 3]);
    let body_rep = store.add_shape_representation("Body", &[body]);
    let box_rep = store.add_shape_representation("Box", &[bounding]);
    let definition = store.add(
        IfcType::IfcProductDefinitionShape,
        vec![
            AttributeValue::Null,
            AttributeValue::Null,
            AttributeValue::refs(&[box_rep, body_rep]),
        ],
    );
    let kernel = Kernel::new(&store);

    let results = kernel.convert_shapes(&decode(&store, definition)).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results.as_slice()[0].item_id, body);
}

#[test]
fn test_surface_model_yields_one_result_per_shell() {
    let mut store = EntityStore::new();
    let faces_a: Vec<u32> = box_faces([0.0; 3], [1.0; 3]).iter().map(|f| store.add_face(f)).collect();
    let faces_b: Vec<u32> = box_faces([2.0; 3], [3.0; 3]).iter().map(|f| store.add_face(f)).collect();
    let shell_a = store.add(IfcType::IfcOpenShell, vec![AttributeValue::refs(&faces_a)]);
    let shell_b = store.add(IfcType::IfcOpenShell, vec![AttributeValue::refs(&faces_b)]);
    let model = store.add(
        IfcType::IfcShellBasedSurfaceModel,
        vec![AttributeValue::refs(&[shell_a, shell_b])],
    );
    let kernel = Kernel::new(&store);

    let results = kernel.convert_shapes(&decode(&store, model)).unwrap();
    let ids: Vec<u32> = results.iter().map(|r| r.item_id).collect();
    assert_eq!(ids, vec![shell_a, shell_b]);
}

#[test]
fn test_surface_style_is_attached() {
    let mut store = EntityStore::new();
    let body = store.add_box_brep([0.0; 3], [1.0; 3]);
    store.add_surface_colour(body, [1.0, 0.5, 0.0], 0.25);
    let kernel = Kernel::new(&store);

    let results = kernel.convert_shapes(&decode(&store, body)).unwrap();
    let style = results.as_slice()[0].style.clone().unwrap();
    assert_eq!(style.name.as_deref(), Some("Surface"));
    assert_eq!(style.rgba(), Some([1.0, 0.5, 0.0, 0.75]));
}

#[test]
fn test_surface_style_through_assignment() {
    let mut store = EntityStore::new();
    let body = store.add_box_brep([0.0; 3], [1.0; 3]);
    let colour = store.add(
        IfcType::IfcColourRgb,
        vec![
            AttributeValue::Null,
            AttributeValue::Float(0.0),
            AttributeValue::Float(0.0),
            AttributeValue::Float(1.0),
        ],
    );
    let shading = store.add(IfcType::IfcSurfaceStyleShading, vec![AttributeValue::EntityRef(colour)]);
    let style = store.add(
        IfcType::IfcSurfaceStyle,
        vec![
            AttributeValue::Null,
            AttributeValue::Enum("POSITIVE".to_string()),
            AttributeValue::refs(&[shading]),
        ],
    );
    let assignment = store.add(
        IfcType::IfcPresentationStyleAssignment,
        vec![AttributeValue::refs(&[style])],
    );
    store.add(
        IfcType::IfcStyledItem,
        vec![
            AttributeValue::EntityRef(body),
            AttributeValue::refs(&[assignment]),
            AttributeValue::Null,
        ],
    );
    let kernel = Kernel::new(&store);

    let results = kernel.convert_shapes(&decode(&store, body)).unwrap();
    let attached = results.as_slice()[0].style.clone().unwrap();
    assert_eq!(attached.id, style);
    assert_eq!(attached.rgb, Some([0.0, 0.0, 1.0]));
    assert_eq!(attached.transparency, 0.0);
}

#[test]
fn test_product_comes_back_in_world_coordinates() {
    let mut store = EntityStore::new();
    let site = store.add_local_placement(None, [100.0, 0.0, 0.0]);
    let placement = store.add_local_placement(Some(site), [0.0, 50.0, 0.0]);
    let item = store.add_rectangle_extrusion(1.0, 1.0, 1.0, [0.0; 3]);
    let shape = store.add_body_representation(&[item]);
    let column = store.add_product(IfcType::IfcColumn, Some(placement), Some(shape));
    let kernel = Kernel::new(&store);

    let results = kernel.convert_shapes(&decode(&store, column)).unwrap();
    let (min, max) = results.as_slice()[0].placed_shape().bounds().unwrap();
    assert_relative_eq!(min, Point3::new(99.5, 49.5, 0.0), epsilon = 1e-9);
    assert_relative_eq!(max, Point3::new(100.5, 50.5, 1.0), epsilon = 1e-9);
}

#[test]
fn test_placement_conversion() {
    let mut store = EntityStore::new();
    let parent = store.add_local_placement(None, [1.0, 0.0, 0.0]);
    let child = store.add_local_placement(Some(parent), [0.0, 2.0, 0.0]);
    let origin = store.add_axis2_placement_3d([0.0; 3]);
    let kernel = Kernel::new(&store);

    let placement = kernel.convert_placement(&decode(&store, child)).unwrap();
    assert_relative_eq!(placement.origin(), Point3::new(1.0, 2.0, 0.0), epsilon = 1e-12);
    assert!(kernel.is_identity_transform(&decode(&store, origin)).unwrap());
    assert!(!kernel.is_identity_transform(&decode(&store, child)).unwrap());
}

#[test]
fn test_cache_hit_and_purge() {
    let mut store = EntityStore::new();
    let body = store.add_box_brep([0.0; 3], [1.0; 3]);
    let kernel = Kernel::new(&store);

    let first = kernel.convert_shapes(&decode(&store, body)).unwrap();
    assert!(matches!(
        kernel.cached(CacheKind::Shape, body),
        Some(CacheEntry::Shape(_))
    ));
    assert!(kernel.cache_len() > 1);

    kernel.purge_cache();
    assert_eq!(kernel.cache_len(), 0);
    assert!(kernel.cached(CacheKind::Shape, body).is_none());

    let second = kernel.convert_shapes(&decode(&store, body)).unwrap();
    assert_eq!(first, second);
}
