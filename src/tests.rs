use crate::common::ExecutionParams;
use crate::polygon::Monotones;
use crate::verify::check_topology_triangles;
use crate::{K_TOLERANCE, PolyVert, PolygonError, PolygonsIdx, SimplePolygonIdx, ccw};
use crate::{triangulate, triangulate_idx_with};
use nalgebra::{Point2, Vector3};
use std::collections::HashMap;

///Strict mode: every check on, overlaps are errors.
fn strict() -> ExecutionParams {
	ExecutionParams {
		intermediate_checks: true,
		process_overlaps: false,
		..Default::default()
	}
}

///Soft mode: overlaps are downgraded to a topology-only triangulation.
fn soft() -> ExecutionParams {
	ExecutionParams {
		intermediate_checks: false,
		process_overlaps: true,
		suppress_errors: true,
		..Default::default()
	}
}

fn poly(points: &[(f32, f32)], first_idx: i32) -> SimplePolygonIdx {
	points
		.iter()
		.enumerate()
		.map(|(i, &(x, y))| PolyVert::new(Point2::new(x, y), first_idx + i as i32))
		.collect()
}

fn positions(polys: &PolygonsIdx) -> HashMap<i32, Point2<f32>> {
	let mut map = HashMap::new();
	for poly in polys {
		for vert in poly {
			map.insert(vert.idx, vert.pos);
		}
	}
	map
}

fn tri_area(tri: &Vector3<i32>, pos: &HashMap<i32, Point2<f32>>) -> f64 {
	let p0 = pos[&tri.x];
	let p1 = pos[&tri.y];
	let p2 = pos[&tri.z];
	let v1 = p1 - p0;
	let v2 = p2 - p0;
	0.5 * (v1.x as f64 * v2.y as f64 - v1.y as f64 * v2.x as f64)
}

fn total_area(triangles: &[Vector3<i32>], polys: &PolygonsIdx) -> f64 {
	let pos = positions(polys);
	triangles.iter().map(|tri| tri_area(tri, &pos)).sum()
}

///Triangulates in strict mode, with all verification on, and checks the
///triangle count.
fn test_poly(polys: &PolygonsIdx, expected: usize, precision: f32) -> Vec<Vector3<i32>> {
	let triangles =
		triangulate_idx_with(polys, precision, &strict()).expect("triangulation failed");
	assert_eq!(triangles.len(), expected, "wrong number of triangles");
	triangles
}

#[test]
fn unit_square() {
	let polys = vec![poly(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], 0)];
	let triangles = test_poly(&polys, 2, 1e-4);

	let mut seen = [false; 4];
	for tri in &triangles {
		for idx in [tri.x, tri.y, tri.z] {
			assert!((0..4).contains(&idx), "fabricated index {}", idx);
			seen[idx as usize] = true;
		}
	}
	assert!(seen.iter().all(|&s| s), "output does not cover all indices");
	assert!((total_area(&triangles, &polys) - 1.0).abs() < 1e-4);
}

#[test]
fn square_with_square_hole() {
	let polys = vec![
		poly(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)], 0),
		poly(&[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)], 4),
	];
	let triangles = test_poly(&polys, 8, 1e-4);
	assert!((total_area(&triangles, &polys) - 12.0).abs() < 1e-3);

	// No triangle may straddle the hole.
	let pos = positions(&polys);
	for tri in &triangles {
		let bc = (pos[&tri.x].coords + pos[&tri.y].coords + pos[&tri.z].coords) / 3.0;
		assert!(
			!(bc.x > 1.0 && bc.x < 3.0 && bc.y > 1.0 && bc.y < 3.0),
			"triangle barycenter ({}, {}) lies inside the hole",
			bc.x,
			bc.y
		);
	}
}

#[test]
fn monotone_mountain() {
	let polys = vec![poly(
		&[(0.0, 0.0), (5.0, 0.0), (4.0, 1.0), (3.0, 3.0), (1.0, 4.0)],
		0,
	)];
	test_poly(&polys, 3, 1e-4);
}

///A polygon that is colinear within precision triangulates without error into
///nothing but degenerate slivers.
#[test]
fn colinear_polygon() {
	let polys = vec![poly(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)], 0)];
	let triangles = test_poly(&polys, 2, 1e-4);
	assert!(total_area(&triangles, &polys).abs() < 1e-6);
	let pos = positions(&polys);
	for tri in &triangles {
		assert_eq!(
			ccw(pos[&tri.x], pos[&tri.y], pos[&tri.z], 2e-4),
			0,
			"colinear input produced a non-degenerate triangle"
		);
	}
}

///An extra vertex within precision of an edge contributes only a degenerate
///sliver; the rest of the triangle is unaffected.
#[test]
fn near_colinear_vert() {
	let polys = vec![poly(
		&[(0.0, 0.0), (0.5, 1e-6), (1.0, 0.0), (0.5, 1.0)],
		0,
	)];
	let triangles = test_poly(&polys, 2, 1e-4);
	assert!((total_area(&triangles, &polys) - 0.5).abs() < 1e-3);

	let pos = positions(&polys);
	let min_area = triangles
		.iter()
		.map(|tri| tri_area(tri, &pos).abs())
		.fold(f64::INFINITY, f64::min);
	assert!(min_area < 1e-4, "expected one degenerate fan element");
}

///A lone hole has no outer contour to attach to: strict mode raises, soft
///mode still returns a manifold (but inverted) triangulation.
#[test]
fn lone_hole() {
	let polys = vec![poly(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)], 0)];

	let params = ExecutionParams {
		suppress_errors: true,
		..strict()
	};
	match triangulate_idx_with(&polys, 1e-4, &params) {
		Err(PolygonError::Geometry(_)) => {}
		other => panic!("expected a geometry error, got {:?}", other),
	}

	let triangles = triangulate_idx_with(&polys, 1e-4, &soft()).expect("soft mode must not raise");
	assert_eq!(triangles.len(), 2);
	check_topology_triangles(&triangles, &polys).expect("soft output must stay manifold");
	assert!((total_area(&triangles, &polys) + 1.0).abs() < 1e-4);
}

///A CCW square with a coincident CW hole is a zero-width annulus: within
///precision everything overlaps, yet the result stays manifold with zero net
///area.
#[test]
fn coincident_square_and_hole() {
	let polys = vec![
		poly(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], 0),
		poly(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)], 4),
	];
	let triangles = triangulate_idx_with(&polys, 1e-4, &soft()).expect("soft mode must not raise");
	check_topology_triangles(&triangles, &polys).expect("output must stay manifold");
	assert!(total_area(&triangles, &polys).abs() < 1e-4);
}

///Two exactly coincident CCW squares remain two independent monotones.
#[test]
fn coincident_squares() {
	let polys = vec![
		poly(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], 0),
		poly(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], 4),
	];
	let triangles = triangulate_idx_with(&polys, 1e-4, &soft()).expect("soft mode must not raise");
	assert_eq!(triangles.len(), 4);
	check_topology_triangles(&triangles, &polys).expect("output must stay manifold");
	assert!((total_area(&triangles, &polys) - 2.0).abs() < 1e-4);
}

///Reconstructing the boundary from the triangulation's unpaired halfedges
///gives back exactly the input's directed edge multiset.
#[test]
fn boundary_reconstruction() {
	let polys = vec![
		poly(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)], 0),
		poly(&[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)], 4),
	];
	let triangles = triangulate_idx_with(&polys, 1e-4, &soft()).expect("triangulation failed");
	check_topology_triangles(&triangles, &polys).expect("boundary does not match input");
}

#[test]
fn deterministic_output() {
	let polys = vec![
		poly(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)], 0),
		poly(&[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)], 4),
	];
	let first = triangulate_idx_with(&polys, 1e-4, &strict()).expect("triangulation failed");
	let second = triangulate_idx_with(&polys, 1e-4, &strict()).expect("triangulation failed");
	assert_eq!(first, second);
}

///With a negative precision the working precision is derived from the largest
///input coordinate.
#[test]
fn auto_precision() {
	let polys = vec![poly(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)], 0)];
	let monotones = Monotones::new(&polys, -1.0, &ExecutionParams::default())
		.expect("construction failed");
	assert_eq!(monotones.precision(), 4.0 * K_TOLERANCE);
}

///The convenience entry point assigns indices sequentially across polygons.
#[test]
fn sequential_indices() {
	let polygons = vec![vec![
		Point2::new(0.0, 0.0),
		Point2::new(1.0, 0.0),
		Point2::new(1.0, 1.0),
		Point2::new(0.0, 1.0),
	]];
	let triangles = triangulate(&polygons, 1e-4).expect("triangulation failed");
	assert_eq!(triangles.len(), 2);
	for tri in &triangles {
		for idx in [tri.x, tri.y, tri.z] {
			assert!((0..4).contains(&idx));
		}
	}
}
