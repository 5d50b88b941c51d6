use crate::PolygonError;
use crate::polygon::PolygonsIdx;
use crate::utils::ccw;
use nalgebra::{Point2, Vector3};
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct PolyEdge {
	start_vert: i32,
	end_vert: i32,
}

fn polygons_to_edges(polys: &PolygonsIdx) -> Vec<PolyEdge> {
	let mut halfedges = Vec::new();
	for poly in polys {
		for i in 1..poly.len() {
			halfedges.push(PolyEdge {
				start_vert: poly[i - 1].idx,
				end_vert: poly[i].idx,
			});
		}
		if let Some(last) = poly.last() {
			halfedges.push(PolyEdge {
				start_vert: last.idx,
				end_vert: poly[0].idx,
			});
		}
	}
	halfedges
}

fn triangles_to_edges(triangles: &[Vector3<i32>]) -> Vec<PolyEdge> {
	let mut halfedges = Vec::with_capacity(triangles.len() * 3);
	for tri in triangles {
		halfedges.push(PolyEdge {
			start_vert: tri.x,
			end_vert: tri.y,
		});
		halfedges.push(PolyEdge {
			start_vert: tri.y,
			end_vert: tri.z,
		});
		halfedges.push(PolyEdge {
			start_vert: tri.z,
			end_vert: tri.x,
		});
	}
	halfedges
}

fn check_topology(halfedges: &[PolyEdge]) -> Result<(), PolygonError> {
	if halfedges.len() % 2 != 0 {
		return Err(PolygonError::Topology("Odd number of halfedges.".to_string()));
	}
	let n_edges = halfedges.len() / 2;

	let mut forward: Vec<PolyEdge> = halfedges
		.iter()
		.copied()
		.filter(|edge| edge.end_vert > edge.start_vert)
		.collect();
	if forward.len() != n_edges {
		return Err(PolygonError::Topology(
			"Half of halfedges should be forward.".to_string(),
		));
	}

	let mut backward: Vec<PolyEdge> = halfedges
		.iter()
		.copied()
		.filter(|edge| edge.end_vert < edge.start_vert)
		.collect();
	if backward.len() != n_edges {
		return Err(PolygonError::Topology(
			"Half of halfedges should be backward.".to_string(),
		));
	}

	for edge in &mut backward {
		std::mem::swap(&mut edge.start_vert, &mut edge.end_vert);
	}
	forward.sort_by_key(|edge| (edge.start_vert, edge.end_vert));
	backward.sort_by_key(|edge| (edge.start_vert, edge.end_vert));
	for i in 0..n_edges {
		if forward[i] != backward[i] {
			return Err(PolygonError::Topology(
				"Forward and backward edge do not match.".to_string(),
			));
		}
		if i > 0 && (forward[i - 1] == forward[i] || backward[i - 1] == backward[i]) {
			return Err(PolygonError::Topology("Not a 2-manifold.".to_string()));
		}
	}
	Ok(())
}

///Verifies that the triangulation halfedges, together with the reversed input
///polygon edges, pair up into a closed 2-manifold.
pub(crate) fn check_topology_triangles(
	triangles: &[Vector3<i32>],
	polys: &PolygonsIdx,
) -> Result<(), PolygonError> {
	let mut halfedges = triangles_to_edges(triangles);
	for edge in polygons_to_edges(polys) {
		halfedges.push(PolyEdge {
			start_vert: edge.end_vert,
			end_vert: edge.start_vert,
		});
	}
	check_topology(&halfedges)
}

///Verifies that every output triangle is wound counter-clockwise within the
///given precision.
pub(crate) fn check_geometry(
	triangles: &[Vector3<i32>],
	polys: &PolygonsIdx,
	precision: f32,
) -> Result<(), PolygonError> {
	let mut vert_pos: HashMap<i32, Point2<f32>> = HashMap::new();
	for poly in polys {
		for vert in poly {
			vert_pos.insert(vert.idx, vert.pos);
		}
	}
	let pos = |idx: i32| vert_pos.get(&idx).copied().unwrap_or_else(Point2::origin);
	if triangles
		.iter()
		.all(|tri| ccw(pos(tri.x), pos(tri.y), pos(tri.z), precision) >= 0)
	{
		Ok(())
	} else {
		Err(PolygonError::Geometry(
			"triangulation is not entirely CCW!".to_string(),
		))
	}
}

///Prints the polygons in a form that can be pasted back into a test.
pub(crate) fn dump(polys: &PolygonsIdx) {
	for poly in polys {
		println!("polys.push(vec![");
		for vert in poly {
			println!(
				"\tPolyVert::new(Point2::new({:.9}, {:.9}), {}),  //",
				vert.pos.x, vert.pos.y, vert.idx
			);
		}
		println!("]);");
	}
}

pub(crate) fn print_failure(
	err: &PolygonError,
	polys: &PolygonsIdx,
	triangles: &[Vector3<i32>],
	precision: f32,
) {
	println!("-----------------------------------");
	println!("Triangulation failed! Precision = {}", precision);
	println!("{}", err);
	dump(polys);
	println!("produced this triangulation:");
	for tri in triangles {
		println!("{}, {}, {}", tri.x, tri.y, tri.z);
	}
}
