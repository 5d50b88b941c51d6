//! Triangulation of planar polygons with holes, built for feeding the 2D
//! cross-sections of a mesh Boolean engine back into a 3D manifold mesh.
//!
//! The input is a set of simple polygons wound CCW for outer contours and CW
//! for holes, each vertex carrying an opaque index into the owning mesh. The
//! polygons are first subdivided into y-monotone pieces by a pair of sweeps -
//! a forward sweep that resolves &epsilon;-ambiguous edge orderings and a
//! backward sweep that splits the polygons using only the topology the
//! forward sweep recorded - and each monotone piece is then triangulated by a
//! reflex-chain walk. The output triangles reference the input indices and
//! are wound CCW whenever the input was geometrically valid.

use thiserror::Error;

pub use crate::common::{ExecutionParams, Polygons, Rect, SimplePolygon};
pub use crate::polygon::{
	PolyVert, PolygonsIdx, SimplePolygonIdx, triangulate, triangulate_idx, triangulate_idx_with,
	triangulate_with,
};
pub use crate::utils::{K_TOLERANCE, ccw};

mod common;
mod list;
mod polygon;
mod utils;
mod verify;

#[cfg(test)]
mod tests;

///Failure modes of the triangulator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolygonError {
	/// The sweep discovered input that cannot be resolved within the working
	/// precision, such as polygons overlapping by more than &epsilon;. With
	/// [ExecutionParams::process_overlaps] set, this is downgraded to a soft
	/// failure and the caller receives a manifold but possibly
	/// geometrically-invalid triangulation instead.
	#[error("geometry error: {0}")]
	Geometry(String),
	/// An internal topological invariant was violated after construction.
	/// Never downgraded; indicates a bug or catastrophically corrupt input.
	#[error("topology error: {0}")]
	Topology(String),
}
