use crate::PolygonError;
use crate::common::{ExecutionParams, OrderedF32, Polygons, Rect};
use crate::list::{Chain, LinkedArena};
use crate::utils::{K_TOLERANCE, ccw};
use crate::verify;
use nalgebra::{Point2, Vector3};
use rayon::prelude::*;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

///Polygon vertex.
#[derive(Debug, Clone, Copy)]
pub struct PolyVert {
	/// X-Y position
	pub pos: Point2<f32>,
	/// ID or index into another vertex vector
	pub idx: i32,
}

impl PolyVert {
	pub fn new(pos: Point2<f32>, idx: i32) -> Self {
		Self { pos, idx }
	}
}

pub type SimplePolygonIdx = Vec<PolyVert>;
pub type PolygonsIdx = Vec<SimplePolygonIdx>;

macro_rules! verbose {
	($params:expr, $($arg:tt)*) => {
		if $params.verbose {
			println!($($arg)*);
		}
	};
}

///Only used inside the sweep functions. A failed condition means the monotone
///subdivision cannot continue, most likely because the input polygons overlap
///by more than the precision. With process_overlaps set the sweep abandons and
///reports a soft failure, leaving the polygons for the triangulator to close
///topologically; otherwise it is a geometry error.
macro_rules! overlap_assert {
	($params:expr, $cond:expr, $msg:expr) => {
		if !$cond {
			if $params.process_overlaps {
				return Ok(true);
			}
			return Err(PolygonError::Geometry($msg.to_string()));
		}
	};
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum VertType {
	Start,
	Backward,
	Forward,
	Merge,
	End,
	Skip,
}

///This is the data structure of the polygons themselves. The verts are held in
///an arena and threaded into a single ring chain in sweep-line order, while
///the left and right indices form the polygon loops. The mesh_idx is the input
///index that is transferred to the output triangulation.
#[derive(Clone)]
struct VertAdj {
	pos: Point2<f32>,
	/// Global index into the owning mesh.
	mesh_idx: i32,
	/// 0 = unprocessed, negative = processed; reused as the positive
	/// sweep-line ordinal during triangulation.
	index: i32,
	left: usize,
	right: usize,
	edge_l: Option<usize>,
	edge_r: Option<usize>,
}

impl VertAdj {
	fn processed(&self) -> bool {
		self.index < 0
	}

	fn set_processed(&mut self, processed: bool) {
		self.index = if processed { -1 } else { 0 };
	}
}

///The edge pairs form the two flanks of a monotone polygon while it is being
///constructed. The sweep-line is horizontal and moves from -y to +y, or South
///to North. The West edge is a backwards edge while the East edge is forwards,
///a topological constraint. If the polygon is geometrically valid, then the
///West edge will also be to the -x side of the East edge, hence the name.
///
///east_certain records whether we are sure this edge is truly west of its
///eastern neighbor. It is false when several active edges are colinear within
///tolerance, in which case later verts may still reorder the pairs.
struct Edge {
	south: usize,
	/// The other flank of the same open monotone.
	linked: Option<usize>,
	/// Forward-sweep breadcrumb: the edge this pair sat west of when it was
	/// retired, replayed by the backward sweep in place of any geometry. The
	/// backward sweep reuses it to mark pending merge splits.
	next: Option<usize>,
	forward: bool,
	/// Reserved; never set.
	flipped: bool,
	east_certain: bool,
}

///The class first turns input polygons into monotone polygons, then
///triangulates them with the reflex-chain triangulator below.
pub(crate) struct Monotones {
	verts: LinkedArena<VertAdj>,
	/// Verts in sweep-line order.
	ring: Chain,
	edges: LinkedArena<Edge>,
	/// West to east edges of the currently open monotones.
	active: Chain,
	/// Completed monotones, pair adjacency preserved.
	inactive: Chain,
	/// A triangle of this height or less is degenerate.
	precision: f32,
}

impl Monotones {
	pub(crate) fn new(
		polys: &PolygonsIdx,
		precision: f32,
		params: &ExecutionParams,
	) -> Result<Self, PolygonError> {
		let num_vert = polys.iter().map(|poly| poly.len()).sum();
		let mut mono = Self {
			verts: LinkedArena::with_capacity(num_vert),
			ring: Chain::default(),
			edges: LinkedArena::new(),
			active: Chain::default(),
			inactive: Chain::default(),
			precision,
		};

		let mut bbox = Rect::default();
		for poly in polys {
			let mut start = None;
			let mut last = None;
			for vert in poly {
				let current = mono.verts.len();
				mono.verts.alloc(VertAdj {
					pos: vert.pos,
					mesh_idx: vert.idx,
					index: 0,
					left: current,
					right: current,
					edge_l: None,
					edge_r: None,
				});
				mono.verts.push_back(&mut mono.ring, current);
				bbox.union(vert.pos);

				match last {
					None => start = Some(current),
					Some(prev) => mono.link(prev, current),
				}
				last = Some(current);
			}
			if let (Some(last), Some(start)) = (last, start) {
				mono.link(last, start);
			}
		}

		if mono.precision < 0.0 {
			mono.precision = bbox.scale() * K_TOLERANCE;
		}

		if mono.sweep_forward(params)? {
			return Ok(mono);
		}
		mono.check(params)?;

		if mono.sweep_back(params)? {
			return Ok(mono);
		}
		mono.check(params)?;

		Ok(mono)
	}

	pub(crate) fn precision(&self) -> f32 {
		self.precision
	}

	///Emits the triangulation of every monotone. The verts of each monotone
	///are fed to a Triangulator in sweep-line order by always advancing the
	///flank whose next vert has the smaller ordinal.
	pub(crate) fn triangulate(
		&mut self,
		triangles: &mut Vec<Vector3<i32>>,
		params: &ExecutionParams,
	) -> Result<(), PolygonError> {
		// Save the sweep-line order in the vert to check further down.
		let mut i = 1;
		let mut v = self.ring.head();
		while let Some(vert) = v {
			self.verts[vert].index = i;
			i += 1;
			v = self.verts.next(vert);
		}

		let mut triangles_left = self.verts.len() as i32;
		let mut start = self.first_unprocessed();
		while let Some(first) = start {
			verbose!(params, "{}", self.verts[first].mesh_idx);
			let mut triangulator = Triangulator::new(first, self.precision);
			self.verts[first].set_processed(true);
			let mut v_r = self.verts[first].right;
			let mut v_l = self.verts[first].left;
			while v_r != v_l {
				// Process the neighbor vert that is next in the sweep-line.
				if self.verts[v_r].index < self.verts[v_l].index {
					verbose!(params, "{}", self.verts[v_r].mesh_idx);
					triangulator.process_vert(&self.verts, v_r, true, false, triangles, params);
					self.verts[v_r].set_processed(true);
					v_r = self.verts[v_r].right;
				} else {
					verbose!(params, "{}", self.verts[v_l].mesh_idx);
					triangulator.process_vert(&self.verts, v_l, false, false, triangles, params);
					self.verts[v_l].set_processed(true);
					v_l = self.verts[v_l].left;
				}
			}
			verbose!(params, "{}", self.verts[v_r].mesh_idx);
			triangulator.process_vert(&self.verts, v_r, true, true, triangles, params);
			self.verts[v_r].set_processed(true);

			if triangulator.num_triangles() == 0 {
				return Err(PolygonError::Topology(
					"Monotone produced no triangles.".to_string(),
				));
			}
			triangles_left -= 2 + triangulator.num_triangles();
			start = self.first_unprocessed();
		}

		if triangles_left != 0 {
			return Err(PolygonError::Topology(
				"Triangulation produced wrong number of triangles.".to_string(),
			));
		}
		Ok(())
	}

	///A variety of sanity checks on the data structure, only performed when
	///params.intermediate_checks is set.
	fn check(&mut self, params: &ExecutionParams) -> Result<(), PolygonError> {
		if !params.intermediate_checks {
			return Ok(());
		}
		let mut v = self.ring.head();
		while let Some(vert) = v {
			self.verts[vert].set_processed(false);
			let right = self.verts[vert].right;
			if self.verts[right].right == vert {
				return Err(PolygonError::Topology("two-edge monotone!".to_string()));
			}
			if self.verts[self.verts[vert].left].right != vert {
				return Err(PolygonError::Topology(
					"monotone vert neighbors don't agree!".to_string(),
				));
			}
			v = self.verts.next(vert);
		}
		if params.verbose {
			let mut start = self.first_unprocessed();
			while let Some(first) = start {
				self.verts[first].set_processed(true);
				println!(
					"monotone start: {}, {}",
					self.verts[first].mesh_idx, self.verts[first].pos.y
				);
				let mut vert = self.verts[first].right;
				while vert != first {
					println!("{}, {}", self.verts[vert].mesh_idx, self.verts[vert].pos.y);
					self.verts[vert].set_processed(true);
					vert = self.verts[vert].right;
				}
				println!();
				start = self.first_unprocessed();
			}
		}
		Ok(())
	}

	fn first_unprocessed(&self) -> Option<usize> {
		let mut v = self.ring.head();
		while let Some(vert) = v {
			if !self.verts[vert].processed() {
				return Some(vert);
			}
			v = self.verts.next(vert);
		}
		None
	}

	fn link(&mut self, left: usize, right: usize) {
		self.verts[left].right = right;
		self.verts[right].left = left;
	}

	fn update_edge(&mut self, edge: usize, vert: usize) {
		self.edges[edge].south = vert;
		self.verts[vert].edge_l = Some(edge);
		self.verts[vert].edge_r = Some(edge);
	}

	fn link_edges(&mut self, edge1: usize, edge2: usize) {
		self.edges[edge1].linked = Some(edge2);
		self.edges[edge2].linked = Some(edge1);
	}

	fn north(&self, edge: usize) -> usize {
		let edge = &self.edges[edge];
		if edge.forward {
			self.verts[edge.south].right
		} else {
			self.verts[edge.south].left
		}
	}

	///Is the edge east of the vert, within the given precision? Compares the
	///x-extents first so that only genuinely ambiguous verts fall through to
	///the orientation predicate.
	fn east_of(&self, edge: usize, vert: usize, precision: f32) -> i32 {
		let south = self.verts[self.edges[edge].south].pos;
		let north = self.verts[self.north(edge)].pos;
		let pos = self.verts[vert].pos;
		if south.x - precision > pos.x && north.x - precision > pos.x {
			1
		} else if south.x + precision < pos.x && north.x + precision < pos.x {
			-1
		} else {
			ccw(south, north, pos, precision)
		}
	}

	fn is_past(&self, vert: usize, other: usize) -> bool {
		self.verts[vert].pos.y > self.verts[other].pos.y + self.precision
	}

	fn is_start(&self, vert: usize) -> bool {
		let v = &self.verts[vert];
		let left = &self.verts[v.left];
		let right = &self.verts[v.right];
		(left.pos.y >= v.pos.y && right.pos.y > v.pos.y)
			|| (left.pos.y == v.pos.y
				&& right.pos.y == v.pos.y
				&& left.pos.x <= v.pos.x
				&& right.pos.x < v.pos.x)
	}

	///This function is shared between the forward and backward sweeps and
	///determines the topology of the vertex relative to the sweep line.
	fn process_vert(&mut self, vert: usize, params: &ExecutionParams) -> VertType {
		let v_right = self.verts[vert].right;
		let v_left = self.verts[vert].left;
		if self.verts[v_right].processed() {
			if self.verts[v_left].processed() {
				let (Some(edge_r), Some(edge_l)) =
					(self.verts[v_right].edge_l, self.verts[v_left].edge_r)
				else {
					verbose!(params, "Skip");
					return VertType::Skip;
				};
				let (Some(l_linked), Some(r_linked)) =
					(self.edges[edge_l].linked, self.edges[edge_r].linked)
				else {
					verbose!(params, "Skip");
					return VertType::Skip;
				};

				if self.edges.next(edge_r) != Some(edge_l)
					&& self.edges.next(edge_l) != Some(edge_r)
				{
					verbose!(params, "Skip");
					return VertType::Skip;
				}

				self.edges[edge_r].south = vert;
				self.edges[edge_l].south = vert;
				self.verts[vert].edge_r = Some(edge_r);
				self.verts[vert].edge_l = Some(edge_l);
				self.link_edges(l_linked, r_linked);

				if self.edges.next(edge_r) == Some(edge_l) {
					// facing in
					verbose!(params, "End");
					VertType::End
				} else {
					// facing out
					verbose!(params, "Merge");
					VertType::Merge
				}
			} else {
				let Some(bwd_edge) = self.verts[v_right].edge_l else {
					verbose!(params, "Skip");
					return VertType::Skip;
				};
				if let Some(fwd_edge) = self.edges.next(bwd_edge) {
					let fwd_north = self.verts[self.edges[fwd_edge].south].right;
					if !self.is_past(vert, v_right)
						&& !self.is_past(fwd_north, vert)
						&& self.is_past(vert, self.edges[fwd_edge].south)
						&& self.verts[vert].pos.x > self.verts[fwd_north].pos.x + self.precision
					{
						verbose!(params, "Skip backward edge");
						return VertType::Skip;
					}
				}
				self.update_edge(bwd_edge, vert);
				verbose!(params, "Backward");
				VertType::Backward
			}
		} else if self.verts[v_left].processed() {
			let Some(fwd_edge) = self.verts[v_left].edge_r else {
				verbose!(params, "Skip");
				return VertType::Skip;
			};
			if let Some(bwd_edge) = self.edges.prev(fwd_edge) {
				let bwd_north = self.verts[self.edges[bwd_edge].south].left;
				if !self.is_past(vert, v_left)
					&& !self.is_past(bwd_north, vert)
					&& self.is_past(vert, self.edges[bwd_edge].south)
					&& self.verts[vert].pos.x < self.verts[bwd_north].pos.x - self.precision
				{
					verbose!(params, "Skip forward edge");
					return VertType::Skip;
				}
			}
			self.update_edge(fwd_edge, vert);
			verbose!(params, "Forward");
			VertType::Forward
		} else {
			verbose!(params, "Start");
			VertType::Start
		}
	}

	///Remove this edge and its pair to the east, but save them and mark the
	///edge they were next to. When the reverse sweep happens, the pair will be
	///placed next to its last neighbor instead of using geometry.
	fn remove_pair(&mut self, west_edge: usize) {
		let east_edge = self
			.edges
			.next(west_edge)
			.expect("retired pair is list-adjacent");
		let next_east = self.edges.next(east_edge);
		self.edges[west_edge].next = next_east;
		self.edges[east_edge].next = next_east;
		self.edges
			.splice_before(&mut self.inactive, None, &mut self.active, west_edge);
		self.edges
			.splice_before(&mut self.inactive, None, &mut self.active, east_edge);
	}

	///Finds where vert fits in the active edge list, taking the winding of the
	///vert's own corner into account. An ambiguous corner within precision is
	///inverted to agree with the list; an unambiguous corner in an invalid
	///slot shifts one slot in whichever direction is still consistent, or
	///defers the vert entirely.
	fn place_start(&mut self, vert: usize) -> VertType {
		let mut east_edge = self.active.head();
		while let Some(edge) = east_edge {
			if self.east_of(edge, vert, 0.0) > 0 {
				break;
			}
			east_edge = self.edges.next(edge);
		}

		let v_left = self.verts[self.verts[vert].left].pos;
		let v_pos = self.verts[vert].pos;
		let v_right = self.verts[self.verts[vert].right].pos;
		let mut is_hole = ccw(v_left, v_pos, v_right, 0.0) < 0;
		let hole_certain = ccw(v_left, v_pos, v_right, self.precision) != 0;
		let should_be_start = match east_edge {
			Some(edge) => !self.edges[edge].forward,
			None => true,
		};

		if is_hole == should_be_start {
			// invalid
			if !hole_certain {
				is_hole = !is_hole;
			} else {
				// shift to a valid position
				let west_neighbor = match east_edge {
					Some(edge) => self.edges.prev(edge),
					None => self.active.tail(),
				};
				if let Some(east) =
					east_edge.filter(|&edge| self.east_of(edge, vert, self.precision) <= 0)
				{
					east_edge = self.edges.next(east);
				} else if let Some(west) =
					west_neighbor.filter(|&west| self.east_of(west, vert, self.precision) >= 0)
				{
					east_edge = Some(west);
				} else {
					return VertType::Skip;
				}
			}
		}

		let east_certain = match east_edge {
			Some(edge) => self.east_of(edge, vert, self.precision) > 0,
			None => true,
		};
		let new_east_edge = self.edges.alloc(Edge {
			south: vert,
			linked: None,
			next: None,
			forward: !is_hole,
			flipped: false,
			east_certain,
		});
		self.edges
			.insert_before(&mut self.active, east_edge, new_east_edge);
		let new_west_edge = self.edges.alloc(Edge {
			south: vert,
			linked: None,
			next: None,
			forward: is_hole,
			flipped: false,
			east_certain: hole_certain,
		});
		self.edges
			.insert_before(&mut self.active, Some(new_east_edge), new_west_edge);

		self.verts[vert].edge_r = Some(if is_hole { new_west_edge } else { new_east_edge });
		self.verts[vert].edge_l = Some(if is_hole { new_east_edge } else { new_west_edge });
		self.link_edges(new_east_edge, new_west_edge);
		VertType::Start
	}

	///This function sweeps forward (South to North) keeping track of the
	///monotones and reordering degenerates (monotone ordering in the
	///x-direction and sweep line ordering in the y-direction). The polygon
	///loops are not changed during this process. Returns true if the sweep was
	///abandoned due to an overlap.
	fn sweep_forward(&mut self, params: &ExecutionParams) -> Result<bool, PolygonError> {
		// Queue of attached-but-unprocessed verts; the Reverse makes the heap
		// pop its minimum (y, then x) element.
		let mut next_attached: BinaryHeap<Reverse<SweepKey>> = BinaryHeap::new();

		let mut starts = Vec::new();
		let mut v = self.ring.head();
		while let Some(vert) = v {
			if self.is_start(vert) {
				starts.push(vert);
			}
			v = self.verts.next(vert);
		}
		{
			// Reversed so that the minimum element is at starts.last().
			let verts = &self.verts;
			starts.par_sort_unstable_by_key(|&vert| {
				let pos = verts[vert].pos;
				(
					Reverse(OrderedF32(pos.y)),
					Reverse(OrderedF32(pos.x)),
					vert,
				)
			});
		}

		let mut skipped = Vec::new();
		let mut insert_at = self.ring.head();

		while let Some(cursor) = insert_at {
			// fallback for completely degenerate polygons that have no starts.
			let prefer_queue = match next_attached.peek() {
				Some(&Reverse(SweepKey(_, _, queued))) => match starts.last() {
					// Prefer neighbors, which may process starts without
					// needing a new pair.
					Some(&next_start) => !self.is_past(queued, next_start),
					None => true,
				},
				None => false,
			};
			let vert = if prefer_queue {
				match next_attached.pop() {
					Some(Reverse(SweepKey(_, _, queued))) => queued,
					None => cursor,
				}
			} else if let Some(next_start) = starts.pop() {
				// Create a new pair with the next vert from the sorted starts.
				next_start
			} else {
				insert_at = self.verts.next(cursor);
				cursor
			};

			if self.verts[vert].processed() {
				continue;
			}

			verbose!(params, "mesh_idx = {}", self.verts[vert].mesh_idx);

			overlap_assert!(
				params,
				skipped.last().map_or(true, |&skip| !self.is_past(vert, skip)),
				"Not Geometrically Valid! None of the skipped verts is valid."
			);

			let mut vert_type = self.process_vert(vert, params);
			if vert_type == VertType::Start {
				vert_type = self.place_start(vert);
			}

			if vert_type == VertType::Skip {
				overlap_assert!(
					params,
					insert_at.map_or(false, |at| self.verts.next(at).is_some()),
					"Not Geometrically Valid! Tried to skip final vert."
				);
				overlap_assert!(
					params,
					!next_attached.is_empty() || !starts.is_empty(),
					"Not Geometrically Valid! Tried to skip last queued vert."
				);
				skipped.push(vert);
				verbose!(params, "Skipping vert");
				continue;
			}

			if Some(vert) == insert_at {
				insert_at = self.verts.next(vert);
			} else {
				self.verts.move_before(&mut self.ring, insert_at, vert);
			}

			match vert_type {
				VertType::Backward => {
					next_attached.push(sweep_key(&self.verts, self.verts[vert].left));
				}
				VertType::Forward => {
					next_attached.push(sweep_key(&self.verts, self.verts[vert].right));
				}
				VertType::Start => {
					next_attached.push(sweep_key(&self.verts, self.verts[vert].left));
					next_attached.push(sweep_key(&self.verts, self.verts[vert].right));
				}
				VertType::Merge => {
					let edge_l = self.verts[vert].edge_l.expect("merge vert has edges");
					self.remove_pair(edge_l);
				}
				VertType::End => {
					let edge_r = self.verts[vert].edge_r.expect("end vert has edges");
					self.remove_pair(edge_r);
				}
				VertType::Skip => unreachable!(),
			}

			self.verts[vert].set_processed(true);
			// Push skipped verts back into the unprocessed queue.
			while let Some(skip) = skipped.pop() {
				starts.push(skip);
			}

			if params.verbose {
				self.list_active();
			}
		}
		Ok(false)
	}

	///This is the only function that actually changes the polygon loops; all
	///the rest is bookkeeping. This divides polygons by connecting two verts.
	///It duplicates these verts to break the polygons, then attaches them
	///across to each other with two new edges.
	fn split_verts(&mut self, north: usize, south: usize, params: &ExecutionParams) -> usize {
		// at split events, add duplicate vertices and reconnect
		verbose!(
			params,
			"split from {} to {}",
			self.verts[north].mesh_idx,
			self.verts[south].mesh_idx
		);

		let north_east = self.verts.alloc(self.verts[north].clone());
		self.verts
			.insert_before(&mut self.ring, Some(north), north_east);
		self.link(self.verts[north].left, north_east);
		self.verts[north_east].set_processed(true);

		let south_east = self.verts.alloc(self.verts[south].clone());
		let after_south = self.verts.next(south);
		self.verts
			.insert_before(&mut self.ring, after_south, south_east);
		self.link(south_east, self.verts[south].right);
		self.verts[south_east].set_processed(true);

		self.link(south, north);
		self.link(north_east, south_east);

		north_east
	}

	///Realizes the split that west_edge was marked with, if any.
	fn check_split(&mut self, vert: usize, west_edge: usize, params: &ExecutionParams) -> usize {
		if let Some(marked) = self.edges[west_edge].next {
			let south = self.edges[marked].south;
			let vert = self.split_verts(vert, south, params);
			self.edges[west_edge].next = None; // unmark merge
			vert
		} else {
			vert
		}
	}

	///This function sweeps back, splitting the input polygons into monotone
	///polygons without doing a single geometric calculation. Instead
	///everything is based on the topology saved from the forward sweep,
	///primarily the relative ordering of new monotones. Even though the sweep
	///is going back, the polygon is considered rotated, so we still refer to
	///sweeping from South to North and the pairs as ordered from West to East
	///(though this is now the opposite order from the forward sweep).
	fn sweep_back(&mut self, params: &ExecutionParams) -> Result<bool, PolygonError> {
		let mut v = self.ring.head();
		while let Some(vert) = v {
			self.verts[vert].set_processed(false);
			v = self.verts.next(vert);
		}

		let mut at: Option<usize> = None;
		loop {
			let step = match at {
				None => self.ring.tail(),
				Some(vert) => self.verts.prev(vert),
			};
			let Some(mut vert) = step else { break };

			if self.verts[vert].processed() {
				at = Some(vert);
				continue;
			}

			verbose!(params, "mesh_idx = {}", self.verts[vert].mesh_idx);

			let vert_type = self.process_vert(vert, params);
			overlap_assert!(
				params,
				vert_type != VertType::Skip,
				"Skip should not happen on reverse sweep!"
			);

			match vert_type {
				VertType::Merge => {
					let edge_r = self.verts[vert].edge_r.expect("merge vert has edges");
					vert = self.check_split(vert, edge_r, params);
					let edge_l = self.verts[vert].edge_l.expect("merge vert has edges");
					let Some(west_of) = self.edges.prev(edge_l) else {
						overlap_assert!(params, false, "Merge has no westward neighbor!");
						unreachable!()
					};
					self.check_split(vert, west_of, params);
					self.edges[west_of].next = Some(edge_l);
				}
				VertType::End => {
					let edge_r = self.verts[vert].edge_r.expect("end vert has edges");
					self.check_split(vert, edge_r, params);
				}
				_ => {}
			}

			match vert_type {
				VertType::Merge | VertType::End => {
					let edge_r = self.verts[vert].edge_r.expect("closed vert has edges");
					let edge_l = self.verts[vert].edge_l.expect("closed vert has edges");
					self.edges
						.splice_before(&mut self.inactive, None, &mut self.active, edge_r);
					self.edges
						.splice_before(&mut self.inactive, None, &mut self.active, edge_l);
				}
				VertType::Forward => {
					let edge_l = self.verts[vert].edge_l.expect("forward vert has edges");
					if let Some(west_of) = self.edges.prev(edge_l) {
						self.check_split(vert, west_of, params);
					}
				}
				VertType::Backward => {
					let edge_r = self.verts[vert].edge_r.expect("backward vert has edges");
					self.check_split(vert, edge_r, params);
				}
				VertType::Start => {
					// Due to sweeping in the opposite direction, east and west
					// are swapped and what was the next pair is now the
					// previous pair and begin and end are swapped.
					let mut west_edge = self.verts[vert].edge_l.expect("start vert has edges");
					let mut east_edge = self.verts[vert].edge_r.expect("start vert has edges");
					let mut east_of = self.edges[west_edge].next;

					if self.edges.next(east_edge) == Some(west_edge) {
						std::mem::swap(&mut east_edge, &mut west_edge);
					}

					if !self.edges[west_edge].flipped {
						std::mem::swap(&mut west_edge, &mut east_edge);
						east_of = match east_of {
							None => self.active.head(),
							Some(edge) => self.edges.next(edge),
						};
					}

					self.edges
						.splice_before(&mut self.active, east_of, &mut self.inactive, east_edge);
					self.edges.splice_before(
						&mut self.active,
						Some(east_edge),
						&mut self.inactive,
						west_edge,
					);
					self.edges[west_edge].forward ^= true;
					self.edges[east_edge].forward ^= true;
					let is_hole = self.edges[west_edge].forward;

					if is_hole {
						let Some(west_of) = self.edges.prev(west_edge) else {
							overlap_assert!(params, false, "Hole has no enclosing monotone!");
							unreachable!()
						};
						let split = match self.edges[west_of].next {
							Some(marked) => self.edges[marked].south,
							None => {
								let west_south = self.edges[west_of].south;
								match east_of {
									Some(east) => {
										let east_south = self.edges[east].south;
										if self.verts[west_south].pos.y
											< self.verts[east_south].pos.y
										{
											east_south
										} else {
											west_south
										}
									}
									None => west_south,
								}
							}
						};
						let east_vert = self.split_verts(vert, split, params);
						self.edges[west_of].next = None;
						self.update_edge(east_edge, east_vert);
						self.update_edge(west_edge, vert);
					} else {
						self.verts[vert].edge_l = Some(west_edge);
						self.verts[vert].edge_r = Some(east_edge);
					}
					self.edges[west_edge].next = None;
					self.edges[east_edge].next = None;
				}
				VertType::Skip => unreachable!(),
			}

			self.verts[vert].set_processed(true);

			if params.verbose {
				self.list_active();
			}

			at = Some(vert);
		}
		Ok(false)
	}

	fn list_edge(&self, edge: usize) {
		let e = &self.edges[edge];
		println!(
			"{}: S = {}, N = {}{}{}",
			if e.forward { "Fwd" } else { "Bwd" },
			self.verts[e.south].mesh_idx,
			self.verts[self.north(edge)].mesh_idx,
			if e.next.is_none() { " none" } else { " next" },
			if e.east_certain {
				" certain"
			} else {
				" uncertain"
			}
		);
	}

	fn list_active(&self) {
		println!("active edges:");
		let mut e = self.active.head();
		while let Some(edge) = e {
			self.list_edge(edge);
			e = self.edges.next(edge);
		}
	}
}

///Min-ordering key for the queue of attached verts: ascending y, ties broken
///by x and finally by arena index for determinism.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct SweepKey(OrderedF32, OrderedF32, usize);

fn sweep_key(verts: &LinkedArena<VertAdj>, vert: usize) -> Reverse<SweepKey> {
	let pos = verts[vert].pos;
	Reverse(SweepKey(OrderedF32(pos.y), OrderedF32(pos.x), vert))
}

///This takes sequential verts of a monotone polygon and outputs a
///geometrically valid triangulation, step by step.
struct Triangulator {
	reflex_chain: Vec<usize>,
	/// The end vertex across from the reflex chain.
	other_side: usize,
	/// The side the reflex chain is on.
	on_right: bool,
	triangles_output: i32,
	precision: f32,
}

impl Triangulator {
	fn new(vert: usize, precision: f32) -> Self {
		Self {
			reflex_chain: vec![vert],
			other_side: vert,
			on_right: false,
			triangles_output: 0,
			precision,
		}
	}

	fn num_triangles(&self) -> i32 {
		self.triangles_output
	}

	///The vert, vi, must attach to the free end (specified by on_right) of the
	///polygon that has been input so far. The verts must also be processed in
	///sweep-line order to get a geometrically valid result. If not, then the
	///polygon is not monotone, as the result should be topologically valid,
	///but not geometrically. The parameter, last, must be set true only for
	///the final point, as this ensures the last triangle is output.
	fn process_vert(
		&mut self,
		verts: &LinkedArena<VertAdj>,
		vi: usize,
		on_right: bool,
		last: bool,
		triangles: &mut Vec<Vector3<i32>>,
		params: &ExecutionParams,
	) {
		let mut v_top = *self.reflex_chain.last().expect("reflex chain is never empty");
		if self.reflex_chain.len() < 2 {
			self.reflex_chain.push(vi);
			self.on_right = on_right;
			return;
		}
		self.reflex_chain.pop();
		let mut vj = *self.reflex_chain.last().expect("chain had two verts");
		if self.on_right == on_right && !last {
			// This only creates enough triangles to ensure the reflex chain is
			// still reflex.
			verbose!(params, "same chain");
			let convex = if self.on_right { 1 } else { -1 };
			let mut c = ccw(verts[vi].pos, verts[vj].pos, verts[v_top].pos, self.precision);
			while c == convex || c == 0 {
				self.add_triangle(verts, triangles, vi, vj, v_top, params);
				v_top = vj;
				self.reflex_chain.pop();
				let Some(&next) = self.reflex_chain.last() else {
					break;
				};
				vj = next;
				c = ccw(verts[vi].pos, verts[vj].pos, verts[v_top].pos, self.precision);
			}
			self.reflex_chain.push(v_top);
			self.reflex_chain.push(vi);
		} else {
			// This branch empties the reflex chain and switches sides. It must
			// be used for the last point, as it will output all the triangles
			// regardless of geometry.
			verbose!(params, "different chain");
			self.on_right = !self.on_right;
			let mut v_last = v_top;
			while let Some(&vj) = self.reflex_chain.last() {
				self.add_triangle(verts, triangles, vi, v_last, vj, params);
				v_last = vj;
				self.reflex_chain.pop();
			}
			self.reflex_chain.push(v_top);
			self.reflex_chain.push(vi);
			self.other_side = v_top;
		}
	}

	fn add_triangle(
		&mut self,
		verts: &LinkedArena<VertAdj>,
		triangles: &mut Vec<Vector3<i32>>,
		v0: usize,
		v1: usize,
		v2: usize,
		params: &ExecutionParams,
	) {
		let (v1, v2) = if self.on_right { (v1, v2) } else { (v2, v1) };
		triangles.push(Vector3::new(
			verts[v0].mesh_idx,
			verts[v1].mesh_idx,
			verts[v2].mesh_idx,
		));
		self.triangles_output += 1;
		verbose!(
			params,
			"({}, {}, {})",
			verts[v0].mesh_idx,
			verts[v1].mesh_idx,
			verts[v2].mesh_idx
		);
	}
}

fn triangulate_idx_inner(
	polys: &PolygonsIdx,
	precision: f32,
	params: &ExecutionParams,
	triangles: &mut Vec<Vector3<i32>>,
) -> Result<(), PolygonError> {
	let mut monotones = Monotones::new(polys, precision, params)?;
	monotones.triangulate(triangles, params)?;
	if params.intermediate_checks {
		verify::check_topology_triangles(triangles, polys)?;
		if !params.process_overlaps {
			verify::check_geometry(triangles, polys, 2.0 * monotones.precision())?;
		}
	}
	Ok(())
}

///@brief Triangulates a set of &epsilon;-valid polygons with explicit
///execution parameters. If the input is not &epsilon;-valid, the
///triangulation may overlap, but will always return a manifold result that
///matches the input edge directions.
///
///@param polys The set of polygons, wound CCW and representing multiple
///polygons and/or holes. These have 2D-projected positions as well as
///references back to the original vertices.
///@param precision The value of &epsilon;, bounding the uncertainty of the
///input; a negative value selects automatic precision from the input bounds.
///@param params Verbosity, checking, and overlap handling for this call.
///@return The triangles, referencing the original vertex indices.
pub fn triangulate_idx_with(
	polys: &PolygonsIdx,
	precision: f32,
	params: &ExecutionParams,
) -> Result<Vec<Vector3<i32>>, PolygonError> {
	let mut triangles = Vec::new();
	match triangulate_idx_inner(polys, precision, params, &mut triangles) {
		Ok(()) => Ok(triangles),
		Err(err) => {
			if !params.suppress_errors {
				verify::print_failure(&err, polys, &triangles, precision);
			}
			Err(err)
		}
	}
}

///@brief Triangulates a set of &epsilon;-valid polygons. If the input is not
///&epsilon;-valid, the triangulation may overlap, but will always return a
///manifold result that matches the input edge directions.
///
///@param polys The set of polygons, wound CCW and representing multiple
///polygons and/or holes. These have 2D-projected positions as well as
///references back to the original vertices.
///@param precision The value of &epsilon;, bounding the uncertainty of the
///input; a negative value selects automatic precision from the input bounds.
///@return The triangles, referencing the original vertex indices.
pub fn triangulate_idx(
	polys: &PolygonsIdx,
	precision: f32,
) -> Result<Vec<Vector3<i32>>, PolygonError> {
	triangulate_idx_with(polys, precision, &ExecutionParams::default())
}

///@brief Triangulates a set of &epsilon;-valid polygons with explicit
///execution parameters, assigning vertex indices sequentially across all
///polygons in traversal order.
///
///@param polygons The set of polygons, wound CCW and representing multiple
///polygons and/or holes.
///@param precision The value of &epsilon;, bounding the uncertainty of the
///input; a negative value selects automatic precision from the input bounds.
///@param params Verbosity, checking, and overlap handling for this call.
///@return The triangles, referencing the polygon points in order.
pub fn triangulate_with(
	polygons: &Polygons,
	precision: f32,
	params: &ExecutionParams,
) -> Result<Vec<Vector3<i32>>, PolygonError> {
	let mut idx: i32 = 0;
	let mut polygons_indexed = PolygonsIdx::default();
	for poly in polygons.iter() {
		let mut simple_indexed = SimplePolygonIdx::default();
		for poly_vert in poly.iter() {
			simple_indexed.push(PolyVert {
				pos: *poly_vert,
				idx,
			});
			idx += 1;
		}
		polygons_indexed.push(simple_indexed);
	}
	triangulate_idx_with(&polygons_indexed, precision, params)
}

///@brief Triangulates a set of &epsilon;-valid polygons, assigning vertex
///indices sequentially across all polygons in traversal order.
///
///@param polygons The set of polygons, wound CCW and representing multiple
///polygons and/or holes.
///@param precision The value of &epsilon;, bounding the uncertainty of the
///input; a negative value selects automatic precision from the input bounds.
///@return The triangles, referencing the polygon points in order.
pub fn triangulate(polygons: &Polygons, precision: f32) -> Result<Vec<Vector3<i32>>, PolygonError> {
	triangulate_with(polygons, precision, &ExecutionParams::default())
}
