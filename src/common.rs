use nalgebra::{Point2, Vector2};
use std::cmp::Ordering;

pub type SimplePolygon = Vec<Point2<f32>>;
pub type Polygons = Vec<SimplePolygon>;

///Axis-aligned 2D box, primarily for bounding.
#[derive(Clone, Copy, Debug)]
pub struct Rect {
	pub min: Point2<f32>,
	pub max: Point2<f32>,
}

impl Default for Rect {
	///Default constructor is an infinite box that contains all space.
	fn default() -> Self {
		Self {
			min: Point2::new(f32::INFINITY, f32::INFINITY),
			max: Point2::new(f32::NEG_INFINITY, f32::NEG_INFINITY),
		}
	}
}

impl Rect {
	pub fn new(a: Point2<f32>, b: Point2<f32>) -> Rect {
		Rect {
			min: a.inf(&b),
			max: a.sup(&b),
		}
	}

	///Returns the dimensions of the rectangle.
	pub fn size(&self) -> Vector2<f32> {
		self.max - self.min
	}

	///Returns the absolute-largest coordinate value of any contained point.
	pub fn scale(&self) -> f32 {
		self.min.coords.abs().sup(&self.max.coords.abs()).max()
	}

	///Does this rectangle contain (includes on border) the given point?
	pub fn contains(&self, p: &Point2<f32>) -> bool {
		p.x >= self.min.x && p.y >= self.min.y && p.x <= self.max.x && p.y <= self.max.y
	}

	///Expand this rectangle (in place) to include the given point.
	pub fn union(&mut self, p: Point2<f32>) {
		self.min = self.min.inf(&p);
		self.max = self.max.sup(&p);
	}
}

///Per-call triangulation settings, threaded through the sweep and the
///triangulator by reference so that concurrent calls can use distinct
///configurations.
#[derive(Clone, Copy, Debug)]
pub struct ExecutionParams {
	/// Emit diagnostic traces while sweeping.
	pub verbose: bool,
	/// Run the cross-sweep sanity checks and post-triangulation verification.
	pub intermediate_checks: bool,
	/// Downgrade overlap detections from an error into a soft failure that
	/// still returns a manifold (but possibly inverted) triangulation.
	pub process_overlaps: bool,
	/// Suppress the diagnostic dump printed on failure.
	pub suppress_errors: bool,
}

impl Default for ExecutionParams {
	fn default() -> Self {
		Self {
			verbose: false,
			intermediate_checks: false,
			process_overlaps: true,
			suppress_errors: false,
		}
	}
}

pub struct OrderedF32(pub f32);

impl Ord for OrderedF32 {
	fn cmp(&self, other: &Self) -> Ordering {
		self.0.total_cmp(&other.0)
	}
}

impl PartialOrd for OrderedF32 {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Eq for OrderedF32 {}

impl PartialEq for OrderedF32 {
	fn eq(&self, other: &Self) -> bool {
		self.0.total_cmp(&other.0) == Ordering::Equal
	}
}
