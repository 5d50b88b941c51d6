use nalgebra::Point2;

///Relative tolerance applied to the largest input coordinate when the caller
///does not supply a precision of their own.
pub const K_TOLERANCE: f32 = 1.0 / 8192.0;

///Determines if the three points are wound counter-clockwise, clockwise, or
///colinear within the specified tolerance.
///
///@param p0 First point
///@param p1 Second point
///@param p2 Third point
///@param tol Tolerance value for colinearity: the result is 0 whenever the
///altitude of the triangle is within tol of zero.
///@return int, like Signum, this returns 1 for CCW, -1 for CW, and 0 if within
///tol of colinear.
#[inline]
pub fn ccw(p0: Point2<f32>, p1: Point2<f32>, p2: Point2<f32>, tol: f32) -> i32 {
	let v1 = p1 - p0;
	let v2 = p2 - p0;
	let area = v1.x * v2.y - v1.y * v2.x;
	let base2 = v1.magnitude_squared().max(v2.magnitude_squared());
	if area * area <= base2 * tol * tol {
		0
	} else if area > 0.0 {
		1
	} else {
		-1
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn ccw_signs() {
		let a = Point2::new(0.0, 0.0);
		let b = Point2::new(1.0, 0.0);
		let c = Point2::new(0.0, 1.0);
		assert_eq!(ccw(a, b, c, 0.0), 1);
		assert_eq!(ccw(a, c, b, 0.0), -1);
		// Swapping the last two arguments flips the sign exactly.
		let d = Point2::new(0.3, 0.7);
		assert_eq!(ccw(a, b, d, 1e-4), -ccw(a, d, b, 1e-4));
	}

	#[test]
	fn ccw_tolerance_zone() {
		let a = Point2::new(0.0, 0.0);
		let b = Point2::new(1.0, 0.0);
		// Altitude 1e-6 over a unit base is colinear at tol 1e-4 but not at 1e-8.
		let c = Point2::new(0.5, 1e-6);
		assert_eq!(ccw(a, b, c, 1e-4), 0);
		assert_eq!(ccw(a, b, c, 1e-8), 1);
		// Coincident points are colinear at any tolerance.
		assert_eq!(ccw(a, a, a, 0.0), 0);
	}
}
