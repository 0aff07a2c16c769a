//! Struct and functions for working with `Vertex`s from which `Polygon`s are composed.

use crate::float_types::Real;
use nalgebra::{Point3, Vector2, Vector3};

/// A vertex of a polygon, holding position, normal and optional
/// texture coordinate and color.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub pos: Point3<Real>,
    pub normal: Vector3<Real>,
    pub uv: Option<Vector2<Real>>,
    pub color: Option<Vector3<Real>>,
}

impl Vertex {
    /// Create a new [`Vertex`].
    ///
    /// * `pos`    – the position in model space
    /// * `normal` – (optionally non‑unit) normal; it will be **copied
    ///   verbatim**, so make sure it is oriented the way
    ///   you need it for lighting.
    pub const fn new(pos: Point3<Real>, normal: Vector3<Real>) -> Self {
        Vertex {
            pos,
            normal,
            uv: None,
            color: None,
        }
    }

    pub fn with_uv(mut self, uv: Vector2<Real>) -> Self {
        self.uv = Some(uv);
        self
    }

    pub fn with_color(mut self, color: Vector3<Real>) -> Self {
        self.color = Some(color);
        self
    }

    /// Flip vertex normal. Position, uv and color are orientation-free.
    pub fn flip(&mut self) {
        self.normal = -self.normal;
    }

    /// Return the linear interpolation between `self` (`t = 0`) and `other` (`t = 1`).
    ///
    /// Normals are linearly interpolated as well. `uv` and `color` are blended
    /// when both ends carry them, otherwise whichever end has one wins.
    pub fn interpolate(&self, other: &Vertex, t: Real) -> Vertex {
        // For positions (Point3): p(t) = p0 + t * (p1 - p0)
        let pos = self.pos + (other.pos - self.pos) * t;

        // For normals (Vector3): n(t) = n0 + t * (n1 - n0)
        let normal = self.normal.lerp(&other.normal, t);

        let uv = match (self.uv, other.uv) {
            (Some(a), Some(b)) => Some(a.lerp(&b, t)),
            (a, b) => a.or(b),
        };
        let color = match (self.color, other.color) {
            (Some(a), Some(b)) => Some(a.lerp(&b, t)),
            (a, b) => a.or(b),
        };

        Vertex {
            pos,
            normal,
            uv,
            color,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.pos.coords.iter().all(|c| c.is_finite())
            && self.normal.iter().all(|c| c.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn flip_only_touches_normal() {
        let mut v = Vertex::new(Point3::new(1.0, 2.0, 3.0), Vector3::x())
            .with_uv(Vector2::new(0.5, 0.5));
        v.flip();
        assert_eq!(v.pos, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(v.normal, -Vector3::x());
        assert_eq!(v.uv, Some(Vector2::new(0.5, 0.5)));
    }

    #[test]
    fn interpolate_blends_every_attribute() {
        let a = Vertex::new(Point3::origin(), Vector3::x())
            .with_uv(Vector2::new(0.0, 0.0))
            .with_color(Vector3::new(1.0, 0.0, 0.0));
        let b = Vertex::new(Point3::new(2.0, 0.0, 0.0), Vector3::y())
            .with_uv(Vector2::new(1.0, 1.0))
            .with_color(Vector3::new(0.0, 0.0, 1.0));

        let mid = a.interpolate(&b, 0.5);
        assert_relative_eq!(mid.pos, Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(mid.normal, Vector3::new(0.5, 0.5, 0.0));
        assert_relative_eq!(mid.uv.unwrap(), Vector2::new(0.5, 0.5));
        assert_relative_eq!(mid.color.unwrap(), Vector3::new(0.5, 0.0, 0.5));
    }

    #[test]
    fn interpolate_keeps_one_sided_attributes() {
        let a = Vertex::new(Point3::origin(), Vector3::z()).with_uv(Vector2::new(0.25, 0.75));
        let b = Vertex::new(Point3::new(0.0, 1.0, 0.0), Vector3::z());
        let mid = a.interpolate(&b, 0.3);
        assert_eq!(mid.uv, Some(Vector2::new(0.25, 0.75)));
        assert_eq!(mid.color, None);
    }
}
