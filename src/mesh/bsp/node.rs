//! BSP tree node data structure

use crate::float_types::Real;
use crate::mesh::plane::Plane;
use crate::mesh::polygon::Polygon;
use nalgebra::Point3;

/// A BSP tree node, containing polygons plus optional front/back subtrees
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Splitting plane for this node *or* **None** for an empty leaf.
    pub plane: Option<Plane>,

    /// Polygons in *front* half‑spaces.
    pub front: Option<Box<Node>>,

    /// Polygons in *back* half‑spaces.
    pub back: Option<Box<Node>>,

    /// Polygons that lie on `plane` (after the node has been built).
    pub polygons: Vec<Polygon>,
}

impl Node {
    /// Create a new empty BSP node
    pub const fn new() -> Self {
        Self {
            plane: None,
            front: None,
            back: None,
            polygons: Vec::new(),
        }
    }

    /// Classify a point against the solid this tree bounds.
    ///
    /// Falling off the front of a node with no front child means empty space,
    /// falling off the back of a node with no back child means solid. Points
    /// on a splitting plane count as in front of it.
    pub fn contains_point(&self, point: &Point3<Real>) -> bool {
        let mut node = self;
        loop {
            let Some(plane) = node.plane.as_ref() else {
                return false;
            };
            if plane.signed_distance(point) >= 0.0 {
                match node.front.as_deref() {
                    Some(front) => node = front,
                    None => return false,
                }
            } else {
                match node.back.as_deref() {
                    Some(back) => node = back,
                    None => return true,
                }
            }
        }
    }

    /// Depth of the tree; an empty leaf has depth 0.
    pub fn depth(&self) -> usize {
        if self.plane.is_none() {
            return 0;
        }
        let front = self.front.as_ref().map_or(0, |n| n.depth());
        let back = self.back.as_ref().map_or(0, |n| n.depth());
        1 + front.max(back)
    }
}
