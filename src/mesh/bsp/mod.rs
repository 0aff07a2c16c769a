//! Binary Space Partitioning (BSP) tree implementation
//!
//! The algorithms live behind the [`BspOps`] trait so the splitting-plane
//! strategy can be swapped; [`Node`]'s inherent methods use the default
//! [`SerialBspOps`].

pub mod node;
pub mod serial;
pub mod traits;

pub use node::Node;
pub use serial::SerialBspOps;
pub use traits::{BalancedSplittingStrategy, BspOps, FirstPolygonStrategy, SplittingPlaneStrategy};

use crate::mesh::polygon::Polygon;

impl Node {
    /// Creates a new BSP node from polygons
    pub fn from_polygons(polygons: &[Polygon]) -> Self {
        let mut node = Self::new();
        if !polygons.is_empty() {
            node.build(polygons);
        }
        node
    }

    /// Invert all polygons in the BSP tree
    pub fn invert(&mut self) {
        SerialBspOps::new().invert(self);
    }

    /// Recursively remove all polygons that are inside this BSP tree
    pub fn clip_polygons(&self, polygons: &[Polygon]) -> Vec<Polygon> {
        SerialBspOps::new().clip_polygons(self, polygons)
    }

    /// Remove all polygons in this BSP tree that are inside the other BSP tree
    pub fn clip_to(&mut self, bsp: &Node) {
        SerialBspOps::new().clip_to(self, bsp);
    }

    /// Return all polygons in this BSP tree
    pub fn all_polygons(&self) -> Vec<Polygon> {
        SerialBspOps::new().all_polygons(self)
    }

    /// Build a BSP tree from the given polygons
    pub fn build(&mut self, polygons: &[Polygon]) {
        SerialBspOps::new().build(self, polygons);
    }
}
