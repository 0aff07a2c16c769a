//! Serial implementation of BSP operations

use crate::float_types::{Real, tolerance};
use crate::mesh::bsp::node::Node;
use crate::mesh::bsp::traits::{BspOps, FirstPolygonStrategy, SplittingPlaneStrategy};
use crate::mesh::polygon::Polygon;

/// Serial implementation of BSP operations
#[derive(Debug, Clone)]
pub struct SerialBspOps<SP: SplittingPlaneStrategy = FirstPolygonStrategy> {
    splitting_strategy: SP,
    epsilon: Real,
}

impl SerialBspOps<FirstPolygonStrategy> {
    pub fn new() -> Self {
        Self::with_strategy(FirstPolygonStrategy)
    }
}

impl Default for SerialBspOps<FirstPolygonStrategy> {
    fn default() -> Self {
        Self::new()
    }
}

impl<SP: SplittingPlaneStrategy> SerialBspOps<SP> {
    pub fn with_strategy(strategy: SP) -> Self {
        Self {
            splitting_strategy: strategy,
            epsilon: tolerance(),
        }
    }

    /// Override the classification tolerance for this instance only.
    pub fn with_tolerance(mut self, epsilon: Real) -> Self {
        self.epsilon = epsilon;
        self
    }
}

impl<SP: SplittingPlaneStrategy> BspOps for SerialBspOps<SP> {
    fn invert(&self, node: &mut Node) {
        // Use iterative approach with a stack
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            // Flip all polygons and plane in this node
            current.polygons.iter_mut().for_each(Polygon::flip);
            if let Some(ref mut plane) = current.plane {
                plane.flip();
            }

            // Swap front and back
            std::mem::swap(&mut current.front, &mut current.back);

            if let Some(ref mut front) = current.front {
                stack.push(front.as_mut());
            }
            if let Some(ref mut back) = current.back {
                stack.push(back.as_mut());
            }
        }
    }

    fn clip_polygons(&self, node: &Node, polygons: &[Polygon]) -> Vec<Polygon> {
        // An empty leaf keeps everything
        let Some(plane) = node.plane.as_ref() else {
            return polygons.to_vec();
        };

        let mut front_polys = Vec::with_capacity(polygons.len());
        let mut back_polys = Vec::with_capacity(polygons.len());

        for polygon in polygons {
            let (coplanar_front, coplanar_back, front_parts, back_parts) =
                plane.split_polygon_with_tolerance(polygon, self.epsilon);

            front_polys.extend(coplanar_front);
            front_polys.extend(front_parts);
            back_polys.extend(coplanar_back);
            back_polys.extend(back_parts);
        }

        // Front fragments survive unless a front subtree removes them,
        // back fragments survive only if a back subtree keeps them
        let mut result = match node.front.as_deref() {
            Some(front) => self.clip_polygons(front, &front_polys),
            None => front_polys,
        };

        if let Some(back) = node.back.as_deref() {
            result.extend(self.clip_polygons(back, &back_polys));
        }

        result
    }

    fn clip_to(&self, node: &mut Node, other: &Node) {
        node.polygons = self.clip_polygons(other, &node.polygons);

        if let Some(ref mut front) = node.front {
            self.clip_to(front, other);
        }

        if let Some(ref mut back) = node.back {
            self.clip_to(back, other);
        }
    }

    fn all_polygons(&self, node: &Node) -> Vec<Polygon> {
        let mut result = Vec::new();
        let mut stack = vec![node];

        // Pre-order: this node, then the whole front subtree, then the back subtree
        while let Some(current) = stack.pop() {
            result.extend_from_slice(&current.polygons);

            if let Some(back) = current.back.as_deref() {
                stack.push(back);
            }
            if let Some(front) = current.front.as_deref() {
                stack.push(front);
            }
        }
        result
    }

    fn build(&self, node: &mut Node, polygons: &[Polygon]) {
        if polygons.is_empty() {
            return;
        }

        // Choose the splitting plane if not already set
        let plane = *node
            .plane
            .get_or_insert_with(|| self.splitting_strategy.pick_splitting_plane(polygons));

        let mut front = Vec::with_capacity(polygons.len() / 2);
        let mut back = Vec::with_capacity(polygons.len() / 2);

        for polygon in polygons {
            let (coplanar_front, coplanar_back, front_parts, back_parts) =
                plane.split_polygon_with_tolerance(polygon, self.epsilon);

            node.polygons.extend(coplanar_front);
            node.polygons.extend(coplanar_back);
            front.extend(front_parts);
            back.extend(back_parts);
        }

        // Build child nodes using lazy initialization pattern
        if !front.is_empty() {
            let child = node.front.get_or_insert_with(|| Box::new(Node::new()));
            self.build(child, &front);
        }

        if !back.is_empty() {
            let child = node.back.get_or_insert_with(|| Box::new(Node::new()));
            self.build(child, &back);
        }
    }
}
