//! Welding of coplanar loops in the plane's 2D frame.
//!
//! Fragments left by BSP splitting tile a face but rarely share whole edges:
//! a vertex of one fragment often sits in the middle of a neighbour's edge.
//! The loops are put on one vertex pool (points closer than the tolerance
//! are merged), every edge is split at the pool vertices lying on it, and
//! each directed edge cancels against its reverse. What is left is the
//! boundary of the tiled region, traced into rings.

use crate::float_types::Real;
use geo::{Area, Contains, Coord, LineString, Point, Polygon as GeoPolygon};
use hashbrown::HashMap;

type Edge = (usize, usize);

/// Loops indexing a shared vertex pool.
#[derive(Debug, Clone)]
pub(super) struct WeldedLoops {
    points: Vec<Coord<Real>>,
    rings: Vec<Vec<usize>>,
    tolerance: Real,
}

impl WeldedLoops {
    pub(super) fn new(tolerance: Real) -> Self {
        WeldedLoops {
            points: Vec::new(),
            rings: Vec::new(),
            tolerance,
        }
    }

    fn point_index(&mut self, coord: Coord<Real>) -> usize {
        let limit = self.tolerance * self.tolerance;
        if let Some(index) = self
            .points
            .iter()
            .position(|p| distance_squared(*p, coord) <= limit)
        {
            return index;
        }
        self.points.push(coord);
        self.points.len() - 1
    }

    /// Add a loop; repeated points are collapsed and loops with fewer than
    /// three distinct points are ignored.
    pub(super) fn push_ring(&mut self, ring: impl IntoIterator<Item = Coord<Real>>) {
        let mut indices: Vec<usize> = Vec::new();
        for coord in ring {
            let index = self.point_index(coord);
            if indices.last() != Some(&index) {
                indices.push(index);
            }
        }
        while indices.len() > 1 && indices.first() == indices.last() {
            indices.pop();
        }
        if indices.len() >= 3 {
            self.rings.push(indices);
        }
    }

    pub(super) fn ring_count(&self) -> usize {
        self.rings.len()
    }

    // Insert every pool vertex lying strictly inside an edge into that edge
    fn split_t_junctions(&mut self) {
        let points = &self.points;
        let tolerance = self.tolerance;
        for ring in &mut self.rings {
            let mut split = Vec::with_capacity(ring.len());
            for (k, &a) in ring.iter().enumerate() {
                let b = ring[(k + 1) % ring.len()];
                split.push(a);
                let mut inner: Vec<(Real, usize)> = points
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != a && i != b)
                    .filter_map(|(i, p)| {
                        edge_parameter(points[a], points[b], *p, tolerance).map(|t| (t, i))
                    })
                    .collect();
                inner.sort_by(|x, y| x.0.total_cmp(&y.0));
                split.extend(inner.into_iter().map(|(_, i)| i));
            }
            *ring = split;
        }
    }

    fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.rings.iter().flat_map(|ring| {
            let n = ring.len();
            (0..n).map(move |k| (ring[k], ring[(k + 1) % n]))
        })
    }

    /// Directed edges that survive cancellation against their reverse, in
    /// input order.
    fn boundary_edges(&self) -> Vec<Edge> {
        let mut counts: HashMap<Edge, usize> = HashMap::new();
        for edge in self.edges() {
            *counts.entry(edge).or_insert(0) += 1;
        }
        let mut quota: HashMap<Edge, usize> = counts
            .iter()
            .map(|(&(a, b), &n)| {
                let reverse = counts.get(&(b, a)).copied().unwrap_or(0);
                ((a, b), n.saturating_sub(reverse))
            })
            .collect();

        self.edges()
            .filter(|edge| match quota.get_mut(edge) {
                Some(left) if *left > 0 => {
                    *left -= 1;
                    true
                },
                _ => false,
            })
            .collect()
    }

    // Signed turn from direction a->b onto b->c, in (-pi, pi]
    fn turn(&self, a: usize, b: usize, c: usize) -> Real {
        let incoming = self.points[b] - self.points[a];
        let outgoing = self.points[c] - self.points[b];
        let cross = incoming.x * outgoing.y - incoming.y * outgoing.x;
        let dot = incoming.x * outgoing.x + incoming.y * outgoing.y;
        cross.atan2(dot)
    }

    /// Chain boundary edges into closed rings of pool indices.
    ///
    /// Where several boundary edges leave one vertex the sharpest left turn
    /// is taken, so regions touching at a single point come out as separate
    /// rings.
    fn trace_boundary(&self) -> Vec<Vec<usize>> {
        let edges = self.boundary_edges();
        let mut outgoing: HashMap<usize, Vec<usize>> = HashMap::new();
        for (id, &(a, _)) in edges.iter().enumerate() {
            outgoing.entry(a).or_default().push(id);
        }

        let mut used = vec![false; edges.len()];
        let mut rings = Vec::new();
        for first in 0..edges.len() {
            if used[first] {
                continue;
            }
            let start = edges[first].0;
            let mut ring = Vec::new();
            let mut current = first;
            let closed = loop {
                used[current] = true;
                let (a, b) = edges[current];
                ring.push(a);
                if b == start {
                    break true;
                }
                let next = outgoing
                    .get(&b)
                    .into_iter()
                    .flatten()
                    .copied()
                    .filter(|&id| !used[id])
                    .max_by(|&x, &y| {
                        self.turn(a, b, edges[x].1)
                            .total_cmp(&self.turn(a, b, edges[y].1))
                    });
                match next {
                    Some(id) => current = id,
                    None => break false,
                }
            };
            if closed {
                rings.push(ring);
            } else {
                tracing::trace!(points = ring.len(), "dropping open boundary chain");
            }
        }
        rings
    }

    // Remove vertices lying on the segment between their neighbours
    fn drop_collinear(&self, mut ring: Vec<usize>) -> Vec<usize> {
        loop {
            let n = ring.len();
            if n < 3 {
                return ring;
            }
            let redundant = (0..n).find(|&k| {
                let prev = self.points[ring[(k + n - 1) % n]];
                let next = self.points[ring[(k + 1) % n]];
                edge_parameter(prev, next, self.points[ring[k]], self.tolerance).is_some()
            });
            match redundant {
                Some(k) => {
                    ring.remove(k);
                },
                None => return ring,
            }
        }
    }

    /// Merged regions: each counter-clockwise boundary ring with the
    /// clockwise rings it encloses as holes.
    pub(super) fn into_regions(mut self) -> Vec<GeoPolygon<Real>> {
        self.split_t_junctions();
        let min_area = self.tolerance * self.tolerance;

        let mut exteriors: Vec<(Real, LineString<Real>)> = Vec::new();
        let mut holes: Vec<LineString<Real>> = Vec::new();
        for ring in self.trace_boundary() {
            let ring = self.drop_collinear(ring);
            if ring.len() < 3 {
                continue;
            }
            let line = LineString::new(ring.iter().map(|&i| self.points[i]).collect());
            let area = GeoPolygon::new(line.clone(), Vec::new()).signed_area();
            if area > min_area {
                exteriors.push((area, line));
            } else if area < -min_area {
                holes.push(line);
            }
        }

        let shells: Vec<GeoPolygon<Real>> = exteriors
            .iter()
            .map(|(_, line)| GeoPolygon::new(line.clone(), Vec::new()))
            .collect();
        let mut interiors: Vec<Vec<LineString<Real>>> = vec![Vec::new(); exteriors.len()];
        for hole in holes {
            let owner = shells
                .iter()
                .enumerate()
                .filter(|(_, shell)| encloses(shell, &hole))
                .min_by(|(i, _), (j, _)| exteriors[*i].0.total_cmp(&exteriors[*j].0))
                .map(|(i, _)| i);
            match owner {
                Some(i) => interiors[i].push(hole),
                None => tracing::trace!(points = hole.0.len(), "dropping unenclosed hole"),
            }
        }

        exteriors
            .into_iter()
            .zip(interiors)
            .map(|((_, exterior), holes)| GeoPolygon::new(exterior, holes))
            .collect()
    }
}

fn distance_squared(a: Coord<Real>, b: Coord<Real>) -> Real {
    let d = a - b;
    d.x * d.x + d.y * d.y
}

/// Parameter of `p` along segment `a`-`b` when `p` is within `tolerance` of
/// the segment and more than `tolerance` away from both ends.
fn edge_parameter(a: Coord<Real>, b: Coord<Real>, p: Coord<Real>, tolerance: Real) -> Option<Real> {
    let d = b - a;
    let length_squared = d.x * d.x + d.y * d.y;
    if length_squared <= tolerance * tolerance {
        return None;
    }
    let length = length_squared.sqrt();
    let v = p - a;
    let t = (v.x * d.x + v.y * d.y) / length_squared;
    let gap = (d.x * v.y - d.y * v.x).abs() / length;
    (gap <= tolerance && t * length > tolerance && (1.0 - t) * length > tolerance).then_some(t)
}

// A hole ring may touch its shell, so any strictly interior vertex or edge
// midpoint is enough.
fn encloses(shell: &GeoPolygon<Real>, hole: &LineString<Real>) -> bool {
    hole.coords().any(|c| shell.contains(&Point::from(*c)))
        || hole.lines().any(|line| {
            let mid = Coord {
                x: (line.start.x + line.end.x) * 0.5,
                y: (line.start.y + line.end.y) * 0.5,
            };
            shell.contains(&Point::from(mid))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(points: &[(Real, Real)]) -> Vec<Coord<Real>> {
        points.iter().map(|&(x, y)| Coord { x, y }).collect()
    }

    fn welded(rings: &[&[(Real, Real)]]) -> Vec<GeoPolygon<Real>> {
        let mut loops = WeldedLoops::new(1e-6);
        for ring in rings {
            loops.push_ring(coords(ring));
        }
        loops.into_regions()
    }

    #[test]
    fn t_junction_is_closed() {
        // Tall left square against two stacked right squares
        let regions = welded(&[
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 2.0), (0.0, 2.0)],
            &[(1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0)],
            &[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0)],
        ]);
        assert_eq!(regions.len(), 1);
        assert!(regions[0].interiors().is_empty());
        // Closed ring of the four corners
        assert_eq!(regions[0].exterior().0.len(), 5);
        assert!((regions[0].signed_area() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn near_coincident_points_are_merged() {
        let regions = welded(&[
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)],
            &[(0.0, 0.0), (1.0, 1.0 + 1e-9), (0.0, 1.0)],
        ]);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].exterior().0.len(), 5);
    }

    #[test]
    fn enclosed_clockwise_ring_becomes_hole() {
        // Four trapezoids around the square [1,2]x[1,2]
        let regions = welded(&[
            &[(0.0, 0.0), (3.0, 0.0), (2.0, 1.0), (1.0, 1.0)],
            &[(3.0, 0.0), (3.0, 3.0), (2.0, 2.0), (2.0, 1.0)],
            &[(3.0, 3.0), (0.0, 3.0), (1.0, 2.0), (2.0, 2.0)],
            &[(0.0, 3.0), (0.0, 0.0), (1.0, 1.0), (1.0, 2.0)],
        ]);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].interiors().len(), 1);
        assert_eq!(regions[0].interiors()[0].0.len(), 5);
        assert!((regions[0].unsigned_area() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn regions_touching_at_a_corner_stay_apart() {
        let regions = welded(&[
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
            &[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0)],
        ]);
        assert_eq!(regions.len(), 2);
        assert!(regions.iter().all(|r| r.exterior().0.len() == 5));
    }

    #[test]
    fn degenerate_rings_are_ignored() {
        let mut loops = WeldedLoops::new(1e-6);
        loops.push_ring(coords(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]));
        assert_eq!(loops.ring_count(), 0);
        assert!(loops.into_regions().is_empty());
    }

    #[test]
    fn edge_parameter_excludes_endpoints() {
        let a = Coord { x: 0.0, y: 0.0 };
        let b = Coord { x: 2.0, y: 0.0 };
        assert_eq!(edge_parameter(a, b, Coord { x: 1.0, y: 1e-9 }, 1e-6), Some(0.5));
        assert_eq!(edge_parameter(a, b, Coord { x: 2.0, y: 0.0 }, 1e-6), None);
        assert_eq!(edge_parameter(a, b, Coord { x: 1.0, y: 0.1 }, 1e-6), None);
    }
}
