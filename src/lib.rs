//! Polygon-soup **Constructive Solid Geometry (CSG)** built on [BSP](mesh::bsp) trees.
//!
//! A [`Solid`] is a list of convex, outward-wound polygons. Boolean
//! operations (*union*, *subtract*, *intersect*) run the classic clip/invert
//! protocol over BSP trees and return new solids. Results can be flattened
//! into renderer buffers with [`Solid::to_geometry`] or reduced to per-plane
//! silhouette loops with [`Solid::duplicate_edges`].
//!
//! ```
//! use polysolid::{CSG, Solid};
//! use polysolid::shapes::{CubeOptions, SphereOptions};
//!
//! let cube = Solid::cube(CubeOptions::default()).unwrap();
//! let sphere = Solid::sphere(SphereOptions { radius: 1.3, ..Default::default() }).unwrap();
//! let carved = cube.subtract(&sphere);
//! assert!(!carved.to_geometry().indices.is_empty());
//! ```
//!
//! # Features
//! - **parallel**: merge silhouette plane groups on rayon's thread pool

#![forbid(unsafe_code)]

pub mod errors;
pub mod float_types;
pub mod frame;
pub mod mesh;
pub mod shapes;
pub mod traits;
pub mod transform;
pub mod vector;

pub use errors::ValidationError;
pub use frame::Frame;
pub use mesh::Solid;
pub use mesh::geometry::{Geometry, GeometryGroup};
pub use mesh::plane::Plane;
pub use mesh::polygon::Polygon;
pub use mesh::silhouette::{GeoUnion, PlanarUnion, Polyline};
pub use mesh::vertex::Vertex;
pub use traits::CSG;
pub use transform::Transform;
pub use vector::VectorExt;
