//! Procedural geometry for a small planet: a subdivided, height-painted
//! icosphere and a spline flight path around it.
//!
//! This crate is pure synchronous geometry. It never talks to a renderer
//! directly; meshes are handed over through [`MeshSink`] and images are read
//! through [`ImageSampler`], so the same code runs natively and on WASM.
//!
//! # Design principles
//!
//! - **Arena + index**: vertices, segments and steps refer to each other by
//!   index, never by pointer
//! - **Loud topology errors**: broken invariants panic with the offending ids
//! - **Quiet content misses**: lookups that can legitimately miss return
//!   `Option` and log
//!
//! # Key types
//!
//! - [`Sphere`]: icosphere subdivision with per-segment flat-shaded meshes
//! - [`Path`]: Catmull-Rom path with arc-length pose queries
//! - [`TubeWindow`]: rings around the path near the ship
//! - [`Palette`]: GIMP palette used to classify surfaces

mod error;

pub mod angle;
pub mod geo;
pub mod mesh;
pub mod painter;
pub mod palette;
pub mod path;
pub mod sphere;
pub mod spline;
pub mod surface;
pub mod tube;

pub use angle::Ypr;
pub use error::{GeometryError, GeometryResult};
pub use geo::GeoPoint;
pub use mesh::{DynamicMesh, FlushStats, IndexRange, MeshSink, VertexLayout, faces_camera};
pub use painter::ImageSampler;
pub use palette::Palette;
pub use path::{DirectionEx, DirectionFlags, Path, PathLocation, PathSegment, PathStep, Span};
pub use sphere::{Sphere, SphereSegment, SphereState, SphereTriangle, SphereVertex};
pub use surface::Surface;
pub use tube::{TubeSegment, TubeUpdate, TubeWindow};
