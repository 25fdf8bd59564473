pub mod geometry;
pub mod primitives;

pub use geometry::{Mesh, Vertex, FLOATS_PER_VERTEX};
pub use primitives::{cube, mesh_for_shape, uv_sphere};
