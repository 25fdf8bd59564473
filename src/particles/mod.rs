pub mod foliage;
pub mod ornaments;
pub mod stars;

pub use foliage::{FoliageConfig, FoliageField, FoliageUniforms};
pub use ornaments::{OrnamentConfig, OrnamentField, OrnamentKind};
pub use stars::{StarConfig, StarField};
