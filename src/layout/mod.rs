pub mod grid_geometry;
pub mod lightbox_fit;

pub use grid_geometry::GridGeometry;
pub use lightbox_fit::lightbox_fit;
