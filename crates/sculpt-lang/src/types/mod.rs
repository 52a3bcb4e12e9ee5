pub mod geometry;
pub mod mat;
