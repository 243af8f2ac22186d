pub mod render;
pub mod series;
