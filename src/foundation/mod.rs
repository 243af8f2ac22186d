pub mod color;
pub mod error;
pub mod math;
pub mod svg;
