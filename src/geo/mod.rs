pub mod mercator;
pub mod tiles;
