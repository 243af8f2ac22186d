pub mod heatmap;
pub mod muscles;
pub mod timeline;
