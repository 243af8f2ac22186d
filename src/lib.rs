//! Fitcard renders a synced fitness activity into a single share-ready
//! 1080x1920 PNG "activity card".
//!
//! The pipeline is record-oriented:
//!
//! - Load a [`RawRecord`] from a [`RecordStore`]
//! - Extract telemetry (endurance samples or a strength set log)
//! - Render the card with [`render_card`], optionally fetching basemap
//!   tiles from a [`TileSource`]
#![forbid(unsafe_code)]

pub mod card;
pub mod chart;
pub mod foundation;
pub mod geo;
pub mod route;
pub mod source;
pub mod strength;
pub mod telemetry;

pub use crate::card::compose::{render_card, CardOptions, CardTheme};
pub use crate::foundation::error::{FitcardError, FitcardResult};
pub use crate::geo::tiles::{HttpTileSource, TileSource};
pub use crate::source::{DirRecordStore, RawRecord, RecordStore};
