pub mod compose;
pub mod layout;
pub mod metrics;
pub mod zones;
