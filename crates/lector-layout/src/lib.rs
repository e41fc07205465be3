//! Layout analysis
//!
//! Turns raw page geometry into classified blocks and a deterministic reading
//! order. Column detection sits behind the [`ColumnEstimator`] strategy trait
//! so the model-selection clustering can be swapped for a fixed-k heuristic
//! without touching the resolver.

pub mod classify;
pub mod columns;
pub mod order;

pub use classify::{ClassifierConfig, GeometryClassifier};
pub use columns::{BicKMeans, ColumnEstimator};
pub use order::{build_reading_order, order_key};
