pub mod series;
pub mod shared;
pub mod snapshot;

pub use series::{CoreMetric, LinkMetric, SeriesKey};
pub use shared::SharedStore;
pub use snapshot::{CoreView, Snapshot};
