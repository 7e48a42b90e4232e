pub mod frame;
pub mod record;

pub use frame::{QueueStatusRecord, SubcarrierFrame};
pub use record::FeatureRecord;
