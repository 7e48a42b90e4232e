pub mod ring;
pub mod time_series;

pub use ring::RingBuffer;
pub use time_series::TimeSeries;
