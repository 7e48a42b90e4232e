pub mod core_state;

pub use core_state::{CoreState, CoreUpdate, WindowVariance};
