pub mod batch;
pub mod classifier;
pub mod defaults;
pub mod exclusions;
pub mod learning;
pub mod store;

pub use crate::domain::model::{Classification, Coupon, PreferenceCategory, PreferenceLevel};
pub use crate::domain::ports::Storage;
pub use crate::utils::error::Result;
