//! Conversion of raw quotes into fee parameters and cost estimates.

mod estimate;
pub use estimate::{NativePrice, estimate_costs};

mod normalize;
pub use normalize::{NormalizedFees, normalize};
pub(crate) use normalize::confirmation_time;
