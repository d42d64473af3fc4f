//! Fee engine types.

mod asset;
pub use asset::*;

mod fees;
pub use fees::*;

mod network;
pub use network::*;

mod params;
pub(crate) use params::{parse_amount, trim_decimal};
pub use params::{
    Eip1559FeeParams, EstimatedTime, FeeParam, GasFeeParams, GasFeeParamsBySpeed,
    LegacyFeeParams,
};

mod snapshot;
pub use snapshot::*;

mod speed;
pub use speed::Speed;
