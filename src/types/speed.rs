use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Fee aggressiveness level.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Speed {
    /// User edited tier.
    Custom,
    /// Default tier.
    #[default]
    Normal,
    /// Faster than normal.
    Fast,
    /// Fastest tier.
    Urgent,
}

impl Speed {
    /// Tiers produced by fee sources, slowest first.
    pub const QUOTED: [Self; 3] = [Self::Normal, Self::Fast, Self::Urgent];
}
