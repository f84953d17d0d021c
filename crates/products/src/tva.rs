//! Moroccan VAT (TVA) rates.

use serde::{Deserialize, Serialize};

use armetix_core::DomainError;

/// Allowed TVA rates, in percent.
///
/// Serialized as the bare percentage (`20`), never as a variant name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TvaRate {
    Seven,
    Ten,
    Fourteen,
    #[default]
    Twenty,
}

impl TvaRate {
    pub const ALL: [TvaRate; 4] = [
        TvaRate::Seven,
        TvaRate::Ten,
        TvaRate::Fourteen,
        TvaRate::Twenty,
    ];

    pub fn percent(self) -> u32 {
        match self {
            TvaRate::Seven => 7,
            TvaRate::Ten => 10,
            TvaRate::Fourteen => 14,
            TvaRate::Twenty => 20,
        }
    }
}

impl TryFrom<u32> for TvaRate {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            7 => Ok(TvaRate::Seven),
            10 => Ok(TvaRate::Ten),
            14 => Ok(TvaRate::Fourteen),
            20 => Ok(TvaRate::Twenty),
            other => Err(DomainError::validation(format!(
                "invalid TVA rate {other}: use 7, 10, 14 or 20"
            ))),
        }
    }
}

impl From<TvaRate> for u32 {
    fn from(value: TvaRate) -> Self {
        value.percent()
    }
}

impl core::fmt::Display for TvaRate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}%", self.percent())
    }
}
