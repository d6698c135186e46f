use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

// ─── SortOrder ───────────────────────────────────────────────────────

/// Ordering applied to coin lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    MarketCapAsc,
    MarketCapDesc,
    Change24hAsc,
    Change24hDesc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::NameAsc => "name_asc",
            SortOrder::NameDesc => "name_desc",
            SortOrder::PriceAsc => "price_asc",
            SortOrder::PriceDesc => "price_desc",
            SortOrder::MarketCapAsc => "market_cap_asc",
            SortOrder::MarketCapDesc => "market_cap_desc",
            SortOrder::Change24hAsc => "change_24h_asc",
            SortOrder::Change24hDesc => "change_24h_desc",
        }
    }

    /// Order parameter understood by the markets endpoint. Orders the
    /// catalog cannot apply fall back to market cap and are sorted locally.
    pub fn api_order(&self) -> &'static str {
        match self {
            SortOrder::MarketCapAsc => "market_cap_asc",
            _ => "market_cap_desc",
        }
    }

    pub fn all() -> &'static [SortOrder] {
        &[
            SortOrder::NameAsc,
            SortOrder::NameDesc,
            SortOrder::PriceAsc,
            SortOrder::PriceDesc,
            SortOrder::MarketCapAsc,
            SortOrder::MarketCapDesc,
            SortOrder::Change24hAsc,
            SortOrder::Change24hDesc,
        ]
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name_asc" => Ok(SortOrder::NameAsc),
            "name_desc" => Ok(SortOrder::NameDesc),
            "price_asc" => Ok(SortOrder::PriceAsc),
            "price_desc" => Ok(SortOrder::PriceDesc),
            "market_cap_asc" => Ok(SortOrder::MarketCapAsc),
            "market_cap_desc" => Ok(SortOrder::MarketCapDesc),
            "change_24h_asc" => Ok(SortOrder::Change24hAsc),
            "change_24h_desc" => Ok(SortOrder::Change24hDesc),
            _ => Err(AppError::InvalidInput(format!(
                "Invalid sort order: {}. Supported: name_asc, name_desc, price_asc, price_desc, market_cap_asc, market_cap_desc, change_24h_asc, change_24h_desc",
                s
            ))),
        }
    }
}

// ─── FavoriteAction ──────────────────────────────────────────────────

/// Outcome of toggling a coin's favorite status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FavoriteAction {
    Added,
    Removed,
}
