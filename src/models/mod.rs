pub mod setup;
pub mod tag;
pub mod trade;
pub mod user;

pub use setup::{CreateSetupInput, SetupPerformance, SetupTrade, UpdateSetupInput};
pub use tag::{CreateTagInput, Tag};
pub use trade::{CreateTradeInput, Trade, TradeDetail, TradeFilters, UpdateTradeInput};
pub use user::{CurrentUser, Session, User};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "trade_direction", rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "trade_outcome", rename_all = "kebab-case")]
pub enum Outcome {
    Win,
    Loss,
    BreakEven,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::BreakEven => "break-even",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TagKind
// ---------------------------------------------------------------------------

/// What a tag describes about a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "tag_kind", rename_all = "lowercase")]
pub enum TagKind {
    Psychology,
    Pair,
    Timeframe,
    Indicator,
}

impl TagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagKind::Psychology => "psychology",
            TagKind::Pair => "pair",
            TagKind::Timeframe => "timeframe",
            TagKind::Indicator => "indicator",
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serializes_kebab_case() {
        let json = serde_json::to_string(&Outcome::BreakEven).unwrap();
        assert_eq!(json, "\"break-even\"");
        let parsed: Outcome = serde_json::from_str("\"win\"").unwrap();
        assert_eq!(parsed, Outcome::Win);
    }

    #[test]
    fn test_display_matches_wire_format() {
        assert_eq!(Outcome::BreakEven.to_string(), "break-even");
        assert_eq!(Direction::Buy.to_string(), "buy");
        assert_eq!(TagKind::Indicator.to_string(), "indicator");
    }

    #[test]
    fn test_direction_rejects_unknown() {
        assert!(serde_json::from_str::<Direction>("\"long\"").is_err());
        assert_eq!(serde_json::from_str::<Direction>("\"sell\"").unwrap(), Direction::Sell);
    }
}
