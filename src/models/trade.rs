use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Direction, Outcome, Tag};
use crate::journal::TradeInputs;

/// Database row for the trades table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trade {
    pub id: Uuid,
    pub user_id: Uuid,
    pub setup_trade_id: Option<Uuid>,
    pub direction: Direction,
    pub entry_price: Decimal,
    pub take_profit: Decimal,
    pub stoploss: Decimal,
    pub exit_price: Decimal,
    pub lot_size: Decimal,
    pub outcome: Outcome,
    pub profit_loss: Decimal,
    pub risk_ratio: Decimal,
    pub trade_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub screenshot_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trade {
    /// The user-entered fields the derived columns are computed from.
    pub fn inputs(&self) -> TradeInputs {
        TradeInputs {
            direction: self.direction,
            entry_price: self.entry_price,
            exit_price: self.exit_price,
            take_profit: self.take_profit,
            stoploss: self.stoploss,
            lot_size: self.lot_size,
        }
    }
}

/// A trade together with the tags attached to it.
#[derive(Debug, Clone, Serialize)]
pub struct TradeDetail {
    #[serde(flatten)]
    pub trade: Trade,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTradeInput {
    pub direction: Direction,
    pub entry_price: Decimal,
    pub take_profit: Decimal,
    pub stoploss: Decimal,
    pub exit_price: Decimal,
    pub lot_size: Decimal,
    pub trade_date: DateTime<Utc>,
    pub setup_trade_id: Option<Uuid>,
    pub notes: Option<String>,
    pub screenshot_url: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

impl CreateTradeInput {
    pub fn inputs(&self) -> TradeInputs {
        TradeInputs {
            direction: self.direction,
            entry_price: self.entry_price,
            exit_price: self.exit_price,
            take_profit: self.take_profit,
            stoploss: self.stoploss,
            lot_size: self.lot_size,
        }
    }
}

/// Partial update. Absent fields keep their stored value.
///
/// `setup_trade_id`, `notes` and `screenshot_url` distinguish an absent key
/// (keep) from an explicit `null` (clear) and a value (replace).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTradeInput {
    pub direction: Option<Direction>,
    pub entry_price: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub stoploss: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub lot_size: Option<Decimal>,
    pub trade_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "present")]
    pub setup_trade_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub screenshot_url: Option<Option<String>>,
    pub tag_ids: Option<Vec<Uuid>>,
}

impl UpdateTradeInput {
    /// Overlay the provided fields on the stored trade's inputs.
    pub fn merged_inputs(&self, current: &Trade) -> TradeInputs {
        let stored = current.inputs();
        TradeInputs {
            direction: self.direction.unwrap_or(stored.direction),
            entry_price: self.entry_price.unwrap_or(stored.entry_price),
            exit_price: self.exit_price.unwrap_or(stored.exit_price),
            take_profit: self.take_profit.unwrap_or(stored.take_profit),
            stoploss: self.stoploss.unwrap_or(stored.stoploss),
            lot_size: self.lot_size.unwrap_or(stored.lot_size),
        }
    }

    /// Setup link after the update is applied.
    pub fn resolved_setup(&self, current: &Trade) -> Option<Uuid> {
        match self.setup_trade_id {
            Some(link) => link,
            None => current.setup_trade_id,
        }
    }
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Query parameters for listing trades.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeFilters {
    pub setup_id: Option<Uuid>,
    pub outcome: Option<Outcome>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn stored_trade(setup: Option<Uuid>) -> Trade {
        let now = Utc::now();
        Trade {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            setup_trade_id: setup,
            direction: Direction::Buy,
            entry_price: dec!(100),
            take_profit: dec!(130),
            stoploss: dec!(90),
            exit_price: dec!(120),
            lot_size: dec!(1),
            outcome: Outcome::Win,
            profit_loss: dec!(20),
            risk_ratio: dec!(3),
            trade_date: now,
            notes: None,
            screenshot_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_update_distinguishes_absent_null_and_value() {
        let absent: UpdateTradeInput = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.setup_trade_id, None);

        let null: UpdateTradeInput = serde_json::from_str(r#"{"setup_trade_id": null}"#).unwrap();
        assert_eq!(null.setup_trade_id, Some(None));

        let id = Uuid::new_v4();
        let value: UpdateTradeInput =
            serde_json::from_str(&format!(r#"{{"setup_trade_id": "{id}"}}"#)).unwrap();
        assert_eq!(value.setup_trade_id, Some(Some(id)));
    }

    #[test]
    fn test_update_can_clear_notes_and_screenshot() {
        let clear: UpdateTradeInput =
            serde_json::from_str(r#"{"notes": null, "screenshot_url": null}"#).unwrap();
        assert_eq!(clear.notes, Some(None));
        assert_eq!(clear.screenshot_url, Some(None));

        let keep: UpdateTradeInput = serde_json::from_str(r#"{"exit_price": "101"}"#).unwrap();
        assert_eq!(keep.notes, None);
        assert_eq!(keep.screenshot_url, None);

        let replace: UpdateTradeInput = serde_json::from_str(r#"{"notes": "held too long"}"#).unwrap();
        assert_eq!(replace.notes, Some(Some("held too long".to_string())));
    }

    #[test]
    fn test_resolved_setup() {
        let s1 = Uuid::new_v4();
        let s2 = Uuid::new_v4();
        let trade = stored_trade(Some(s1));

        let keep = UpdateTradeInput::default();
        assert_eq!(keep.resolved_setup(&trade), Some(s1));

        let unlink = UpdateTradeInput { setup_trade_id: Some(None), ..Default::default() };
        assert_eq!(unlink.resolved_setup(&trade), None);

        let relink = UpdateTradeInput { setup_trade_id: Some(Some(s2)), ..Default::default() };
        assert_eq!(relink.resolved_setup(&trade), Some(s2));
    }

    #[test]
    fn test_merged_inputs_overlay() {
        let trade = stored_trade(None);
        let update = UpdateTradeInput {
            exit_price: Some(dec!(95)),
            direction: Some(Direction::Sell),
            ..Default::default()
        };
        let merged = update.merged_inputs(&trade);
        assert_eq!(merged.direction, Direction::Sell);
        assert_eq!(merged.exit_price, dec!(95));
        assert_eq!(merged.entry_price, dec!(100));
        assert_eq!(merged.lot_size, dec!(1));
    }

    #[test]
    fn test_create_input_accepts_string_and_number_decimals() {
        let json = r#"{
            "direction": "buy",
            "entry_price": "1.1000",
            "take_profit": 1.11,
            "stoploss": "1.0950",
            "exit_price": "1.1050",
            "lot_size": 1,
            "trade_date": "2024-03-01T10:00:00Z"
        }"#;
        let input: CreateTradeInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.entry_price, dec!(1.1000));
        assert_eq!(input.lot_size, dec!(1));
        assert!(input.tag_ids.is_empty());
        assert!(input.setup_trade_id.is_none());
    }
}
