use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A reusable strategy template. `winrate` is maintained by the
/// recalculator and is never accepted from clients.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SetupTrade {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub strategy: String,
    pub notes: String,
    pub winrate: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSetupInput {
    pub name: String,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSetupInput {
    pub name: Option<String>,
    pub strategy: Option<String>,
    pub notes: Option<String>,
}

/// Per-setup aggregate row for the statistics view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SetupPerformance {
    pub id: Uuid,
    pub name: String,
    pub winrate: Option<Decimal>,
    pub trade_count: i64,
    pub win_count: i64,
    pub total_profit_loss: Decimal,
}
