pub mod calculator;
pub mod winrate;

pub use calculator::{calculate_derived_fields, risk_ratio, DerivedFields, TradeInputs};
pub use winrate::{compute_winrate, round_percent, round_ratio};
