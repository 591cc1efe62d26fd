use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Direction, Outcome};

/// Price, direction and size fields a trade's outcome is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeInputs {
    pub direction: Direction,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub take_profit: Decimal,
    pub stoploss: Decimal,
    pub lot_size: Decimal,
}

/// Fields stamped onto a trade on every create or update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedFields {
    pub outcome: Outcome,
    pub profit_loss: Decimal,
    pub risk_ratio: Decimal,
}

/// Compute outcome, signed profit/loss and reward:risk for a closed trade.
///
/// `risk_ratio` is 0 when the stop-loss sits on the entry price. That value
/// is a convention for "no measurable risk", not a real ratio. A quotient
/// too large for `Decimal` saturates to `Decimal::MAX`; callers persisting a
/// trade reject those inputs first (see [`risk_ratio`]).
pub fn calculate_derived_fields(input: &TradeInputs) -> DerivedFields {
    let price_diff = match input.direction {
        Direction::Buy => input.exit_price - input.entry_price,
        Direction::Sell => input.entry_price - input.exit_price,
    };

    let outcome = if price_diff > Decimal::ZERO {
        Outcome::Win
    } else if price_diff < Decimal::ZERO {
        Outcome::Loss
    } else {
        Outcome::BreakEven
    };

    let profit_loss = price_diff * input.lot_size;

    DerivedFields {
        outcome,
        profit_loss,
        risk_ratio: risk_ratio(input).unwrap_or(Decimal::MAX),
    }
}

/// Reward distance over risk distance. Lot size scales both sides equally
/// and is left out so tiny sizes cannot underflow the risk to zero.
///
/// Returns `Some(0)` when the stop-loss equals the entry price and `None`
/// when the quotient does not fit in a `Decimal`.
pub fn risk_ratio(input: &TradeInputs) -> Option<Decimal> {
    let risk = (input.entry_price - input.stoploss).abs();
    if risk.is_zero() {
        return Some(Decimal::ZERO);
    }

    let reward = (input.take_profit - input.entry_price).abs();
    reward.checked_div(risk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn inputs(direction: Direction, entry: Decimal, exit: Decimal) -> TradeInputs {
        TradeInputs {
            direction,
            entry_price: entry,
            exit_price: exit,
            take_profit: entry + dec!(30),
            stoploss: entry - dec!(10),
            lot_size: dec!(1),
        }
    }

    #[test]
    fn test_buy_above_entry_is_win() {
        let d = calculate_derived_fields(&inputs(Direction::Buy, dec!(100), dec!(110)));
        assert_eq!(d.outcome, Outcome::Win);
        assert_eq!(d.profit_loss, dec!(10));
    }

    #[test]
    fn test_buy_below_entry_is_loss() {
        let d = calculate_derived_fields(&inputs(Direction::Buy, dec!(100), dec!(95)));
        assert_eq!(d.outcome, Outcome::Loss);
        assert_eq!(d.profit_loss, dec!(-5));
    }

    #[test]
    fn test_sell_below_entry_is_win() {
        let d = calculate_derived_fields(&inputs(Direction::Sell, dec!(100), dec!(92)));
        assert_eq!(d.outcome, Outcome::Win);
        assert_eq!(d.profit_loss, dec!(8));
    }

    #[test]
    fn test_sell_above_entry_is_loss() {
        let d = calculate_derived_fields(&inputs(Direction::Sell, dec!(100), dec!(104)));
        assert_eq!(d.outcome, Outcome::Loss);
        assert!(d.profit_loss < Decimal::ZERO);
    }

    #[test]
    fn test_flat_exit_is_break_even_both_directions() {
        for direction in [Direction::Buy, Direction::Sell] {
            let d = calculate_derived_fields(&inputs(direction, dec!(100), dec!(100)));
            assert_eq!(d.outcome, Outcome::BreakEven);
            assert!(d.profit_loss.is_zero());
        }
    }

    #[test]
    fn test_risk_ratio_is_independent_of_lot_size() {
        let mut input = TradeInputs {
            direction: Direction::Buy,
            entry_price: dec!(100),
            exit_price: dec!(120),
            take_profit: dec!(130),
            stoploss: dec!(90),
            lot_size: dec!(1),
        };
        let one = calculate_derived_fields(&input);
        assert_eq!(one.risk_ratio, dec!(3));
        assert_eq!(one.profit_loss, dec!(20));

        input.lot_size = dec!(5);
        let five = calculate_derived_fields(&input);
        assert_eq!(five.risk_ratio, dec!(3));
        assert_eq!(five.profit_loss, dec!(100));
    }

    #[test]
    fn test_zero_risk_yields_zero_ratio() {
        // Degenerate convention: stop on entry gives 0, not "undefined".
        let input = TradeInputs {
            direction: Direction::Buy,
            entry_price: dec!(100),
            exit_price: dec!(105),
            take_profit: dec!(120),
            stoploss: dec!(100),
            lot_size: dec!(2),
        };
        let d = calculate_derived_fields(&input);
        assert_eq!(d.risk_ratio, Decimal::ZERO);
        assert_eq!(d.outcome, Outcome::Win);
    }

    #[test]
    fn test_forex_scenario() {
        let input = TradeInputs {
            direction: Direction::Buy,
            entry_price: dec!(1.1000),
            exit_price: dec!(1.1050),
            take_profit: dec!(1.1100),
            stoploss: dec!(1.0950),
            lot_size: dec!(1),
        };
        let d = calculate_derived_fields(&input);
        assert_eq!(d.outcome, Outcome::Win);
        assert_eq!(d.profit_loss, dec!(0.0050));
        assert_eq!(d.risk_ratio, dec!(2));
    }

    #[test]
    fn test_ratio_is_stored_unrounded() {
        let input = TradeInputs {
            direction: Direction::Sell,
            entry_price: dec!(100),
            exit_price: dec!(99),
            take_profit: dec!(90),
            stoploss: dec!(103),
            lot_size: dec!(1),
        };
        // 10 / 3
        let ratio = calculate_derived_fields(&input).risk_ratio;
        assert_eq!(ratio.round_dp(2), dec!(3.33));
        assert!(ratio > dec!(3.3333333333));
    }

    #[test]
    fn test_tiny_lot_keeps_ratio() {
        let mut input = TradeInputs {
            direction: Direction::Buy,
            entry_price: dec!(1),
            exit_price: dec!(1.0000000002),
            take_profit: dec!(1.0000000003),
            stoploss: dec!(0.9999999999),
            lot_size: dec!(1),
        };
        assert_eq!(calculate_derived_fields(&input).risk_ratio, dec!(3));

        input.lot_size = dec!(0.00000000000000000001);
        let d = calculate_derived_fields(&input);
        assert_eq!(d.risk_ratio, dec!(3));
        assert_eq!(d.outcome, Outcome::Win);
    }

    #[test]
    fn test_stop_hugging_entry_does_not_overflow() {
        let input = TradeInputs {
            direction: Direction::Buy,
            entry_price: dec!(1),
            exit_price: dec!(2),
            take_profit: Decimal::from(1_000_000_000_000i64),
            stoploss: dec!(1.00000000000000000001),
            lot_size: dec!(1),
        };
        assert_eq!(risk_ratio(&input), None);

        let d = calculate_derived_fields(&input);
        assert_eq!(d.risk_ratio, Decimal::MAX);
        assert_eq!(d.profit_loss, dec!(1));
    }

    #[test]
    fn test_calculation_is_deterministic() {
        let input = inputs(Direction::Sell, dec!(50.5), dec!(49.25));
        assert_eq!(calculate_derived_fields(&input), calculate_derived_fields(&input));
    }
}
