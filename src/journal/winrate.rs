use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::Outcome;

/// Decimal places kept on a reward:risk ratio.
pub const RATIO_DECIMALS: u32 = 2;

/// Decimal places kept on a stored winrate percentage.
pub const PERCENT_DECIMALS: u32 = 1;

pub fn round_ratio(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(RATIO_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PERCENT_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Percentage of wins over all outcomes, or `None` for an empty set.
///
/// Always a full recount; callers pass every outcome currently linked to the
/// setup.
pub fn compute_winrate<I>(outcomes: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Outcome>,
{
    let (wins, total) = outcomes
        .into_iter()
        .fold((0i64, 0i64), |(wins, total), outcome| {
            (wins + i64::from(outcome == Outcome::Win), total + 1)
        });

    winrate_from_counts(wins, total)
}

/// Same rule as [`compute_winrate`] for callers that already aggregated in SQL.
pub fn winrate_from_counts(wins: i64, total: i64) -> Option<Decimal> {
    if total <= 0 {
        return None;
    }

    Some(round_percent(
        Decimal::from(wins) * Decimal::ONE_HUNDRED / Decimal::from(total),
    ))
}
