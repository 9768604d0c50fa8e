//! Final score derivation for a single score sheet
//!
//! `final = round2(avg(D1,D2) + avg(D3,D4) + (10 - mid(E)) + (10 - mid(A))) - deduction`
//!
//! Zero is treated as "not provided" by both the pair average and the
//! middle-of-three selection, so a genuine zero mark cannot be expressed.
//! Stored results depend on this formula and on rounding before the
//! deduction is subtracted; neither may change without migrating them.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};

use crate::domain::entities::score::ScoreComponents;

/// Average of two marks where a zero mark is ignored
pub fn average_pair(x: f64, y: f64) -> f64 {
    if x == 0.0 {
        y
    } else if y == 0.0 {
        x
    } else {
        (x + y) / 2.0
    }
}

/// Middle of three marks.
///
/// When two marks are zero the remaining one is returned. Otherwise the
/// three are sorted and the one at index 1 is returned, zeros included.
pub fn select_middle(v1: f64, v2: f64, v3: f64) -> f64 {
    match (v1 == 0.0, v2 == 0.0, v3 == 0.0) {
        (true, true, _) => v3,
        (true, _, true) => v2,
        (_, true, true) => v1,
        _ => {
            let mut marks = [v1, v2, v3];
            marks.sort_by(|a, b| a.total_cmp(b));
            marks[1]
        }
    }
}

/// Significant digits kept before decimal rounding; drops binary noise such
/// as `13.004999999999999` for a sheet that sums to 13.005.
const ROUNDING_PRECISION: usize = 15;

/// Round half away from zero to two decimal places.
///
/// The value is rounded as the decimal it represents, so `1.005` gives `1.01`.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let decimal = format!("{:.*e}", ROUNDING_PRECISION - 1, value);
    BigDecimal::from_str(&decimal)
        .ok()
        .and_then(|d| {
            d.with_scale_round(2, RoundingMode::HalfUp)
                .to_string()
                .parse::<f64>()
                .ok()
        })
        .unwrap_or(value)
}

/// Intermediate values of a final score computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub total_d: f64,
    pub middle_a: f64,
    pub middle_e: f64,
    /// `total_d + (10 - middle_e) + (10 - middle_a)` before rounding
    pub raw_total: f64,
    pub final_score: f64,
}

/// Stateless calculator; safe to share across requests and threads
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreCalculator;

impl ScoreCalculator {
    pub fn new() -> Self {
        ScoreCalculator
    }

    pub fn breakdown(&self, components: &ScoreComponents) -> ScoreBreakdown {
        let [d1, d2, d3, d4] = components.difficulty();
        let [a1, a2, a3] = components.artistry();
        let [e1, e2, e3] = components.execution();

        let total_d = average_pair(d1, d2) + average_pair(d3, d4);
        let middle_a = select_middle(a1, a2, a3);
        let middle_e = select_middle(e1, e2, e3);

        let raw_total = total_d + (10.0 - middle_e) + (10.0 - middle_a);
        let final_score = round2(raw_total) - components.technical_deduction;

        ScoreBreakdown {
            total_d,
            middle_a,
            middle_e,
            raw_total,
            final_score,
        }
    }

    /// Final score for one sheet. May be negative; never fails.
    pub fn final_score(&self, components: &ScoreComponents) -> f64 {
        self.breakdown(components).final_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn sample_sheet() -> ScoreComponents {
        ScoreComponents {
            d1: 5.0,
            d2: 5.0,
            d3: 4.0,
            d4: 6.0,
            a1: 8.0,
            a2: 9.0,
            a3: 8.5,
            e1: 8.0,
            e2: 8.5,
            e3: 9.0,
            technical_deduction: 0.3,
        }
    }

    #[test]
    fn test_average_pair_zero_is_sentinel() {
        assert_eq!(average_pair(0.0, 5.0), 5.0);
        assert_eq!(average_pair(5.0, 0.0), 5.0);
        assert_eq!(average_pair(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_average_pair_averages_two_marks() {
        assert_eq!(average_pair(4.0, 6.0), 5.0);
        assert_eq!(average_pair(4.5, 5.0), 4.75);
    }

    #[test]
    fn test_select_middle_two_zeros_returns_remaining() {
        assert_eq!(select_middle(0.0, 0.0, 7.0), 7.0);
        assert_eq!(select_middle(0.0, 6.0, 0.0), 6.0);
        assert_eq!(select_middle(5.0, 0.0, 0.0), 5.0);
        assert_eq!(select_middle(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_select_middle_sorted_index_one() {
        assert_eq!(select_middle(3.0, 5.0, 4.0), 4.0);
        assert_eq!(select_middle(9.0, 8.0, 8.5), 8.5);
        assert_eq!(select_middle(7.0, 7.0, 2.0), 7.0);
    }

    #[test]
    fn test_select_middle_single_zero_stays_in_sort() {
        // sorted [0, 8, 9]
        assert_eq!(select_middle(0.0, 9.0, 8.0), 8.0);
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_close(round2(12.345_6), 12.35);
        assert_close(round2(12.344), 12.34);
        assert_close(round2(-1.255_1), -1.26);
    }

    #[test]
    fn test_round2_decimal_halfway_values() {
        assert_eq!(round2(1.005), 1.01);
        assert_eq!(round2(0.145), 0.15);
        assert_eq!(round2(0.285), 0.29);
        assert_eq!(round2(0.565), 0.57);
        assert_eq!(round2(13.005), 13.01);
        assert_eq!(round2(-1.005), -1.01);
        assert_eq!(round2(1.004_999), 1.0);
    }

    #[test]
    fn test_round2_every_halfway_cent_rounds_up() {
        // x.xx5 for every cent in [0, 40)
        for thousandths in (5..40_000).step_by(10) {
            let value = thousandths as f64 / 1000.0;
            let expected = (thousandths + 5) / 10;
            assert_eq!(
                round2(value),
                expected as f64 / 100.0,
                "round2({})",
                value
            );
        }
    }

    #[test]
    fn test_round2_non_finite_passthrough() {
        assert!(round2(f64::NAN).is_nan());
        assert_eq!(round2(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn test_reference_sheet() {
        let calc = ScoreCalculator::new();
        let breakdown = calc.breakdown(&sample_sheet());

        assert_close(breakdown.total_d, 10.0);
        assert_close(breakdown.middle_a, 8.5);
        assert_close(breakdown.middle_e, 8.5);
        assert_close(breakdown.raw_total, 13.0);
        assert_close(breakdown.final_score, 12.7);
    }

    #[test]
    fn test_rounding_happens_before_deduction() {
        let mut sheet = sample_sheet();
        // total_d = 5 + 5.005, raw 13.005 rounds to 13.01 before the deduction
        sheet.d3 = 4.0;
        sheet.d4 = 6.01;
        sheet.technical_deduction = 0.123;

        let breakdown = ScoreCalculator::new().breakdown(&sheet);
        assert_close(breakdown.raw_total, 13.005);
        assert_close(breakdown.final_score, 12.887);
    }

    #[test]
    fn test_halfway_sheet_rounds_up() {
        let sheet = ScoreComponents {
            d1: 1.01,
            d2: 1.0,
            a1: 10.0,
            e1: 10.0,
            ..ScoreComponents::default()
        };

        let breakdown = ScoreCalculator::new().breakdown(&sheet);
        assert_close(breakdown.raw_total, 1.005);
        assert_eq!(breakdown.final_score, 1.01);
    }

    #[test]
    fn test_empty_sheet_scores_twenty() {
        let calc = ScoreCalculator::new();
        assert_close(calc.final_score(&ScoreComponents::default()), 20.0);
    }

    #[test]
    fn test_negative_final_score_is_returned() {
        let sheet = ScoreComponents {
            a1: 10.0,
            a2: 10.0,
            a3: 10.0,
            e1: 10.0,
            e2: 10.0,
            e3: 10.0,
            technical_deduction: 5.0,
            ..ScoreComponents::default()
        };
        assert_close(ScoreCalculator::new().final_score(&sheet), -5.0);
    }

    #[test]
    fn test_recomputation_is_deterministic() {
        let calc = ScoreCalculator::new();
        let sheet = sample_sheet();
        let first = calc.final_score(&sheet);
        for _ in 0..10 {
            assert_eq!(calc.final_score(&sheet), first);
        }
    }
}
