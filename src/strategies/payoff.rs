//! Expiration payoff of a strategy
//!
//! P/L at expiration is piecewise linear in the underlying price with kinks only
//! at leg strikes. Evaluating it at zero and at every strike, plus the slope past
//! the highest strike, gives exact extremes and break-even points.

use super::types::{Bound, PayoffProfile, Strategy};
use crate::chain::types::{OptionType, CONTRACT_MULTIPLIER};

const SLOPE_EPS: f64 = 1e-9;
const VALUE_EPS: f64 = 1e-9;

impl Strategy {
    /// Total P/L in dollars if the underlying settles at `underlying`
    pub fn payoff_at(&self, underlying: f64) -> f64 {
        let value: f64 = self.legs.iter().map(|leg| leg.value_at(underlying)).sum();
        value - self.net_debit
    }

    /// P/L sampled at each price, e.g. for plotting
    pub fn payoff_curve(&self, prices: &[f64]) -> Vec<(f64, f64)> {
        prices.iter().map(|&p| (p, self.payoff_at(p))).collect()
    }

    /// dP/L / dS beyond the highest strike, where every call is in the money
    fn terminal_slope(&self) -> f64 {
        self.legs
            .iter()
            .filter(|leg| leg.option_type == OptionType::Call)
            .map(|leg| leg.action.sign() * leg.quantity as f64 * CONTRACT_MULTIPLIER)
            .sum()
    }

    /// Underlying prices where the payoff can change slope, including zero
    fn kinks(&self) -> Vec<f64> {
        let mut points: Vec<f64> = std::iter::once(0.0)
            .chain(self.legs.iter().map(|leg| leg.strike).filter(|k| *k > 0.0))
            .collect();
        points.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        points.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        points
    }

    pub fn payoff_profile(&self) -> PayoffProfile {
        let points = self.kinks();
        let values: Vec<f64> = points.iter().map(|&p| self.payoff_at(p)).collect();
        let slope = self.terminal_slope();

        let highest = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let lowest = values.iter().copied().fold(f64::INFINITY, f64::min);

        let max_profit = if slope > SLOPE_EPS {
            Bound::Unlimited
        } else {
            Bound::Limited(highest)
        };
        let max_loss = if slope < -SLOPE_EPS {
            Bound::Unlimited
        } else {
            Bound::Limited(lowest)
        };

        PayoffProfile {
            max_profit,
            max_loss,
            break_evens: break_evens(&points, &values, slope),
        }
    }
}

fn push_unique(out: &mut Vec<f64>, x: f64) {
    if !out.iter().any(|v| (v - x).abs() < 1e-6) {
        out.push(x);
    }
}

fn break_evens(points: &[f64], values: &[f64], slope: f64) -> Vec<f64> {
    let mut out = Vec::new();

    for i in 0..points.len() {
        let (x0, y0) = (points[i], values[i]);
        if y0.abs() < VALUE_EPS {
            push_unique(&mut out, x0);
            continue;
        }
        if let (Some(&x1), Some(&y1)) = (points.get(i + 1), values.get(i + 1)) {
            if y1.abs() >= VALUE_EPS && y0.signum() != y1.signum() {
                push_unique(&mut out, x0 + (x1 - x0) * (-y0) / (y1 - y0));
            }
        }
    }

    // Past the last kink the payoff is a ray with the terminal slope
    if let (Some(&x_last), Some(&y_last)) = (points.last(), values.last()) {
        if slope.abs() > SLOPE_EPS && y_last.abs() >= VALUE_EPS && y_last.signum() != slope.signum() {
            push_unique(&mut out, x_last - y_last / slope);
        }
    }

    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    out
}
