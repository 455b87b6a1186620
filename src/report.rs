//! Labelled result cards for one expiration
//!
//! [`ExpirationAnalysis`] runs every per-expiration analytic once. [`build_report`]
//! turns it into display cards, the same shape sent to the analysis endpoint as
//! `calculationResults`, and [`render_prompt_text`] flattens those cards into
//! markdown-style text.

use crate::analytics::{
    activity::{notable_activity, ActivityEntry, NotableActivity},
    arbitrage::{find_arbitrage, ArbitrageOpportunity},
    expiry::{annual_factor, years},
    income::{cash_secured_puts, covered_calls, CashSecuredPutScreen, CoveredCallScreen},
    max_pain::{max_pain, MaxPain},
    parity::{put_call_parity, ParityAnalysis},
    ratio::{put_call_ratio, PutCallRatio},
    skew::{volatility_skew, VolatilitySkew},
    summary::{format_large_number, summary_stats, SummaryStats},
};
use crate::chain::config::AnalyticsConfig;
use crate::chain::types::ExpirationSlice;

/// One labelled value on a result card
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResultItem {
    pub label: String,
    pub value: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub tooltip: Option<String>,
    /// Highlighted interpretation rows
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "is_false"))]
    pub special: bool,
}

#[cfg(feature = "serde")]
fn is_false(value: &bool) -> bool {
    !*value
}

impl ResultItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            tooltip: None,
            special: false,
        }
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn special(mut self) -> Self {
        self.special = true;
        self
    }
}

/// A titled card of results, e.g. "Maximum Pain Analysis"
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalculationResult {
    /// Card identifier such as `maxPain`
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub title: String,
    #[cfg_attr(feature = "serde", serde(rename = "data"))]
    pub items: Vec<ResultItem>,
}

impl CalculationResult {
    fn new(kind: &str, title: &str, items: Vec<ResultItem>) -> Self {
        Self {
            kind: kind.to_string(),
            title: title.to_string(),
            items,
        }
    }
}

/// Every per-expiration analytic; `None` where the data cannot support it
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpirationAnalysis {
    pub expiration_date: String,
    pub spot: f64,
    pub days_to_expiration: u32,
    pub skew: Option<VolatilitySkew>,
    pub covered_calls: Option<CoveredCallScreen>,
    pub cash_secured_puts: Option<CashSecuredPutScreen>,
    pub max_pain: Option<MaxPain>,
    pub parity: Option<ParityAnalysis>,
    pub arbitrage: Option<Vec<ArbitrageOpportunity>>,
    pub put_call_ratio: Option<PutCallRatio>,
    pub activity: Option<NotableActivity>,
    pub summary: Option<SummaryStats>,
}

impl ExpirationAnalysis {
    pub fn compute(slice: &ExpirationSlice, spot: f64, days: u32, cfg: &AnalyticsConfig) -> Self {
        let both_sides = !slice.calls.is_empty() && !slice.puts.is_empty();
        let t = years(days);

        let skew = match volatility_skew(slice, spot, cfg.skew_otm_window) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::debug!(expiration = %slice.expiration_date, "skew skipped: {e}");
                None
            }
        };
        let max_pain = match max_pain(slice, spot, cfg.max_pain_min_total_oi) {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::debug!(expiration = %slice.expiration_date, "max pain skipped: {e}");
                None
            }
        };

        let parity = both_sides
            .then(|| put_call_parity(slice, spot, t, cfg))
            .filter(|p| p.summary.is_some());
        let activity = Some(notable_activity(
            slice,
            spot,
            cfg.top_activity,
            cfg.min_open_interest,
            cfg.unusual_volume_oi_ratio,
        ))
        .filter(|a| !a.is_empty());

        Self {
            expiration_date: slice.expiration_date.clone(),
            spot,
            days_to_expiration: days,
            skew,
            covered_calls: covered_calls(slice, spot, days, cfg.min_open_interest, cfg.top_candidates),
            cash_secured_puts: cash_secured_puts(
                slice,
                spot,
                days,
                cfg.min_open_interest,
                cfg.top_candidates,
            ),
            max_pain,
            parity,
            arbitrage: both_sides
                .then(|| find_arbitrage(slice, spot, t, cfg.market.r, cfg.arbitrage_threshold)),
            put_call_ratio: both_sides.then(|| put_call_ratio(slice)),
            activity,
            summary: (!slice.is_empty()).then(|| summary_stats(slice, spot)),
        }
    }
}

fn pct(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Thousands separators for contract counts, e.g. `12,345`
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn basic_info(a: &ExpirationAnalysis) -> CalculationResult {
    CalculationResult::new(
        "basicInfo",
        "Expiration Information",
        vec![
            ResultItem::new("Days to Expiration", a.days_to_expiration.to_string()),
            ResultItem::new(
                "Annual Factor",
                format!("{:.2}", annual_factor(a.days_to_expiration)),
            ),
        ],
    )
}

fn skew_card(s: &VolatilitySkew) -> CalculationResult {
    CalculationResult::new(
        "volatilitySkew",
        "Volatility Analysis",
        vec![
            ResultItem::new("ATM Implied Volatility", pct(s.atm_iv)).tooltip(
                "Average implied volatility of options at or near the current stock price",
            ),
            ResultItem::new("OTM Calls Average IV", pct(s.avg_otm_call_iv)).tooltip(format!(
                "Average IV of out-of-the-money calls (up to {:.0}% above current price)",
                s.window * 100.0
            )),
            ResultItem::new("OTM Puts Average IV", pct(s.avg_otm_put_iv)).tooltip(format!(
                "Average IV of out-of-the-money puts (up to {:.0}% below current price)",
                s.window * 100.0
            )),
            ResultItem::new("Volatility Skew", pct(s.skew)).tooltip(
                "Difference between OTM put and call IV (positive means downside protection is more expensive)",
            ),
            ResultItem::new("IV Interpretation", s.interpretation()).special(),
        ],
    )
}

fn covered_call_card(screen: &CoveredCallScreen, days: u32) -> Option<CalculationResult> {
    let top_static = screen.by_static_return.first()?;
    let top_assigned = screen.by_assigned_return.first()?;
    let best = &screen.best;
    Some(CalculationResult::new(
        "coveredCalls",
        "Best Covered Call Opportunities",
        vec![
            ResultItem::new(
                "Highest Premium Yield",
                format!(
                    "${} strike: {} annualized",
                    top_static.strike,
                    pct(top_static.annualized_static_return)
                ),
            )
            .tooltip(format!(
                "Collect ${:.2} premium ({} yield)",
                top_static.premium,
                pct(top_static.static_return)
            )),
            ResultItem::new(
                "Highest If Assigned Return",
                format!(
                    "${} strike: {} annualized",
                    top_assigned.strike,
                    pct(top_assigned.annualized_assigned_return)
                ),
            )
            .tooltip(format!(
                "Potential {} return if assigned",
                pct(top_assigned.assigned_return)
            )),
            ResultItem::new(
                "Best Overall Opportunity",
                format!("${} strike - {} DTE", best.strike, days),
            )
            .tooltip(format!(
                "{} static / {} if assigned (annualized)",
                pct(best.annualized_static_return),
                pct(best.annualized_assigned_return)
            )),
        ],
    ))
}

fn cash_secured_put_card(screen: &CashSecuredPutScreen, days: u32) -> Option<CalculationResult> {
    let top_return = screen.by_return.first()?;
    let top_discount = screen.by_discount.first()?;
    let best = &screen.best;
    Some(CalculationResult::new(
        "cashSecuredPuts",
        "Best Cash Secured Put Opportunities",
        vec![
            ResultItem::new(
                "Highest Premium Return",
                format!(
                    "${} strike: {} annualized",
                    top_return.strike,
                    pct(top_return.annualized_return_on_capital)
                ),
            )
            .tooltip(format!(
                "Collect ${:.2} premium ({} return on capital)",
                top_return.premium,
                pct(top_return.return_on_capital)
            )),
            ResultItem::new(
                "Largest Discount If Assigned",
                format!(
                    "${} strike: {} below current price",
                    top_discount.strike,
                    pct(top_discount.discount_if_assigned)
                ),
            )
            .tooltip(format!(
                "Effective purchase price: ${:.2}",
                top_discount.effective_price()
            )),
            ResultItem::new(
                "Best Overall Opportunity",
                format!("${} strike - {} DTE", best.strike, days),
            )
            .tooltip(format!(
                "{} return, {} discount if assigned",
                pct(best.annualized_return_on_capital),
                pct(best.discount_if_assigned)
            )),
        ],
    ))
}

fn max_pain_card(m: &MaxPain) -> CalculationResult {
    let (reliability, reliability_tip) = if m.reliable {
        (
            "High",
            "Sufficient open interest to make this a reliable indicator",
        )
    } else {
        ("Low", "Low open interest makes this less reliable")
    };
    CalculationResult::new(
        "maxPain",
        "Maximum Pain Analysis",
        vec![
            ResultItem::new("Max Pain Point", format!("${:.2}", m.strike)).tooltip(
                "The stock price that would cause the maximum financial pain to option holders at expiration",
            ),
            ResultItem::new("Distance from Current Price", format!("{:.2}%", m.distance_pct))
                .tooltip(if m.distance_pct > 0.0 {
                    "Max pain is above current price"
                } else {
                    "Max pain is below current price"
                }),
            ResultItem::new("Reliability", reliability).tooltip(reliability_tip),
            ResultItem::new(
                "Call/Put OI Ratio",
                m.call_put_oi_ratio
                    .map(|r| format!("{:.2}", r))
                    .unwrap_or_else(|| "N/A".to_string()),
            )
            .tooltip(format!(
                "{} call contracts vs {} put contracts in open interest",
                format_count(m.total_call_oi),
                format_count(m.total_put_oi)
            )),
        ],
    )
}

fn parity_card(p: &ParityAnalysis) -> Option<CalculationResult> {
    let s = p.summary.as_ref()?;
    Some(CalculationResult::new(
        "putCallParity",
        "Put-Call Parity Analysis",
        vec![
            ResultItem::new("Strike Price", format!("{:.2}", s.strike))
                .tooltip("The strike price used for put-call parity analysis"),
            ResultItem::new("Call Price", format!("{:.2}", s.call_price))
                .tooltip("Market mid-price of the call option"),
            ResultItem::new("Put Price", format!("{:.2}", s.put_price))
                .tooltip("Market mid-price of the put option"),
            ResultItem::new(
                "Parity Difference",
                format!("{:.2} ({:.2}%)", s.parity_difference, s.parity_diff_pct),
            )
            .tooltip("Difference between left and right sides of the put-call parity equation"),
            ResultItem::new("BS Theoretical Call", format!("{:.2}", s.theoretical_call))
                .tooltip("Black-Scholes theoretical call price with dividend adjustment"),
            ResultItem::new("BS Theoretical Put", format!("{:.2}", s.theoretical_put))
                .tooltip("Black-Scholes theoretical put price with dividend adjustment"),
            ResultItem::new("Arbitrage Strategy", s.trade.advice())
                .special()
                .tooltip("Potential arbitrage strategy based on put-call parity analysis"),
            ResultItem::new(
                "Analysis Coverage",
                format!("{} strikes analyzed", p.rows.len()),
            )
            .tooltip(format!(
                "Full analysis performed on strikes from {:.2} to {:.2}",
                p.band_low, p.band_high
            )),
        ],
    ))
}

fn arbitrage_card(found: &[ArbitrageOpportunity]) -> CalculationResult {
    let items = if found.is_empty() {
        vec![
            ResultItem::new("No significant arbitrage detected", "Market appears efficient").tooltip(
                "The options are priced in line with put-call parity, suggesting no risk-free profit opportunities",
            ),
        ]
    } else {
        found
            .iter()
            .take(3)
            .map(|arb| {
                ResultItem::new(
                    format!("{} at ${}", arb.trade.label(), arb.strike),
                    format!("${:.2} per contract", arb.expected_profit),
                )
                .tooltip(format!(
                    "Strategy: {}. Note: Transaction costs and execution risks may reduce actual profit.",
                    arb.legs_description()
                ))
                .special()
            })
            .collect()
    };
    CalculationResult::new("arbitrage", "Potential Arbitrage Opportunities", items)
}

fn ratio_card(r: &PutCallRatio) -> CalculationResult {
    CalculationResult::new(
        "putCallRatio",
        "Put-Call Ratio Analysis",
        vec![
            ResultItem::new("Volume P/C Ratio", format!("{:.2}", r.volume_ratio)).tooltip(format!(
                "Based on {} put vs {} call volume",
                format_count(r.put_volume),
                format_count(r.call_volume)
            )),
            ResultItem::new("Open Interest P/C Ratio", format!("{:.2}", r.oi_ratio)).tooltip(
                format!(
                    "Based on {} put vs {} call open interest",
                    format_count(r.put_open_interest),
                    format_count(r.call_open_interest)
                ),
            ),
            ResultItem::new("Volume Interpretation", r.volume_interpretation()).special(),
            ResultItem::new("OI Interpretation", r.oi_interpretation()).special(),
        ],
    )
}

fn distance_tooltip(e: &ActivityEntry) -> String {
    format!(
        "Strike price is {:.2}% {} current price",
        e.distance_pct,
        e.side_of_spot()
    )
}

fn activity_card(a: &NotableActivity) -> CalculationResult {
    let mut items = Vec::new();
    for (i, e) in a.highest_volume.iter().enumerate() {
        items.push(
            ResultItem::new(
                format!("#{} Highest Volume", i + 1),
                format!(
                    "{} ${:.2}: {} contracts",
                    e.option_type,
                    e.strike,
                    format_count(e.volume)
                ),
            )
            .tooltip(distance_tooltip(e)),
        );
    }
    for (i, e) in a.highest_open_interest.iter().enumerate() {
        items.push(
            ResultItem::new(
                format!("#{} Highest Open Interest", i + 1),
                format!(
                    "{} ${:.2}: {} contracts",
                    e.option_type,
                    e.strike,
                    format_count(e.open_interest)
                ),
            )
            .tooltip(distance_tooltip(e)),
        );
    }
    for (i, e) in a.unusual.iter().enumerate() {
        items.push(
            ResultItem::new(
                format!("Unusual Activity #{}", i + 1),
                format!(
                    "{} ${:.2}: {:.2}x V/OI ratio",
                    e.option_type, e.strike, e.volume_oi_ratio
                ),
            )
            .tooltip(format!(
                "{} volume on {} open interest",
                format_count(e.volume),
                format_count(e.open_interest)
            )),
        );
    }
    CalculationResult::new("highVolume", "Notable Option Activity", items)
}

fn summary_card(s: &SummaryStats) -> CalculationResult {
    CalculationResult::new(
        "summaryStats",
        "Options Summary Statistics",
        vec![
            ResultItem::new(
                "Total Call Premium",
                format!("${}", format_large_number(s.total_call_premium)),
            )
            .tooltip("Total value of all call options based on current bid prices and open interest"),
            ResultItem::new(
                "Total Put Premium",
                format!("${}", format_large_number(s.total_put_premium)),
            )
            .tooltip("Total value of all put options based on current bid prices and open interest"),
            ResultItem::new("Average Call Premium", format!("${:.2}", s.avg_call_bid))
                .tooltip("Average premium across all calls"),
            ResultItem::new("Average Put Premium", format!("${:.2}", s.avg_put_bid))
                .tooltip("Average premium across all puts"),
            ResultItem::new("Implied Move", pct(s.implied_move))
                .tooltip("Expected stock price move by expiration based on ATM straddle pricing"),
        ],
    )
}

/// Result cards in display order, skipping analytics that could not run
pub fn build_report(analysis: &ExpirationAnalysis) -> Vec<CalculationResult> {
    let days = analysis.days_to_expiration;
    let mut results = vec![basic_info(analysis)];

    results.extend(analysis.skew.as_ref().map(skew_card));
    results.extend(
        analysis
            .covered_calls
            .as_ref()
            .and_then(|s| covered_call_card(s, days)),
    );
    results.extend(
        analysis
            .cash_secured_puts
            .as_ref()
            .and_then(|s| cash_secured_put_card(s, days)),
    );
    results.extend(analysis.max_pain.as_ref().map(max_pain_card));
    results.extend(analysis.parity.as_ref().and_then(parity_card));
    results.extend(analysis.arbitrage.as_deref().map(arbitrage_card));
    results.extend(analysis.put_call_ratio.as_ref().map(ratio_card));
    results.extend(analysis.activity.as_ref().map(activity_card));
    results.extend(analysis.summary.as_ref().map(summary_card));

    results
}

/// Flatten result cards into `### Title:` sections of `- label: value` lines
pub fn render_prompt_text(results: &[CalculationResult]) -> String {
    let mut out = String::new();
    for result in results {
        out.push_str(&format!("### {}:\n", result.title));
        for item in &result.items {
            out.push_str(&format!("- {}: {}\n", item.label, item.value));
        }
        out.push('\n');
    }
    out
}
