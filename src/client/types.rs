use serde::{Deserialize, Serialize};

use crate::chain::types::{ExpirationSlice, OptionContract};
use crate::report::CalculationResult;

/// Calls and puts of the expiration under analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OptionsData {
    pub calls: Vec<OptionContract>,
    pub puts: Vec<OptionContract>,
}

impl From<&ExpirationSlice> for OptionsData {
    fn from(slice: &ExpirationSlice) -> Self {
        Self {
            calls: slice.calls.clone(),
            puts: slice.puts.clone(),
        }
    }
}

/// Body of `POST /api/analyze/options`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub symbol: String,
    pub stock_price: f64,
    /// Volatility ETF price used as a market fear gauge
    pub vxx_price: Option<f64>,
    pub expiration_date: String,
    pub calculation_results: Vec<CalculationResult>,
    pub options_data: OptionsData,
}

impl AnalysisRequest {
    pub fn new(
        symbol: impl Into<String>,
        stock_price: f64,
        slice: &ExpirationSlice,
        calculation_results: Vec<CalculationResult>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            stock_price,
            vxx_price: None,
            expiration_date: slice.expiration_date.clone(),
            calculation_results,
            options_data: OptionsData::from(slice),
        }
    }

    pub fn with_vxx_price(mut self, vxx_price: f64) -> Self {
        self.vxx_price = Some(vxx_price);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyIdea {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Strategy suggestions returned by the analysis endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub summary: String,
    #[serde(default)]
    pub market_outlook: String,
    #[serde(default)]
    pub strategies: Vec<StrategyIdea>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub contrarian: Option<String>,
}
