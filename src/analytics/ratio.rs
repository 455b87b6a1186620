use crate::chain::types::ExpirationSlice;

/// Put/call volume and open-interest ratios for one expiration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PutCallRatio {
    pub call_volume: u64,
    pub put_volume: u64,
    pub call_open_interest: u64,
    pub put_open_interest: u64,
    /// put volume / max(call volume, 1)
    pub volume_ratio: f64,
    /// put OI / max(call OI, 1)
    pub oi_ratio: f64,
}

impl PutCallRatio {
    pub fn volume_interpretation(&self) -> &'static str {
        interpret_volume_ratio(self.volume_ratio)
    }

    pub fn oi_interpretation(&self) -> &'static str {
        interpret_oi_ratio(self.oi_ratio)
    }

    pub fn sentiment(&self) -> Sentiment {
        Sentiment::from_ratio(self.volume_ratio)
    }
}

/// Coarse market mood derived from a put/call ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sentiment {
    Bearish,
    SomewhatBearish,
    Neutral,
    SomewhatBullish,
    Bullish,
}

impl Sentiment {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 1.5 {
            Sentiment::Bearish
        } else if ratio > 1.0 {
            Sentiment::SomewhatBearish
        } else if ratio > 0.7 {
            Sentiment::Neutral
        } else if ratio > 0.5 {
            Sentiment::SomewhatBullish
        } else {
            Sentiment::Bullish
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Bearish => "Bearish",
            Sentiment::SomewhatBearish => "Somewhat Bearish",
            Sentiment::Neutral => "Neutral",
            Sentiment::SomewhatBullish => "Somewhat Bullish",
            Sentiment::Bullish => "Bullish",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub fn put_call_ratio(slice: &ExpirationSlice) -> PutCallRatio {
    let call_volume: u64 = slice.calls.iter().map(|c| c.volume).sum();
    let put_volume: u64 = slice.puts.iter().map(|p| p.volume).sum();
    let call_open_interest: u64 = slice.calls.iter().map(|c| c.open_interest).sum();
    let put_open_interest: u64 = slice.puts.iter().map(|p| p.open_interest).sum();

    PutCallRatio {
        call_volume,
        put_volume,
        call_open_interest,
        put_open_interest,
        volume_ratio: put_volume as f64 / call_volume.max(1) as f64,
        oi_ratio: put_open_interest as f64 / call_open_interest.max(1) as f64,
    }
}

pub fn interpret_volume_ratio(ratio: f64) -> &'static str {
    if ratio > 1.5 {
        "Strongly bearish - Recent high put buying activity"
    } else if ratio > 1.0 {
        "Moderately bearish - More put than call activity"
    } else if ratio > 0.7 {
        "Neutral to slightly bearish"
    } else if ratio > 0.5 {
        "Neutral to slightly bullish"
    } else {
        "Bullish - Significantly more call than put activity"
    }
}

pub fn interpret_oi_ratio(ratio: f64) -> &'static str {
    if ratio > 1.5 {
        "Strongly bearish sentiment"
    } else if ratio > 1.0 {
        "Moderately bearish sentiment"
    } else if ratio > 0.7 {
        "Neutral to slightly bearish sentiment"
    } else if ratio > 0.5 {
        "Neutral to slightly bullish sentiment"
    } else {
        "Bullish sentiment"
    }
}
