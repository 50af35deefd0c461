use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of values a strategy rule may reference.
///
/// Bar fields are read straight from the price series; everything else comes
/// from the indicator provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndicatorKind {
    Price,
    Open,
    High,
    Low,
    Volume,
    Sma20,
    Sma50,
    Ema12,
    Ema26,
    Rsi,
    Macd,
    MacdSignal,
    MacdHistogram,
    BbUpper,
    BbMiddle,
    BbLower,
    Atr,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 17] = [
        IndicatorKind::Price,
        IndicatorKind::Open,
        IndicatorKind::High,
        IndicatorKind::Low,
        IndicatorKind::Volume,
        IndicatorKind::Sma20,
        IndicatorKind::Sma50,
        IndicatorKind::Ema12,
        IndicatorKind::Ema26,
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::MacdSignal,
        IndicatorKind::MacdHistogram,
        IndicatorKind::BbUpper,
        IndicatorKind::BbMiddle,
        IndicatorKind::BbLower,
        IndicatorKind::Atr,
    ];

    /// Resolve a rule's indicator name. Case, `_`, `-` and `.` are ignored,
    /// so `macd_signal`, `macdSignal` and `MACD.signal` are the same name.
    pub fn parse(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | '.' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        let kind = match key.as_str() {
            "price" | "close" => Self::Price,
            "open" => Self::Open,
            "high" => Self::High,
            "low" => Self::Low,
            "volume" => Self::Volume,
            "sma20" => Self::Sma20,
            "sma50" => Self::Sma50,
            "ema12" => Self::Ema12,
            "ema26" => Self::Ema26,
            "rsi" => Self::Rsi,
            "macd" => Self::Macd,
            "macdsignal" => Self::MacdSignal,
            "macdhistogram" | "macdhist" => Self::MacdHistogram,
            "bbupper" | "bollingerupper" => Self::BbUpper,
            "bbmiddle" | "bollingermiddle" => Self::BbMiddle,
            "bblower" | "bollingerlower" => Self::BbLower,
            "atr" => Self::Atr,
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Volume => "volume",
            Self::Sma20 => "sma20",
            Self::Sma50 => "sma50",
            Self::Ema12 => "ema12",
            Self::Ema26 => "ema26",
            Self::Rsi => "rsi",
            Self::Macd => "macd",
            Self::MacdSignal => "macdSignal",
            Self::MacdHistogram => "macdHistogram",
            Self::BbUpper => "bbUpper",
            Self::BbMiddle => "bbMiddle",
            Self::BbLower => "bbLower",
            Self::Atr => "atr",
        }
    }

    /// True for values taken from the bar itself rather than the provider
    pub fn is_bar_field(self) -> bool {
        matches!(
            self,
            Self::Price | Self::Open | Self::High | Self::Low | Self::Volume
        )
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
