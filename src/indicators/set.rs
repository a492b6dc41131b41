// =============================================================================
// Indicator Set — the full indicator snapshot for one analysis call
// =============================================================================
//
// Runs every indicator in this module over one series and files the results
// by category. Ordered maps keep the serialised form stable across calls.
// Indicators that fell back to their neutral value because the series was too
// short are listed in `degraded`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::indicators::adx::{calculate_dmi, DmiResult};
use crate::indicators::atr::calculate_atr;
use crate::indicators::bollinger::{calculate_bollinger, Bands};
use crate::indicators::cci::calculate_cci;
use crate::indicators::ema::{calculate_sma, current_ema};
use crate::indicators::ichimoku::{calculate_ichimoku, IchimokuResult};
use crate::indicators::keltner::calculate_keltner;
use crate::indicators::macd::{calculate_macd, warmup_bars, MacdResult};
use crate::indicators::roc::calculate_roc;
use crate::indicators::rsi::current_rsi;
use crate::indicators::stochastic::{calculate_stochastic, calculate_williams_r, StochasticResult};
use crate::indicators::volume::{calculate_cmf, calculate_mfi, calculate_obv, calculate_vwap};
use crate::market_data::PriceBar;

pub const SMA_SHORT: &str = "sma_short";
pub const SMA_LONG: &str = "sma_long";
pub const EMA_FAST: &str = "ema_fast";
pub const EMA_SLOW: &str = "ema_slow";
pub const MACD: &str = "macd";
pub const RSI: &str = "rsi";
pub const STOCHASTIC: &str = "stochastic";
pub const WILLIAMS_R: &str = "williams_r";
pub const CCI: &str = "cci";
pub const ROC: &str = "roc";
pub const BOLLINGER: &str = "bollinger";
pub const ATR: &str = "atr";
pub const OBV: &str = "obv";
pub const VWAP: &str = "vwap";
pub const CMF: &str = "cmf";
pub const MFI: &str = "mfi";
pub const ADX: &str = "adx";
pub const DMI: &str = "dmi";
pub const ICHIMOKU: &str = "ichimoku";
pub const KELTNER: &str = "keltner";

/// Look-back periods and multipliers for the full indicator set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub sma_short: usize,
    pub sma_long: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_std: f64,
    pub atr_period: usize,
    pub stochastic_k: usize,
    pub stochastic_d: usize,
    pub williams_period: usize,
    pub cci_period: usize,
    pub mfi_period: usize,
    pub adx_period: usize,
    pub cmf_period: usize,
    pub keltner_period: usize,
    pub keltner_multiplier: f64,
    pub roc_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_short: 20,
            sma_long: 50,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_std: 2.0,
            atr_period: 14,
            stochastic_k: 14,
            stochastic_d: 3,
            williams_period: 14,
            cci_period: 20,
            mfi_period: 14,
            adx_period: 14,
            cmf_period: 21,
            keltner_period: 20,
            keltner_multiplier: 2.0,
            roc_period: 12,
        }
    }
}

/// Value of a single indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndicatorValue {
    Scalar {
        value: f64,
    },
    Band {
        upper: f64,
        middle: f64,
        lower: f64,
    },
    OscillatorPair {
        k: f64,
        d: f64,
    },
    Directional {
        di_plus: f64,
        di_minus: f64,
    },
    Macd {
        macd_line: f64,
        signal_line: f64,
        histogram: f64,
        bullish: bool,
    },
    Ichimoku {
        tenkan: f64,
        kijun: f64,
        senkou_a: f64,
        senkou_b: f64,
        chikou: f64,
        bullish: bool,
    },
}

impl IndicatorValue {
    pub fn scalar(value: f64) -> Self {
        Self::Scalar { value }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match *self {
            Self::Scalar { value } => Some(value),
            _ => None,
        }
    }
}

impl From<Bands> for IndicatorValue {
    fn from(b: Bands) -> Self {
        Self::Band {
            upper: b.upper,
            middle: b.middle,
            lower: b.lower,
        }
    }
}

impl From<StochasticResult> for IndicatorValue {
    fn from(s: StochasticResult) -> Self {
        Self::OscillatorPair { k: s.k, d: s.d }
    }
}

impl From<DmiResult> for IndicatorValue {
    fn from(d: DmiResult) -> Self {
        Self::Directional {
            di_plus: d.di_plus,
            di_minus: d.di_minus,
        }
    }
}

impl From<MacdResult> for IndicatorValue {
    fn from(m: MacdResult) -> Self {
        Self::Macd {
            macd_line: m.macd_line,
            signal_line: m.signal_line,
            histogram: m.histogram,
            bullish: m.is_bullish(),
        }
    }
}

impl From<IchimokuResult> for IndicatorValue {
    fn from(i: IchimokuResult) -> Self {
        Self::Ichimoku {
            tenkan: i.tenkan,
            kijun: i.kijun,
            senkou_a: i.senkou_a,
            senkou_b: i.senkou_b,
            chikou: i.chikou,
            bullish: i.is_bullish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorCategory {
    Trend,
    Momentum,
    Volatility,
    Volume,
    Strength,
    Advanced,
}

type Group = BTreeMap<String, IndicatorValue>;

/// Every indicator for one series, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub trend: Group,
    pub momentum: Group,
    pub volatility: Group,
    pub volume: Group,
    pub strength: Group,
    pub advanced: Group,
    /// Indicators that returned their neutral fallback for lack of data.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<String>,
}

impl IndicatorSet {
    /// Compute the full indicator set for `bars` (oldest first).
    pub fn compute(bars: &[PriceBar], params: &IndicatorParams) -> Self {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let n = bars.len();
        let mut set = Self::default();

        // --- Trend ---------------------------------------------------------
        set.record(IndicatorCategory::Trend, SMA_SHORT, IndicatorValue::scalar(calculate_sma(&closes, params.sma_short)), n < params.sma_short);
        set.record(IndicatorCategory::Trend, SMA_LONG, IndicatorValue::scalar(calculate_sma(&closes, params.sma_long)), n < params.sma_long);
        set.record(IndicatorCategory::Trend, EMA_FAST, IndicatorValue::scalar(current_ema(&closes, params.macd_fast)), n < params.macd_fast);
        set.record(IndicatorCategory::Trend, EMA_SLOW, IndicatorValue::scalar(current_ema(&closes, params.macd_slow)), n < params.macd_slow);
        let macd = calculate_macd(&closes, params.macd_fast, params.macd_slow, params.macd_signal);
        set.record(IndicatorCategory::Trend, MACD, macd.into(), n < warmup_bars(params.macd_slow, params.macd_signal));

        // --- Momentum ------------------------------------------------------
        set.record(IndicatorCategory::Momentum, RSI, IndicatorValue::scalar(current_rsi(&closes, params.rsi_period)), n < params.rsi_period + 1);
        let stochastic = calculate_stochastic(bars, params.stochastic_k, params.stochastic_d);
        set.record(IndicatorCategory::Momentum, STOCHASTIC, stochastic.into(), n < params.stochastic_k);
        set.record(IndicatorCategory::Momentum, WILLIAMS_R, IndicatorValue::scalar(calculate_williams_r(bars, params.williams_period)), n < params.williams_period);
        set.record(IndicatorCategory::Momentum, CCI, IndicatorValue::scalar(calculate_cci(bars, params.cci_period)), n < params.cci_period);
        set.record(IndicatorCategory::Momentum, ROC, IndicatorValue::scalar(calculate_roc(&closes, params.roc_period)), n <= params.roc_period);

        // --- Volatility ----------------------------------------------------
        let bollinger = calculate_bollinger(&closes, params.bollinger_period, params.bollinger_std);
        set.record(IndicatorCategory::Volatility, BOLLINGER, bollinger.into(), n < params.bollinger_period);
        set.record(IndicatorCategory::Volatility, ATR, IndicatorValue::scalar(calculate_atr(bars, params.atr_period)), n < params.atr_period + 1);

        // --- Volume --------------------------------------------------------
        set.record(IndicatorCategory::Volume, OBV, IndicatorValue::scalar(calculate_obv(bars)), false);
        set.record(IndicatorCategory::Volume, VWAP, IndicatorValue::scalar(calculate_vwap(bars)), false);
        set.record(IndicatorCategory::Volume, CMF, IndicatorValue::scalar(calculate_cmf(bars, params.cmf_period)), n < params.cmf_period);
        set.record(IndicatorCategory::Volume, MFI, IndicatorValue::scalar(calculate_mfi(bars, params.mfi_period)), n < params.mfi_period + 1);

        // --- Strength ------------------------------------------------------
        let dmi = calculate_dmi(bars, params.adx_period);
        let dmi_short = n < 2 * params.adx_period + 1;
        set.record(IndicatorCategory::Strength, ADX, IndicatorValue::scalar(dmi.adx), dmi_short);
        set.record(IndicatorCategory::Strength, DMI, dmi.into(), dmi_short);

        // --- Advanced ------------------------------------------------------
        set.record(IndicatorCategory::Advanced, ICHIMOKU, calculate_ichimoku(bars).into(), n < 52);
        let keltner = calculate_keltner(bars, params.keltner_period, params.keltner_multiplier);
        set.record(IndicatorCategory::Advanced, KELTNER, keltner.into(), n < params.keltner_period + 1);

        set
    }

    fn record(&mut self, category: IndicatorCategory, name: &str, value: IndicatorValue, degraded: bool) {
        self.group_mut(category).insert(name.to_string(), value);
        if degraded {
            self.degraded.push(name.to_string());
        }
    }

    fn group_mut(&mut self, category: IndicatorCategory) -> &mut Group {
        match category {
            IndicatorCategory::Trend => &mut self.trend,
            IndicatorCategory::Momentum => &mut self.momentum,
            IndicatorCategory::Volatility => &mut self.volatility,
            IndicatorCategory::Volume => &mut self.volume,
            IndicatorCategory::Strength => &mut self.strength,
            IndicatorCategory::Advanced => &mut self.advanced,
        }
    }

    fn groups(&self) -> [&Group; 6] {
        [
            &self.trend,
            &self.momentum,
            &self.volatility,
            &self.volume,
            &self.strength,
            &self.advanced,
        ]
    }

    /// Look an indicator up by name across all categories.
    pub fn get(&self, name: &str) -> Option<&IndicatorValue> {
        self.groups().into_iter().find_map(|g| g.get(name))
    }

    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(IndicatorValue::as_scalar)
    }

    pub fn is_degraded(&self, name: &str) -> bool {
        self.degraded.iter().any(|d| d == name)
    }

    /// Total number of indicators in the set.
    pub fn len(&self) -> usize {
        self.groups().iter().map(|g| g.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// RSI, or the neutral 50.0 when absent.
    pub fn rsi(&self) -> f64 {
        self.scalar(RSI).unwrap_or(50.0)
    }

    /// MACD reading, or all zeros when absent.
    pub fn macd(&self) -> MacdResult {
        match self.get(MACD) {
            Some(&IndicatorValue::Macd {
                macd_line,
                signal_line,
                histogram,
                ..
            }) => MacdResult {
                macd_line,
                signal_line,
                histogram,
            },
            _ => MacdResult::default(),
        }
    }
}
