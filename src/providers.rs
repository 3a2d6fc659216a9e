//! External collaborator interfaces
//!
//! Market data retrieval, symbol analysis and notification delivery are
//! owned by the embedding process; the pipeline talks to them through
//! these traits. Each is automocked for tests.

use crate::error::Result;
use crate::types::{
    DailyPerformance, NotificationPayload, OptionEntry, RiskLevel, Signal, SignalAction,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One indicator-annotated OHLCV bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    #[serde(default)]
    pub indicators: IndicatorSet,
}

/// Technical indicators computed by the data layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    /// Rolling close volatility (stddev / mean)
    pub volatility: Option<f64>,
}

/// Strategy analysis for one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyAnalysis {
    pub action: SignalAction,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub target_price: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub strategy: String,
    #[serde(default)]
    pub sector_performance: f64,
    #[serde(default)]
    pub option_flow: String,
    #[serde(default)]
    pub implied_volatility: Option<f64>,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub suggested_strategy: Option<crate::types::OptionStrategy>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub logic_chain: Vec<String>,
}

/// Source of indicator-annotated market data
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch an OHLCV series with indicators for the given lookback window
    async fn ohlcv(&self, symbol: &str, lookback_days: u32) -> Result<Vec<Candle>>;

    /// Latest traded price
    async fn current_price(&self, symbol: &str) -> Result<Decimal>;
}

/// Strategy analysis service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(
        &self,
        symbol: &str,
        candles: &[Candle],
        current_price: Decimal,
    ) -> Result<StrategyAnalysis>;
}

/// Outbound notification transport
///
/// Fire-and-forget: the pipeline logs delivery failures but never blocks
/// on or retries them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch_signal(&self, payload: &NotificationPayload) -> Result<()>;

    async fn send_daily_report(
        &self,
        signals: &[Signal],
        performance: &DailyPerformance,
    ) -> Result<()>;

    async fn send_option_entry_signal(&self, entry: &OptionEntry) -> Result<()>;
}
