//! Core types shared across the pipeline

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Recommended trade action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

/// Risk classification for a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Directional bias of an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Bias {
    Bullish,
    #[default]
    Neutral,
    Bearish,
}

impl From<SignalAction> for Bias {
    fn from(action: SignalAction) -> Self {
        match action {
            SignalAction::Buy => Bias::Bullish,
            SignalAction::Sell => Bias::Bearish,
            SignalAction::Hold => Bias::Neutral,
        }
    }
}

/// Informational strength tier of a fused signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalTier {
    Strong,
    Moderate,
    Weak,
}

/// Suggested option strategy attached to an analysis
///
/// Required fields are enforced by the variant shape; arity and numeric
/// bounds are checked by the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionStrategy {
    CallSpread {
        strikes: Vec<Decimal>,
        expiry: NaiveDate,
    },
    PutSpread {
        strikes: Vec<Decimal>,
        expiry: NaiveDate,
    },
    IronCondor {
        strikes: Vec<Decimal>,
        expiry: NaiveDate,
    },
    Straddle {
        strike: Decimal,
        expiry: NaiveDate,
    },
}

impl OptionStrategy {
    /// Strategy type name as it appears on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            OptionStrategy::CallSpread { .. } => "CALL_SPREAD",
            OptionStrategy::PutSpread { .. } => "PUT_SPREAD",
            OptionStrategy::IronCondor { .. } => "IRON_CONDOR",
            OptionStrategy::Straddle { .. } => "STRADDLE",
        }
    }

    pub fn expiry(&self) -> NaiveDate {
        match self {
            OptionStrategy::CallSpread { expiry, .. }
            | OptionStrategy::PutSpread { expiry, .. }
            | OptionStrategy::IronCondor { expiry, .. }
            | OptionStrategy::Straddle { expiry, .. } => *expiry,
        }
    }
}

/// An accepted, timestamped trading recommendation
///
/// Created only by the orchestrator after a candidate clears a gate.
/// Immutable once created; appended to the symbol's ordered history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub action: SignalAction,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub risk_level: RiskLevel,
    pub final_score: f64,
    pub reasoning: String,
    pub recommendation: String,
    pub strategy_type: String,
}

/// Analysis record fed into the fusion engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default)]
    pub symbol: String,
    /// Base confidence in [0,1]; a missing value deserializes to 0 and is
    /// rejected by the fusion floor.
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub bias: Bias,
    #[serde(default)]
    pub suggested_strategy: Option<OptionStrategy>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub logic_chain: Vec<String>,
}

/// Signal candidate produced by the fusion engine, pre-validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedSignal {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub bias: Bias,
    pub tier: SignalTier,
    /// Fusion strength in [0,1]
    pub strength: f64,
    pub suggested_strategy: Option<OptionStrategy>,
    pub risk_factors: Vec<String>,
    pub logic_chain: Vec<String>,
}

/// Flat context handed to the arbitration gate
#[derive(Debug, Clone, Serialize)]
pub struct SignalContext {
    pub symbol: String,
    pub current_price: Decimal,
    pub target_price: Decimal,
    pub stop_loss: Decimal,
    /// |target - current| / |current - stop|
    pub risk_reward: Decimal,
    pub confidence: f64,
    /// Sector move in percent
    pub sector_performance: f64,
    pub option_flow: String,
    pub direction: SignalAction,
    pub strategy: String,
}

/// Notification category for a dispatched signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Entry,
    Exit,
    Hold,
}

/// Payload forwarded to the notification dispatcher for one signal
#[derive(Debug, Clone, Serialize)]
pub struct NotificationPayload {
    pub kind: NotificationKind,
    pub symbol: String,
    pub strategy: String,
    pub direction: Bias,
    pub confidence: f64,
    pub price: Decimal,
    /// Rough reward:risk estimate derived from the final score
    pub rr_ratio: f64,
    pub ai_insight: String,
}

/// Option entry alert sent when the arbitration gate approves a trade
#[derive(Debug, Clone, Serialize)]
pub struct OptionEntry {
    pub symbol: String,
    pub option_type: String,
    pub strike_price: Decimal,
    pub expiry_date: DateTime<Utc>,
    pub current_price: Decimal,
    pub implied_volatility: f64,
    pub support: Decimal,
    pub resistance: Decimal,
    pub risk_reward_ratio: Decimal,
    pub confidence_score: f64,
    pub analysis: String,
}

/// Daily performance metrics attached to the rollup report
#[derive(Debug, Clone, Default, Serialize)]
pub struct DailyPerformance {
    pub daily_pnl: Decimal,
    pub weekly_pnl: Decimal,
    pub monthly_pnl: Decimal,
}
