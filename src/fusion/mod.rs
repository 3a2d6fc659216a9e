//! Signal fusion engine
//!
//! Scores one analysis record into a classified signal candidate, or
//! rejects it outright. Strength combines the model's base confidence
//! with a directional-bias multiplier that penalizes indecisive calls.


use crate::types::{AnalysisReport, Bias, FusedSignal, SignalTier};
use chrono::Utc;
use tracing::debug;

/// Strength thresholds for classification and the acceptance floor
#[derive(Debug, Clone)]
pub struct FusionThresholds {
    /// Strength at or above which a candidate is STRONG
    pub strong: f64,
    /// Strength at or above which a candidate is MODERATE
    pub moderate: f64,
    /// Hard floor: candidates below this are rejected regardless of tier
    pub min_strength: f64,
}

impl Default for FusionThresholds {
    fn default() -> Self {
        Self {
            strong: 0.75,
            moderate: 0.50,
            min_strength: 0.60,
        }
    }
}

/// Fuses analysis confidence and bias into a signal candidate
#[derive(Debug, Clone, Default)]
pub struct SignalFusionEngine {
    thresholds: FusionThresholds,
}

impl SignalFusionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: FusionThresholds) -> Self {
        Self { thresholds }
    }

    /// Fusion strength: clamp(confidence × bias multiplier, 0, 1)
    ///
    /// Bullish and bearish calls keep full weight; neutral calls are
    /// discounted to 0.8.
    pub fn signal_strength(&self, report: &AnalysisReport) -> f64 {
        let multiplier = match report.bias {
            Bias::Bullish | Bias::Bearish => 1.0,
            Bias::Neutral => 0.8,
        };
        (report.confidence * multiplier).clamp(0.0, 1.0)
    }

    /// Classify a strength value; informational only, the acceptance
    /// floor is independent of (and stricter than) the WEAK boundary.
    pub fn classify(&self, strength: f64) -> SignalTier {
        if strength >= self.thresholds.strong {
            SignalTier::Strong
        } else if strength >= self.thresholds.moderate {
            SignalTier::Moderate
        } else {
            SignalTier::Weak
        }
    }

    /// Score an analysis record into a signal candidate
    ///
    /// Returns `None` when strength falls under the floor. Never errors:
    /// a report with missing confidence scores 0 and is rejected.
    pub fn process(&self, report: &AnalysisReport) -> Option<FusedSignal> {
        let strength = self.signal_strength(report);

        if strength < self.thresholds.min_strength {
            debug!(
                "{}: fusion strength {:.2} below floor {:.2}, rejecting",
                report.symbol, strength, self.thresholds.min_strength
            );
            return None;
        }

        Some(FusedSignal {
            timestamp: Utc::now(),
            symbol: report.symbol.clone(),
            bias: report.bias,
            tier: self.classify(strength),
            strength,
            suggested_strategy: report.suggested_strategy.clone(),
            risk_factors: report.risk_factors.clone(),
            logic_chain: report.logic_chain.clone(),
        })
    }
}
