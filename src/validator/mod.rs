//! Option strategy and signal validation
//!
//! Pure structural and numeric checks. Every failure path returns a
//! structured reason, never an error.

#[cfg(test)]
mod tests;

use crate::config::ValidationConfig;
use crate::types::{FusedSignal, OptionStrategy, RiskLevel};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Minimum fused strength a signal must carry to be validated at all
const MIN_SIGNAL_STRENGTH: f64 = 0.6;

/// Strength at or above which a validated signal is HIGH quality
const HIGH_QUALITY_STRENGTH: f64 = 0.8;

/// Outcome of a single strategy validation
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Valid { risk_level: RiskLevel },
    Invalid { reason: String },
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid { .. })
    }

    fn invalid(reason: impl Into<String>) -> Self {
        Validation::Invalid {
            reason: reason.into(),
        }
    }
}

/// Quality grade of a validated fused signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalQuality {
    High,
    Moderate,
}

/// Combined assessment of a fused signal and its embedded strategy
#[derive(Debug, Clone, PartialEq)]
pub enum SignalAssessment {
    Valid {
        quality: SignalQuality,
        strategy_risk: RiskLevel,
    },
    Invalid {
        reason: String,
    },
}

impl SignalAssessment {
    pub fn is_valid(&self) -> bool {
        matches!(self, SignalAssessment::Valid { .. })
    }
}

/// Validates option strategy structure and overall signal strength
#[derive(Debug, Clone, Default)]
pub struct StrategyValidator {
    config: ValidationConfig,
    /// Fixed reference date for DTE checks; `None` means today
    today: Option<NaiveDate>,
}

impl StrategyValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            today: None,
        }
    }

    /// Pin the reference date used for days-to-expiry checks
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
    }

    /// Validate one suggested strategy against the rule table
    pub fn validate_strategy(&self, strategy: &OptionStrategy) -> Validation {
        match strategy {
            OptionStrategy::CallSpread { strikes, expiry }
            | OptionStrategy::PutSpread { strikes, expiry } => {
                if strikes.len() != 2 {
                    return Validation::invalid("Invalid strikes format");
                }
                let width = (strikes[1] - strikes[0]).abs();
                if !self.width_in_bounds(width) {
                    return Validation::invalid("Spread width out of range");
                }
                if let Some(v) = self.check_dte(*expiry) {
                    return v;
                }
                Validation::Valid {
                    risk_level: RiskLevel::Medium,
                }
            }
            OptionStrategy::IronCondor { strikes, expiry } => {
                if strikes.len() != 4 {
                    return Validation::invalid("Invalid strikes format");
                }
                let put_width = (strikes[1] - strikes[0]).abs();
                let call_width = (strikes[3] - strikes[2]).abs();
                if !self.width_in_bounds(put_width) {
                    return Validation::invalid("Put spread width out of range");
                }
                if !self.width_in_bounds(call_width) {
                    return Validation::invalid("Call spread width out of range");
                }
                if let Some(v) = self.check_dte(*expiry) {
                    return v;
                }
                Validation::Valid {
                    risk_level: RiskLevel::Low,
                }
            }
            OptionStrategy::Straddle { expiry, .. } => {
                if let Some(v) = self.check_dte(*expiry) {
                    return v;
                }
                Validation::Valid {
                    risk_level: RiskLevel::High,
                }
            }
        }
    }

    /// Validate a fused signal: strength floor first, then the embedded
    /// strategy, combined into one assessment.
    pub fn validate_signal(&self, signal: &FusedSignal) -> SignalAssessment {
        if signal.strength < MIN_SIGNAL_STRENGTH {
            return SignalAssessment::Invalid {
                reason: "Signal strength too low".to_string(),
            };
        }

        let strategy = match &signal.suggested_strategy {
            Some(s) => s,
            None => {
                return SignalAssessment::Invalid {
                    reason: "No suggested strategy".to_string(),
                }
            }
        };

        match self.validate_strategy(strategy) {
            Validation::Valid { risk_level } => SignalAssessment::Valid {
                quality: if signal.strength >= HIGH_QUALITY_STRENGTH {
                    SignalQuality::High
                } else {
                    SignalQuality::Moderate
                },
                strategy_risk: risk_level,
            },
            Validation::Invalid { reason } => SignalAssessment::Invalid {
                reason: format!("Strategy validation failed: {}", reason),
            },
        }
    }

    fn width_in_bounds(&self, width: Decimal) -> bool {
        width >= self.config.min_spread_width && width <= self.config.max_spread_width
    }

    /// Days-to-expiry bounds check; `None` means the expiry is acceptable
    fn check_dte(&self, expiry: NaiveDate) -> Option<Validation> {
        let dte = (expiry - self.today()).num_days();
        if dte < self.config.min_dte || dte > self.config.max_dte {
            return Some(Validation::invalid("DTE out of range"));
        }
        None
    }
}
