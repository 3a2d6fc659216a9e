//! Unit tests for strategy and signal validation

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::config::ValidationConfig;
    use crate::types::{Bias, FusedSignal, OptionStrategy, SignalTier};
    use chrono::{Duration, NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn validator() -> StrategyValidator {
        StrategyValidator::new(ValidationConfig::default()).with_today(today())
    }

    fn expiry(days_out: i64) -> NaiveDate {
        today() + Duration::days(days_out)
    }

    fn fused(strength: f64, strategy: Option<OptionStrategy>) -> FusedSignal {
        FusedSignal {
            timestamp: Utc::now(),
            symbol: "AAPL".to_string(),
            bias: Bias::Bullish,
            tier: SignalTier::Strong,
            strength,
            suggested_strategy: strategy,
            risk_factors: vec![],
            logic_chain: vec![],
        }
    }

    #[test]
    fn test_call_spread_wrong_arity_rejected() {
        let strategy = OptionStrategy::CallSpread {
            strikes: vec![dec!(150)],
            expiry: expiry(20),
        };
        let result = validator().validate_strategy(&strategy);
        assert_eq!(
            result,
            Validation::Invalid {
                reason: "Invalid strikes format".to_string()
            }
        );
    }

    #[test]
    fn test_call_spread_width_out_of_range() {
        // Width 15 exceeds the [2, 10] bounds
        let strategy = OptionStrategy::CallSpread {
            strikes: vec![dec!(150), dec!(165)],
            expiry: expiry(20),
        };
        let result = validator().validate_strategy(&strategy);
        assert_eq!(
            result,
            Validation::Invalid {
                reason: "Spread width out of range".to_string()
            }
        );
    }

    #[test]
    fn test_put_spread_valid_with_descending_strikes() {
        // Strikes [110, 105]: |105 - 110| = 5, inside [2, 10]; 20 DTE inside [7, 45]
        let strategy = OptionStrategy::PutSpread {
            strikes: vec![dec!(110), dec!(105)],
            expiry: expiry(20),
        };
        let result = validator().validate_strategy(&strategy);
        assert_eq!(
            result,
            Validation::Valid {
                risk_level: RiskLevel::Medium
            }
        );
    }

    #[test]
    fn test_iron_condor_narrow_wing_rejected() {
        // Put wing width 1 is under the minimum of 2
        let strategy = OptionStrategy::IronCondor {
            strikes: vec![dec!(90), dec!(91), dec!(110), dec!(112)],
            expiry: expiry(20),
        };
        let result = validator().validate_strategy(&strategy);
        assert_eq!(
            result,
            Validation::Invalid {
                reason: "Put spread width out of range".to_string()
            }
        );
    }

    #[test]
    fn test_iron_condor_call_wing_checked_independently() {
        let strategy = OptionStrategy::IronCondor {
            strikes: vec![dec!(90), dec!(95), dec!(110), dec!(111)],
            expiry: expiry(20),
        };
        let result = validator().validate_strategy(&strategy);
        assert_eq!(
            result,
            Validation::Invalid {
                reason: "Call spread width out of range".to_string()
            }
        );
    }

    #[test]
    fn test_iron_condor_valid_is_low_risk() {
        let strategy = OptionStrategy::IronCondor {
            strikes: vec![dec!(90), dec!(95), dec!(110), dec!(115)],
            expiry: expiry(30),
        };
        assert_eq!(
            validator().validate_strategy(&strategy),
            Validation::Valid {
                risk_level: RiskLevel::Low
            }
        );
    }

    #[test]
    fn test_straddle_valid_is_high_risk() {
        let strategy = OptionStrategy::Straddle {
            strike: dec!(100),
            expiry: expiry(14),
        };
        assert_eq!(
            validator().validate_strategy(&strategy),
            Validation::Valid {
                risk_level: RiskLevel::High
            }
        );
    }

    #[test]
    fn test_dte_too_near_rejected() {
        let strategy = OptionStrategy::Straddle {
            strike: dec!(100),
            expiry: expiry(3),
        };
        assert_eq!(
            validator().validate_strategy(&strategy),
            Validation::Invalid {
                reason: "DTE out of range".to_string()
            }
        );
    }

    #[test]
    fn test_dte_too_far_rejected() {
        let strategy = OptionStrategy::CallSpread {
            strikes: vec![dec!(150), dec!(155)],
            expiry: expiry(60),
        };
        assert_eq!(
            validator().validate_strategy(&strategy),
            Validation::Invalid {
                reason: "DTE out of range".to_string()
            }
        );
    }

    #[test]
    fn test_dte_bounds_inclusive() {
        let v = validator();
        let at_min = OptionStrategy::Straddle {
            strike: dec!(100),
            expiry: expiry(7),
        };
        let at_max = OptionStrategy::Straddle {
            strike: dec!(100),
            expiry: expiry(45),
        };
        assert!(v.validate_strategy(&at_min).is_valid());
        assert!(v.validate_strategy(&at_max).is_valid());
    }

    #[test]
    fn test_signal_strength_too_low_rejected() {
        let strategy = OptionStrategy::PutSpread {
            strikes: vec![dec!(110), dec!(105)],
            expiry: expiry(20),
        };
        let assessment = validator().validate_signal(&fused(0.55, Some(strategy)));
        assert_eq!(
            assessment,
            SignalAssessment::Invalid {
                reason: "Signal strength too low".to_string()
            }
        );
    }

    #[test]
    fn test_signal_without_strategy_rejected() {
        let assessment = validator().validate_signal(&fused(0.85, None));
        assert!(!assessment.is_valid());
    }

    #[test]
    fn test_signal_quality_high_at_point_eight() {
        let strategy = OptionStrategy::CallSpread {
            strikes: vec![dec!(150), dec!(155)],
            expiry: expiry(20),
        };
        let assessment = validator().validate_signal(&fused(0.85, Some(strategy)));
        assert_eq!(
            assessment,
            SignalAssessment::Valid {
                quality: SignalQuality::High,
                strategy_risk: RiskLevel::Medium
            }
        );
    }

    #[test]
    fn test_signal_quality_moderate_under_point_eight() {
        let strategy = OptionStrategy::CallSpread {
            strikes: vec![dec!(150), dec!(155)],
            expiry: expiry(20),
        };
        let assessment = validator().validate_signal(&fused(0.7, Some(strategy)));
        assert_eq!(
            assessment,
            SignalAssessment::Valid {
                quality: SignalQuality::Moderate,
                strategy_risk: RiskLevel::Medium
            }
        );
    }

    #[test]
    fn test_invalid_strategy_reason_propagates() {
        let strategy = OptionStrategy::CallSpread {
            strikes: vec![dec!(150)],
            expiry: expiry(20),
        };
        match validator().validate_signal(&fused(0.85, Some(strategy))) {
            SignalAssessment::Invalid { reason } => {
                assert!(reason.contains("Invalid strikes format"));
            }
            other => panic!("expected invalid assessment, got {:?}", other),
        }
    }
}
