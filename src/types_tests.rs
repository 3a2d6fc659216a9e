//! Tests for core type serialization

#[cfg(test)]
mod tests {
    use super::super::types::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn signal() -> Signal {
        Signal {
            symbol: "AAPL".to_string(),
            action: SignalAction::Buy,
            confidence: 0.8,
            timestamp: Utc::now(),
            risk_level: RiskLevel::Medium,
            final_score: 0.8,
            reasoning: "Breakout".to_string(),
            recommendation: "Buy call spread".to_string(),
            strategy_type: "Momentum".to_string(),
        }
    }

    #[test]
    fn test_signal_action_wire_format() {
        assert_eq!(serde_json::to_string(&SignalAction::Buy).unwrap(), "\"BUY\"");
        assert_eq!(
            serde_json::to_string(&SignalAction::Sell).unwrap(),
            "\"SELL\""
        );
        assert_eq!(
            serde_json::from_str::<SignalAction>("\"HOLD\"").unwrap(),
            SignalAction::Hold
        );
    }

    #[test]
    fn test_risk_level_wire_format() {
        assert_eq!(serde_json::to_string(&RiskLevel::Low).unwrap(), "\"LOW\"");
        assert_eq!(
            serde_json::from_str::<RiskLevel>("\"MEDIUM\"").unwrap(),
            RiskLevel::Medium
        );
    }

    #[test]
    fn test_signal_round_trip() {
        let original = signal();
        let json = serde_json::to_string(&original).unwrap();
        let restored: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_option_strategy_tagged_format() {
        let strategy = OptionStrategy::CallSpread {
            strikes: vec![dec!(150), dec!(155)],
            expiry: NaiveDate::from_ymd_opt(2025, 7, 18).unwrap(),
        };
        let json = serde_json::to_value(&strategy).unwrap();
        assert_eq!(json["type"], "CALL_SPREAD");
        assert_eq!(json["expiry"], "2025-07-18");

        let restored: OptionStrategy = serde_json::from_value(json).unwrap();
        assert_eq!(restored, strategy);
        assert_eq!(restored.kind(), "CALL_SPREAD");
    }

    #[test]
    fn test_straddle_has_single_strike_field() {
        let json = r#"{"type": "STRADDLE", "strike": "100", "expiry": "2025-07-18"}"#;
        let strategy: OptionStrategy = serde_json::from_str(json).unwrap();
        match strategy {
            OptionStrategy::Straddle { strike, .. } => assert_eq!(strike, dec!(100)),
            other => panic!("expected straddle, got {:?}", other),
        }
    }

    #[test]
    fn test_strategy_missing_required_field_fails_to_parse() {
        let json = r#"{"type": "CALL_SPREAD", "strikes": [150, 155]}"#;
        assert!(serde_json::from_str::<OptionStrategy>(json).is_err());
    }

    #[test]
    fn test_bias_from_action() {
        assert_eq!(Bias::from(SignalAction::Buy), Bias::Bullish);
        assert_eq!(Bias::from(SignalAction::Sell), Bias::Bearish);
        assert_eq!(Bias::from(SignalAction::Hold), Bias::Neutral);
    }

    #[test]
    fn test_analysis_report_defaults() {
        let report: AnalysisReport = serde_json::from_str("{}").unwrap();
        assert_eq!(report.confidence, 0.0);
        assert_eq!(report.bias, Bias::Neutral);
        assert!(report.suggested_strategy.is_none());
        assert!(report.risk_factors.is_empty());
    }
}
