//! Tests for the durable signal store

#[cfg(test)]
mod tests {
    use super::super::error::PipelineError;
    use super::super::store::SignalStore;
    use super::super::types::{RiskLevel, Signal, SignalAction};
    use chrono::{Duration, Utc};
    use std::collections::HashMap;

    fn signal(symbol: &str, offset_secs: i64) -> Signal {
        Signal {
            symbol: symbol.to_string(),
            action: SignalAction::Buy,
            confidence: 0.8,
            timestamp: Utc::now() + Duration::seconds(offset_secs),
            risk_level: RiskLevel::Medium,
            final_score: 0.8,
            reasoning: "test".to_string(),
            recommendation: String::new(),
            strategy_type: "Momentum".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_history_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SignalStore::new(dir.path().join("signals.json"));

        let history: HashMap<String, Vec<Signal>> = HashMap::new();
        store.save(&history).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_round_trip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = SignalStore::new(dir.path().join("signals.json"));

        let mut history = HashMap::new();
        history.insert(
            "AAPL".to_string(),
            vec![signal("AAPL", 0), signal("AAPL", 60), signal("AAPL", 120)],
        );
        history.insert("SPY".to_string(), vec![signal("SPY", 0)]);

        store.save(&history).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, history);
        // Insertion order within a symbol is significant
        let aapl = &loaded["AAPL"];
        assert!(aapl[0].timestamp < aapl[1].timestamp);
        assert!(aapl[1].timestamp < aapl[2].timestamp);
    }

    #[tokio::test]
    async fn test_save_overwrites_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store = SignalStore::new(dir.path().join("signals.json"));

        let mut first = HashMap::new();
        first.insert("AAPL".to_string(), vec![signal("AAPL", 0)]);
        store.save(&first).await.unwrap();

        let mut second = HashMap::new();
        second.insert("SPY".to_string(), vec![signal("SPY", 0)]);
        store.save(&second).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert!(!loaded.contains_key("AAPL"));
        assert!(loaded.contains_key("SPY"));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SignalStore::new(dir.path().join("missing.json"));
        assert!(!store.exists());
        assert!(matches!(
            store.load().await,
            Err(PipelineError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signals.json");
        tokio::fs::write(&path, "not json at all").await.unwrap();

        let store = SignalStore::new(path);
        assert!(matches!(
            store.load().await,
            Err(PipelineError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = SignalStore::new(dir.path().join("nested").join("signals.json"));

        let history: HashMap<String, Vec<Signal>> = HashMap::new();
        store.save(&history).await.unwrap();
        assert!(store.exists());
    }
}
