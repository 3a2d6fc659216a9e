//! Execution orchestrator
//!
//! Owns the timer loop, per-symbol pipeline invocation, the signal queue
//! and per-symbol history. One background worker produces onto the queue
//! during each sweep; the queue is drained on the same task right after,
//! so history has exactly one writer and needs no extra locking.


use crate::arbiter::{ArbitratedSignal, ArbitrationGate, JudgeAction};
use crate::config::{ExecutorConfig, ValidationConfig};
use crate::error::{PipelineError, Result};
use crate::fusion::SignalFusionEngine;
use crate::providers::{AnalysisService, MarketDataProvider, NotificationDispatcher};
use crate::store::SignalStore;
use crate::types::{
    AnalysisReport, DailyPerformance, NotificationKind, NotificationPayload, OptionEntry, Signal,
    SignalAction, SignalContext,
};
use crate::validator::{SignalAssessment, StrategyValidator};
use chrono::{DateTime, Local, Timelike, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, Notify, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Minimum bars of market data required before analysis runs
const MIN_BARS: usize = 20;

/// Lookback window requested from the data provider, in days
const LOOKBACK_DAYS: u32 = 365;

/// Per-symbol outcome of one pipeline invocation
///
/// A failed symbol is an outcome, not an error: nothing here escapes to
/// the run loop.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// Confidence cleared the configured minimum in threshold mode
    ThresholdAccepted { signal: Signal },
    /// The arbitration gate produced a verdict (notify may still be false)
    ArbitrationAccepted { result: ArbitratedSignal },
    /// Pipeline ran but no signal was generated
    NoSignal {
        symbol: String,
        confidence: f64,
        threshold: f64,
        reason: String,
    },
    /// Pipeline failed for this symbol this tick
    Failed { symbol: String, message: String },
}

/// Drives the signal pipeline on a fixed interval
pub struct ExecutionOrchestrator {
    config: ExecutorConfig,
    market_data: Arc<dyn MarketDataProvider>,
    analysis: Arc<dyn AnalysisService>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    fusion: SignalFusionEngine,
    validator: StrategyValidator,
    arbiter: Option<ArbitrationGate>,
    /// Fixed local clock for rollup checks; `None` means the system clock
    now: Option<DateTime<Local>>,
    /// Symbol -> ordered signal history; written only by the queue consumer
    history: RwLock<HashMap<String, Vec<Signal>>>,
    queue_tx: mpsc::UnboundedSender<Signal>,
    queue_rx: Mutex<mpsc::UnboundedReceiver<Signal>>,
    daily_signals: Mutex<Vec<Signal>>,
    last_report: Mutex<DateTime<Local>>,
    running: AtomicBool,
    shutdown: Notify,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ExecutionOrchestrator {
    pub fn new(
        config: ExecutorConfig,
        validation: ValidationConfig,
        market_data: Arc<dyn MarketDataProvider>,
        analysis: Arc<dyn AnalysisService>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        Self {
            config,
            market_data,
            analysis,
            dispatcher,
            fusion: SignalFusionEngine::new(),
            validator: StrategyValidator::new(validation),
            arbiter: None,
            now: None,
            history: RwLock::new(HashMap::new()),
            queue_tx,
            queue_rx: Mutex::new(queue_rx),
            daily_signals: Mutex::new(Vec::new()),
            last_report: Mutex::new(Local::now()),
            running: AtomicBool::new(false),
            shutdown: Notify::new(),
            worker: Mutex::new(None),
        }
    }

    /// Switch this instance to arbitration mode
    ///
    /// Threshold and arbitration gating are mutually exclusive per
    /// orchestrator instance.
    pub fn with_arbitration(mut self, gate: ArbitrationGate) -> Self {
        self.config.arbitration = true;
        self.arbiter = Some(gate);
        self
    }

    /// Pin the clock used for daily-rollup checks
    pub fn with_now(mut self, now: DateTime<Local>) -> Self {
        self.now = Some(now);
        self
    }

    fn now_local(&self) -> DateTime<Local> {
        self.now.unwrap_or_else(Local::now)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start the background worker; idempotent
    pub async fn start(self: &Arc<Self>) -> bool {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Orchestrator is already running");
            return false;
        }

        let handle = tokio::spawn(Arc::clone(self).run_loop());
        *self.worker.lock().await = Some(handle);
        info!("Orchestrator started");
        true
    }

    /// Request shutdown and join the worker with a bounded timeout
    ///
    /// Cancellation is cooperative: an in-flight external call is never
    /// hard-interrupted.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Orchestrator is not running");
            return;
        }

        self.shutdown.notify_one();

        let handle = self.worker.lock().await.take();
        if let Some(handle) = handle {
            if tokio::time::timeout(Duration::from_secs(5), handle)
                .await
                .is_err()
            {
                warn!("Worker did not stop within timeout");
            }
        }
        info!("Orchestrator stopped");
    }

    async fn run_loop(self: Arc<Self>) {
        let interval = Duration::from_secs(self.config.interval_secs);
        let backoff = Duration::from_secs(self.config.error_backoff_secs);

        while self.running.load(Ordering::SeqCst) {
            let sleep_for = match self.tick().await {
                Ok(()) => interval,
                Err(e) => {
                    warn!("Error in execution loop: {}", e);
                    backoff
                }
            };

            self.maybe_send_daily_report().await;

            tokio::select! {
                _ = tokio::time::sleep(sleep_for) => {}
                _ = self.shutdown.notified() => break,
            }
        }

        debug!("Orchestrator worker exited");
    }

    /// One full sweep: analyze every symbol, enqueue accepted outcomes,
    /// then drain the queue.
    async fn tick(&self) -> Result<()> {
        for symbol in &self.config.symbols {
            // Cooperative mid-sweep cancellation
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            let outcome = self.execute_strategy(symbol).await;
            self.enqueue_outcome(&outcome)?;
        }

        self.drain_queue().await;
        Ok(())
    }

    /// One-shot sweep over an explicit symbol list
    pub async fn batch_execute(&self, symbols: &[String]) -> HashMap<String, ExecutionOutcome> {
        let mut results = HashMap::new();

        for symbol in symbols {
            let outcome = self.execute_strategy(symbol).await;
            if let Err(e) = self.enqueue_outcome(&outcome) {
                warn!("{}: failed to enqueue outcome: {}", symbol, e);
            }
            results.insert(symbol.clone(), outcome);
        }

        self.drain_queue().await;
        results
    }

    /// Run the pipeline for one symbol
    ///
    /// Any internal error is converted to [`ExecutionOutcome::Failed`];
    /// this call never returns an error to the run loop.
    pub async fn execute_strategy(&self, symbol: &str) -> ExecutionOutcome {
        match self.run_pipeline(symbol).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Error in execute_strategy for {}: {}", symbol, e);
                ExecutionOutcome::Failed {
                    symbol: symbol.to_string(),
                    message: e.to_string(),
                }
            }
        }
    }

    async fn run_pipeline(&self, symbol: &str) -> Result<ExecutionOutcome> {
        let candles = self.market_data.ohlcv(symbol, LOOKBACK_DAYS).await?;
        if candles.len() < MIN_BARS {
            return Err(PipelineError::Data(format!(
                "Insufficient data for {}",
                symbol
            )));
        }

        let current_price = self.market_data.current_price(symbol).await?;
        let analysis = self
            .analysis
            .analyze(symbol, &candles, current_price)
            .await?;

        let target_price = analysis
            .target_price
            .unwrap_or_else(|| current_price * dec!(1.05));
        let stop_loss = analysis
            .stop_loss
            .unwrap_or_else(|| current_price * dec!(0.95));

        let risk_reward = risk_reward_ratio(current_price, target_price, stop_loss);

        let ctx = SignalContext {
            symbol: symbol.to_string(),
            current_price,
            target_price,
            stop_loss,
            risk_reward,
            confidence: analysis.confidence,
            sector_performance: analysis.sector_performance,
            option_flow: if analysis.option_flow.is_empty() {
                "中性".to_string()
            } else {
                analysis.option_flow.clone()
            },
            direction: analysis.action,
            strategy: if analysis.strategy.is_empty() {
                "AI分析".to_string()
            } else {
                analysis.strategy.clone()
            },
        };

        if let Some(gate) = &self.arbiter {
            let judgement = gate.judge(&ctx).await;
            let result = gate.get_formatted_result(&judgement, &ctx);

            if result.notify {
                let entry = OptionEntry {
                    symbol: symbol.to_string(),
                    option_type: result.option_type.clone(),
                    strike_price: target_price,
                    expiry_date: Utc::now() + chrono::Duration::days(30),
                    current_price,
                    implied_volatility: analysis.implied_volatility.unwrap_or(0.3),
                    support: stop_loss,
                    resistance: target_price,
                    risk_reward_ratio: risk_reward,
                    confidence_score: analysis.confidence,
                    analysis: result.reason.clone(),
                };
                if let Err(e) = self.dispatcher.send_option_entry_signal(&entry).await {
                    warn!("{}: failed to send option entry signal: {}", symbol, e);
                }
            }

            return Ok(ExecutionOutcome::ArbitrationAccepted { result });
        }

        // Threshold mode: fusion floor, strategy validation when one is
        // suggested, then the confidence gate.
        let report = AnalysisReport {
            symbol: symbol.to_string(),
            confidence: analysis.confidence,
            bias: analysis.action.into(),
            suggested_strategy: analysis.suggested_strategy.clone(),
            risk_factors: analysis.risk_factors.clone(),
            logic_chain: analysis.logic_chain.clone(),
        };

        let fused = match self.fusion.process(&report) {
            Some(f) => f,
            None => {
                return Ok(self.no_signal(
                    symbol,
                    analysis.confidence,
                    "Signal strength below floor",
                ))
            }
        };

        if fused.suggested_strategy.is_some() {
            if let SignalAssessment::Invalid { reason } = self.validator.validate_signal(&fused) {
                return Ok(self.no_signal(symbol, analysis.confidence, &reason));
            }
        }

        if analysis.confidence >= self.config.min_confidence {
            let signal = Signal {
                symbol: symbol.to_string(),
                action: analysis.action,
                confidence: analysis.confidence,
                timestamp: Utc::now(),
                risk_level: analysis.risk_level,
                final_score: analysis.confidence,
                reasoning: analysis.reasoning.clone(),
                recommendation: analysis.recommendation.clone(),
                strategy_type: if analysis.strategy.is_empty() {
                    "AI".to_string()
                } else {
                    analysis.strategy.clone()
                },
            };
            Ok(ExecutionOutcome::ThresholdAccepted { signal })
        } else {
            Ok(self.no_signal(symbol, analysis.confidence, "Confidence below threshold"))
        }
    }

    fn no_signal(&self, symbol: &str, confidence: f64, reason: &str) -> ExecutionOutcome {
        debug!("{}: no signal ({})", symbol, reason);
        ExecutionOutcome::NoSignal {
            symbol: symbol.to_string(),
            confidence,
            threshold: self.config.min_confidence,
            reason: reason.to_string(),
        }
    }

    /// Push accepted outcomes onto the signal queue
    fn enqueue_outcome(&self, outcome: &ExecutionOutcome) -> Result<()> {
        let signal = match outcome {
            ExecutionOutcome::ThresholdAccepted { signal } => signal.clone(),
            ExecutionOutcome::ArbitrationAccepted { result } if result.notify => {
                arbitrated_to_signal(result)
            }
            _ => return Ok(()),
        };

        self.queue_tx
            .send(signal)
            .map_err(|e| PipelineError::Internal(format!("Signal queue closed: {}", e)))
    }

    /// Drain the queue non-blocking and consume each signal
    ///
    /// Runs on the worker task right after each sweep, making it the sole
    /// writer of history.
    async fn drain_queue(&self) {
        let mut drained = Vec::new();
        {
            let mut rx = self.queue_rx.lock().await;
            while let Ok(signal) = rx.try_recv() {
                drained.push(signal);
            }
        }

        for signal in drained {
            self.consume_signal(signal).await;
        }
    }

    async fn consume_signal(&self, signal: Signal) {
        {
            let mut history = self.history.write().await;
            history
                .entry(signal.symbol.clone())
                .or_default()
                .push(signal.clone());
        }

        self.daily_signals.lock().await.push(signal.clone());

        if signal.confidence < self.config.min_confidence {
            return;
        }

        let price = match self.market_data.current_price(&signal.symbol).await {
            Ok(p) => p,
            Err(e) => {
                warn!("Error getting current price for {}: {}", signal.symbol, e);
                Decimal::ZERO
            }
        };

        let payload = NotificationPayload {
            kind: match signal.action {
                SignalAction::Buy => NotificationKind::Entry,
                SignalAction::Sell => NotificationKind::Exit,
                SignalAction::Hold => NotificationKind::Hold,
            },
            symbol: signal.symbol.clone(),
            strategy: if signal.strategy_type.is_empty() {
                "AI Strategy".to_string()
            } else {
                signal.strategy_type.clone()
            },
            direction: signal.action.into(),
            confidence: signal.confidence,
            price,
            // Rough reward:risk estimate
            rr_ratio: signal.final_score * 2.0,
            ai_insight: signal.reasoning.clone(),
        };

        if let Err(e) = self.dispatcher.dispatch_signal(&payload).await {
            warn!("{}: failed to dispatch signal: {}", signal.symbol, e);
        }
    }

    /// Fire the daily rollup once a new day has begun after market close
    /// (or 24 h have elapsed), then reset the day's list.
    async fn maybe_send_daily_report(&self) {
        let now = self.now_local();
        let due = {
            let last = self.last_report.lock().await;
            let new_day = last.date_naive() != now.date_naive();
            let after_close = now.hour() >= self.config.market_close_hour;
            (after_close && new_day)
                || now.signed_duration_since(*last) > chrono::Duration::hours(24)
        };

        if !due {
            return;
        }

        *self.last_report.lock().await = now;

        let signals: Vec<Signal> = {
            let mut daily = self.daily_signals.lock().await;
            std::mem::take(&mut *daily)
        };

        if signals.is_empty() {
            info!("No signals to report today");
            return;
        }

        let performance = DailyPerformance::default();
        match self
            .dispatcher
            .send_daily_report(&signals, &performance)
            .await
        {
            Ok(()) => info!("Sent daily report with {} signals", signals.len()),
            Err(e) => warn!("Failed to send daily report: {}", e),
        }
    }

    /// Most recent signals for a symbol, newest first
    pub async fn recent_signals(&self, symbol: &str, count: usize) -> Vec<Signal> {
        let history = self.history.read().await;
        let mut signals = history.get(symbol).cloned().unwrap_or_default();
        signals.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        signals.truncate(count);
        signals
    }

    pub async fn queue_len(&self) -> usize {
        self.queue_rx.lock().await.len()
    }

    /// Persist the full per-symbol history, overwriting the store
    pub async fn save_signals(&self, store: &SignalStore) -> Result<()> {
        let history = self.history.read().await;
        store.save(&history).await
    }

    /// Replace the in-memory history wholesale from the store
    ///
    /// A missing file leaves the current history untouched.
    pub async fn load_signals(&self, store: &SignalStore) -> Result<()> {
        if !store.exists() {
            warn!("Signal file {} not found", store.path().display());
            return Ok(());
        }

        let loaded = store.load().await?;
        *self.history.write().await = loaded;
        Ok(())
    }
}

/// Risk-reward ratio: |target − current| / |current − stop|, 0 when the
/// stop sits on the current price.
pub fn risk_reward_ratio(current_price: Decimal, target_price: Decimal, stop_loss: Decimal) -> Decimal {
    let risk = (current_price - stop_loss).abs();
    let reward = (target_price - current_price).abs();
    if risk > Decimal::ZERO {
        reward / risk
    } else {
        Decimal::ZERO
    }
}

/// Normalize an arbitration verdict into a signal for history and dispatch
fn arbitrated_to_signal(result: &ArbitratedSignal) -> Signal {
    let action = match result.action {
        JudgeAction::Call => SignalAction::Buy,
        JudgeAction::Put => SignalAction::Sell,
        JudgeAction::Hold => SignalAction::Hold,
    };

    Signal {
        symbol: result.symbol.clone(),
        action,
        confidence: result.ai_confidence,
        timestamp: result.timestamp,
        risk_level: result.risk_level.into(),
        final_score: result.ai_confidence,
        reasoning: result.reason.clone(),
        recommendation: result.expected_move.clone(),
        strategy_type: result.strategy.clone(),
    }
}
