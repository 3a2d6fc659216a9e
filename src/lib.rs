//! AI Option Trading Signal Pipeline
//!
//! A Rust library for generating, validating and dispatching option trading
//! signals on a fixed polling schedule.
//!
//! ## Architecture
//!
//! ```text
//! MarketData → Analysis → Fusion → Validator ─┐
//!                            │                ├→ Queue → History → Notifier
//!                            └→ Arbitration ──┘
//!                          (LLM accept/reject)
//! ```
//!
//! The [`executor::ExecutionOrchestrator`] drives the loop: every tick it
//! analyzes each configured symbol, gates the result through either the
//! confidence threshold (fusion + validator) or the LLM arbitration gate,
//! and pushes accepted signals onto a queue that is drained into per-symbol
//! history after each sweep.

pub mod arbiter;
pub mod config;
pub mod error;
pub mod executor;
pub mod fusion;
pub mod providers;
pub mod store;
pub mod types;
pub mod validator;

#[cfg(test)]
mod types_tests;
#[cfg(test)]
mod store_tests;
