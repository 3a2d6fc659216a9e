//! LLM arbitration gate
//!
//! Optional final accept/reject/annotate step. Renders the signal context
//! into a fixed prompt, sends it to an OpenAI-style chat-completion
//! endpoint, and parses the reply strictly into a [`Judgement`]. Any
//! failure degrades to a conservative default; the gate never errors.


use crate::config::LlmConfig;
use crate::error::{PipelineError, Result};
use crate::types::{Bias, RiskLevel, SignalContext};
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Option action recommended by the arbiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JudgeAction {
    Call,
    Put,
    Hold,
}

/// Risk grade as emitted by the LLM (低/中/高)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JudgedRisk {
    #[serde(rename = "低")]
    Low,
    #[serde(rename = "中")]
    Medium,
    #[serde(rename = "高")]
    High,
}

impl From<JudgedRisk> for RiskLevel {
    fn from(risk: JudgedRisk) -> Self {
        match risk {
            JudgedRisk::Low => RiskLevel::Low,
            JudgedRisk::Medium => RiskLevel::Medium,
            JudgedRisk::High => RiskLevel::High,
        }
    }
}

/// Signal quality rating assigned by the LLM (A best, C worst)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiRating {
    A,
    B,
    C,
}

/// Fully populated arbitration verdict
///
/// Every field is always present: missing pieces of the raw reply are
/// backfilled independently with conservative defaults, so a partially
/// usable reply never fails the whole judgement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Judgement {
    pub notify: bool,
    pub action: JudgeAction,
    pub confidence: f64,
    pub risk_level: JudgedRisk,
    /// Signed percentage string, e.g. "+3%" or "-2%"
    pub expected_move: String,
    pub reason: String,
    pub ai_rating: AiRating,
}

impl Judgement {
    /// Conservative verdict used when the LLM call or parse fails
    fn degraded(reason: impl Into<String>) -> Self {
        Self {
            notify: false,
            action: JudgeAction::Hold,
            confidence: 0.0,
            risk_level: JudgedRisk::High,
            expected_move: "0%".to_string(),
            reason: reason.into(),
            ai_rating: AiRating::C,
        }
    }
}

/// Context + judgement merged for the notification layer
#[derive(Debug, Clone, Serialize)]
pub struct ArbitratedSignal {
    pub symbol: String,
    pub current_price: Decimal,
    pub target_price: Decimal,
    pub stop_loss: Decimal,
    pub risk_reward: Decimal,
    pub confidence: f64,
    pub sector_performance: f64,
    pub option_flow: String,
    pub strategy: String,
    pub notify: bool,
    pub action: JudgeAction,
    pub ai_confidence: f64,
    pub risk_level: JudgedRisk,
    pub expected_move: String,
    pub reason: String,
    pub ai_rating: AiRating,
    /// call / put / hold, derived from the action
    pub option_type: String,
    /// BULLISH / BEARISH / NEUTRAL, derived from the action
    pub direction: Bias,
    pub timestamp: DateTime<Utc>,
}

const PROMPT_TEMPLATE: &str = r#"你是专业的期权交易专家，请根据以下市场与策略数据，判断是否发出交易信号：

股票代码: {symbol}
当前价格: {current_price}
目标价格: {target_price}
止损价格: {stop_loss}
风险收益比: {risk_reward}
置信度: {confidence}
板块走势（%）: {sector_performance}
期权市场: {option_flow}

请分析上述市场数据并给出完整的期权交易决策，包括行动建议、风险评级和预期移动。

请以JSON格式返回：
{
    "notify": "是/否",
    "action": "Call/Put/Hold",
    "confidence": 0-1之间的浮点数,
    "risk_level": "低/中/高",
    "expected_move": "+X%/-X%",
    "reason": "简洁理由（不超过两行）",
    "ai_rating": "A/B/C"
}

其中：
- notify：是否应该通知用户
- action：推荐的期权类型（Call看涨/Put看跌/Hold观望）
- confidence：AI对该推荐的置信度（0-1之间）
- risk_level：交易风险等级（低/中/高）
- expected_move：预期价格变动（百分比）
- reason：推荐理由（简洁明了）
- ai_rating：AI给出的信号质量评级（A最高/C最低）"#;

/// LLM-backed arbitration gate
pub struct ArbitrationGate {
    http: Client,
    config: LlmConfig,
}

impl ArbitrationGate {
    pub fn new(config: LlmConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    /// Render the fixed prompt for a signal context
    pub fn render_prompt(&self, ctx: &SignalContext) -> String {
        PROMPT_TEMPLATE
            .replace("{symbol}", &ctx.symbol)
            .replace("{current_price}", &ctx.current_price.to_string())
            .replace("{target_price}", &ctx.target_price.to_string())
            .replace("{stop_loss}", &ctx.stop_loss.to_string())
            .replace("{risk_reward}", &format!("{:.2}", ctx.risk_reward))
            .replace("{confidence}", &format!("{:.2}", ctx.confidence))
            .replace(
                "{sector_performance}",
                &format!("{:.2}", ctx.sector_performance),
            )
            .replace("{option_flow}", &ctx.option_flow)
    }

    /// Judge a signal context
    ///
    /// Never fails: transport errors and malformed replies degrade to a
    /// conservative default verdict.
    pub async fn judge(&self, ctx: &SignalContext) -> Judgement {
        let prompt = self.render_prompt(ctx);

        let response = match self.call_llm(&prompt).await {
            Ok(r) => r,
            Err(e) => {
                warn!("{}: arbitration call failed: {}", ctx.symbol, e);
                return Judgement::degraded(format!("AI判断过程发生错误: {}", e));
            }
        };

        match self.parse_judgement(&response) {
            Some(judgement) => {
                info!(
                    "{}: AI decision {:?} notify={} conf={:.2}",
                    ctx.symbol, judgement.action, judgement.notify, judgement.confidence
                );
                judgement
            }
            None => {
                warn!("{}: failed to parse AI response as JSON", ctx.symbol);
                Judgement::degraded("AI解析失败，无法处理返回格式")
            }
        }
    }

    async fn call_llm(&self, prompt: &str) -> Result<String> {
        let (base_url, model) = match self.config.provider.to_lowercase().as_str() {
            "openai" | "gpt" => (
                self.config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "https://api.openai.com".to_string()),
                self.config
                    .model
                    .clone()
                    .unwrap_or_else(|| "gpt-4o-mini".to_string()),
            ),
            "ollama" => (
                self.config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434".to_string()),
                self.config
                    .model
                    .clone()
                    .unwrap_or_else(|| "qwen2.5:14b".to_string()),
            ),
            // deepseek and unknown providers fall back to the deepseek endpoint
            _ => (
                self.config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "https://api.deepseek.com".to_string()),
                self.config
                    .model
                    .clone()
                    .unwrap_or_else(|| "deepseek-chat".to_string()),
            ),
        };

        let request = serde_json::json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
            "response_format": {"type": "json_object"}
        });

        let mut req = self
            .http
            .post(format!("{}/v1/chat/completions", base_url))
            .header("content-type", "application/json");

        if !self.config.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.config.api_key));
        }

        let resp: serde_json::Value = req.json(&request).send().await?.json().await?;

        resp["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| PipelineError::Arbitration("Empty LLM response".into()))
    }

    /// Parse a raw reply into a judgement, backfilling each missing field
    /// independently. Returns `None` only when no JSON object can be
    /// extracted at all.
    pub fn parse_judgement(&self, response: &str) -> Option<Judgement> {
        let json_str = match (response.find('{'), response.rfind('}')) {
            (Some(start), Some(end)) if end > start => &response[start..=end],
            _ => return None,
        };

        let parsed: serde_json::Value = serde_json::from_str(json_str).ok()?;
        if !parsed.is_object() {
            return None;
        }

        let notify = match &parsed["notify"] {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::String(s) => {
                matches!(s.trim(), "是" | "yes" | "Yes" | "true" | "True")
            }
            _ => false,
        };

        let action = match parsed["action"].as_str().map(str::to_lowercase).as_deref() {
            Some("call") => JudgeAction::Call,
            Some("put") => JudgeAction::Put,
            _ => JudgeAction::Hold,
        };

        let confidence = parsed["confidence"].as_f64().unwrap_or(0.5);

        let risk_level = match parsed["risk_level"].as_str() {
            Some("低") => JudgedRisk::Low,
            Some("高") => JudgedRisk::High,
            _ => JudgedRisk::Medium,
        };

        let expected_move = parsed["expected_move"]
            .as_str()
            .unwrap_or("0%")
            .to_string();

        let reason = parsed["reason"]
            .as_str()
            .unwrap_or("AI分析结果缺失关键信息")
            .to_string();

        let ai_rating = match parsed["ai_rating"].as_str() {
            Some("A") => AiRating::A,
            Some("B") => AiRating::B,
            _ => AiRating::C,
        };

        Some(Judgement {
            notify,
            action,
            confidence,
            risk_level,
            expected_move,
            reason,
            ai_rating,
        })
    }

    /// Merge a judgement back into its context for the notification layer
    pub fn get_formatted_result(
        &self,
        judgement: &Judgement,
        ctx: &SignalContext,
    ) -> ArbitratedSignal {
        let (option_type, direction) = match judgement.action {
            JudgeAction::Call => ("call", Bias::Bullish),
            JudgeAction::Put => ("put", Bias::Bearish),
            JudgeAction::Hold => ("hold", Bias::Neutral),
        };

        ArbitratedSignal {
            symbol: ctx.symbol.clone(),
            current_price: ctx.current_price,
            target_price: ctx.target_price,
            stop_loss: ctx.stop_loss,
            risk_reward: ctx.risk_reward,
            confidence: ctx.confidence,
            sector_performance: ctx.sector_performance,
            option_flow: ctx.option_flow.clone(),
            strategy: ctx.strategy.clone(),
            notify: judgement.notify,
            action: judgement.action,
            ai_confidence: judgement.confidence,
            risk_level: judgement.risk_level,
            expected_move: judgement.expected_move.clone(),
            reason: judgement.reason.clone(),
            ai_rating: judgement.ai_rating,
            option_type: option_type.to_string(),
            direction,
            timestamp: Utc::now(),
        }
    }
}
