//! Token-usage ledger
//!
//! Append-only JSON log of every generation call with running totals. Purely
//! observational; nothing reads it back except the stats display.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::gateway::TokenUsage;

const LEDGER_FILE: &str = "token_usage.json";

/// One logged generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

/// Running totals across all logged calls
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UsageTotals {
    pub input: u64,
    pub output: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerData {
    total: UsageTotals,
    history: Vec<UsageEntry>,
}

/// Aggregate view for the stats display
#[derive(Debug, Clone)]
pub struct UsageStats {
    pub total: UsageTotals,
    pub calls: usize,
    pub recent: Vec<UsageEntry>,
}

/// JSON-backed token ledger with an injected storage directory
pub struct TokenLedger {
    path: PathBuf,
}

impl TokenLedger {
    /// Create a ledger rooted at the given directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).context("Failed to create ledger directory")?;
        Ok(Self {
            path: dir.join(LEDGER_FILE),
        })
    }

    /// Record one call's usage and bump the running totals
    pub fn log(&self, operation: &str, model: &str, usage: TokenUsage) -> Result<()> {
        let mut data = self.load()?;
        data.total.input += usage.input_tokens;
        data.total.output += usage.output_tokens;
        data.history.push(UsageEntry {
            timestamp: Utc::now(),
            operation: operation.to_string(),
            model: model.to_string(),
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            total_tokens: usage.input_tokens + usage.output_tokens,
        });
        self.save(&data)
    }

    /// Totals plus the most recent calls (newest last)
    pub fn stats(&self, recent: usize) -> Result<UsageStats> {
        let data = self.load()?;
        let skip = data.history.len().saturating_sub(recent);
        Ok(UsageStats {
            total: data.total,
            calls: data.history.len(),
            recent: data.history[skip..].to_vec(),
        })
    }

    fn load(&self) -> Result<LedgerData> {
        if !self.path.exists() {
            return Ok(LedgerData::default());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Malformed token ledger at {}", self.path.display()))
    }

    fn save(&self, data: &LedgerData) -> Result<()> {
        let json = serde_json::to_string_pretty(data).context("Failed to serialize ledger")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}
