// SPDX-License-Identifier: MIT

//! Engine configuration
//!
//! Controls how `WorkflowFactory::run_all` treats eligibility and how it
//! schedules workflow runs. Values come from the environment
//! (`RULEFLOW_RUN_POLICY`, `RULEFLOW_EXECUTION`) or from serialized config.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::engine::error::EngineError;

pub const RUN_POLICY_ENV: &str = "RULEFLOW_RUN_POLICY";
pub const EXECUTION_ENV: &str = "RULEFLOW_EXECUTION";

/// Whether a batch run applies activities of ineligible workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPolicy {
    /// Only eligible workflows run their activities
    #[default]
    Gated,
    /// Every workflow runs its activities; eligibility is only logged
    Unconditional,
}

/// How a batch run schedules its workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// All workflow runs are polled together; the batch waits for all of them
    #[default]
    Concurrent,
    /// One workflow after another, in held order
    Sequential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub run_policy: RunPolicy,
    pub execution: ExecutionMode,
}

impl EngineConfig {
    /// Read overrides from the environment, keeping defaults for unset keys
    pub fn from_env() -> Result<Self, EngineError> {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(RUN_POLICY_ENV) {
            config.run_policy = value.parse()?;
        }
        if let Ok(value) = std::env::var(EXECUTION_ENV) {
            config.execution = value.parse()?;
        }
        Ok(config)
    }

    pub fn with_run_policy(mut self, run_policy: RunPolicy) -> Self {
        self.run_policy = run_policy;
        self
    }

    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }
}

impl FromStr for RunPolicy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gated" => Ok(RunPolicy::Gated),
            "unconditional" => Ok(RunPolicy::Unconditional),
            other => Err(EngineError::config(format!(
                "unknown run policy '{}', expected gated or unconditional",
                other
            ))),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concurrent" => Ok(ExecutionMode::Concurrent),
            "sequential" => Ok(ExecutionMode::Sequential),
            other => Err(EngineError::config(format!(
                "unknown execution mode '{}', expected concurrent or sequential",
                other
            ))),
        }
    }
}

impl fmt::Display for RunPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPolicy::Gated => write!(f, "gated"),
            RunPolicy::Unconditional => write!(f, "unconditional"),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Concurrent => write!(f, "concurrent"),
            ExecutionMode::Sequential => write!(f, "sequential"),
        }
    }
}
