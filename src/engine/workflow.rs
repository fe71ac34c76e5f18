// SPDX-License-Identifier: MIT

//! Workflow capability traits
//!
//! The factory only needs two things from a workflow: the capability to be
//! bound to a context, checked and run (`Workflow`), and a way to rebuild it
//! from its serialized record (`Reconstruct`).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::context::{ContextSlot, DataContext};
use super::error::EngineError;

/// Core workflow trait for all workflow types
#[async_trait]
pub trait Workflow: Send + Sync {
    /// Objects this workflow evaluates against
    type Context: DataContext;

    /// Returns the workflow name, used in logs
    fn name(&self) -> &str;

    /// Replace the data context
    fn set_context(&mut self, context: Self::Context);

    /// Replace the data context from untyped positional objects
    fn assign_slots(&mut self, slots: Vec<ContextSlot>) -> Result<(), EngineError> {
        let context = Self::Context::from_slots(slots)?;
        self.set_context(context);
        Ok(())
    }

    /// Evaluate the eligibility tree against the current context
    fn check_eligibility(&self) -> Result<bool, EngineError>;

    /// Run every activity in order; does not check eligibility
    async fn run_activities(&self) -> Result<(), EngineError>;
}

/// Rebuild a workflow from rule data
pub trait Reconstruct: Sized {
    /// Serialized form of one workflow
    type Record: Serialize + DeserializeOwned + Send + 'static;

    /// Default-construct a workflow (registering its behavior) and populate it
    fn reconstruct(record: Self::Record) -> Self;

    /// Extract the rule data, leaving behavior behind
    fn to_record(&self) -> Self::Record;
}
