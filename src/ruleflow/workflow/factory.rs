// SPDX-License-Identifier: MIT

//! Workflow factory - batch loading, checking and running
//!
//! The factory holds workflows of one type and applies them to caller data.
//! Every batch operation is an isolation boundary: a failing workflow is
//! logged and left out, the others proceed, and no error is returned.

use futures::future::join_all;
use futures::FutureExt;
use std::any::type_name;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::engine::context::ContextSlot;
use crate::engine::error::EngineError;
use crate::engine::workflow::{Reconstruct, Workflow};
use crate::ruleflow::config::{EngineConfig, ExecutionMode, RunPolicy};

use super::loader::{RuleFormat, WorkflowLoader};

/// Context handed to a batch operation
#[derive(Clone)]
pub enum ContextBinding<C> {
    /// Typed objects, arity checked by the compiler
    Typed(C),
    /// Untyped positional objects, checked per workflow
    Slots(Vec<ContextSlot>),
}

impl<C> ContextBinding<C> {
    pub fn slots(slots: Vec<ContextSlot>) -> Self {
        ContextBinding::Slots(slots)
    }
}

impl<C> From<C> for ContextBinding<C> {
    fn from(context: C) -> Self {
        ContextBinding::Typed(context)
    }
}

impl<C: Clone> ContextBinding<C> {
    fn bind<W: Workflow<Context = C>>(&self, workflow: &mut W) -> Result<(), EngineError> {
        match self {
            ContextBinding::Typed(context) => {
                workflow.set_context(context.clone());
                Ok(())
            }
            ContextBinding::Slots(slots) => workflow.assign_slots(slots.clone()),
        }
    }
}

/// What happened to one workflow during a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Activities ran to completion
    Completed { workflow: String },
    /// Ineligible under a gated run; activities not started
    Skipped { workflow: String },
    /// Context binding, eligibility or an activity failed
    Failed { workflow: String, error: String },
}

impl RunOutcome {
    pub fn workflow(&self) -> &str {
        match self {
            RunOutcome::Completed { workflow }
            | RunOutcome::Skipped { workflow }
            | RunOutcome::Failed { workflow, .. } => workflow,
        }
    }
}

/// Per-workflow outcomes of a batch run, in held order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub outcomes: Vec<RunOutcome>,
}

impl RunReport {
    pub fn completed(&self) -> Vec<&str> {
        self.names(|o| matches!(o, RunOutcome::Completed { .. }))
    }

    pub fn skipped(&self) -> Vec<&str> {
        self.names(|o| matches!(o, RunOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> Vec<&str> {
        self.names(|o| matches!(o, RunOutcome::Failed { .. }))
    }

    fn names(&self, keep: impl Fn(&RunOutcome) -> bool) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| keep(*o))
            .map(RunOutcome::workflow)
            .collect()
    }
}

/// Holds a homogeneous collection of workflows
pub struct WorkflowFactory<W> {
    workflows: Vec<W>,
    config: EngineConfig,
}

impl<W> WorkflowFactory<W>
where
    W: Workflow + Reconstruct,
{
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            workflows: Vec::new(),
            config,
        }
    }

    fn type_name() -> &'static str {
        type_name::<W>()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn push(&mut self, workflow: W) {
        self.workflows.push(workflow);
    }

    pub fn workflows(&self) -> &[W] {
        &self.workflows
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }

    pub fn clear(&mut self) {
        self.workflows.clear();
    }

    /// Serialize workflows to JSON; behavior is never included
    pub fn serialize(workflows: &[W]) -> Result<String, EngineError> {
        Self::render(workflows, RuleFormat::Json)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Self::render(&self.workflows, RuleFormat::Json)
    }

    pub fn to_yaml(&self) -> Result<String, EngineError> {
        Self::render(&self.workflows, RuleFormat::Yaml)
    }

    fn render(workflows: &[W], format: RuleFormat) -> Result<String, EngineError> {
        let records: Vec<W::Record> = workflows.iter().map(Reconstruct::to_record).collect();
        WorkflowLoader::render(&records, format)
    }

    /// Load workflows from JSON and append them.
    ///
    /// Returns how many were appended. On any parse failure nothing is
    /// appended, the failure is logged and 0 is returned.
    pub async fn load_from_json(&mut self, json: &str) -> usize {
        self.load_text(json.to_string(), RuleFormat::Json).await
    }

    pub async fn load_from_yaml(&mut self, yaml: &str) -> usize {
        self.load_text(yaml.to_string(), RuleFormat::Yaml).await
    }

    /// Load workflows from a file; `.yaml`/`.yml` are read as YAML, others as JSON
    pub async fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> usize {
        let format = RuleFormat::from_path(&path);
        match tokio::fs::read_to_string(path.as_ref())
            .await
            .map_err(EngineError::from)
        {
            Ok(content) => self.load_text(content, format).await,
            Err(e) => {
                log::error!(
                    "Error on WorkflowFactory {} - cannot read {}: {}",
                    Self::type_name(),
                    path.as_ref().display(),
                    e
                );
                0
            }
        }
    }

    async fn load_text(&mut self, content: String, format: RuleFormat) -> usize {
        log::trace!("WorkflowFactory {} - Start load from {:?}", Self::type_name(), format);

        let parsed = tokio::task::spawn_blocking(move || {
            WorkflowLoader::parse::<W::Record>(&content, format)
        })
        .await
        .map_err(EngineError::from)
        .and_then(|records| records);

        match parsed {
            Ok(records) => {
                let loaded = records.len();
                self.workflows
                    .extend(records.into_iter().map(W::reconstruct));
                log::trace!(
                    "WorkflowFactory {} - End of load from {:?}, {} workflow(s)",
                    Self::type_name(),
                    format,
                    loaded
                );
                loaded
            }
            Err(e) => {
                log::error!("Error on WorkflowFactory {}: {}", Self::type_name(), e);
                0
            }
        }
    }

    /// Check every workflow against `context`; true only if all are eligible.
    ///
    /// A workflow whose check fails (unbindable context, missing dispatch
    /// entry, malformed tree, panicking comparator) is logged and does not
    /// count either way: it cannot turn an otherwise eligible batch
    /// ineligible.
    pub fn check_eligibility_only(
        &mut self,
        context: impl Into<ContextBinding<W::Context>>,
    ) -> bool {
        let binding = context.into();
        let mut result = true;
        log::trace!("WorkflowFactory {} - Check eligibility start", Self::type_name());

        for workflow in &mut self.workflows {
            let checked = binding.bind(workflow).and_then(|_| {
                log::trace!(
                    "WorkflowFactory {} - Check eligibility of workflow {}",
                    Self::type_name(),
                    workflow.name()
                );
                panic::catch_unwind(AssertUnwindSafe(|| workflow.check_eligibility()))
                    .unwrap_or_else(|payload| Err(EngineError::from_panic(payload)))
            });

            match checked {
                Ok(eligible) => {
                    log::trace!(
                        "WorkflowFactory {} - End of check eligibility of workflow {} - result : {}",
                        Self::type_name(),
                        workflow.name(),
                        eligible
                    );
                    result &= eligible;
                }
                Err(e) => log::error!(
                    "Error on WorkflowFactory {} - workflow {}: {}",
                    Self::type_name(),
                    workflow.name(),
                    e
                ),
            }
        }

        log::trace!("WorkflowFactory {} - End of Check eligibility", Self::type_name());
        result
    }

    /// Run every workflow against `context` and wait for all of them.
    ///
    /// Each workflow is bound, checked, and then runs its activities in
    /// order, unless the run policy is gated and it is ineligible. A failure,
    /// including a panic in host behavior, stops that workflow only.
    pub async fn run_all(&mut self, context: impl Into<ContextBinding<W::Context>>) -> RunReport {
        let binding = context.into();
        let policy = self.config.run_policy;
        log::trace!(
            "WorkflowFactory {} - Run start ({}, {})",
            Self::type_name(),
            policy,
            self.config.execution
        );

        let runs = self
            .workflows
            .iter_mut()
            .map(|workflow| run_workflow(workflow, &binding, policy));

        let outcomes = match self.config.execution {
            ExecutionMode::Concurrent => join_all(runs).await,
            ExecutionMode::Sequential => {
                let mut outcomes = Vec::new();
                for run in runs {
                    outcomes.push(run.await);
                }
                outcomes
            }
        };

        log::trace!("WorkflowFactory {} - End of run", Self::type_name());
        RunReport { outcomes }
    }
}

impl<W> Default for WorkflowFactory<W>
where
    W: Workflow + Reconstruct,
{
    fn default() -> Self {
        Self::new()
    }
}

async fn run_workflow<W: Workflow>(
    workflow: &mut W,
    binding: &ContextBinding<W::Context>,
    policy: RunPolicy,
) -> RunOutcome {
    let type_name = type_name::<W>();
    let result = AssertUnwindSafe(execute(workflow, binding, policy, type_name))
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(EngineError::from_panic(payload)));

    match result {
        Ok(true) => RunOutcome::Completed {
            workflow: workflow.name().to_string(),
        },
        Ok(false) => RunOutcome::Skipped {
            workflow: workflow.name().to_string(),
        },
        Err(e) => {
            log::error!(
                "Error on WorkflowFactory {} - workflow {}: {}",
                type_name,
                workflow.name(),
                e
            );
            RunOutcome::Failed {
                workflow: workflow.name().to_string(),
                error: e.to_string(),
            }
        }
    }
}

/// Returns whether activities ran
async fn execute<W: Workflow>(
    workflow: &mut W,
    binding: &ContextBinding<W::Context>,
    policy: RunPolicy,
    type_name: &str,
) -> Result<bool, EngineError> {
    binding.bind(workflow)?;

    log::trace!(
        "WorkflowFactory {} - Check eligibility of workflow {}",
        type_name,
        workflow.name()
    );
    let eligible = workflow.check_eligibility()?;
    log::trace!(
        "WorkflowFactory {} - End of check eligibility of workflow {} - result : {}",
        type_name,
        workflow.name(),
        eligible
    );

    if !eligible && policy == RunPolicy::Gated {
        log::trace!(
            "WorkflowFactory {} - workflow {} not eligible, activities skipped",
            type_name,
            workflow.name()
        );
        return Ok(false);
    }

    log::trace!(
        "WorkflowFactory {} - execute activity of workflow {}",
        type_name,
        workflow.name()
    );
    workflow.run_activities().await?;
    log::trace!(
        "WorkflowFactory {} - End of activity of workflow {}",
        type_name,
        workflow.name()
    );
    Ok(true)
}
