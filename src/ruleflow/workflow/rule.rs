// SPDX-License-Identifier: MIT

//! Rule workflow - rule data bound to a workflow type's behavior

use async_trait::async_trait;
use std::sync::Arc;

use crate::engine::dispatch::WorkflowType;
use crate::engine::error::{DispatchKind, EngineError, StructuralError};
use crate::engine::workflow::{Reconstruct, Workflow};

use super::condition;
use super::registry::{Dispatch, DispatchRegistry};
use super::types::{ActivityLine, EligibilityLine, WorkflowRecord};

/// Eligibility line of a workflow type
pub type EligibilityLineOf<T> =
    EligibilityLine<<T as WorkflowType>::Property, <T as WorkflowType>::EligibilityKind>;

/// Activity line of a workflow type
pub type ActivityLineOf<T> =
    ActivityLine<<T as WorkflowType>::Property, <T as WorkflowType>::ActivityKind>;

/// Serialized record of a workflow type
pub type RecordOf<T> = WorkflowRecord<
    <T as WorkflowType>::Property,
    <T as WorkflowType>::EligibilityKind,
    <T as WorkflowType>::ActivityKind,
>;

/// A named workflow of type `T`: an eligibility tree, an activity list and
/// the type's shared dispatch tables.
pub struct RuleWorkflow<T: WorkflowType> {
    name: String,
    context: Option<T::Context>,
    dispatch: Arc<Dispatch<T>>,
    eligibility_lines: Vec<EligibilityLineOf<T>>,
    activity_lines: Vec<ActivityLineOf<T>>,
}

impl<T: WorkflowType> RuleWorkflow<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context: None,
            dispatch: DispatchRegistry::get::<T>(),
            eligibility_lines: Vec::new(),
            activity_lines: Vec::new(),
        }
    }

    pub fn with_eligibility(mut self, lines: Vec<EligibilityLineOf<T>>) -> Self {
        self.eligibility_lines = lines;
        self
    }

    pub fn with_activities(mut self, lines: Vec<ActivityLineOf<T>>) -> Self {
        self.activity_lines = lines;
        self
    }

    pub fn eligibility_lines(&self) -> &[EligibilityLineOf<T>] {
        &self.eligibility_lines
    }

    pub fn set_eligibility_lines(&mut self, lines: Vec<EligibilityLineOf<T>>) {
        self.eligibility_lines = lines;
    }

    pub fn activity_lines(&self) -> &[ActivityLineOf<T>] {
        &self.activity_lines
    }

    pub fn set_activity_lines(&mut self, lines: Vec<ActivityLineOf<T>>) {
        self.activity_lines = lines;
    }

    /// The context last assigned, if any
    pub fn context(&self) -> Option<&T::Context> {
        self.context.as_ref()
    }

    fn bound_context(&self) -> Result<&T::Context, EngineError> {
        self.context
            .as_ref()
            .ok_or_else(|| StructuralError::ContextUnset.into())
    }
}

impl<T: WorkflowType> Default for RuleWorkflow<T> {
    fn default() -> Self {
        Self::new(String::new())
    }
}

#[async_trait]
impl<T: WorkflowType> Workflow for RuleWorkflow<T> {
    type Context = T::Context;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_context(&mut self, context: Self::Context) {
        self.context = Some(context);
    }

    fn check_eligibility(&self) -> Result<bool, EngineError> {
        let context = self.bound_context()?;
        let table = &self.dispatch.eligibility;

        condition::evaluate(&self.eligibility_lines, &mut |property, kind, value| {
            let comparator = table.get(property, kind).ok_or_else(|| {
                EngineError::dispatch_lookup(DispatchKind::Eligibility, property, kind)
            })?;
            Ok(comparator(context, value))
        })
    }

    async fn run_activities(&self) -> Result<(), EngineError> {
        let context = self.bound_context()?;

        for line in &self.activity_lines {
            let action = self
                .dispatch
                .activities
                .get(&line.property, &line.kind)
                .ok_or_else(|| {
                    EngineError::dispatch_lookup(DispatchKind::Activity, &line.property, &line.kind)
                })?;

            log::trace!(
                "Workflow {} - activity {:?} on {:?}",
                self.name,
                line.kind,
                line.property
            );
            action(context, &line.value)
                .await
                .map_err(|source| EngineError::activity(&line.property, &line.kind, source))?;
        }

        Ok(())
    }
}

impl<T: WorkflowType> Reconstruct for RuleWorkflow<T> {
    type Record = RecordOf<T>;

    fn reconstruct(record: Self::Record) -> Self {
        let mut workflow = Self::default();
        workflow.name = record.name;
        workflow.eligibility_lines = record.eligibility_lines;
        workflow.activity_lines = record.activity_lines;
        workflow
    }

    fn to_record(&self) -> Self::Record {
        WorkflowRecord {
            name: self.name.clone(),
            eligibility_lines: self.eligibility_lines.clone(),
            activity_lines: self.activity_lines.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dispatch::{ActivityTable, EligibilityTable};
    use crate::engine::context::ContextSlot;
    use crate::ruleflow::workflow::types::LogicalOperator;
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
    enum Field {
        Status,
        Total,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
    enum Check {
        Equals,
        Missing,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
    enum Step {
        Set,
        Log,
        Missing,
    }

    #[derive(Default)]
    struct Order {
        status: Mutex<String>,
        total: Mutex<String>,
        log: Mutex<Vec<String>>,
        checks: AtomicUsize,
    }

    impl Order {
        fn field(&self, field: Field) -> &Mutex<String> {
            match field {
                Field::Status => &self.status,
                Field::Total => &self.total,
            }
        }
    }

    struct OrderWorkflow;

    impl WorkflowType for OrderWorkflow {
        type Property = Field;
        type EligibilityKind = Check;
        type ActivityKind = Step;
        type Context = (Arc<Order>,);

        fn define_eligibilities(table: &mut EligibilityTable<Self>) {
            for field in [Field::Status, Field::Total] {
                table.comparator(field, Check::Equals, move |ctx, value| {
                    ctx.0.checks.fetch_add(1, Ordering::SeqCst);
                    *ctx.0.field(field).lock().unwrap() == value
                });
            }
        }

        fn define_activities(table: &mut ActivityTable<Self>) {
            for field in [Field::Status, Field::Total] {
                table.action(field, Step::Set, move |ctx, value| {
                    Box::pin(async move {
                        tokio::task::yield_now().await;
                        *ctx.0.field(field).lock().unwrap() = value.to_string();
                        ctx.0.log.lock().unwrap().push(format!("set {:?}", field));
                        Ok(())
                    })
                });
                table.action(field, Step::Log, move |ctx, value| {
                    Box::pin(async move {
                        ctx.0.log.lock().unwrap().push(value.to_string());
                        Ok(())
                    })
                });
            }
        }
    }

    fn order(status: &str) -> Arc<Order> {
        let order = Order::default();
        *order.status.lock().unwrap() = status.to_string();
        Arc::new(order)
    }

    fn paid_workflow() -> RuleWorkflow<OrderWorkflow> {
        RuleWorkflow::new("paid orders")
            .with_eligibility(vec![EligibilityLine::condition(
                LogicalOperator::And,
                Field::Status,
                Check::Equals,
                "paid",
            )])
            .with_activities(vec![
                ActivityLine::new(Field::Status, Step::Log, "first"),
                ActivityLine::new(Field::Status, Step::Set, "shipped"),
                ActivityLine::new(Field::Total, Step::Log, "last"),
            ])
    }

    #[test]
    fn test_check_without_context_fails() {
        let err = paid_workflow().check_eligibility().unwrap_err();
        assert!(matches!(
            err,
            EngineError::Structure(StructuralError::ContextUnset)
        ));
    }

    #[test]
    fn test_check_uses_last_context() {
        let mut workflow = paid_workflow();

        workflow.set_context((order("paid"),));
        assert!(workflow.check_eligibility().unwrap());

        workflow.set_context((order("pending"),));
        assert!(!workflow.check_eligibility().unwrap());
    }

    #[test]
    fn test_missing_eligibility_method() {
        let mut workflow = RuleWorkflow::<OrderWorkflow>::new("broken").with_eligibility(vec![
            EligibilityLine::condition(LogicalOperator::And, Field::Status, Check::Missing, "x"),
        ]);
        workflow.set_context((order("paid"),));

        let err = workflow.check_eligibility().unwrap_err();
        assert_eq!(
            err.to_string(),
            "No eligibility method registered for property Status with kind Missing"
        );
    }

    #[test]
    fn test_assign_slots_checks_arity() {
        let mut workflow = paid_workflow();
        let first: ContextSlot = order("paid");
        let second: ContextSlot = order("paid");

        let err = workflow.assign_slots(vec![first.clone(), second]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Structure(StructuralError::ContextArity {
                expected: 1,
                actual: 2
            })
        ));
        assert!(workflow.context().is_none());

        workflow.assign_slots(vec![first]).unwrap();
        assert!(workflow.check_eligibility().unwrap());
    }

    #[tokio::test]
    async fn test_activities_run_in_order() {
        let mut workflow = paid_workflow();
        let target = order("paid");
        workflow.set_context((target.clone(),));

        workflow.run_activities().await.unwrap();

        assert_eq!(*target.status.lock().unwrap(), "shipped");
        assert_eq!(
            *target.log.lock().unwrap(),
            vec!["first", "set Status", "last"]
        );
    }

    #[tokio::test]
    async fn test_activities_ignore_eligibility() {
        let mut workflow = paid_workflow();
        let target = order("pending");
        workflow.set_context((target.clone(),));

        assert!(!workflow.check_eligibility().unwrap());
        workflow.run_activities().await.unwrap();
        assert_eq!(*target.status.lock().unwrap(), "shipped");
    }

    #[tokio::test]
    async fn test_missing_activity_stops_after_earlier_steps() {
        let mut workflow = RuleWorkflow::<OrderWorkflow>::new("partial").with_activities(vec![
            ActivityLine::new(Field::Total, Step::Set, "10"),
            ActivityLine::new(Field::Total, Step::Missing, "x"),
            ActivityLine::new(Field::Status, Step::Set, "never"),
        ]);
        let target = order("paid");
        workflow.set_context((target.clone(),));

        let err = workflow.run_activities().await.unwrap_err();
        assert!(err.is_dispatch_lookup());
        assert_eq!(*target.total.lock().unwrap(), "10");
        assert_eq!(*target.status.lock().unwrap(), "paid");
    }

    #[test]
    fn test_record_round_trip_keeps_lines() {
        let workflow = paid_workflow();
        let rebuilt = RuleWorkflow::<OrderWorkflow>::reconstruct(workflow.to_record());

        assert_eq!(rebuilt.name(), "paid orders");
        assert_eq!(rebuilt.eligibility_lines(), workflow.eligibility_lines());
        assert_eq!(rebuilt.activity_lines(), workflow.activity_lines());
        assert!(rebuilt.context().is_none());
    }

    #[test]
    fn test_comparators_count_per_check() {
        let mut workflow = paid_workflow();
        let target = order("paid");
        workflow.set_context((target.clone(),));

        workflow.check_eligibility().unwrap();
        workflow.check_eligibility().unwrap();
        assert_eq!(target.checks.load(Ordering::SeqCst), 2);
    }
}
