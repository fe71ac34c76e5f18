// SPDX-License-Identifier: MIT

//! Dispatch tables mapping rule data to host behavior
//!
//! Rule lines only carry a property, a kind and a raw string value. What a
//! comparison or an activity actually does is looked up here, keyed by
//! property then kind. Each workflow type fills its tables once through
//! [`WorkflowType`]; they are read-only afterwards.

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use super::context::DataContext;

/// Error returned by a host action
pub type ActionError = Box<dyn Error + Send + Sync>;

/// Completion of a host action
pub type ActionResult = Result<(), ActionError>;

/// Eligibility check: compares the context against a raw rule value
pub type Comparator<C> = Arc<dyn Fn(&C, &str) -> bool + Send + Sync>;

/// Activity: applies a raw rule value to the context, possibly asynchronously
pub type Action<C> = Arc<dyn for<'a> Fn(&'a C, &'a str) -> BoxFuture<'a, ActionResult> + Send + Sync>;

/// A discrete value usable as a dispatch key (host-defined enums)
pub trait RuleKey:
    Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> RuleKey for T where
    T: Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Property then kind keyed lookup
pub struct DispatchTable<P, K, F> {
    methods: HashMap<P, HashMap<K, F>>,
}

impl<P, K, F> DispatchTable<P, K, F>
where
    P: Eq + Hash,
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    /// Register a behavior, replacing any previous one for the same pair
    pub fn insert(&mut self, property: P, kind: K, method: F) -> &mut Self {
        self.methods
            .entry(property)
            .or_default()
            .insert(kind, method);
        self
    }

    pub fn get(&self, property: &P, kind: &K) -> Option<&F> {
        self.methods.get(property)?.get(kind)
    }

    pub fn contains(&self, property: &P, kind: &K) -> bool {
        self.get(property, kind).is_some()
    }

    /// Number of registered (property, kind) pairs
    pub fn len(&self) -> usize {
        self.methods.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P, K, F> Default for DispatchTable<P, K, F>
where
    P: Eq + Hash,
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, K, C> DispatchTable<P, K, Comparator<C>>
where
    P: Eq + Hash,
    K: Eq + Hash,
{
    pub fn comparator<F>(&mut self, property: P, kind: K, method: F) -> &mut Self
    where
        F: Fn(&C, &str) -> bool + Send + Sync + 'static,
    {
        self.insert(property, kind, Arc::new(method))
    }
}

impl<P, K, C> DispatchTable<P, K, Action<C>>
where
    P: Eq + Hash,
    K: Eq + Hash,
{
    pub fn action<F>(&mut self, property: P, kind: K, method: F) -> &mut Self
    where
        F: for<'a> Fn(&'a C, &'a str) -> BoxFuture<'a, ActionResult> + Send + Sync + 'static,
    {
        self.insert(property, kind, Arc::new(method))
    }
}

/// Eligibility table of a workflow type
pub type EligibilityTable<T> = DispatchTable<
    <T as WorkflowType>::Property,
    <T as WorkflowType>::EligibilityKind,
    Comparator<<T as WorkflowType>::Context>,
>;

/// Activity table of a workflow type
pub type ActivityTable<T> = DispatchTable<
    <T as WorkflowType>::Property,
    <T as WorkflowType>::ActivityKind,
    Action<<T as WorkflowType>::Context>,
>;

/// A concrete kind of workflow, defined by the host application.
///
/// The associated enums name what rule data can reference; the two
/// `define_*` functions register the behavior behind each pair. Tables
/// are built once per type and shared by all of its workflows.
pub trait WorkflowType: Sized + Send + Sync + 'static {
    /// Properties rules can target (FirstName, Email, ...)
    type Property: RuleKey;
    /// Eligibility checks available (Equals, Contains, ...)
    type EligibilityKind: RuleKey;
    /// Activities available (Set, SendMail, ...)
    type ActivityKind: RuleKey;
    /// Objects the workflow evaluates against
    type Context: DataContext;

    fn define_eligibilities(table: &mut EligibilityTable<Self>);

    fn define_activities(table: &mut ActivityTable<Self>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Property {
        Alpha,
        Beta,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Equals,
        Contains,
    }

    struct Counter {
        hits: AtomicUsize,
        text: String,
    }

    #[test]
    fn test_insert_and_get() {
        let mut table: DispatchTable<Property, Kind, Comparator<String>> = DispatchTable::new();
        table
            .comparator(Property::Alpha, Kind::Equals, |ctx: &String, value: &str| ctx == value)
            .comparator(Property::Alpha, Kind::Contains, |ctx: &String, value: &str| {
                ctx.contains(value)
            });

        assert_eq!(table.len(), 2);
        assert!(table.contains(&Property::Alpha, &Kind::Equals));
        assert!(!table.contains(&Property::Beta, &Kind::Equals));

        let equals = table.get(&Property::Alpha, &Kind::Equals).unwrap();
        assert!(equals(&"Alpha".to_string(), "Alpha"));
        let contains = table.get(&Property::Alpha, &Kind::Contains).unwrap();
        assert!(contains(&"Alpha".to_string(), "lph"));
    }

    #[test]
    fn test_missing_kind_for_known_property() {
        let mut table: DispatchTable<Property, Kind, Comparator<String>> = DispatchTable::new();
        table.comparator(Property::Beta, Kind::Equals, |_: &String, _: &str| true);

        assert!(table.get(&Property::Beta, &Kind::Contains).is_none());
        assert!(table.get(&Property::Alpha, &Kind::Equals).is_none());
    }

    #[test]
    fn test_insert_replaces() {
        let mut table: DispatchTable<Property, Kind, Comparator<String>> = DispatchTable::new();
        table.comparator(Property::Alpha, Kind::Equals, |_: &String, _: &str| false);
        table.comparator(Property::Alpha, Kind::Equals, |_: &String, _: &str| true);

        assert_eq!(table.len(), 1);
        let method = table.get(&Property::Alpha, &Kind::Equals).unwrap();
        assert!(method(&String::new(), ""));
    }

    #[tokio::test]
    async fn test_action_receives_context_and_value() {
        let mut table: DispatchTable<Property, Kind, Action<Counter>> = DispatchTable::default();
        table.action(Property::Alpha, Kind::Equals, |ctx, value| {
            Box::pin(async move {
                ctx.hits.fetch_add(value.len(), Ordering::SeqCst);
                Ok(())
            })
        });

        let ctx = Counter {
            hits: AtomicUsize::new(0),
            text: "unused".to_string(),
        };
        let action = table.get(&Property::Alpha, &Kind::Equals).unwrap();
        action(&ctx, "four").await.unwrap();

        assert_eq!(ctx.hits.load(Ordering::SeqCst), 4);
        assert_eq!(ctx.text, "unused");
    }
}
