// SPDX-License-Identifier: MIT

use crate::engine::dispatch::{ActivityTable, EligibilityTable, WorkflowType};
use once_cell::sync::Lazy;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registered behavior of one workflow type
pub struct Dispatch<T: WorkflowType> {
    pub eligibility: EligibilityTable<T>,
    pub activities: ActivityTable<T>,
}

impl<T: WorkflowType> Dispatch<T> {
    /// Run the type's registration functions into fresh tables
    pub fn build() -> Self {
        let mut eligibility = EligibilityTable::<T>::new();
        let mut activities = ActivityTable::<T>::new();
        T::define_eligibilities(&mut eligibility);
        T::define_activities(&mut activities);
        Self {
            eligibility,
            activities,
        }
    }
}

type Tables = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

static TABLES: Lazy<RwLock<Tables>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Process-wide cache of dispatch tables, one entry per workflow type
pub struct DispatchRegistry;

impl DispatchRegistry {
    /// Get the tables of `T`, registering them on first use
    pub fn get<T: WorkflowType>() -> Arc<Dispatch<T>> {
        let key = TypeId::of::<T>();

        let cached = TABLES
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(Ok(dispatch)) = cached.map(|entry| entry.downcast::<Dispatch<T>>()) {
            return dispatch;
        }

        // Built outside the lock so `define_*` may use the registry itself;
        // if two first uses race, the first inserted entry wins
        let built = Dispatch::<T>::build();
        log::trace!(
            "DispatchRegistry - registered {} eligibility and {} activity methods for {}",
            built.eligibility.len(),
            built.activities.len(),
            type_name::<T>()
        );
        let built = Arc::new(built);

        let entry = TABLES
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert_with(|| built.clone() as Arc<dyn Any + Send + Sync>)
            .clone();

        entry.downcast::<Dispatch<T>>().unwrap_or(built)
    }

    /// Whether `T` has been registered already
    pub fn is_registered<T: WorkflowType>() -> bool {
        TABLES
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeId::of::<T>())
    }
}
