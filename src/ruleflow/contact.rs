// SPDX-License-Identifier: MIT

//! Contact workflows
//!
//! A ready-made workflow type over a single contact record, used by the
//! command-line front end and as a reference for host-defined types.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

use crate::engine::dispatch::{ActionResult, ActivityTable, EligibilityTable, WorkflowType};
use crate::ruleflow::workflow::factory::WorkflowFactory;
use crate::ruleflow::workflow::rule::RuleWorkflow;

/// A contact record shared with running workflows
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: String,
}

impl Contact {
    pub fn get(&self, property: ContactProperty) -> &str {
        match property {
            ContactProperty::FirstName => &self.first_name,
            ContactProperty::LastName => &self.last_name,
            ContactProperty::Email => &self.email,
            ContactProperty::Country => &self.country,
        }
    }

    pub fn get_mut(&mut self, property: ContactProperty) -> &mut String {
        match property {
            ContactProperty::FirstName => &mut self.first_name,
            ContactProperty::LastName => &mut self.last_name,
            ContactProperty::Email => &mut self.email,
            ContactProperty::Country => &mut self.country,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ContactProperty {
    FirstName,
    LastName,
    Email,
    Country,
}

impl ContactProperty {
    pub const ALL: [ContactProperty; 4] = [
        ContactProperty::FirstName,
        ContactProperty::LastName,
        ContactProperty::Email,
        ContactProperty::Country,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ContactCheck {
    Equals,
    NotEquals,
    Contains,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
}

impl ContactCheck {
    pub const ALL: [ContactCheck; 7] = [
        ContactCheck::Equals,
        ContactCheck::NotEquals,
        ContactCheck::Contains,
        ContactCheck::StartsWith,
        ContactCheck::EndsWith,
        ContactCheck::IsEmpty,
        ContactCheck::IsNotEmpty,
    ];

    /// Apply the check to a field value; matching is case-sensitive
    pub fn matches(self, field: &str, value: &str) -> bool {
        match self {
            ContactCheck::Equals => field == value,
            ContactCheck::NotEquals => field != value,
            ContactCheck::Contains => field.contains(value),
            ContactCheck::StartsWith => field.starts_with(value),
            ContactCheck::EndsWith => field.ends_with(value),
            ContactCheck::IsEmpty => field.is_empty(),
            ContactCheck::IsNotEmpty => !field.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ContactActivity {
    Set,
    Append,
    Clear,
}

impl ContactActivity {
    pub const ALL: [ContactActivity; 3] = [
        ContactActivity::Set,
        ContactActivity::Append,
        ContactActivity::Clear,
    ];

    pub fn apply(self, field: &mut String, value: &str) {
        match self {
            ContactActivity::Set => *field = value.to_string(),
            ContactActivity::Append => field.push_str(value),
            ContactActivity::Clear => field.clear(),
        }
    }
}

/// Context of contact workflows
pub type ContactContext = (Arc<RwLock<Contact>>,);

/// Workflow type over one contact
pub struct ContactWorkflowType;

impl WorkflowType for ContactWorkflowType {
    type Property = ContactProperty;
    type EligibilityKind = ContactCheck;
    type ActivityKind = ContactActivity;
    type Context = ContactContext;

    fn define_eligibilities(table: &mut EligibilityTable<Self>) {
        for property in ContactProperty::ALL {
            for check in ContactCheck::ALL {
                table.comparator(property, check, move |ctx, value| {
                    let contact = ctx.0.read().unwrap_or_else(PoisonError::into_inner);
                    check.matches(contact.get(property), value)
                });
            }
        }
    }

    fn define_activities(table: &mut ActivityTable<Self>) {
        for property in ContactProperty::ALL {
            for activity in ContactActivity::ALL {
                table.action(property, activity, move |ctx, value| {
                    Box::pin(async move { update(ctx, property, activity, value) })
                });
            }
        }
    }
}

/// Like the comparators, goes through a poisoned lock
fn update(
    ctx: &ContactContext,
    property: ContactProperty,
    activity: ContactActivity,
    value: &str,
) -> ActionResult {
    let mut contact = ctx.0.write().unwrap_or_else(PoisonError::into_inner);
    activity.apply(contact.get_mut(property), value);
    Ok(())
}

pub type ContactWorkflow = RuleWorkflow<ContactWorkflowType>;

pub type ContactFactory = WorkflowFactory<ContactWorkflow>;

/// Wrap a contact as a workflow context
pub fn contact_context(contact: Contact) -> ContactContext {
    (Arc::new(RwLock::new(contact)),)
}
