// SPDX-License-Identifier: MIT

//! Rule data types
//!
//! These structures are the serializable half of a workflow: which
//! properties, which checks, which values. Enumerated fields serialize as
//! their variant names.

use serde::{Deserialize, Serialize};

use crate::engine::error::StructuralError;

/// Relation between a line and the line before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

/// One condition or nested group of the eligibility tree.
///
/// `operator` links this line to the previous one in the same sequence and
/// is ignored on the first line. A line is either a condition (`property`,
/// `kind`, `value`) or a group, never both.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(
    rename_all = "camelCase",
    bound(deserialize = "P: Deserialize<'de>, K: Deserialize<'de>")
)]
pub struct EligibilityLine<P, K> {
    #[serde(default)]
    pub operator: LogicalOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<P>,
    #[serde(
        default,
        rename = "eligibilityKind",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<K>,
    #[serde(
        default,
        rename = "compareValue",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Vec<EligibilityLine<P, K>>>,
}

/// Checked view of an eligibility line
#[derive(Debug, PartialEq)]
pub enum EligibilityNode<'a, P, K> {
    Condition {
        property: &'a P,
        kind: &'a K,
        value: &'a str,
    },
    Group(&'a [EligibilityLine<P, K>]),
}

impl<P, K> EligibilityLine<P, K> {
    /// A single condition
    pub fn condition(
        operator: LogicalOperator,
        property: P,
        kind: K,
        value: impl Into<String>,
    ) -> Self {
        Self {
            operator,
            property: Some(property),
            kind: Some(kind),
            value: Some(value.into()),
            group: None,
        }
    }

    /// A nested group, evaluated as a single line of the parent sequence
    pub fn group(operator: LogicalOperator, lines: Vec<EligibilityLine<P, K>>) -> Self {
        Self {
            operator,
            property: None,
            kind: None,
            value: None,
            group: Some(lines),
        }
    }

    /// Classify the line; `index` is its position, used in errors
    pub fn node(&self, index: usize) -> Result<EligibilityNode<'_, P, K>, StructuralError> {
        match (&self.group, &self.property, &self.kind) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                Err(StructuralError::AmbiguousNode { index })
            }
            (Some(group), None, None) => Ok(EligibilityNode::Group(group)),
            (None, Some(property), Some(kind)) => Ok(EligibilityNode::Condition {
                property,
                kind,
                // A missing value compares as the empty string
                value: self.value.as_deref().unwrap_or(""),
            }),
            (None, _, _) => Err(StructuralError::IncompleteCondition { index }),
        }
    }

    pub fn is_group(&self) -> bool {
        self.group.is_some()
    }
}

/// One instruction run when the workflow's activities execute
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLine<P, A> {
    pub property: P,
    #[serde(rename = "activityKind")]
    pub kind: A,
    #[serde(default)]
    pub value: String,
}

impl<P, A> ActivityLine<P, A> {
    pub fn new(property: P, kind: A, value: impl Into<String>) -> Self {
        Self {
            property,
            kind,
            value: value.into(),
        }
    }
}

/// Serialized form of one workflow (behavior is never part of it)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(
    rename_all = "camelCase",
    bound(deserialize = "P: Deserialize<'de>, K: Deserialize<'de>, A: Deserialize<'de>")
)]
pub struct WorkflowRecord<P, K, A> {
    pub name: String,
    #[serde(default)]
    pub eligibility_lines: Vec<EligibilityLine<P, K>>,
    #[serde(default)]
    pub activity_lines: Vec<ActivityLine<P, A>>,
}
