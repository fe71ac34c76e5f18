// SPDX-License-Identifier: MIT

//! Data-driven rule workflows.
//!
//! - [`engine`] holds the domain-agnostic building blocks: errors, data
//!   contexts, dispatch tables and the workflow capability traits.
//! - [`ruleflow`] holds the rule engine itself: rule data, the eligibility
//!   evaluator, the factory that loads and runs workflow batches, and the
//!   built-in contact workflow type.

pub mod engine;
pub mod ruleflow;
