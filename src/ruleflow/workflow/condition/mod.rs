// SPDX-License-Identifier: MIT

//! Eligibility evaluation for rule workflows
//!
//! An eligibility tree is an ordered sequence of lines, each a condition or
//! a nested group, linked by AND/OR to the line before it. Evaluation walks
//! the sequence left to right and stops as soon as the outcome is decided:
//! - `false` followed by `AND` yields `false`
//! - `true` followed by `OR` yields `true`
//!
//! Otherwise the remaining lines decide. Lines after the stopping point are
//! never evaluated and their comparators never run.

mod evaluator;

pub use evaluator::evaluate;
