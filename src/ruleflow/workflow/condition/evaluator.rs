//! Eligibility tree evaluator

use crate::engine::error::{EngineError, StructuralError};
use crate::ruleflow::workflow::types::{EligibilityLine, EligibilityNode, LogicalOperator};

/// Evaluate an eligibility sequence.
///
/// `compare` resolves a single condition `(property, kind, value)`; it is
/// only called for lines that are actually reached. Groups recurse with the
/// same `compare` and take part in the parent sequence like one condition.
pub fn evaluate<P, K, F>(lines: &[EligibilityLine<P, K>], compare: &mut F) -> Result<bool, EngineError>
where
    F: FnMut(&P, &K, &str) -> Result<bool, EngineError>,
{
    if lines.is_empty() {
        return Err(StructuralError::EmptySequence.into());
    }

    let last = lines.len() - 1;
    for (index, line) in lines.iter().enumerate() {
        let current = match line.node(index)? {
            EligibilityNode::Group(group) => evaluate(group, compare)?,
            EligibilityNode::Condition {
                property,
                kind,
                value,
            } => compare(property, kind, value)?,
        };

        if index == last {
            return Ok(current);
        }

        match (current, lines[index + 1].operator) {
            (true, LogicalOperator::Or) => return Ok(true),
            (false, LogicalOperator::And) => return Ok(false),
            _ => {}
        }
    }

    Ok(false)
}
