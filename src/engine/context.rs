// SPDX-License-Identifier: MIT

//! Positional data contexts
//!
//! A workflow evaluates against one to four externally owned objects. Each
//! workflow type fixes the arity and types as a tuple of `Arc`s, so typed
//! assignment is checked by the compiler. Untyped assignment goes through
//! [`DataContext::from_slots`], which checks arity and types at run time.

use std::any::{type_name, Any};
use std::sync::Arc;

use super::error::{EngineError, StructuralError};

/// One untyped context object
pub type ContextSlot = Arc<dyn Any + Send + Sync>;

/// The set of objects a workflow type evaluates against
pub trait DataContext: Clone + Send + Sync + 'static {
    /// Number of positional objects
    const ARITY: usize;

    /// Build the context from positional slots, failing on wrong arity or type
    fn from_slots(slots: Vec<ContextSlot>) -> Result<Self, EngineError>;
}

fn check_arity(expected: usize, slots: &[ContextSlot]) -> Result<(), EngineError> {
    if slots.len() != expected {
        return Err(StructuralError::ContextArity {
            expected,
            actual: slots.len(),
        }
        .into());
    }
    Ok(())
}

fn downcast_slot<T: Send + Sync + 'static>(
    slot: usize,
    value: ContextSlot,
) -> Result<Arc<T>, EngineError> {
    value.downcast::<T>().map_err(|_| {
        StructuralError::ContextType {
            slot,
            expected: type_name::<T>(),
        }
        .into()
    })
}

macro_rules! impl_data_context {
    ($arity:expr; $($ty:ident => $idx:tt),+) => {
        impl<$($ty),+> DataContext for ($(Arc<$ty>,)+)
        where
            $($ty: Send + Sync + 'static),+
        {
            const ARITY: usize = $arity;

            fn from_slots(slots: Vec<ContextSlot>) -> Result<Self, EngineError> {
                check_arity(Self::ARITY, &slots)?;
                let mut slots = slots.into_iter();
                Ok(($(
                    match slots.next() {
                        Some(value) => downcast_slot::<$ty>($idx, value)?,
                        None => {
                            return Err(StructuralError::ContextArity {
                                expected: Self::ARITY,
                                actual: $idx,
                            }
                            .into())
                        }
                    },
                )+))
            }
        }
    };
}

impl_data_context!(1; A => 0);
impl_data_context!(2; A => 0, B => 1);
impl_data_context!(3; A => 0, B => 1, C => 2);
impl_data_context!(4; A => 0, B => 1, C => 2, D => 3);
