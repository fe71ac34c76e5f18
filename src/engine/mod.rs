// SPDX-License-Identifier: MIT

//! Engine primitives shared by every workflow type
//!
//! - `error` - typed errors for dispatch, structure and parsing failures
//! - `context` - positional data contexts (one to four shared objects)
//! - `dispatch` - property/kind keyed behavior tables
//! - `workflow` - the capability traits the factory is generic over

pub mod context;
pub mod dispatch;
pub mod error;
pub mod workflow;

pub use context::{ContextSlot, DataContext};
pub use dispatch::{
    Action, ActionError, ActionResult, ActivityTable, Comparator, DispatchTable, EligibilityTable,
    RuleKey, WorkflowType,
};
pub use error::{DispatchKind, EngineError, StructuralError};
pub use workflow::{Reconstruct, Workflow};
