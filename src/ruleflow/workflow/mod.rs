// SPDX-License-Identifier: MIT

pub mod condition;
pub mod factory;
pub mod loader;
pub mod registry;
pub mod rule;
pub mod types;
