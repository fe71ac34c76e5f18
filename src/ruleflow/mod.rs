// SPDX-License-Identifier: MIT

pub mod config;
pub mod contact;
pub mod workflow;
