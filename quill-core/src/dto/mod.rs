//! Data Transfer Objects for the orchestrator API
//!
//! This module contains DTOs used between the orchestrator and its callers
//! (client library, CLI, cron triggers).

pub mod batch;
pub mod step;
