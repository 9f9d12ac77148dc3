//! Core domain types
//!
//! This module contains the core domain structures used across Quill services.
//! These types represent the fundamental business entities and are shared between
//! the orchestrator (for persistence) and the client/CLI (for display).

pub mod batch;
pub mod blog;
pub mod job;
pub mod seo;
