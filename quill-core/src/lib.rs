//! Quill Core
//!
//! Core types and abstractions for the Quill content pipeline.
//!
//! This crate contains:
//! - Domain types: Core business entities (Batch, Job, Blog, SeoAnalysis)
//! - DTOs: Data transfer objects for the orchestrator API

pub mod domain;
pub mod dto;
