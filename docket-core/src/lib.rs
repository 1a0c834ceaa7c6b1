//! Core vocabulary for the docket document-chat backend.
//!
//! This crate provides:
//! - The [`DocumentType`] enum shared by the ingestion pipelines and the
//!   file registry
//! - The [`Tool`] and [`ToolContext`] traits consumed by the
//!   conversational-agent collaborator
//! - The [`CoreError`] type every tool boundary translates into

mod error;
mod tool;
mod types;

pub use error::{CoreError, Result};
pub use tool::{DetachedContext, Tool, ToolContext};
pub use types::DocumentType;
