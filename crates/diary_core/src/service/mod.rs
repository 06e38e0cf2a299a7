//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the operations a presentation layer
//!   needs: entry reads with navigation, windowed lists, feeds, writes.
//! - Keep presentation layers decoupled from storage details.
//!
//! # Invariants
//! - Services never bypass repository validation/uniqueness contracts.
//! - Storage failures propagate unchanged inside `DiaryError::Repo`.

pub mod catalog_service;
pub mod diary_service;
pub mod error;
