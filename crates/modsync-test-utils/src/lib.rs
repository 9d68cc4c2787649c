//! Shared test utilities for the modsync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fixture`]: [`TestRoot`], a temporary managed root plus a local mirror
//!   that serves file content and the manifest
//! - [`manifest`]: builders for manifest JSON documents

pub mod fixture;
pub mod manifest;

pub use fixture::TestRoot;
pub use manifest::{EntrySpec, ManifestBuilder, md5_hex};
