//! Tenant settings persistence.
//!
//! The settings document maps every tenant to its configuration (status target,
//! announcements, auto role, warnings). It is owned by the store; the engine only
//! reads it, apart from the settings and warning commands that rewrite it.

mod json;
mod settings;
mod types;

pub use json::JsonFileStore;
pub use settings::TenantSettings;
pub use types::*;
