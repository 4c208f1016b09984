//! Tenant identity and tenant-scoped state bookkeeping.

mod registry;
mod types;

pub use registry::TenantRegistry;
pub use types::{ChannelId, MessageId, RoleId, TenantId, UserId};
