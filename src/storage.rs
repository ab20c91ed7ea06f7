pub mod directory;
mod audit_config;

pub use audit_config::{AuditConfig, AuditConfigError, DEFAULT_API_URL};
pub use directory::{Directory, ScanError, TagReport};
