//! Logger identities and module classes.
//!
//! # Responsibilities
//! - Name the well-known module tags
//! - Normalize free-form module keys for configuration lookup
//! - Decide which configuration class a module belongs to

use std::fmt;

use serde::Serialize;

/// Incoming and outgoing request traffic. Configured by `log.request`.
pub const MODULE_REQUEST: &str = "[Request]";
/// System internals. Configured by `log.system` like every other module.
pub const MODULE_SYSTEM: &str = "[System]";
pub const MODULE_BRIEF: &str = "[Brief]";
pub const MODULE_EVENT: &str = "[Event]";

/// Configuration class a module draws its defaults from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleClass {
    System,
    Request,
}

/// Strip bracket decoration and whitespace, then lowercase.
///
/// `"[Auth]"`, `"auth"` and `" [AUTH] "` all normalize to `"auth"`.
pub fn normalize_module(module: &str) -> String {
    module
        .trim()
        .trim_matches(|c: char| c == '[' || c == ']')
        .trim()
        .to_lowercase()
}

/// Unique registry key: a module plus an optional service channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoggerIdentity {
    module: String,
    service: String,
}

impl LoggerIdentity {
    /// An empty `service` addresses the module's default channel.
    pub fn new(module: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            service: service.into(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn normalized_module(&self) -> String {
        normalize_module(&self.module)
    }

    pub fn class(&self) -> ModuleClass {
        if self.normalized_module() == normalize_module(MODULE_REQUEST) {
            ModuleClass::Request
        } else {
            ModuleClass::System
        }
    }
}

impl fmt::Display for LoggerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.service.is_empty() {
            write!(f, "{}", self.module)
        } else {
            write!(f, "{}/{}", self.module, self.service)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_module() {
        assert_eq!(normalize_module("[Auth]"), "auth");
        assert_eq!(normalize_module(" [AUTH] "), "auth");
        assert_eq!(normalize_module("billing"), "billing");
        assert_eq!(normalize_module("[[Net]]"), "net");
        assert_eq!(normalize_module(""), "");
    }

    #[test]
    fn test_class() {
        assert_eq!(LoggerIdentity::new(MODULE_REQUEST, "").class(), ModuleClass::Request);
        assert_eq!(LoggerIdentity::new("request", "rpc").class(), ModuleClass::Request);
        assert_eq!(LoggerIdentity::new(MODULE_SYSTEM, "").class(), ModuleClass::System);
        assert_eq!(LoggerIdentity::new("[Requests]", "").class(), ModuleClass::System);
    }

    #[test]
    fn test_identity_distinguishes_services() {
        let a = LoggerIdentity::new("[Auth]", "");
        let b = LoggerIdentity::new("[Auth]", "chain1");
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "[Auth]");
        assert_eq!(b.to_string(), "[Auth]/chain1");
    }
}
