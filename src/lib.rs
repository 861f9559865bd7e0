//! Phrasebook - MySQL-Backed Dialogue Pattern Retrieval
//!
//! Phrasebook lets a conversational agent retrieve pre-authored request
//! patterns, response patterns, and tag-to-task assignments from a MySQL
//! store, and ships the setup routine that collects and persists the
//! database credentials the lookups need.
//!
//! # Core Principles
//! - Two independent components: credential setup and pattern lookups
//! - Per-call connections, released on every exit path
//! - Bound query parameters, never interpolated values
//! - First-row semantics made explicit (`LIMIT 1`)
//! - Secrets never echoed to any output stream
//!
//! # Module Organization
//! - [`error`] - Error types and stable error codes
//! - [`settings`] - Credential resolution and the persisted settings artifact
//! - [`settings::command`] - Compact `init(...)` command grammar
//! - [`gateway`] - Pattern lookup gateway and its MySQL transport
//!
//! # Public API
//! - Setup: [`resolve_and_persist`], [`resolve_from_command`], [`InitOptions`]
//! - Artifact: [`Credentials`], [`parse_env`], [`quote_env_value`]
//! - Lookups: [`Gateway`], [`GatewayConfig`]
//! - Errors: [`PhrasebookError`], [`Result`]

pub mod error;
pub mod gateway;
pub mod settings;

// Re-export commonly used types for convenience
pub use error::{PhrasebookError, Result};
pub use gateway::{Gateway, GatewayConfig, Lookup, LookupConnection, LookupDomain, LookupKey, LookupRow, LookupTransport, MySqlTransport};
pub use settings::command::{parse_init_command, resolve_from_command, CommandPairs};
pub use settings::{
    default_artifact_path, parse_env, quote_env_value, resolve_and_persist, resolve_default,
    unquote_env_value, Credentials, InitOptions,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_exports() {
        // Verify that key types are accessible
        let _opts = InitOptions::default();
        let _domain = LookupDomain::RequestPatterns;
        let _pairs = CommandPairs::default();
    }
}
