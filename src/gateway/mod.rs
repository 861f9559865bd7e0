//! Pattern Lookup Gateway
//!
//! This module retrieves pre-authored dialogue material from the MySQL
//! store: request pattern sets, response pattern sets, and tag-to-task
//! assignments. Every operation is a first-row lookup against one of three
//! fixed tables.
//!
//! # Stateless Design
//! Each operation opens a connection, fetches the first matching row, and
//! closes the connection on every path (match, no match, failure) before
//! the payload is decoded. No connection is reused between operations, so
//! concurrent calls on one gateway are independent.
//!
//! # Payload Contract
//! Request and response rows hold a JSON object; the `request` /
//! `responses` key decodes to the pattern list and an absent key decodes
//! as an empty list. Tag assignment rows hold plain text.
//!
//! # Transport Seam
//! The gateway is generic over [`LookupTransport`] so the lookup flow can
//! be exercised without a live server. The default transport speaks MySQL.

use serde::Deserialize;

use crate::error::{PhrasebookError, Result};

pub mod mysql;

pub use mysql::MySqlTransport;

/// Lookup domains served by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupDomain {
    /// Request pattern sets (`user_requests`)
    RequestPatterns,
    /// Response pattern sets (`jarvis_responses`)
    ResponsePatterns,
    /// Tag-to-task assignments (`april_tag_assignments`)
    TagAssignments,
}

impl LookupDomain {
    /// Table holding this domain's rows
    #[must_use]
    pub const fn table(&self) -> &'static str {
        match self {
            Self::RequestPatterns => "user_requests",
            Self::ResponsePatterns => "jarvis_responses",
            Self::TagAssignments => "april_tag_assignments",
        }
    }

    /// Column holding the stored payload
    #[must_use]
    pub const fn payload_column(&self) -> &'static str {
        match self {
            Self::RequestPatterns => "REQUEST",
            Self::ResponsePatterns => "RESPONSE",
            Self::TagAssignments => "AssignmentTask",
        }
    }

    /// Column matched against the lookup key
    #[must_use]
    pub const fn key_column(&self) -> &'static str {
        match self {
            Self::RequestPatterns => "REQUESTTYPE",
            Self::ResponsePatterns => "RESPONSETYPE",
            Self::TagAssignments => "TagID",
        }
    }

    /// Get the domain name as a string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RequestPatterns => "request-patterns",
            Self::ResponsePatterns => "response-patterns",
            Self::TagAssignments => "tag-assignments",
        }
    }
}

impl std::fmt::Display for LookupDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key matched by a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    /// Text key (request and response type labels)
    Text(String),
    /// Integer key (tag identifiers)
    Id(i64),
}

/// A single first-row lookup against one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    /// Domain the lookup runs against
    pub domain: LookupDomain,

    /// Key value bound into the query
    pub key: LookupKey,
}

impl Lookup {
    /// Lookup for the request pattern set stored under `request_type`
    #[must_use]
    pub fn request_patterns(request_type: impl Into<String>) -> Self {
        Self { domain: LookupDomain::RequestPatterns, key: LookupKey::Text(request_type.into()) }
    }

    /// Lookup for the response pattern set stored under `response_type`
    #[must_use]
    pub fn response_patterns(response_type: impl Into<String>) -> Self {
        Self { domain: LookupDomain::ResponsePatterns, key: LookupKey::Text(response_type.into()) }
    }

    /// Lookup for the task assigned to `tag_id`
    #[must_use]
    pub const fn tag_assignment(tag_id: i64) -> Self {
        Self { domain: LookupDomain::TagAssignments, key: LookupKey::Id(tag_id) }
    }

    /// SQL statement for this lookup
    ///
    /// Table and column names come from compile-time constants; the key is
    /// always bound as a parameter. `LIMIT 1` makes the first-row contract
    /// explicit (ordering among duplicate keys is server-defined).
    #[must_use]
    pub fn sql(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE {} = ? LIMIT 1",
            self.domain.payload_column(),
            self.domain.table(),
            self.domain.key_column()
        )
    }
}

/// First matching row for a lookup, as seen by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRow {
    /// Payload column rendered as text; `None` when the column is SQL NULL
    pub payload: Option<String>,
}

/// Connection parameters for the gateway
///
/// All four fields are mandatory. The server port is left to the driver
/// default.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Hostname or IP address of the MySQL server
    pub host: String,

    /// Username for the MySQL account
    pub user: String,

    /// Password for the MySQL account
    /// WARNING: Sensitive data, do not log or include in error messages
    pub password: String,

    /// Database holding the pattern tables
    pub database: String,
}

impl GatewayConfig {
    /// Create a new gateway config
    #[must_use]
    pub const fn new(host: String, user: String, password: String, database: String) -> Self {
        Self { host, user, password, database }
    }
}

/// Transport able to open lookup connections
///
/// Implementations own the driver specifics; the gateway owns the lookup
/// flow and the payload contract.
pub trait LookupTransport {
    /// Connection type produced by this transport
    type Conn: LookupConnection;

    /// Open a connection for a single lookup
    fn connect(
        &self,
        config: &GatewayConfig,
    ) -> impl std::future::Future<Output = Result<Self::Conn>> + Send;
}

/// A live connection serving first-row lookups
pub trait LookupConnection: Send {
    /// Fetch the first row matching the lookup, if any
    fn fetch_first(
        &mut self,
        lookup: &Lookup,
    ) -> impl std::future::Future<Output = Result<Option<LookupRow>>> + Send;

    /// Close the connection
    fn close(self) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Pattern lookup gateway
///
/// Operations take `&self` and are safe to call concurrently; each one
/// opens and closes its own connection.
pub struct Gateway<T: LookupTransport = MySqlTransport> {
    config: GatewayConfig,
    transport: T,
}

impl Gateway<MySqlTransport> {
    /// Create a gateway over the default MySQL transport
    #[must_use]
    pub const fn new(config: GatewayConfig) -> Self {
        Self { config, transport: MySqlTransport }
    }
}

impl<T: LookupTransport> Gateway<T> {
    /// Create a gateway over a custom transport
    #[must_use]
    pub fn with_transport(config: GatewayConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Fetch the request pattern set stored under `request_type`
    ///
    /// Returns `Ok(None)` when no row matches. A matching row must hold a
    /// JSON object; its `request` key decodes to the pattern list and an
    /// absent key decodes as an empty list.
    pub async fn fetch_request_patterns(&self, request_type: &str) -> Result<Option<Vec<String>>> {
        match self.fetch_first(Lookup::request_patterns(request_type)).await? {
            Some(row) => {
                let payload: RequestPayload = decode_payload(&row, LookupDomain::RequestPatterns)?;
                Ok(Some(payload.request))
            }
            None => Ok(None),
        }
    }

    /// Fetch the response pattern set stored under `response_type`
    ///
    /// Same contract as [`Self::fetch_request_patterns`], decoding the
    /// `responses` key.
    pub async fn fetch_response_patterns(
        &self,
        response_type: &str,
    ) -> Result<Option<Vec<String>>> {
        match self.fetch_first(Lookup::response_patterns(response_type)).await? {
            Some(row) => {
                let payload: ResponsePayload =
                    decode_payload(&row, LookupDomain::ResponsePatterns)?;
                Ok(Some(payload.responses))
            }
            None => Ok(None),
        }
    }

    /// Fetch the task assigned to `tag_id`
    ///
    /// Returns the raw column text. `Ok(None)` when no row matches or the
    /// assignment column is NULL.
    pub async fn fetch_tag_assignment(&self, tag_id: i64) -> Result<Option<String>> {
        let row = self.fetch_first(Lookup::tag_assignment(tag_id)).await?;
        Ok(row.and_then(|row| row.payload))
    }

    /// Run one lookup with scoped connection acquisition
    ///
    /// The connection is closed on every path before the result is
    /// inspected. A fetch error takes precedence over a close error; a
    /// close error after a successful fetch is surfaced.
    async fn fetch_first(&self, lookup: Lookup) -> Result<Option<LookupRow>> {
        let mut conn = self.transport.connect(&self.config).await?;
        let fetched = conn.fetch_first(&lookup).await;
        let closed = conn.close().await;

        let row = fetched?;
        closed?;
        Ok(row)
    }
}

/// Stored request payload shape
#[derive(Debug, Deserialize)]
struct RequestPayload {
    #[serde(default)]
    request: Vec<String>,
}

/// Stored response payload shape
#[derive(Debug, Deserialize)]
struct ResponsePayload {
    #[serde(default)]
    responses: Vec<String>,
}

/// Decode a row's JSON payload into the domain's typed shape
///
/// NULL payloads and payloads that are not the expected JSON shape are
/// decode errors, never silent absence.
fn decode_payload<P: serde::de::DeserializeOwned>(row: &LookupRow, domain: LookupDomain) -> Result<P> {
    let text = row
        .payload
        .as_deref()
        .ok_or_else(|| PhrasebookError::decode(format!("NULL payload in {} row", domain.table())))?;

    serde_json::from_str(text).map_err(|e| {
        PhrasebookError::decode(format!("Invalid JSON payload in {} row: {e}", domain.table()))
    })
}
