//! MySQL Lookup Transport
//!
//! This module implements the gateway's transport seam over `mysql_async`.
//!
//! # Implementation Notes
//! - One TCP connection per lookup, opened by [`MySqlTransport::connect`]
//!   and torn down with `disconnect()` so the server sees a clean close
//! - The lookup key is always a bound parameter
//! - The payload column is rendered as text: UTF-8 bytes pass through,
//!   binary bytes are Base64-encoded, temporal values are formatted
//! - The server port is the driver default; the gateway config carries none

use mysql_async::{prelude::*, Conn, OptsBuilder, Row, Value};

use crate::error::{PhrasebookError, Result};
use crate::gateway::{GatewayConfig, Lookup, LookupConnection, LookupKey, LookupRow, LookupTransport};

/// Transport speaking MySQL via `mysql_async`
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlTransport;

impl LookupTransport for MySqlTransport {
    type Conn = MySqlLookupConn;

    async fn connect(&self, config: &GatewayConfig) -> Result<MySqlLookupConn> {
        let opts = OptsBuilder::default()
            .ip_or_hostname(&config.host)
            .user(Some(&config.user))
            .pass(Some(&config.password))
            .db_name(Some(&config.database));

        let conn = Conn::new(opts).await.map_err(|e| {
            PhrasebookError::connection_failed(format!("Failed to connect to MySQL: {e}"))
        })?;

        Ok(MySqlLookupConn { conn })
    }
}

/// A live MySQL connection serving first-row lookups
pub struct MySqlLookupConn {
    conn: Conn,
}

impl LookupConnection for MySqlLookupConn {
    async fn fetch_first(&mut self, lookup: &Lookup) -> Result<Option<LookupRow>> {
        let key = match &lookup.key {
            LookupKey::Text(text) => Value::from(text.as_str()),
            LookupKey::Id(id) => Value::from(*id),
        };

        let row: Option<Row> = self.conn.exec_first(lookup.sql(), (key,)).await.map_err(|e| {
            PhrasebookError::query_failed(format!(
                "Failed to query {}: {e}",
                lookup.domain.table()
            ))
        })?;

        match row {
            Some(row) => {
                let value = row.as_ref(0).ok_or_else(|| {
                    PhrasebookError::query_failed(format!(
                        "Missing {} column in {} row",
                        lookup.domain.payload_column(),
                        lookup.domain.table()
                    ))
                })?;
                Ok(Some(LookupRow { payload: value_text(value) }))
            }
            None => Ok(None),
        }
    }

    async fn close(self) -> Result<()> {
        self.conn.disconnect().await.map_err(|e| {
            PhrasebookError::connection_failed(format!("Failed to disconnect: {e}"))
        })
    }
}

/// Render a MySQL value as payload text
///
/// `None` stands for SQL NULL. Binary bytes that are not valid UTF-8 are
/// Base64-encoded so the result is always a valid string.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::NULL => None,

        Value::Bytes(bytes) => Some(match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => {
                use base64::Engine;
                base64::engine::general_purpose::STANDARD.encode(bytes)
            }
        }),

        Value::Int(i) => Some(i.to_string()),

        Value::UInt(u) => Some(u.to_string()),

        Value::Float(f) => Some(f.to_string()),

        Value::Double(d) => Some(d.to_string()),

        Value::Date(year, month, day, hour, minute, second, micro) => Some(format!(
            "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}.{micro:06}"
        )),

        Value::Time(is_negative, days, hours, minutes, seconds, microseconds) => {
            let sign = if *is_negative { "-" } else { "" };
            let total_hours = days * 24 + u32::from(*hours);
            Some(format!("{sign}{total_hours}:{minutes:02}:{seconds:02}.{microseconds:06}"))
        }
    }
}
