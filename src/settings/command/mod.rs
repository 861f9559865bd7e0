//! Compact Init Command Parsing
//!
//! This module parses one-line setup commands of the form
//! `init(usr:john@example.com, pwd:1234, host:db.local, port:3307)`.
//!
//! # Grammar
//! - The `init( ... )` wrapper is optional: a bare pair list is accepted,
//!   but anything starting with `init` must carry the full wrapper.
//! - Pairs are comma-separated `key:value` tokens; whitespace around keys
//!   and values is ignored.
//! - Keys are matched case-insensitively against `usr`, `pwd`, `host`,
//!   `port`, `db`, and `env`. Unrecognized keys are ignored; the last
//!   occurrence of a duplicate key wins.
//! - Values may be wrapped in single or double quotes to embed commas or
//!   spaces. Surrounding quotes are stripped; the inner text is kept
//!   verbatim. A quote only opens a quoted value when it is the first
//!   non-space character after the colon.

use std::path::{Path, PathBuf};

use crate::error::{PhrasebookError, Result};
use crate::settings::{resolve_and_persist, InitOptions};

/// Key/value pairs recognized by the compact init command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandPairs {
    /// `usr:` value
    pub user: Option<String>,

    /// `pwd:` value
    /// WARNING: Sensitive data, do not log or include in error messages
    pub password: Option<String>,

    /// `host:` value
    pub host: Option<String>,

    /// `port:` value (kept as text)
    pub port: Option<String>,

    /// `db:` value
    pub database: Option<String>,

    /// `env:` value (settings artifact location override)
    pub env: Option<String>,
}

/// Parse a compact init command into its recognized pairs
///
/// # Errors
/// `Validation` when the input starts with `init` but is not a well-formed
/// `init( ... )` wrapper, or when text trails the closing parenthesis.
pub fn parse_init_command(command: &str) -> Result<CommandPairs> {
    let inner = extract_inner(command.trim())?;

    let mut pairs = CommandPairs::default();
    for token in split_pairs(inner) {
        let Some((key, value)) = parse_pair(&token) else {
            continue;
        };
        match key.as_str() {
            "usr" => pairs.user = Some(value),
            "pwd" => pairs.password = Some(value),
            "host" => pairs.host = Some(value),
            "port" => pairs.port = Some(value),
            "db" => pairs.database = Some(value),
            "env" => pairs.env = Some(value),
            _ => {} // unrecognized keys are ignored
        }
    }

    Ok(pairs)
}

/// Parse a compact init command and persist the resulting credentials
///
/// Always runs non-interactively: pairs missing from the command fall
/// through the usual default chain, and missing mandatory credentials fail
/// with `Validation`. A non-blank `env:` pair overrides `env_path`.
pub fn resolve_from_command(command: &str, env_path: Option<&Path>) -> Result<PathBuf> {
    let pairs = parse_init_command(command)?;

    let artifact = match pairs.env.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => env_path.map(Path::to_path_buf),
    };

    resolve_and_persist(InitOptions {
        user: pairs.user,
        password: pairs.password,
        host: pairs.host,
        port: pairs.port,
        database: pairs.database,
        env_path: artifact,
        non_interactive: true,
    })
}

/// Strip the optional `init( ... )` wrapper
///
/// Input starting with `init` (case-insensitive) must carry the wrapper;
/// anything else is treated as a bare pair list.
fn extract_inner(text: &str) -> Result<&str> {
    let is_init_prefixed =
        text.len() >= 4 && text.is_char_boundary(4) && text[..4].eq_ignore_ascii_case("init");
    if !is_init_prefixed {
        return Ok(text);
    }

    let rest = text[4..].trim_start();
    let Some(body) = rest.strip_prefix('(') else {
        return Err(PhrasebookError::validation("Invalid init command syntax"));
    };
    let Some(inner) = body.trim_end().strip_suffix(')') else {
        return Err(PhrasebookError::validation("Invalid init command syntax"));
    };

    Ok(inner)
}

/// Split the pair list on commas, honoring quoted values
///
/// A quote opens a quoted region only as the first non-space character
/// after the first colon of the token; commas inside the region do not
/// split. An unclosed quote runs to the end of the input.
fn split_pairs(inner: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quote: Option<char> = None;
    let mut seen_colon = false;
    let mut value_started = false;

    for ch in inner.chars() {
        if let Some(quote) = in_quote {
            current.push(ch);
            if ch == quote {
                in_quote = None;
            }
            continue;
        }

        match ch {
            ',' => {
                tokens.push(std::mem::take(&mut current));
                seen_colon = false;
                value_started = false;
            }
            ':' if !seen_colon => {
                seen_colon = true;
                current.push(ch);
            }
            '"' | '\'' if seen_colon && !value_started => {
                in_quote = Some(ch);
                value_started = true;
                current.push(ch);
            }
            _ => {
                if seen_colon && !ch.is_whitespace() {
                    value_started = true;
                }
                current.push(ch);
            }
        }
    }
    tokens.push(current);

    tokens
}

/// Split one token into a lowercased key and an unquoted value
fn parse_pair(token: &str) -> Option<(String, String)> {
    let (key, value) = token.split_once(':')?;
    Some((key.trim().to_ascii_lowercase(), strip_quotes(value.trim())))
}

/// Strip one pair of matching surrounding quotes; inner text stays verbatim
fn strip_quotes(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if first == bytes[bytes.len() - 1] && (first == b'"' || first == b'\'') {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}
