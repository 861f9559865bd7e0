//! Credential Settings Management
//!
//! This module resolves MySQL credentials and persists them as the settings
//! artifact consumed by deployment tooling and external loaders.
//!
//! # Settings Artifact
//! UTF-8 text, one `KEY=VALUE` per line, trailing newline. Keys are fixed:
//! `MYSQL_HOST`, `MYSQL_PORT`, `MYSQL_USER`, `MYSQL_PASSWORD`, and an
//! optional `MYSQL_DB`. Values containing spaces, tabs, `#`, quotes, `=`,
//! or backslashes are double-quoted with `\` and `"` escaped inside.
//! [`parse_env`] is the matching reader; encoding and decoding round-trip.
//!
//! # Resolution Precedence
//! 1. Explicit call arguments (highest priority)
//! 2. `MYSQL_HOST` / `MYSQL_PORT` environment variables (host and port only)
//! 3. Built-in defaults (`localhost`, `3306`)
//!
//! Username and password carry no ambient defaults: they are prompted for
//! interactively, or required up front in non-interactive mode.
//!
//! # Security
//! The artifact is written atomically and restricted to owner-only
//! permissions before any secret byte lands in it. Permission failures are
//! non-fatal and reported on stderr.

use std::fs;
use std::path::{Path, PathBuf};

use dialoguer::{Input, Password};

use crate::error::{PhrasebookError, Result};

pub mod command;

/// Environment variable consulted when no explicit host is given
pub const HOST_ENV: &str = "MYSQL_HOST";

/// Environment variable consulted when no explicit port is given
pub const PORT_ENV: &str = "MYSQL_PORT";

/// Fallback host when neither an argument nor the environment provides one
pub const DEFAULT_HOST: &str = "localhost";

/// Fallback port when neither an argument nor the environment provides one
pub const DEFAULT_PORT: &str = "3306";

/// Resolved connection credentials
///
/// Produced by one resolution run and serialized into the settings artifact.
/// Each run overwrites the artifact as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Hostname or IP address of the MySQL server
    pub host: String,

    /// Server port, kept verbatim as text (the artifact never parses it)
    pub port: String,

    /// Username for the MySQL account
    pub user: String,

    /// Password for the MySQL account
    /// WARNING: Sensitive data, do not log or include in error messages
    pub password: String,

    /// Default database, omitted from the artifact when not provided
    pub database: Option<String>,
}

impl Credentials {
    /// Render the settings artifact body
    ///
    /// Keys appear in fixed order; the `MYSQL_DB` line is omitted when no
    /// database was provided. The result always ends with a newline.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("MYSQL_HOST={}", quote_env_value(&self.host)),
            format!("MYSQL_PORT={}", quote_env_value(&self.port)),
            format!("MYSQL_USER={}", quote_env_value(&self.user)),
            format!("MYSQL_PASSWORD={}", quote_env_value(&self.password)),
        ];
        if let Some(database) = &self.database {
            lines.push(format!("MYSQL_DB={}", quote_env_value(database)));
        }
        lines.join("\n") + "\n"
    }
}

/// Options accepted by [`resolve_and_persist`]
///
/// All fields are optional; missing values are resolved through defaults or
/// prompts as described on [`resolve_and_persist`].
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Username (mandatory overall, prompted for when interactive)
    pub user: Option<String>,

    /// Password (mandatory overall, prompted for when interactive)
    /// WARNING: Sensitive data, do not log or include in error messages
    pub password: Option<String>,

    /// Hostname, defaulting through `MYSQL_HOST` then `localhost`
    pub host: Option<String>,

    /// Port, defaulting through `MYSQL_PORT` then `3306`
    pub port: Option<String>,

    /// Default database (optional, asked once when interactive)
    pub database: Option<String>,

    /// Artifact location override; the per-user default is used otherwise
    pub env_path: Option<PathBuf>,

    /// Fail instead of prompting when a mandatory value is missing
    pub non_interactive: bool,
}

/// Get the default settings artifact path
/// (`~/.config/phrasebook/credentials.env` or platform equivalent)
pub fn default_artifact_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| PhrasebookError::settings("Could not determine user config directory"))?;

    Ok(config_dir.join("phrasebook").join("credentials.env"))
}

/// Resolve credentials and persist them as the settings artifact
///
/// Usage examples:
/// - Programmatic: every field set, `non_interactive: true`
/// - Interactive: `InitOptions::default()`, missing values prompted for
///
/// Host and port fall through the default chain (argument, environment,
/// built-in). Username and password are mandatory: interactive runs prompt
/// until a non-blank value is entered (the password prompt hides input),
/// non-interactive runs fail with `Validation` before anything is written.
/// The database is optional; interactive runs ask for it once and treat an
/// empty answer as absent.
///
/// Each run rewrites the whole artifact. The path written is reported on
/// stdout (never the password) and returned.
///
/// # Errors
/// `Validation` when a mandatory value is missing in non-interactive mode,
/// `Settings` when prompting fails or the artifact cannot be written.
pub fn resolve_and_persist(opts: InitOptions) -> Result<PathBuf> {
    let artifact_path = match opts.env_path {
        Some(path) => path,
        None => default_artifact_path()?,
    };

    let host = resolve_default(opts.host.as_deref(), HOST_ENV, DEFAULT_HOST);
    let port = resolve_default(opts.port.as_deref(), PORT_ENV, DEFAULT_PORT);

    let user = match opts.user {
        Some(user) if !user.trim().is_empty() => user,
        _ if opts.non_interactive => {
            return Err(PhrasebookError::validation(
                "usr and pwd are required in non-interactive mode",
            ));
        }
        _ => prompt_user()?,
    };

    let password = match opts.password {
        Some(password) if !password.trim().is_empty() => password,
        _ if opts.non_interactive => {
            return Err(PhrasebookError::validation(
                "usr and pwd are required in non-interactive mode",
            ));
        }
        _ => prompt_password()?,
    };

    let database = match opts.database {
        Some(database) => {
            let database = database.trim();
            if database.is_empty() {
                None
            } else {
                Some(database.to_string())
            }
        }
        None if opts.non_interactive => None,
        None => prompt_database()?,
    };

    let credentials = Credentials { host, port, user, password, database };
    write_artifact(&artifact_path, &credentials.render())?;

    println!("Saved credentials to {} (password not displayed).", artifact_path.display());

    Ok(artifact_path)
}

/// Resolve one value through the default chain
///
/// Order: explicit argument, then the named environment variable, then the
/// fallback. Blank (empty or whitespace-only) arguments and environment
/// values count as unset; resolved values are trimmed.
#[must_use]
pub fn resolve_default(explicit: Option<&str>, env_key: &str, fallback: &str) -> String {
    if let Some(value) = explicit {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    if let Ok(value) = std::env::var(env_key) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    fallback.to_string()
}

/// Quote a value for the settings artifact
///
/// Values containing a space, tab, `#`, `"`, `'`, `=`, or `\` are wrapped
/// in double quotes with `\` and `"` escaped. Everything else passes
/// through unchanged.
#[must_use]
pub fn quote_env_value(value: &str) -> String {
    let needs_quotes =
        value.chars().any(|ch| matches!(ch, ' ' | '\t' | '#' | '"' | '\'' | '=' | '\\'));
    if !needs_quotes {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if ch == '\\' || ch == '"' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

/// Reverse of [`quote_env_value`]
///
/// Strips surrounding double quotes and unescapes `\\` and `\"`. Unquoted
/// values are returned verbatim after trimming.
#[must_use]
pub fn unquote_env_value(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() < 2 || !raw.starts_with('"') || !raw.ends_with('"') {
        return raw.to_string();
    }

    let inner = &raw[1..raw.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => result.push(next),
                None => result.push('\\'),
            }
        } else {
            result.push(ch);
        }
    }
    result
}

/// Parse settings artifact text into key/value pairs
///
/// Blank lines and `#` comment lines are skipped, values are decoded with
/// [`unquote_env_value`], and pairs are returned in file order (duplicates
/// included, so the last occurrence wins for map-style consumers).
#[must_use]
pub fn parse_env(contents: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            pairs.push((key.trim().to_string(), unquote_env_value(value)));
        }
    }
    pairs
}

/// Prompt for the username until a non-blank value is entered
fn prompt_user() -> Result<String> {
    let user: String = Input::new()
        .with_prompt("MySQL username")
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("Username cannot be empty.")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(|e| PhrasebookError::settings(format!("Could not read username: {e}")))?;

    Ok(user.trim().to_string())
}

/// Prompt for the password (hidden input) until a non-blank value is entered
fn prompt_password() -> Result<String> {
    let password = Password::new()
        .with_prompt("MySQL password (input hidden)")
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("Password cannot be empty.")
            } else {
                Ok(())
            }
        })
        .interact()
        .map_err(|e| PhrasebookError::settings(format!("Could not read password: {e}")))?;

    Ok(password.trim().to_string())
}

/// Prompt once for the optional default database; empty means absent
fn prompt_database() -> Result<Option<String>> {
    let database: String = Input::new()
        .with_prompt("Default database (optional)")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| PhrasebookError::settings(format!("Could not read database name: {e}")))?;

    let database = database.trim();
    Ok(if database.is_empty() { None } else { Some(database.to_string()) })
}

/// Write the artifact atomically
///
/// The content lands in a temp sibling whose permissions are tightened
/// before the secret bytes are written, then the sibling is renamed over
/// the target. The temp file is removed on failure.
fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    let file_name = path.file_name().ok_or_else(|| {
        PhrasebookError::settings(format!("Settings path has no file name: {}", path.display()))
    })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                PhrasebookError::settings(format!("Could not create settings directory: {e}"))
            })?;
        }
    }

    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, b"").map_err(|e| {
        PhrasebookError::settings(format!("Could not create settings file: {e}"))
    })?;
    restrict_permissions(&temp_path);

    if let Err(e) = fs::write(&temp_path, contents) {
        let _ = fs::remove_file(&temp_path);
        return Err(PhrasebookError::settings(format!("Could not write settings file: {e}")));
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(PhrasebookError::settings(format!("Could not write settings file: {e}")));
    }

    Ok(())
}

/// Best-effort owner-only permissions
///
/// POSIX mode bits do not exist on every platform, so failure only
/// produces a warning on stderr and never aborts the write.
fn restrict_permissions(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
            eprintln!("Warning: could not restrict permissions on {}: {e}", path.display());
        }
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
}
