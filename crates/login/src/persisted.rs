//! Credentials the login worker persists between runs
//!
//! After a successful login the worker rewrites its TOML configuration
//! with a `[cookies]` table and a `[cookies_info]` table carrying
//! `update_time`. Every other section of that file is ignored here.

use crate::errors::CredentialFileError;
use crate::session::Credentials;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    cookies: Map<String, Value>,
    #[serde(default)]
    cookies_info: CookiesInfo,
}

#[derive(Debug, Default, Deserialize)]
struct CookiesInfo {
    #[serde(default)]
    update_time: Option<String>,
}

/// Read the most recently persisted credentials.
///
/// A missing file, a missing `[cookies]` table and an empty one all mean
/// no login has been persisted yet and yield `Ok(None)`.
pub async fn read_persisted_credentials(path: &Path) -> Result<Option<Credentials>, CredentialFileError> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no persisted credentials");
            return Ok(None);
        }
        Err(e) => return Err(crawlgate_core::Error::file_system(path, "read", e).into()),
    };

    let file: CredentialFile = toml::from_str(&text).map_err(|source| CredentialFileError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    if file.cookies.is_empty() {
        return Ok(None);
    }
    Ok(Some(Credentials {
        cookies: Value::Object(file.cookies),
        update_time: file.cookies_info.update_time,
    }))
}
