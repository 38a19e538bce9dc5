//! Login challenge artifacts

use crate::errors::{LoginError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the user must act on to complete a login: a QR code image plus the
/// handles needed to poll for its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginChallenge {
    /// Base64-encoded PNG
    pub image: String,
    pub client: String,
    pub login_signin_url: String,
    pub qrid: String,
}

impl LoginChallenge {
    /// Extract the challenge from a `generate_qr` payload
    pub(crate) fn from_payload(payload: &Value) -> Result<Self> {
        let field = |name: &'static str| {
            payload
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .ok_or(LoginError::MalformedChallenge { field: name })
        };
        Ok(Self {
            image: field("image")?,
            client: field("client")?,
            login_signin_url: field("login_signin_url")?,
            qrid: field("qrid")?,
        })
    }

    /// Decoded PNG bytes
    pub fn image_png(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.image.trim())
            .map_err(LoginError::InvalidImage)
    }
}
