//! Request headers for both upstream API generations
//!
//! v1 is a plain bearer-token API. v2 is the web client's session API and only
//! answers requests that look like they come from that client, so it gets a
//! browser user agent and an `x-device` blob next to the session cookie.

use std::sync::OnceLock;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, COOKIE, USER_AGENT};

use crate::error::{ApiVersion, DidaError, DidaResult};
use crate::session::Credentials;

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:123.0) Gecko/20100101 Firefox/123.0";

const X_DEVICE: HeaderName = HeaderName::from_static("x-device");
const DEVICE_ID_PREFIX: &str = "6490";
const DEVICE_ID_RANDOM_LEN: usize = 20;

/// Browser identity presented to the v2 API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFingerprint {
    pub user_agent: String,
    pub x_device: String,
}

impl DeviceFingerprint {
    /// Build a fingerprint around a given device id
    pub fn with_device_id(device_id: &str) -> Self {
        let x_device = serde_json::json!({
            "platform": "web",
            "os": "OS X",
            "device": "Firefox 123.0",
            "name": "unofficial api!",
            "version": 4531,
            "id": device_id,
            "channel": "website",
            "campaign": "",
            "websocket": "",
        })
        .to_string();

        Self {
            user_agent: BROWSER_USER_AGENT.to_string(),
            x_device,
        }
    }

    /// Fresh fingerprint with 20 random hex characters in the device id
    pub fn generate() -> Self {
        let random = uuid::Uuid::new_v4().simple().to_string();
        let device_id = format!("{}{}", DEVICE_ID_PREFIX, &random[..DEVICE_ID_RANDOM_LEN]);
        Self::with_device_id(&device_id)
    }

    /// The fingerprint for this process, generated on first use
    pub fn process() -> &'static DeviceFingerprint {
        static FINGERPRINT: OnceLock<DeviceFingerprint> = OnceLock::new();
        FINGERPRINT.get_or_init(Self::generate)
    }
}

/// Headers for the v1 open API
pub fn v1_headers(creds: &Credentials) -> DidaResult<HeaderMap> {
    let token = creds
        .v1_token
        .as_deref()
        .ok_or(DidaError::AuthAbsent(ApiVersion::V1))?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", token))?);
    Ok(headers)
}

/// Headers for the v2 web API
pub fn v2_headers(fingerprint: &DeviceFingerprint, creds: &Credentials) -> DidaResult<HeaderMap> {
    let token = creds
        .v2_token
        .as_deref()
        .ok_or(DidaError::AuthAbsent(ApiVersion::V2))?;

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value(&fingerprint.user_agent)?);
    headers.insert(X_DEVICE, header_value(&fingerprint.x_device)?);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(COOKIE, header_value(&format!("t={}", token))?);
    Ok(headers)
}

/// Session-cookie headers built from the v1 token
///
/// Used for batch-check lookups when no v2 token is configured.
pub fn v1_cookie_headers(creds: &Credentials) -> DidaResult<HeaderMap> {
    let token = creds
        .v1_token
        .as_deref()
        .ok_or(DidaError::AuthAbsent(ApiVersion::V1))?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(COOKIE, header_value(&format!("t={}", token))?);
    Ok(headers)
}

fn header_value(value: &str) -> DidaResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| DidaError::InvalidParams(format!("token is not a valid header value: {}", e)))
}
