use std::fmt::{self, Debug};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue};
use sha2::Sha256;
use url::Url;
use uuid::Uuid;

use crate::API_ORIGIN;
use crate::api::{Command, Envelope};
use crate::error::{SwitchBotError, SwitchBotResult};

type HmacSha256 = Hmac<Sha256>;

/// Escapes the same characters as JavaScript's `encodeURIComponent`,
/// which is what the remote API documents for path segments.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Authenticated SwitchBot API client.
///
/// Stateless across calls: every request is signed with a fresh
/// timestamp/nonce pair, so a single instance can be shared freely.
pub struct SwitchBot {
    token: String,
    secret: String,
    http: reqwest::Client,
}

impl Debug for SwitchBot {
    /* credentials must never end up in logs */
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwitchBot").finish_non_exhaustive()
    }
}

impl SwitchBot {
    #[must_use]
    pub fn new(token: String, secret: String) -> Self {
        Self {
            token,
            secret,
            http: reqwest::Client::new(),
        }
    }

    /// List physical and virtual devices.
    pub async fn fetch_devices(&self) -> SwitchBotResult<Envelope> {
        self.request(Method::GET, "/v1.1/devices", None).await
    }

    /// Query the status of a physical device.
    pub async fn fetch_device_status(&self, device_id: &str) -> SwitchBotResult<Envelope> {
        let path = format!("/v1.1/devices/{}/status", encode_segment(device_id));
        self.request(Method::GET, &path, None).await
    }

    /// Send a control command to a physical or virtual device.
    pub async fn send_command(
        &self,
        device_id: &str,
        command: &Command,
    ) -> SwitchBotResult<Envelope> {
        let path = format!("/v1.1/devices/{}/commands", encode_segment(device_id));
        self.request(Method::POST, &path, Some(command)).await
    }

    /// List manual scenes.
    pub async fn fetch_scenes(&self) -> SwitchBotResult<Envelope> {
        self.request(Method::GET, "/v1.1/scenes", None).await
    }

    /// Execute a manual scene.
    pub async fn execute_scene(&self, scene_id: &str) -> SwitchBotResult<Envelope> {
        let path = format!("/v1.1/scenes/{}/execute", encode_segment(scene_id));
        self.request(Method::POST, &path, None).await
    }

    /// HMAC-SHA256 over `token ++ t ++ nonce`, keyed by the secret,
    /// base64-encoded. Must match the server's verification exactly.
    fn sign(&self, t: &str, nonce: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(self.token.as_bytes());
        mac.update(t.as_bytes());
        mac.update(nonce.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }

    /// Build the full header set for one request. The `t`/`nonce` pair is
    /// single-use; reusing a signature would open the API to replay.
    fn request_headers(
        &self,
        t: &str,
        nonce: &str,
        body_len: Option<usize>,
    ) -> SwitchBotResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&self.token)?);
        headers.insert("sign", HeaderValue::from_str(&self.sign(t, nonce))?);
        headers.insert("nonce", HeaderValue::from_str(nonce)?);
        headers.insert("t", HeaderValue::from_str(t)?);

        if let Some(len) = body_len {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/json; charset=utf8"),
            );
            headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
        }

        Ok(headers)
    }

    /// Single-attempt signed call. No retries, no backoff; the transport
    /// default timeout is the only one in play.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Command>,
    ) -> SwitchBotResult<Envelope> {
        let url = Url::parse(API_ORIGIN)?.join(path)?;

        let t = Utc::now().timestamp_millis().to_string();
        let nonce = Uuid::new_v4().to_string();

        let body = body.map(serde_json::to_vec).transpose()?;
        let headers = self.request_headers(&t, &nonce, body.as_ref().map(Vec::len))?;

        log::debug!("{method} {path}");

        let mut req = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            req = req.body(body);
        }

        let res = req.send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(SwitchBotError::Status(status));
        }

        let envelope: Envelope = serde_json::from_slice(&res.bytes().await?)?;
        envelope.into_result()
    }
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(token: &str, secret: &str) -> SwitchBot {
        SwitchBot::new(token.to_string(), secret.to_string())
    }

    #[test]
    fn signature_matches_known_vector() {
        let sb = client("token", "secret");
        assert_eq!(
            sb.sign("1700000000000", "nonce"),
            "Ho/pm1Q6hyf9kroxzCu/cSBo7lGKad4tesq6eb2CpUg="
        );
    }

    #[test]
    fn signature_depends_on_every_input() {
        let base = client("token", "secret").sign("1700000000000", "nonce");

        assert_eq!(
            client("tok2", "secret").sign("1700000000000", "nonce"),
            "lGic4DXcqGx897QmMHg3IGBZxEZmg8yxEQFXxIxrT0U="
        );
        assert_eq!(
            client("token", "sec2").sign("1700000000000", "nonce"),
            "PV8IM3x+9/rQqoM/X8B2VaU1asihyHsIQ0fsVtkAuQY="
        );
        assert_eq!(
            client("token", "secret").sign("1700000000001", "nonce"),
            "O7eGAma89apWspuVV6OmjxDEApcQf/xetkSHn5MSBFo="
        );
        assert_eq!(
            client("token", "secret").sign("1700000000000", "nonce2"),
            "vpgaOrmxbTv2Z2vbZIcqXjA8F6GM/fnTeUoKuVspHiw="
        );

        /* and it is deterministic */
        assert_eq!(client("token", "secret").sign("1700000000000", "nonce"), base);
    }

    #[test]
    fn headers_without_body() {
        let sb = client("token", "secret");
        let headers = sb.request_headers("1700000000000", "nonce", None).unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "token");
        assert_eq!(headers.get("t").unwrap(), "1700000000000");
        assert_eq!(headers.get("nonce").unwrap(), "nonce");
        assert_eq!(
            headers.get("sign").unwrap(),
            "Ho/pm1Q6hyf9kroxzCu/cSBo7lGKad4tesq6eb2CpUg="
        );
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert!(headers.get(CONTENT_LENGTH).is_none());
    }

    #[test]
    fn headers_with_body_carry_exact_length() {
        let sb = client("token", "secret");
        let body = serde_json::to_vec(&Command::new("turnOn".to_string())).unwrap();
        let headers = sb
            .request_headers("1700000000000", "nonce", Some(body.len()))
            .unwrap();

        assert_eq!(
            headers.get(CONTENT_TYPE).unwrap(),
            "application/json; charset=utf8"
        );
        assert_eq!(
            headers.get(CONTENT_LENGTH).unwrap(),
            body.len().to_string().as_str()
        );
    }

    #[test]
    fn path_segments_encode_like_encode_uri_component() {
        assert_eq!(encode_segment("scene-1_2.3~x"), "scene-1_2.3~x");
        assert_eq!(encode_segment("a/b c"), "a%2Fb%20c");
        assert_eq!(encode_segment("id+&="), "id%2B%26%3D");
    }

    #[test]
    fn debug_never_prints_credentials() {
        let sb = client("very-secret-token", "very-secret-key");
        let debug = format!("{sb:?}");
        assert!(!debug.contains("very-secret"));
    }
}
