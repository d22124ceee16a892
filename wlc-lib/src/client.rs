//! Signed, encrypted HTTP client for the verification service.
//!
//! Every call goes through the same pipeline:
//!
//! 1. serialize the parameter object to JSON (if the operation has one),
//! 2. seal it with AES-GCM and wrap it as `{"data": "<base64>"}`,
//! 3. build one [`QueryParams`] map (endpoint params, `appId`, `bizId`,
//!    `timestamps`) that feeds both the URL and the signer,
//! 4. sign `secret ‖ sorted params ‖ body` with SHA-256,
//! 5. send with the identity headers and decode the JSON reply whatever the
//!    HTTP status.
//!
//! Steps 1-4 produce a [`PreparedRequest`] which can be inspected without
//! touching the network.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};

use crate::config::{Credentials, Endpoints, WlcConfig};
use crate::crypto::EnvelopeCipher;
use crate::envelope::RequestEnvelope;
use crate::signing::{self, QueryParams, APP_ID, BIZ_ID, SIGN, TIMESTAMPS};
use crate::types::{CheckParam, CheckResult, LoginTraceParam, QueryResult, TraceBatchResult};
use crate::{Result, WlcError};

/// Query parameter carrying the subject identifier of a query call.
pub const AI_PARAM: &str = "ai";

/// Query parameter carrying the sandbox scenario code of a test-mode call.
pub const TEST_CODE_PARAM: &str = "code";

/// Content type header name.
pub const CONTENT_TYPE: &str = "Content-Type";

/// Content type of every request.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Production operations.
#[async_trait]
pub trait VerificationApi {
    /// Verify a real name against a national ID number.
    async fn check(&self, param: &CheckParam) -> Result<CheckResult>;

    /// Look up the outcome of an earlier check by its subject identifier.
    async fn query(&self, ai: &str) -> Result<QueryResult>;

    /// Report a batch of login/logout events.
    ///
    /// Per-event failures are reported on the acknowledgments, not as errors.
    async fn login_trace(&self, batch: &LoginTraceParam) -> Result<TraceBatchResult>;
}

/// Test-mode operations against the sandbox.
///
/// `code` selects the canned scenario the sandbox answers with.
#[async_trait]
pub trait SandboxApi {
    async fn check_test(&self, code: &str, param: &CheckParam) -> Result<CheckResult>;

    async fn query_test(&self, code: &str, ai: &str) -> Result<QueryResult>;

    async fn login_trace_test(
        &self,
        code: &str,
        batch: &LoginTraceParam,
    ) -> Result<TraceBatchResult>;
}

/// The three remote operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Check,
    Query,
    LoginTrace,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Query => "query",
            Self::LoginTrace => "login_trace",
        }
    }

    /// HTTP method used by the operation.
    pub fn method(&self) -> Method {
        match self {
            Self::Query => Method::GET,
            Self::Check | Self::LoginTrace => Method::POST,
        }
    }

    fn url<'a>(&self, endpoints: &'a Endpoints) -> &'a str {
        match self {
            Self::Check => &endpoints.check,
            Self::Query => &endpoints.query,
            Self::LoginTrace => &endpoints.login_trace,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built, signed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRequest {
    pub operation: Operation,
    pub method: Method,
    /// Endpoint URL without the query string.
    pub url: String,
    /// Query parameters, also the parameter part of the signature input.
    pub params: QueryParams,
    /// Millisecond timestamp, decimal.
    pub timestamp: String,
    /// Lowercase hex SHA-256 signature.
    pub signature: String,
    /// Envelope JSON, or empty when the operation sends no payload.
    pub body: String,
}

impl PreparedRequest {
    /// Header name/value pairs sent with the request.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let lookup = |key: &str| self.params.get(key).unwrap_or_default().to_string();
        vec![
            (APP_ID, lookup(APP_ID)),
            (BIZ_ID, lookup(BIZ_ID)),
            (TIMESTAMPS, self.timestamp.clone()),
            (SIGN, self.signature.clone()),
            (CONTENT_TYPE, JSON_CONTENT_TYPE.to_string()),
        ]
    }

    /// Parse the body back into its envelope, if there is one.
    pub fn envelope(&self) -> Result<Option<RequestEnvelope>> {
        if self.body.is_empty() {
            return Ok(None);
        }
        RequestEnvelope::from_body(&self.body).map(Some)
    }
}

/// Client for the verification service.
///
/// Cheap to share: credentials are immutable and the underlying
/// `reqwest::Client` is safe for concurrent use.
///
/// # Example
///
/// ```rust,ignore
/// use wlc_lib::prelude::*;
///
/// let config = WlcConfig::new(app_id, secret_hex, biz_id);
/// let client = WlcClient::new(config)?;
///
/// let result = client
///     .check(&CheckParam::new("100000000000000001", "某一一", "110000190101010001"))
///     .await?;
/// println!("pi={:?} status={:?}", result.pi, result.status);
/// ```
#[derive(Clone)]
pub struct WlcClient {
    credentials: Credentials,
    cipher: EnvelopeCipher,
    endpoints: Endpoints,
    sandbox_endpoints: Endpoints,
    timeout_secs: Option<u64>,
    http: reqwest::Client,
}

impl fmt::Debug for WlcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WlcClient")
            .field("credentials", &self.credentials)
            .field("cipher", &self.cipher)
            .field("endpoints", &self.endpoints)
            .field("sandbox_endpoints", &self.sandbox_endpoints)
            .finish()
    }
}

impl WlcClient {
    /// Create a client with its own HTTP transport.
    ///
    /// Fails if the shared secret is not hex or not an AES key length.
    pub fn new(config: WlcConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| WlcError::config("http_client", e.to_string()))?;

        let timeout_secs = config.timeout_secs;
        Self::from_parts(config, http, timeout_secs)
    }

    /// Create a client on top of a caller-supplied HTTP transport.
    ///
    /// `config.timeout_secs` is ignored; timeouts are whatever `http` was
    /// built with.
    pub fn with_http_client(config: WlcConfig, http: reqwest::Client) -> Result<Self> {
        Self::from_parts(config, http, None)
    }

    fn from_parts(
        config: WlcConfig,
        http: reqwest::Client,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let WlcConfig {
            credentials,
            endpoints,
            sandbox_endpoints,
            ..
        } = config;

        if credentials.app_id.is_empty() {
            return Err(WlcError::config("app_id", "cannot be empty"));
        }
        if credentials.biz_id.is_empty() {
            return Err(WlcError::config("biz_id", "cannot be empty"));
        }
        let cipher = EnvelopeCipher::from_hex_secret(&credentials.secret_key)?;

        tracing::debug!(
            app_id = %credentials.app_id,
            biz_id = %credentials.biz_id,
            key_bits = cipher.key_bits(),
            "verification client ready"
        );

        Ok(Self {
            credentials,
            cipher,
            endpoints,
            sandbox_endpoints,
            timeout_secs,
            http,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.credentials.app_id
    }

    pub fn biz_id(&self) -> &str {
        &self.credentials.biz_id
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn sandbox_endpoints(&self) -> &Endpoints {
        &self.sandbox_endpoints
    }

    /// The cipher keyed by this client's shared secret.
    pub fn cipher(&self) -> &EnvelopeCipher {
        &self.cipher
    }

    /// Build the signed request for a check call.
    pub fn prepare_check(&self, code: Option<&str>, param: &CheckParam) -> Result<PreparedRequest> {
        self.prepare(Operation::Check, code, QueryParams::new(), Some(param), now_millis())
    }

    /// Build the signed request for a query call.
    pub fn prepare_query(&self, code: Option<&str>, ai: &str) -> Result<PreparedRequest> {
        self.prepare(
            Operation::Query,
            code,
            QueryParams::new().with(AI_PARAM, ai),
            Option::<&()>::None,
            now_millis(),
        )
    }

    /// Build the signed request for a login trace call.
    pub fn prepare_login_trace(
        &self,
        code: Option<&str>,
        batch: &LoginTraceParam,
    ) -> Result<PreparedRequest> {
        self.prepare(
            Operation::LoginTrace,
            code,
            QueryParams::new(),
            Some(batch),
            now_millis(),
        )
    }

    /// Shared request builder. A scenario code routes the call to the
    /// sandbox and is signed like any other parameter.
    fn prepare<P: Serialize + ?Sized>(
        &self,
        operation: Operation,
        code: Option<&str>,
        mut params: QueryParams,
        payload: Option<&P>,
        timestamp_ms: i64,
    ) -> Result<PreparedRequest> {
        let body = match payload {
            Some(payload) => RequestEnvelope::seal(&self.cipher, payload)?.to_body()?,
            None => String::new(),
        };

        let endpoints = match code {
            Some(code) => {
                params.insert(TEST_CODE_PARAM, code);
                &self.sandbox_endpoints
            }
            None => &self.endpoints,
        };

        let timestamp = timestamp_ms.to_string();
        params.insert(APP_ID, self.credentials.app_id.as_str());
        params.insert(BIZ_ID, self.credentials.biz_id.as_str());
        params.insert(TIMESTAMPS, timestamp.as_str());

        let signature = signing::sign(&self.credentials.secret_key, &params, &body);

        Ok(PreparedRequest {
            operation,
            method: operation.method(),
            url: operation.url(endpoints).to_string(),
            params,
            timestamp,
            signature,
            body,
        })
    }

    /// Send a prepared request and decode the reply.
    ///
    /// The body is decoded whatever the HTTP status; the reply's own error
    /// fields carry the outcome.
    pub async fn send<T: DeserializeOwned>(&self, prepared: PreparedRequest) -> Result<T> {
        let operation = prepared.operation;
        let headers = prepared.headers();
        let body_len = prepared.body.len();

        let mut request = self
            .http
            .request(prepared.method, &prepared.url)
            .query(&prepared.params);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if !prepared.body.is_empty() {
            request = request.body(prepared.body);
        }

        tracing::debug!(
            %operation,
            url = %prepared.url,
            sandbox = prepared.params.get(TEST_CODE_PARAM).is_some(),
            body_len,
            "sending request"
        );

        let response = request
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(operation, &prepared.url, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                %operation,
                status = status.as_u16(),
                "non-success status, decoding reply anyway"
            );
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_reqwest_error(operation, &prepared.url, e))?;

        let reply = serde_json::from_slice(&bytes).map_err(|e| {
            WlcError::Decode(format!("{} reply (HTTP {}): {}", operation, status.as_u16(), e))
        })?;

        tracing::debug!(%operation, status = status.as_u16(), "reply decoded");
        Ok(reply)
    }

    fn map_reqwest_error(&self, operation: Operation, url: &str, e: reqwest::Error) -> WlcError {
        if e.is_timeout() {
            WlcError::ConnectionTimeout {
                operation: operation.to_string(),
                timeout_ms: self.timeout_secs.map(|secs| secs * 1000),
            }
        } else if e.is_connect() {
            WlcError::ConnectionFailed {
                target: url.to_string(),
                reason: e.to_string(),
            }
        } else {
            WlcError::Transport(format!("{} request failed: {}", operation, e))
        }
    }
}

#[async_trait]
impl VerificationApi for WlcClient {
    async fn check(&self, param: &CheckParam) -> Result<CheckResult> {
        let prepared = self.prepare_check(None, param)?;
        self.send(prepared).await
    }

    async fn query(&self, ai: &str) -> Result<QueryResult> {
        let prepared = self.prepare_query(None, ai)?;
        self.send(prepared).await
    }

    async fn login_trace(&self, batch: &LoginTraceParam) -> Result<TraceBatchResult> {
        let prepared = self.prepare_login_trace(None, batch)?;
        self.send(prepared).await
    }
}

#[async_trait]
impl SandboxApi for WlcClient {
    async fn check_test(&self, code: &str, param: &CheckParam) -> Result<CheckResult> {
        let prepared = self.prepare_check(Some(code), param)?;
        self.send(prepared).await
    }

    async fn query_test(&self, code: &str, ai: &str) -> Result<QueryResult> {
        let prepared = self.prepare_query(Some(code), ai)?;
        self.send(prepared).await
    }

    async fn login_trace_test(
        &self,
        code: &str,
        batch: &LoginTraceParam,
    ) -> Result<TraceBatchResult> {
        let prepared = self.prepare_login_trace(Some(code), batch)?;
        self.send(prepared).await
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP: &str = "a0298befcc6340dcac218d5016669df3";
    const SECRET: &str = "bbd3322487be9f3b2af1e7d1d3734f41";
    const BIZ: &str = "1101999999";

    fn client() -> WlcClient {
        WlcClient::new(WlcConfig::new(APP, SECRET, BIZ)).unwrap()
    }

    #[test]
    fn test_construction_rejects_bad_secret() {
        let err = WlcClient::new(WlcConfig::new(APP, "zz-not-hex", BIZ)).unwrap_err();
        assert!(matches!(err, WlcError::Config { ref field, .. } if field == "secret_key"));

        // valid hex, wrong key length
        let err = WlcClient::new(WlcConfig::new(APP, "00112233", BIZ)).unwrap_err();
        assert!(matches!(err, WlcError::Config { .. }));
    }

    #[test]
    fn test_construction_rejects_empty_ids() {
        assert!(WlcClient::new(WlcConfig::new("", SECRET, BIZ)).is_err());
        assert!(WlcClient::new(WlcConfig::new(APP, SECRET, "")).is_err());
    }

    #[test]
    fn test_prepare_is_deterministic_apart_from_nonce() {
        let client = client();
        let param = CheckParam::new("1", "n", "2");

        let a = client
            .prepare(Operation::Check, None, QueryParams::new(), Some(&param), 1_000)
            .unwrap();
        let b = client
            .prepare(Operation::Check, None, QueryParams::new(), Some(&param), 1_000)
            .unwrap();

        // fresh nonce per call
        assert_ne!(a.body, b.body);
        assert!(signing::verify(SECRET, &a.params, &a.body, &a.signature));
        assert!(signing::verify(SECRET, &b.params, &b.body, &b.signature));
        assert_eq!(a.params, b.params);
    }

    #[test]
    fn test_params_carry_identity_and_timestamp() {
        let prepared = client()
            .prepare(
                Operation::Query,
                None,
                QueryParams::new().with(AI_PARAM, "42"),
                Option::<&()>::None,
                1_584_949_895_758,
            )
            .unwrap();

        assert_eq!(prepared.params.get(APP_ID), Some(APP));
        assert_eq!(prepared.params.get(BIZ_ID), Some(BIZ));
        assert_eq!(prepared.params.get(TIMESTAMPS), Some("1584949895758"));
        assert_eq!(prepared.params.get(AI_PARAM), Some("42"));
        assert_eq!(prepared.timestamp, "1584949895758");
        assert!(prepared.body.is_empty());
        assert_eq!(prepared.method, Method::GET);
        assert_eq!(prepared.url, crate::config::QUERY_URL);
    }

    #[test]
    fn test_query_signature_covers_ai() {
        let client = client();
        let sign_for = |ai: &str| {
            client
                .prepare(
                    Operation::Query,
                    None,
                    QueryParams::new().with(AI_PARAM, ai),
                    Option::<&()>::None,
                    7,
                )
                .unwrap()
                .signature
        };

        assert_eq!(sign_for("100000000000000001"), sign_for("100000000000000001"));
        assert_ne!(sign_for("100000000000000001"), sign_for("200000000000000001"));
    }

    #[test]
    fn test_code_routes_to_sandbox_and_is_signed() {
        let client = client();
        let with_code = client.prepare_query(Some("abc"), "1").unwrap();

        assert_eq!(with_code.url, crate::config::SANDBOX_QUERY_URL);
        assert_eq!(with_code.params.get(TEST_CODE_PARAM), Some("abc"));
        assert!(signing::verify(
            SECRET,
            &with_code.params,
            &with_code.body,
            &with_code.signature
        ));

        let without: QueryParams = with_code
            .params
            .iter()
            .filter(|(k, _)| *k != TEST_CODE_PARAM)
            .collect();
        assert!(!signing::verify(SECRET, &without, "", &with_code.signature));
    }

    #[test]
    fn test_headers() {
        let prepared = client().prepare_check(None, &CheckParam::new("1", "n", "2")).unwrap();
        let headers = prepared.headers();

        assert!(headers.contains(&(APP_ID, APP.to_string())));
        assert!(headers.contains(&(BIZ_ID, BIZ.to_string())));
        assert!(headers.contains(&(SIGN, prepared.signature.clone())));
        assert!(headers.contains(&(CONTENT_TYPE, JSON_CONTENT_TYPE.to_string())));
        assert_eq!(prepared.method, Method::POST);
    }

    #[test]
    fn test_envelope_of_login_trace() {
        let client = client();
        let mut batch = LoginTraceParam::new();
        batch.add_guest_login("S", 1, "D");

        let prepared = client.prepare_login_trace(None, &batch).unwrap();
        let envelope = prepared.envelope().unwrap().unwrap();
        let decoded: LoginTraceParam = envelope.open(client.cipher()).unwrap();

        assert_eq!(decoded, batch);
    }

    #[test]
    fn test_timeout_only_tracked_for_owned_transport() {
        let config = WlcConfig::new(APP, SECRET, BIZ).with_timeout(3);

        let owned = WlcClient::new(config.clone()).unwrap();
        assert_eq!(owned.timeout_secs, Some(3));

        let external = WlcClient::with_http_client(config, reqwest::Client::new()).unwrap();
        assert_eq!(external.timeout_secs, None);
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let debug = format!("{:?}", client());
        assert!(!debug.contains(SECRET));
    }
}
