//! Client configuration.
//!
//! # Environment Variables
//!
//! [`WlcConfig::from_env`] reads:
//! - `WLC_APP_ID` - application id
//! - `WLC_SECRET_KEY` - shared secret, hex encoded
//! - `WLC_BIZ_ID` - business/operator id
//! - `WLC_BASE_URL` - optional, points production and sandbox endpoints at one base URL
//! - `WLC_TIMEOUT` - optional, transport timeout in seconds

use serde::{Deserialize, Serialize};

/// Production real-name verification endpoint.
pub const CHECK_URL: &str = "https://api.wlc.nppa.gov.cn/idcard/authentication/check";
/// Production verification result query endpoint.
pub const QUERY_URL: &str = "http://api2.wlc.nppa.gov.cn/idcard/authentication/query";
/// Production login/logout reporting endpoint.
pub const LOGIN_TRACE_URL: &str = "http://api2.wlc.nppa.gov.cn/behavior/collection/loginout";

/// Sandbox real-name verification endpoint.
pub const SANDBOX_CHECK_URL: &str = "https://wlc.nppa.gov.cn/test/authentication/check";
/// Sandbox verification result query endpoint.
pub const SANDBOX_QUERY_URL: &str = "https://wlc.nppa.gov.cn/test/authentication/query";
/// Sandbox login/logout reporting endpoint.
pub const SANDBOX_LOGIN_TRACE_URL: &str = "https://wlc.nppa.gov.cn/test/collection/loginout";

/// Identity of the calling operator.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Application id issued by the service.
    pub app_id: String,

    /// Shared secret (hex). Used verbatim for signing and hex-decoded as the
    /// AES key.
    pub secret_key: String,

    /// Business/operator id.
    pub biz_id: String,
}

impl Credentials {
    pub fn new(
        app_id: impl Into<String>,
        secret_key: impl Into<String>,
        biz_id: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            secret_key: secret_key.into(),
            biz_id: biz_id.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("secret_key", &"<redacted>")
            .field("biz_id", &self.biz_id)
            .finish()
    }
}

/// URLs of the three service operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub check: String,
    pub query: String,
    pub login_trace: String,
}

impl Endpoints {
    /// Production service.
    pub fn production() -> Self {
        Self {
            check: CHECK_URL.to_string(),
            query: QUERY_URL.to_string(),
            login_trace: LOGIN_TRACE_URL.to_string(),
        }
    }

    /// Public sandbox used by the test-mode operations.
    pub fn sandbox() -> Self {
        Self {
            check: SANDBOX_CHECK_URL.to_string(),
            query: SANDBOX_QUERY_URL.to_string(),
            login_trace: SANDBOX_LOGIN_TRACE_URL.to_string(),
        }
    }

    /// Serve all operations from one base URL, keeping the production paths.
    ///
    /// Useful for mock servers and forwarding proxies.
    pub fn with_base(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            check: format!("{}/idcard/authentication/check", base),
            query: format!("{}/idcard/authentication/query", base),
            login_trace: format!("{}/behavior/collection/loginout", base),
        }
    }

    /// Sandbox paths under one base URL.
    pub fn sandbox_with_base(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            check: format!("{}/test/authentication/check", base),
            query: format!("{}/test/authentication/query", base),
            login_trace: format!("{}/test/collection/loginout", base),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::production()
    }
}

/// Configuration for [`WlcClient`](crate::WlcClient).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WlcConfig {
    pub credentials: Credentials,

    /// Endpoints used by the production operations.
    #[serde(default = "Endpoints::production")]
    pub endpoints: Endpoints,

    /// Endpoints used by the test-mode operations.
    #[serde(default = "Endpoints::sandbox")]
    pub sandbox_endpoints: Endpoints,

    /// Transport timeout in seconds. None means no client-side timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl WlcConfig {
    /// Create a configuration targeting the production and public sandbox
    /// endpoints.
    pub fn new(
        app_id: impl Into<String>,
        secret_key: impl Into<String>,
        biz_id: impl Into<String>,
    ) -> Self {
        Self::from_credentials(Credentials::new(app_id, secret_key, biz_id))
    }

    pub fn from_credentials(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoints: Endpoints::production(),
            sandbox_endpoints: Endpoints::sandbox(),
            timeout_secs: None,
        }
    }

    /// Set the production endpoints.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the sandbox endpoints.
    pub fn with_sandbox_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.sandbox_endpoints = endpoints;
        self
    }

    /// Point both production and sandbox endpoints at one base URL.
    pub fn with_base_url(self, base_url: &str) -> Self {
        self.with_endpoints(Endpoints::with_base(base_url))
            .with_sandbox_endpoints(Endpoints::sandbox_with_base(base_url))
    }

    /// Set the transport timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Load configuration from `WLC_*` environment variables.
    ///
    /// Returns None unless app id, secret and business id are all set.
    pub fn from_env() -> Option<Self> {
        let app_id = std::env::var("WLC_APP_ID").ok()?;
        let secret_key = std::env::var("WLC_SECRET_KEY").ok()?;
        let biz_id = std::env::var("WLC_BIZ_ID").ok()?;

        let mut config = Self::new(app_id, secret_key, biz_id);

        if let Ok(base_url) = std::env::var("WLC_BASE_URL") {
            config = config.with_base_url(&base_url);
        }

        if let Ok(timeout) = std::env::var("WLC_TIMEOUT") {
            if let Ok(secs) = timeout.parse::<u64>() {
                config = config.with_timeout(secs);
            }
        }

        Some(config)
    }
}
