//! Client library for the online game anti-addiction verification service.
//!
//! The service exposes three operations:
//!
//! - **Check**: verify a player's real name against a national ID number
//! - **Query**: look up the outcome of an earlier check
//! - **LoginTrace**: report login/logout events for guests and verified users
//!
//! Every request payload is sealed with AES-GCM under the operator's shared
//! secret, wrapped as `{"data": "<base64>"}`, and signed with SHA-256 over the
//! secret, the sorted query parameters and the body. The same pipeline drives
//! the sandbox ("test mode") calls, which add a scenario `code` parameter.
//!
//! # Example
//!
//! ```ignore
//! use wlc_lib::prelude::*;
//!
//! let client = WlcClient::new(WlcConfig::new(app_id, secret_hex, biz_id))?;
//!
//! let mut batch = LoginTraceParam::new();
//! batch
//!     .add_guest_login("session-1", 1_700_000_000, "device-1")
//!     .add_user_logout("session-2", 1_700_000_100, pi);
//!
//! let reply = client.login_trace(&batch).await?;
//! for (event, ack) in reply.correlate(&batch) {
//!     println!("event {} -> {}", event.no, ack.map_or(-1, |a| a.errcode));
//! }
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod crypto;
pub mod envelope;
pub mod errors;
pub mod prelude;
pub mod signing;
pub mod types;

pub use client::{Operation, PreparedRequest, SandboxApi, VerificationApi, WlcClient};
pub use config::{Credentials, Endpoints, WlcConfig};
pub use context::{CallContext, CancelHandle};
pub use crypto::EnvelopeCipher;
pub use envelope::RequestEnvelope;
pub use errors::{WlcError, WlcErrorCode};
pub use signing::QueryParams;
pub use types::{
    BehaviorType, CheckParam, CheckResult, LoginTraceParam, QueryResult, RawStatus, SubjectType,
    TraceAck, TraceBatchResult, TraceEvent, VerificationResult, VerificationStatus,
};

/// Common result alias for verification client operations.
pub type Result<T> = std::result::Result<T, WlcError>;
