//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use wlc_lib::prelude::*;
//! ```
//!
//! ## What's Included
//!
//! - Client: `WlcClient`, `VerificationApi`, `SandboxApi`
//! - Configuration: `WlcConfig`, `Credentials`, `Endpoints`
//! - Parameters and replies: `CheckParam`, `LoginTraceParam`, `VerificationResult`,
//!   `TraceBatchResult`
//! - Error types: `WlcError`, `WlcErrorCode`, `Result`

// Client and capability traits
pub use crate::client::{SandboxApi, VerificationApi, WlcClient};

// Configuration
pub use crate::config::{Credentials, Endpoints, WlcConfig};

// Cancellation
pub use crate::context::{CallContext, CancelHandle};

// Error handling
pub use crate::errors::{WlcError, WlcErrorCode};
pub use crate::Result;

// Parameters and replies
pub use crate::types::{
    CheckParam, CheckResult, LoginTraceParam, QueryResult, TraceAck, TraceBatchResult,
    VerificationResult, VerificationStatus,
};
