//! Request parameters and decoded replies of the three service operations.
//!
//! Status codes and error codes are defined by the remote service and passed
//! through unchanged. Error codes are integers; verification status may arrive
//! as a number or a string.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Real-name verification
// ============================================================================

/// Real-name verification request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckParam {
    /// Subject identifier chosen by the operator; the key for later queries.
    pub ai: String,
    /// Legal name.
    pub name: String,
    /// National ID number.
    #[serde(rename = "idNum")]
    pub id_num: String,
}

impl CheckParam {
    pub fn new(ai: impl Into<String>, name: impl Into<String>, id_num: impl Into<String>) -> Self {
        Self {
            ai: ai.into(),
            name: name.into(),
            id_num: id_num.into(),
        }
    }
}

/// Verification status as reported by the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerificationStatus {
    /// Identity verified, `pi` is assigned.
    Verified,
    /// Verification still in progress; query again later.
    Pending,
    /// Verification failed.
    Failed,
    /// A code this client does not know about.
    Other(i64),
}

/// Verification status exactly as it appeared on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawStatus {
    Code(i64),
    Text(String),
}

impl RawStatus {
    /// Numeric value, parsing textual codes such as `"0"`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Code(code) => Some(*code),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for RawStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{}", code),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for VerificationStatus {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::Verified,
            1 => Self::Pending,
            2 => Self::Failed,
            other => Self::Other(other),
        }
    }
}

/// Decoded reply of a check or query call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "VerificationReply")]
pub struct VerificationResult {
    /// Service-level error code (0 on success).
    pub errcode: i64,
    /// Service-level error message.
    pub errmsg: String,
    /// Person identifier, present once verification succeeded.
    pub pi: Option<String>,
    /// Raw status, absent when the reply carries no result.
    pub status: Option<RawStatus>,
}

/// Reply of [`check`](crate::VerificationApi::check).
pub type CheckResult = VerificationResult;
/// Reply of [`query`](crate::VerificationApi::query).
pub type QueryResult = VerificationResult;

impl VerificationResult {
    /// True when the service accepted the call (`errcode == 0`).
    pub fn is_success(&self) -> bool {
        self.errcode == 0
    }

    /// Numeric status code, if the raw status has one.
    pub fn status_code(&self) -> Option<i64> {
        self.status.as_ref().and_then(RawStatus::as_i64)
    }

    /// Interpret the raw status code. None for non-numeric text.
    pub fn verification_status(&self) -> Option<VerificationStatus> {
        self.status_code().map(VerificationStatus::from)
    }
}

#[derive(Deserialize)]
struct VerificationReply {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
    data: Option<VerificationData>,
}

#[derive(Deserialize)]
struct VerificationData {
    result: Option<VerificationRecord>,
}

#[derive(Deserialize)]
struct VerificationRecord {
    status: Option<RawStatus>,
    pi: Option<String>,
}

impl From<VerificationReply> for VerificationResult {
    fn from(reply: VerificationReply) -> Self {
        let record = reply.data.and_then(|d| d.result);
        let (status, pi) = match record {
            Some(r) => (r.status, r.pi.filter(|pi| !pi.is_empty())),
            None => (None, None),
        };
        Self {
            errcode: reply.errcode,
            errmsg: reply.errmsg,
            pi,
            status,
        }
    }
}

// ============================================================================
// Login / logout trace reporting
// ============================================================================

/// Whether an event is a login or a logout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum BehaviorType {
    Logout = 0,
    Login = 1,
}

/// Who the event belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SubjectType {
    /// A verified user identified by `pi`.
    User = 0,
    /// A guest identified by device id.
    Guest = 2,
}

macro_rules! wire_u8 {
    ($ty:ident { $($code:literal => $variant:ident),+ $(,)? }) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u8(*self as u8)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                match u8::deserialize(deserializer)? {
                    $($code => Ok(Self::$variant),)+
                    other => Err(de::Error::custom(format!(
                        concat!("unknown ", stringify!($ty), " {}"),
                        other
                    ))),
                }
            }
        }
    };
}

wire_u8!(BehaviorType { 0 => Logout, 1 => Login });
wire_u8!(SubjectType { 0 => User, 2 => Guest });

/// A single login or logout record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// 1-based position inside the batch; acknowledgments refer to it.
    pub no: u32,
    /// Game session identifier.
    #[serde(rename = "si")]
    pub session_id: String,
    #[serde(rename = "bt")]
    pub behavior: BehaviorType,
    /// Unix timestamp in seconds.
    #[serde(rename = "ot")]
    pub occurred_at: i64,
    #[serde(rename = "ct")]
    pub subject: SubjectType,
    /// Device identifier, guests only.
    #[serde(rename = "di", default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Person identifier, verified users only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pi: Option<String>,
}

/// Ordered batch of trace events sent in one call.
///
/// Events are numbered in insertion order starting from 1.
///
/// # Example
///
/// ```
/// use wlc_lib::LoginTraceParam;
///
/// let mut batch = LoginTraceParam::new();
/// batch
///     .add_guest_login("session-1", 1_600_000_000, "device-1")
///     .add_user_logout("session-2", 1_600_000_100, "1fffbjzos82bs9cnyj1dna7d6d29zg4esnh99u");
///
/// assert_eq!(batch.len(), 2);
/// assert_eq!(batch.events()[1].no, 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginTraceParam {
    collections: Vec<TraceEvent>,
}

impl LoginTraceParam {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a guest login.
    pub fn add_guest_login(
        &mut self,
        session_id: impl Into<String>,
        timestamp: i64,
        device_id: impl Into<String>,
    ) -> &mut Self {
        self.push_guest(BehaviorType::Login, session_id.into(), timestamp, device_id.into())
    }

    /// Record a guest logout.
    pub fn add_guest_logout(
        &mut self,
        session_id: impl Into<String>,
        timestamp: i64,
        device_id: impl Into<String>,
    ) -> &mut Self {
        self.push_guest(BehaviorType::Logout, session_id.into(), timestamp, device_id.into())
    }

    /// Record a verified user login.
    pub fn add_user_login(
        &mut self,
        session_id: impl Into<String>,
        timestamp: i64,
        pi: impl Into<String>,
    ) -> &mut Self {
        self.push_user(BehaviorType::Login, session_id.into(), timestamp, pi.into())
    }

    /// Record a verified user logout.
    pub fn add_user_logout(
        &mut self,
        session_id: impl Into<String>,
        timestamp: i64,
        pi: impl Into<String>,
    ) -> &mut Self {
        self.push_user(BehaviorType::Logout, session_id.into(), timestamp, pi.into())
    }

    fn push_guest(
        &mut self,
        behavior: BehaviorType,
        session_id: String,
        occurred_at: i64,
        device_id: String,
    ) -> &mut Self {
        self.collections.push(TraceEvent {
            no: self.next_no(),
            session_id,
            behavior,
            occurred_at,
            subject: SubjectType::Guest,
            device_id: Some(device_id),
            pi: None,
        });
        self
    }

    fn push_user(
        &mut self,
        behavior: BehaviorType,
        session_id: String,
        occurred_at: i64,
        pi: String,
    ) -> &mut Self {
        self.collections.push(TraceEvent {
            no: self.next_no(),
            session_id,
            behavior,
            occurred_at,
            subject: SubjectType::User,
            device_id: None,
            pi: Some(pi),
        });
        self
    }

    fn next_no(&self) -> u32 {
        self.collections.len() as u32 + 1
    }

    /// Events in submission order.
    pub fn events(&self) -> &[TraceEvent] {
        &self.collections
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

/// Per-event acknowledgment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceAck {
    /// Sequence number of the acknowledged event.
    #[serde(default)]
    pub no: u32,
    #[serde(default)]
    pub errcode: i64,
    /// Empty on success.
    #[serde(default)]
    pub errmsg: String,
}

impl TraceAck {
    pub fn is_ok(&self) -> bool {
        self.errcode == 0
    }
}

/// Decoded reply of a login trace call.
///
/// A failed acknowledgment does not fail the call; inspect each entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "TraceReply")]
pub struct TraceBatchResult {
    /// Service-level error code (0 on success).
    pub errcode: i64,
    /// Service-level error message.
    pub errmsg: String,
    /// Acknowledgments in the order the service returned them.
    pub results: Vec<TraceAck>,
}

impl TraceBatchResult {
    pub fn is_success(&self) -> bool {
        self.errcode == 0
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceAck> {
        self.results.iter()
    }

    /// Acknowledgments carrying a non-zero error code.
    pub fn failures(&self) -> impl Iterator<Item = &TraceAck> {
        self.results.iter().filter(|ack| !ack.is_ok())
    }

    /// Find the acknowledgment for sequence number `no`.
    pub fn ack_for(&self, no: u32) -> Option<&TraceAck> {
        self.results.iter().find(|ack| ack.no == no)
    }

    /// Pair every submitted event with its acknowledgment, in submission order.
    pub fn correlate<'a>(
        &'a self,
        batch: &'a LoginTraceParam,
    ) -> Vec<(&'a TraceEvent, Option<&'a TraceAck>)> {
        batch
            .events()
            .iter()
            .map(|event| (event, self.ack_for(event.no)))
            .collect()
    }
}

impl<'a> IntoIterator for &'a TraceBatchResult {
    type Item = &'a TraceAck;
    type IntoIter = std::slice::Iter<'a, TraceAck>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Deserialize)]
struct TraceReply {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
    data: Option<TraceData>,
}

#[derive(Deserialize)]
struct TraceData {
    #[serde(default)]
    results: Vec<TraceAck>,
}

impl From<TraceReply> for TraceBatchResult {
    fn from(reply: TraceReply) -> Self {
        Self {
            errcode: reply.errcode,
            errmsg: reply.errmsg,
            results: reply.data.map(|d| d.results).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_param_wire_names() {
        let param = CheckParam::new("100000000000000001", "某一一", "110000190101010001");
        assert_eq!(
            serde_json::to_value(&param).unwrap(),
            json!({"ai": "100000000000000001", "name": "某一一", "idNum": "110000190101010001"})
        );
    }

    #[test]
    fn test_verification_reply_decoding() {
        let result: VerificationResult = serde_json::from_value(json!({
            "errcode": 0,
            "errmsg": "OK",
            "data": {"result": {"status": 0, "pi": "1fffbjzos82bs9cnyj1dna7d6d29zg4esnh99u"}}
        }))
        .unwrap();

        assert!(result.is_success());
        assert_eq!(result.pi.as_deref(), Some("1fffbjzos82bs9cnyj1dna7d6d29zg4esnh99u"));
        assert_eq!(result.verification_status(), Some(VerificationStatus::Verified));
    }

    #[test]
    fn test_verification_reply_without_data() {
        let result: VerificationResult =
            serde_json::from_value(json!({"errcode": 1001, "errmsg": "SYS ERROR"})).unwrap();

        assert!(!result.is_success());
        assert_eq!(result.errmsg, "SYS ERROR");
        assert_eq!(result.status, None);
        assert_eq!(result.pi, None);
    }

    #[test]
    fn test_unknown_status_passes_through() {
        let result: VerificationResult =
            serde_json::from_value(json!({"data": {"result": {"status": 7, "pi": ""}}})).unwrap();

        assert_eq!(result.status, Some(RawStatus::Code(7)));
        assert_eq!(result.verification_status(), Some(VerificationStatus::Other(7)));
        assert_eq!(result.pi, None);
    }

    #[test]
    fn test_string_status_is_accepted() {
        let result: VerificationResult = serde_json::from_value(json!({
            "errcode": 0,
            "errmsg": "OK",
            "data": {"result": {"status": "1", "pi": ""}}
        }))
        .unwrap();

        assert_eq!(result.status, Some(RawStatus::Text("1".to_string())));
        assert_eq!(result.status_code(), Some(1));
        assert_eq!(result.verification_status(), Some(VerificationStatus::Pending));
    }

    #[test]
    fn test_non_numeric_status_passes_through() {
        let result: VerificationResult =
            serde_json::from_value(json!({"data": {"result": {"status": "unknown"}}})).unwrap();

        assert_eq!(result.status.as_ref().map(ToString::to_string).as_deref(), Some("unknown"));
        assert_eq!(result.status_code(), None);
        assert_eq!(result.verification_status(), None);
    }

    #[test]
    fn test_trace_batch_numbering_and_wire_format() {
        let mut batch = LoginTraceParam::new();
        batch
            .add_guest_login("S", 100, "D")
            .add_user_logout("S2", 200, "P");

        assert_eq!(
            serde_json::to_value(&batch).unwrap(),
            json!({"collections": [
                {"no": 1, "si": "S", "bt": 1, "ot": 100, "ct": 2, "di": "D"},
                {"no": 2, "si": "S2", "bt": 0, "ot": 200, "ct": 0, "pi": "P"}
            ]})
        );
    }

    #[test]
    fn test_trace_event_rejects_unknown_codes() {
        let err = serde_json::from_value::<TraceEvent>(json!(
            {"no": 1, "si": "S", "bt": 5, "ot": 1, "ct": 2}
        ))
        .unwrap_err();
        assert!(err.to_string().contains("BehaviorType"));
    }

    #[test]
    fn test_trace_reply_decoding_and_correlation() {
        let mut batch = LoginTraceParam::new();
        batch.add_guest_login("S", 1, "D").add_user_login("S2", 2, "P");

        let result: TraceBatchResult = serde_json::from_value(json!({
            "errcode": 0,
            "errmsg": "OK",
            "data": {"results": [
                {"no": 1, "errcode": 0, "errmsg": ""},
                {"no": 2, "errcode": 2003, "errmsg": "PI not found"}
            ]}
        }))
        .unwrap();

        assert!(result.is_success());
        assert_eq!(result.len(), 2);
        assert_eq!(result.failures().count(), 1);

        let pairs = result.correlate(&batch);
        assert_eq!(pairs[0].0.session_id, "S");
        assert!(pairs[0].1.unwrap().is_ok());
        assert_eq!(pairs[1].1.unwrap().errmsg, "PI not found");
    }

    #[test]
    fn test_trace_reply_without_results() {
        let result: TraceBatchResult = serde_json::from_value(json!({"errcode": 1002})).unwrap();
        assert!(!result.is_success());
        assert!(result.is_empty());
    }
}
