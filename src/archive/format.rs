//! On-disk archive shape.
//!
//! The file is gzip-compressed JSON shared with an external record/replay
//! engine:
//!
//! ```text
//! {
//!   "Requests": { host: { url: [ {SerializedRequest, SerializedResponse,
//!                                 LastServedSessionId}, ... ] } },
//!   "Certs": <opaque>,
//!   "NegotiatedProtocol": <opaque>,
//!   "DeterministicTimeSeedMs": int,
//!   "ServeResponseInChronologicalSequence": bool,
//!   "CurrentSessionId": int,
//!   "DisableFuzzyURLMatching": bool
//! }
//! ```
//!
//! # Design Decisions
//! - Typed fields make serde reject any primitive-type mismatch at load
//! - `IndexMap` keeps host and URL groups in file order, so an unedited
//!   archive is written back in the order it was read

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One stored exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RequestRecord {
    pub serialized_request: String,
    pub serialized_response: String,
    pub last_served_session_id: i64,
}

/// host → URL → records in capture order.
pub(crate) type RequestsByHost = IndexMap<String, IndexMap<String, Vec<RequestRecord>>>;

/// The complete file body.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ArchiveFile {
    pub requests: RequestsByHost,
    #[serde(flatten)]
    pub metadata: SessionMetadata,
}

/// Passthrough session fields; carried verbatim, never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionMetadata {
    pub certs: Value,
    pub negotiated_protocol: Value,
    pub deterministic_time_seed_ms: i64,
    pub serve_response_in_chronological_sequence: bool,
    pub current_session_id: i64,
    #[serde(rename = "DisableFuzzyURLMatching")]
    pub disable_fuzzy_url_matching: bool,
}

impl Default for SessionMetadata {
    fn default() -> Self {
        Self {
            certs: Value::Object(Default::default()),
            negotiated_protocol: Value::Object(Default::default()),
            deterministic_time_seed_ms: 0,
            serve_response_in_chronological_sequence: false,
            current_session_id: 0,
            disable_fuzzy_url_matching: false,
        }
    }
}
