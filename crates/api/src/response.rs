//! Shared response envelope for API handlers.
//!
//! Every JSON response except the rule export uses a `{ "data": ... }`
//! envelope. Handlers return typed payloads through [`DataResponse`] rather
//! than building the envelope with `json!`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
