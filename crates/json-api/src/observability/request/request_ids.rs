//! Request ids: accepted from the caller when sane, generated otherwise.

use salvo::{http::header::HeaderValue, prelude::Response};
use tracing::debug;
use uuid::Uuid;

pub(super) const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Keeps a caller-supplied id only if it is short printable ASCII, so it can
/// be echoed in a header and logged verbatim.
pub(super) fn accept_or_generate(incoming: Option<String>) -> String {
    match incoming {
        Some(id) if is_acceptable(&id) => id,
        Some(rejected) => {
            debug!(len = rejected.len(), "ignoring malformed request id");

            Uuid::now_v7().to_string()
        }
        None => Uuid::now_v7().to_string(),
    }
}

fn is_acceptable(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN && id.bytes().all(|b| b.is_ascii_graphic())
}

pub(super) fn echo(res: &mut Response, request_id: &str) {
    if let Ok(value) = HeaderValue::from_str(request_id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
}
