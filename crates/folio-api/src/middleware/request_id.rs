//! Ensures every request and response carries an `X-Request-ID`.
//!
//! A caller-supplied id is kept; otherwise one is generated and written
//! into the request headers so extractors and error envelopes see it.

use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use crate::extractors::client::{REQUEST_ID_HEADER, RequestId};

pub async fn request_id(mut request: Request, next: Next) -> Response {
    let id = RequestId::from_headers(request.headers()).unwrap_or_else(RequestId::generate);
    let header = HeaderName::from_static(REQUEST_ID_HEADER);
    let value = HeaderValue::from_str(&id).ok();

    if let Some(value) = &value {
        request.headers_mut().insert(header.clone(), value.clone());
    }

    let mut response = next.run(request).await;
    if let Some(value) = value {
        response.headers_mut().insert(header, value);
    }
    response
}
