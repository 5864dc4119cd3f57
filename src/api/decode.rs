use axum::http::{header, HeaderMap};
use serde::Deserialize;

use crate::contracts::InputError;

/// Structured write body: `{"number": <int>}`.
#[derive(Debug, Deserialize)]
pub struct NumberRequest {
    pub number: i64,
}

/// Outcome of decoding one write request.
///
/// The path is chosen by the declared content type alone: a JSON request is
/// never retried as a query request, and vice versa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedNumber {
    /// Parsed from a JSON body.
    Body(i64),
    /// Parsed from the `number` query parameter.
    Query(i64),
    /// Rejected before reaching the store.
    Invalid(InputError),
}

impl DecodedNumber {
    /// Decodes one write request.
    ///
    /// `body` is the buffered request body, or the reason it could not be
    /// buffered. Only the JSON path looks at it; the query path reads the URL
    /// alone.
    pub fn decode(headers: &HeaderMap, query: Option<&str>, body: Result<&[u8], &str>) -> Self {
        if is_json_content_type(headers) {
            let body = match body {
                Ok(body) => body,
                Err(reason) => return Self::Invalid(InputError::InvalidBody(reason.to_string())),
            };
            match serde_json::from_slice::<NumberRequest>(body) {
                Ok(request) => Self::Body(request.number),
                Err(e) => Self::Invalid(InputError::InvalidBody(e.to_string())),
            }
        } else {
            match query_number(query) {
                None => Self::Invalid(InputError::MissingInput),
                Some(raw) => match raw.parse::<i64>() {
                    Ok(number) => Self::Query(number),
                    Err(_) => Self::Invalid(InputError::InvalidFormat(raw)),
                },
            }
        }
    }

    /// The parsed number, whichever path produced it.
    pub fn into_result(self) -> Result<i64, InputError> {
        match self {
            Self::Body(number) | Self::Query(number) => Ok(number),
            Self::Invalid(e) => Err(e),
        }
    }
}

/// Matches `application/json`, ignoring case and parameters such as charset.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|media_type| media_type.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// First non-empty `number` query parameter. An empty value counts as absent.
fn query_number(query: Option<&str>) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "number")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
