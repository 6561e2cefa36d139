// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Decoding of Firefly III response envelopes.
//!
//! Every non-paginated endpoint answers with one of two shapes:
//!
//! - `{"data": ...}` on success, where `data` holds the payload
//! - `{"message": ..., "exception": ...}` on failure
//!
//! [`decode`] dispatches on that closed set and deserializes the payload
//! into the caller's expected type. Paginated list endpoints add a
//! `links.next` URL to each page; [`Paginated`] walks those links as a
//! pull-driven iterator, one page in memory at a time.

use crate::client::FireflyClient;
use crate::error::ApiError;
use reqwest::blocking::Response;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// The two response envelopes the API is known to produce.
///
/// Variant order matters: a body carrying `message` and `exception` is an
/// error even if other keys are present, so `Failure` is tried first.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope {
    Failure { exception: String, message: String },
    Success { data: Value },
}

/// Decodes a response body that has already been read into a string.
///
/// # Errors
///
/// - [`ApiError::Format`] if the body is not JSON or matches neither
///   envelope; the raw body is carried in the error.
/// - [`ApiError::Api`] if the body is a structured error envelope.
/// - [`ApiError::Validation`] if the `data` payload does not deserialize
///   into `T`.
pub fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: Value =
        serde_json::from_str(body).map_err(|_| ApiError::Format(body.to_owned()))?;
    decode_value(&value)
}

/// Reads a response to completion and decodes its envelope.
///
/// # Errors
///
/// [`ApiError::Transport`] if reading the body fails, otherwise as
/// [`decode_body`].
pub fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.text()?;
    decode_body(&body)
}

fn decode_value<T: DeserializeOwned>(value: &Value) -> Result<T, ApiError> {
    match Envelope::deserialize(value) {
        Ok(Envelope::Failure { exception, message }) => Err(ApiError::Api { exception, message }),
        Ok(Envelope::Success { data }) => {
            serde_json::from_value(data).map_err(ApiError::Validation)
        }
        Err(_) => Err(ApiError::Format(value.to_string())),
    }
}

/// One decoded page of a list response: the items plus the link to the next
/// page, if any.
struct Page<T> {
    items: std::vec::IntoIter<T>,
    next: Option<String>,
}

impl<T: DeserializeOwned> Page<T> {
    fn from_body(body: &str) -> Result<Self, ApiError> {
        let value: Value =
            serde_json::from_str(body).map_err(|_| ApiError::Format(body.to_owned()))?;
        let items: Vec<T> = decode_value(&value)?;
        let next = value
            .get("links")
            .and_then(|links| links.get("next"))
            .and_then(Value::as_str)
            .map(str::to_owned);
        Ok(Self {
            items: items.into_iter(),
            next,
        })
    }
}

/// Lazy iterator over every item of every page of a paginated list response.
///
/// Items are yielded strictly in page order, then intra-page order. The next
/// page is only requested once the current page's items have all been
/// consumed; nothing is prefetched or buffered beyond the current page. The
/// sequence is finite and non-restartable, and fuses after the first error.
pub struct Paginated<'a, T> {
    client: &'a FireflyClient,
    page: Page<T>,
    done: bool,
}

impl<'a, T: DeserializeOwned> Paginated<'a, T> {
    /// Starts the walk from an already-issued first response.
    ///
    /// # Errors
    ///
    /// Fails like [`decode`] if the first page cannot be read or decoded.
    pub fn new(client: &'a FireflyClient, response: Response) -> Result<Self, ApiError> {
        let body = response.text()?;
        Ok(Self {
            client,
            page: Page::from_body(&body)?,
            done: false,
        })
    }

    /// Fetches the next page, if there is one. Returns `false` when the last
    /// page has been consumed.
    fn advance(&mut self) -> Result<bool, ApiError> {
        let Some(next) = self.page.next.take() else {
            return Ok(false);
        };
        let body = self.client.get(&next)?.text()?;
        self.page = Page::from_body(&body)?;
        Ok(true)
    }
}

impl<T: DeserializeOwned> Iterator for Paginated<'_, T> {
    type Item = Result<T, ApiError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some(item) = self.page.items.next() {
                return Some(Ok(item));
            }
            match self.advance() {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        name: String,
    }

    #[test]
    fn success_envelope_returns_data_unchanged() {
        let decoded: Named = decode_body(r#"{"data": {"name": "acme"}}"#).unwrap();
        assert_eq!(decoded, Named { name: "acme".to_string() });
    }

    #[test]
    fn success_envelope_with_extra_keys_still_decodes() {
        let decoded: Vec<i64> = decode_body(r#"{"data": [1, 2, 3], "meta": {}}"#).unwrap();
        assert_eq!(decoded, vec![1, 2, 3]);
    }

    #[test]
    fn error_envelope_combines_exception_and_message() {
        let result: Result<Named, _> =
            decode_body(r#"{"message": "Resource not found", "exception": "NotFoundHttpException"}"#);
        let error = result.unwrap_err();
        assert!(matches!(error, ApiError::Api { .. }));
        assert_eq!(error.to_string(), "NotFoundHttpException: Resource not found");
    }

    #[test]
    fn mismatched_payload_is_a_validation_error() {
        let result: Result<Vec<i64>, _> = decode_body(r#"{"data": {"name": "acme"}}"#);
        assert!(matches!(result.unwrap_err(), ApiError::Validation(_)));
    }

    #[test]
    fn non_json_body_is_a_format_error() {
        let result: Result<Named, _> = decode_body("<html>maintenance</html>");
        match result.unwrap_err() {
            ApiError::Format(body) => assert_eq!(body, "<html>maintenance</html>"),
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_envelope_is_a_format_error() {
        let result: Result<Named, _> = decode_body(r#"{"status": "ok"}"#);
        assert!(matches!(result.unwrap_err(), ApiError::Format(_)));
    }

    #[test]
    fn error_envelope_wins_over_data_key() {
        // Matches the dispatch order: message + exception marks a failure
        // even if a data key is also present.
        let result: Result<Value, _> = decode_body(
            r#"{"data": null, "message": "boom", "exception": "ServerError"}"#,
        );
        assert_eq!(result.unwrap_err().to_string(), "ServerError: boom");
    }

    #[test]
    fn single_page_iterates_without_further_requests() {
        // A page without links.next never touches the client, so a session
        // pointing nowhere is safe here.
        let client = FireflyClient::new("http://localhost:1/", "token").unwrap();
        let page = Page::from_body(r#"{"data": [10, 20, 30]}"#).unwrap();
        let items: Vec<i64> = Paginated { client: &client, page, done: false }
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(items, vec![10, 20, 30]);
    }

    #[test]
    fn null_next_link_ends_the_sequence() {
        let page: Page<i64> =
            Page::from_body(r#"{"data": [1], "links": {"next": null}}"#).unwrap();
        assert!(page.next.is_none());
    }

    #[test]
    fn next_link_is_extracted_from_the_raw_body() {
        let page: Page<i64> =
            Page::from_body(r#"{"data": [1], "links": {"next": "https://x/api?page=2"}}"#)
                .unwrap();
        assert_eq!(page.next.as_deref(), Some("https://x/api?page=2"));
    }
}
