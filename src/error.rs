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

//! Error types for API interaction.

use thiserror::Error;

/// Errors raised while talking to the Firefly III API.
///
/// All variants are fatal to the run; the only recoverable condition in the
/// tool (a transaction note without the expected marker) is handled at the
/// scan site and never surfaces here.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Response body is not JSON, or matches neither envelope shape
    #[error("unexpected response format: {0}")]
    Format(String),

    /// The server answered with a structured error envelope
    #[error("{exception}: {message}")]
    Api { exception: String, message: String },

    /// The `data` payload is present but does not have the expected shape
    #[error("response data failed validation: {0}")]
    Validation(serde_json::Error),

    /// Network failure, or a non-success status on a status-checked call
    #[error("api request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The base url or a pagination link cannot be parsed
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::ApiError;

    #[test]
    fn api_error_combines_exception_and_message() {
        let error = ApiError::Api {
            exception: "AuthenticationException".to_string(),
            message: "Unauthenticated.".to_string(),
        };
        assert_eq!(error.to_string(), "AuthenticationException: Unauthenticated.");
    }

    #[test]
    fn format_error_carries_raw_body() {
        let error = ApiError::Format("<html>teapot</html>".to_string());
        assert_eq!(
            error.to_string(),
            "unexpected response format: <html>teapot</html>"
        );
    }

    #[test]
    fn validation_error_names_the_cause() {
        let cause = serde_json::from_value::<Vec<u8>>(serde_json::json!({})).unwrap_err();
        let error = ApiError::Validation(cause);
        assert!(error.to_string().starts_with("response data failed validation:"));
    }
}
