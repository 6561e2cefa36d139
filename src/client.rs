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

//! Authenticated session against a Firefly III instance.
//!
//! [`FireflyClient`] wraps a blocking HTTP client with the instance base URL
//! and the bearer token, so callers pass API paths (`/api/v1/...`) and never
//! deal with authentication or URL resolution themselves.

use crate::error::ApiError;
use crate::response::decode;
use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use url::Url;

/// Blocking session for the Firefly III API.
///
/// Every request resolves its path against the stored base URL with standard
/// URL-join semantics: relative paths are appended, an absolute URL argument
/// (such as a pagination link) overrides the base. The access token is sent
/// as an `Authorization: Bearer` header on every request.
///
/// No retries, no timeout overrides; a transport failure on any call
/// propagates to the caller.
pub struct FireflyClient {
    http: Client,
    base: Url,
    token: String,
}

impl FireflyClient {
    /// Creates a session for the instance at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if the base URL does not parse.
    pub fn new(base_url: &str, access_token: &str) -> Result<Self, ApiError> {
        Ok(Self {
            http: Client::new(),
            base: Url::parse(base_url)?,
            token: access_token.to_owned(),
        })
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.base.join(path)?;
        log::debug!("{} {}", method, url);
        Ok(self.http.request(method, url).bearer_auth(&self.token))
    }

    /// Issues a GET for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if `path` does not resolve against the base
    /// URL, or [`ApiError::Transport`] if the request fails to complete.
    pub fn get(&self, path: &str) -> Result<Response, ApiError> {
        Ok(self.request(Method::GET, path)?.send()?)
    }

    /// Issues a GET for `path` with the given query parameters.
    ///
    /// # Errors
    ///
    /// Same as [`FireflyClient::get`].
    pub fn get_with_query(&self, path: &str, query: &[(&str, &str)]) -> Result<Response, ApiError> {
        Ok(self.request(Method::GET, path)?.query(query).send()?)
    }

    /// Issues a POST for `path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`FireflyClient::get`].
    pub fn post_json<B>(&self, path: &str, body: &B) -> Result<Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        Ok(self.request(Method::POST, path)?.json(body).send()?)
    }

    /// Fetches the currently authenticated user.
    ///
    /// Used at startup purely to validate that the base URL and access token
    /// work before anything else is attempted.
    ///
    /// # Errors
    ///
    /// Any decode or transport failure; an invalid token typically surfaces
    /// as [`ApiError::Api`] or [`ApiError::Format`] depending on how the
    /// instance answers.
    pub fn current_user(&self) -> Result<CurrentUser, ApiError> {
        decode(self.get("/api/v1/about/user")?)
    }
}

/// The authenticated user, as returned by `/api/v1/about/user`.
#[derive(Debug, Deserialize)]
pub struct CurrentUser {
    pub attributes: UserAttributes,
}

#[derive(Debug, Deserialize)]
pub struct UserAttributes {
    pub email: String,
}
