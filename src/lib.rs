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

//! # Firefly Fixer
//!
//! This library cleans up withdrawals that a GoCardless import left pointing
//! at a generic destination account (such as "VISA") in a Firefly III
//! ledger. The import records the real counterparty in the transaction
//! notes; the fixer scans an account for those notes and provisions one
//! ledger rule per distinct beneficiary that reassigns matching
//! transactions, existing and future, to the right destination.
//!
//! ## Core Components
//!
//! - [`FireflyClient`]: authenticated blocking session against the API
//! - [`Paginated`]: lazy walk over multi-page list responses
//! - [`scan_missing_beneficiaries`]: note scan for one account
//! - [`create_fixing_rule`]: rule creation plus immediate re-application
//! - [`run`]: the whole flow, as driven by the CLI
//! - [`ApiError`]: error taxonomy for everything above
//!
//! ## Example
//!
//! ```no_run
//! use firefly_fixer::{FireflyClient, RunOptions, run};
//!
//! let client = FireflyClient::new("https://demo.firefly-iii.org/", "token")?;
//! let report = run(
//!     &client,
//!     &RunOptions {
//!         account: "VISA".to_string(),
//!         group: "GoCardless fixes".to_string(),
//!         dry_run: true,
//!     },
//! )?;
//! println!("{} beneficiaries need a rule", report.beneficiaries.len());
//! # Ok::<(), firefly_fixer::ApiError>(())
//! ```
//!
//! ## Execution Model
//!
//! Everything is single-threaded, sequential, blocking I/O. Each page fetch
//! and each rule creation blocks until the server answers; there are no
//! retries and no local state between runs.

mod base;
pub mod client;
pub mod error;
pub mod response;
pub mod rules;
mod run;
pub mod scanner;

pub use base::{JournalId, RuleId};
pub use client::{CurrentUser, FireflyClient};
pub use error::ApiError;
pub use response::{Paginated, decode, decode_body};
pub use rules::{CreatedRule, NewRule, create_fixing_rule};
pub use run::{RunOptions, RunReport, run};
pub use scanner::{extract_beneficiary, scan_missing_beneficiaries, search_query};
