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

//! Scanning an account's withdrawals for misdirected beneficiaries.
//!
//! The GoCardless import records the real counterparty of a withdrawal in
//! the transaction notes as `Original account name: <name>` whenever the
//! destination landed on a generic payment account. The scanner searches an
//! account for exactly those withdrawals and collects the distinct embedded
//! names.

use crate::base::JournalId;
use crate::client::FireflyClient;
use crate::error::ApiError;
use crate::response::Paginated;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Text prefix the import pipeline uses to embed the real beneficiary in a
/// transaction note.
pub const NOTE_MARKER: &str = "Original account name";

fn note_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"Original account name: ([^\n]*)").expect("valid pattern"))
}

/// One entry of a search result page; only the transaction splits inside
/// its attributes are consumed.
#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub attributes: SearchAttributes,
}

#[derive(Debug, Deserialize)]
pub struct SearchAttributes {
    pub transactions: Vec<TransactionSplit>,
}

/// A single transaction split. Firefly returns many more attributes; the
/// scanner only reads the journal id and the notes.
#[derive(Debug, Deserialize)]
pub struct TransactionSplit {
    pub transaction_journal_id: JournalId,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Builds the transaction search query for `account` as the space-joined
/// `key:"value"` clauses the search endpoint expects.
pub fn search_query(account: &str) -> String {
    let clauses = [
        ("account_is", account),
        ("type", "withdrawal"),
        ("notes_contain", NOTE_MARKER),
    ];
    clauses
        .iter()
        .map(|(key, value)| format!("{key}:\"{value}\""))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts the beneficiary name embedded in a transaction note.
///
/// The capture stops at the end of the marker line and is trimmed of
/// surrounding whitespace. Returns `None` when the note does not carry the
/// marker.
pub fn extract_beneficiary(notes: &str) -> Option<&str> {
    note_pattern()
        .captures(notes)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str().trim())
}

/// Collects the distinct beneficiary names embedded in the notes of
/// `account`'s withdrawals.
///
/// Transactions whose notes match the search filter but not the marker
/// pattern are logged and skipped; the scan continues. Duplicate names
/// collapse into the set.
///
/// # Errors
///
/// Any decode or transport failure while walking the result pages.
pub fn scan_missing_beneficiaries(
    client: &FireflyClient,
    account: &str,
) -> Result<BTreeSet<String>, ApiError> {
    let query = search_query(account);
    let response =
        client.get_with_query("/api/v1/search/transactions", &[("query", query.as_str())])?;

    let mut beneficiaries = BTreeSet::new();
    for result in Paginated::<SearchResult>::new(client, response)? {
        for split in result?.attributes.transactions {
            log::debug!(
                "transaction {}: {:?}",
                split.transaction_journal_id,
                split.notes
            );
            let name = split.notes.as_deref().and_then(extract_beneficiary);
            match name {
                Some(name) => {
                    beneficiaries.insert(name.to_owned());
                }
                None => log::error!(
                    "failed to match note of transaction {}: {:?}",
                    split.transaction_journal_id,
                    split.notes
                ),
            }
        }
    }
    Ok(beneficiaries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_stops_at_newline_and_trims() {
        let notes = "Original account name: Acme Corp\nextra line";
        assert_eq!(extract_beneficiary(notes), Some("Acme Corp"));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let notes = "Original account name:   Total Wine  ";
        assert_eq!(extract_beneficiary(notes), Some("Total Wine"));
    }

    #[test]
    fn marker_in_the_middle_of_the_note_matches() {
        let notes = "imported by gocardless\nOriginal account name: Grocer\nref 123";
        assert_eq!(extract_beneficiary(notes), Some("Grocer"));
    }

    #[test]
    fn note_without_marker_does_not_match() {
        assert_eq!(extract_beneficiary("just a memo"), None);
    }

    #[test]
    fn query_joins_clauses_in_order() {
        assert_eq!(
            search_query("12"),
            r#"account_is:"12" type:"withdrawal" notes_contain:"Original account name""#
        );
    }

    #[test]
    fn splits_tolerate_null_notes() {
        let split: TransactionSplit =
            serde_json::from_str(r#"{"transaction_journal_id": "7", "notes": null}"#).unwrap();
        assert!(split.notes.is_none());
    }
}
