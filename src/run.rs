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

//! End-to-end run: validate credentials, scan, provision.

use crate::client::FireflyClient;
use crate::error::ApiError;
use crate::rules::{CreatedRule, create_fixing_rule};
use crate::scanner::scan_missing_beneficiaries;
use std::collections::BTreeSet;

/// What to scan and where to put the rules.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Account whose withdrawals are scanned, by name or id.
    pub account: String,
    /// Rule group the new rules are created in.
    pub group: String,
    /// When set, stop after reporting what would be created; no write
    /// request is issued.
    pub dry_run: bool,
}

/// Outcome of a run.
#[derive(Debug)]
pub struct RunReport {
    /// Email of the authenticated user, logged as a credential check.
    pub user_email: String,
    /// Distinct beneficiaries found embedded in the scanned notes.
    pub beneficiaries: BTreeSet<String>,
    /// Rules actually created, in creation order. Empty on a dry run or
    /// when nothing needed fixing.
    pub created: Vec<CreatedRule>,
}

/// Runs the full cleanup against one account.
///
/// Linear flow: authenticate, scan for embedded beneficiaries, then create
/// and fire one rule per distinct name. If the set is empty or `dry_run` is
/// set, the run stops after reporting instead.
///
/// There is no rollback: if rule creation fails partway through, the rules
/// created so far remain in the ledger and the error propagates.
///
/// # Errors
///
/// Any decode or transport failure on the credential check, the scan, or a
/// rule creation.
pub fn run(client: &FireflyClient, options: &RunOptions) -> Result<RunReport, ApiError> {
    // Credential check before any real work.
    let user = client.current_user()?;
    log::info!("authenticated as {}", user.attributes.email);

    let beneficiaries = scan_missing_beneficiaries(client, &options.account)?;
    let mut report = RunReport {
        user_email: user.attributes.email,
        beneficiaries,
        created: Vec::new(),
    };

    if report.beneficiaries.is_empty() {
        log::info!(
            "no transaction towards account {} needs fixing, no rule to create",
            options.account
        );
        return Ok(report);
    }

    log::info!(
        "account {} contains transactions towards {} other beneficiaries:\n- {}",
        options.account,
        report.beneficiaries.len(),
        report
            .beneficiaries
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n- ")
    );
    log::info!("new rules will be created in rule group {}", options.group);

    if options.dry_run {
        return Ok(report);
    }

    for beneficiary in &report.beneficiaries {
        let rule = create_fixing_rule(client, &options.account, beneficiary, &options.group)?;
        log::info!(
            "successfully created rule {} ({})",
            rule.attributes.title,
            rule.id
        );
        report.created.push(rule);
    }

    Ok(report)
}
