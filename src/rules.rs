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

//! Rule creation against the ledger.
//!
//! For every misdirected beneficiary the tool provisions one Firefly III
//! rule that matches the withdrawal by its marker note and rewrites the
//! destination account, then fires the rule once so existing transactions
//! are fixed immediately.

use crate::base::RuleId;
use crate::client::FireflyClient;
use crate::error::ApiError;
use crate::response::decode;
use crate::scanner::NOTE_MARKER;
use serde::{Deserialize, Serialize};

/// Moment at which the ledger evaluates a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TriggerMoment {
    /// When a transaction is first stored
    #[serde(rename = "store-journal")]
    StoreJournal,
    /// When a transaction is updated
    #[serde(rename = "update-journal")]
    UpdateJournal,
}

/// Condition types used by the fixing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    TransactionType,
    ToAccountIs,
    NotesContains,
}

/// Action types used by the fixing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    SetDestinationAccount,
}

#[derive(Debug, Serialize)]
pub struct RuleCondition {
    #[serde(rename = "type")]
    pub condition: ConditionType,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct RuleAction {
    #[serde(rename = "type")]
    pub action: ActionType,
    pub value: String,
}

/// Request payload for `POST /api/v1/rules`.
#[derive(Debug, Serialize)]
pub struct NewRule {
    pub title: String,
    pub rule_group_title: String,
    pub strict: bool,
    pub trigger: TriggerMoment,
    pub triggers: Vec<RuleCondition>,
    pub actions: Vec<RuleAction>,
}

impl NewRule {
    /// Builds the rule that reassigns withdrawals to `beneficiary`.
    ///
    /// The rule matches withdrawals going to `account` whose notes embed
    /// this exact beneficiary, and rewrites the destination account to the
    /// beneficiary. It is titled after the beneficiary and placed in
    /// `group`.
    pub fn fixing(account: &str, beneficiary: &str, group: &str) -> Self {
        Self {
            title: beneficiary.to_owned(),
            rule_group_title: group.to_owned(),
            strict: true,
            trigger: TriggerMoment::StoreJournal,
            triggers: vec![
                RuleCondition {
                    condition: ConditionType::TransactionType,
                    value: "withdrawal".to_owned(),
                },
                RuleCondition {
                    condition: ConditionType::ToAccountIs,
                    value: account.to_owned(),
                },
                RuleCondition {
                    condition: ConditionType::NotesContains,
                    value: format!("{NOTE_MARKER}: {beneficiary}"),
                },
            ],
            actions: vec![RuleAction {
                action: ActionType::SetDestinationAccount,
                value: beneficiary.to_owned(),
            }],
        }
    }
}

/// A rule as returned by the server after creation.
#[derive(Debug, Deserialize)]
pub struct CreatedRule {
    pub id: RuleId,
    pub attributes: RuleAttributes,
}

#[derive(Debug, Deserialize)]
pub struct RuleAttributes {
    pub title: String,
}

/// Creates the fixing rule for `beneficiary` and fires it once.
///
/// The creation response is decoded to obtain the assigned rule id; the
/// follow-up `POST /api/v1/rules/{id}/trigger` carries an empty JSON object
/// and is checked by HTTP status only, since the ledger returns no payload
/// of interest there. Not idempotent: calling twice for the same
/// beneficiary creates two rules.
///
/// # Errors
///
/// Any decode or transport failure on the creation call, or a non-success
/// status on the trigger call.
pub fn create_fixing_rule(
    client: &FireflyClient,
    account: &str,
    beneficiary: &str,
    group: &str,
) -> Result<CreatedRule, ApiError> {
    log::debug!("creating rule {} in group {}", beneficiary, group);
    let payload = NewRule::fixing(account, beneficiary, group);
    let rule: CreatedRule = decode(client.post_json("/api/v1/rules", &payload)?)?;

    log::debug!("triggering newly created rule {} ({})", rule.id, beneficiary);
    client
        .post_json(&format!("/api/v1/rules/{}/trigger", rule.id), &serde_json::json!({}))?
        .error_for_status()?;

    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fixing_rule_serializes_to_the_expected_payload() {
        let payload = serde_json::to_value(NewRule::fixing("VISA", "Total Wine", "Fixes")).unwrap();
        assert_eq!(
            payload,
            json!({
                "title": "Total Wine",
                "rule_group_title": "Fixes",
                "strict": true,
                "trigger": "store-journal",
                "triggers": [
                    {"type": "transaction_type", "value": "withdrawal"},
                    {"type": "to_account_is", "value": "VISA"},
                    {"type": "notes_contains", "value": "Original account name: Total Wine"},
                ],
                "actions": [
                    {"type": "set_destination_account", "value": "Total Wine"},
                ],
            })
        );
    }

    #[test]
    fn created_rule_decodes_id_and_title() {
        let rule: CreatedRule = serde_json::from_str(
            r#"{"id": "93", "attributes": {"title": "Total Wine", "strict": true}}"#,
        )
        .unwrap();
        assert_eq!(rule.id.0, "93");
        assert_eq!(rule.attributes.title, "Total Wine");
    }
}
