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

use clap::Parser;
use firefly_fixer::{FireflyClient, RunOptions, run};
use log::LevelFilter;
use std::process;

/// Firefly Fixer - reassign GoCardless-imported withdrawals
///
/// Scans an account for withdrawals whose notes name the real beneficiary
/// (transactions imported via GoCardless towards a common payment platform
/// such as VISA land there with the counterparty only recorded in the note),
/// then creates one rule per beneficiary that rewrites the destination
/// account, and fires each rule so existing transactions are fixed too.
#[derive(Parser, Debug)]
#[command(name = "firefly-fixer")]
#[command(about = "Creates Firefly III rules that fix GoCardless destination accounts", long_about = None)]
struct Args {
    /// Verbosity; repeat for more detail (-v warnings, -vv info, -vvv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// The url where the firefly api can be reached,
    /// i.e. https://demo.firefly-iii.org/
    #[arg(short, long, env = "FIREFLY_III_URL")]
    url: String,

    /// A user token to interact with the api
    #[arg(short = 't', long, env = "FIREFLY_III_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,

    /// The name of the group in which the rules should be created
    #[arg(short, long, env = "FIREFLY_III_RULE_GROUP")]
    group: String,

    /// Only perform get requests against the api and display an overview of
    /// the changes that would be made without the flag
    #[arg(long, env = "DRY_RUN")]
    dry_run: bool,

    /// Account whose withdrawals should be scanned, by name or id
    #[arg(value_name = "ACCOUNT", env = "ACCOUNT_NAME")]
    account: String,
}

/// Maps the repeatable `-v` flag to a log level filter.
///
/// Silent by default (errors only); everything past `-vvv` logs everything.
fn level_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(level_filter(args.verbose))
        .init();

    let client = match FireflyClient::new(&args.url, &args.access_token) {
        Ok(client) => client,
        Err(e) => {
            log::error!("failed to set up the api session: {}", e);
            process::exit(1);
        }
    };

    let options = RunOptions {
        account: args.account,
        group: args.group,
        dry_run: args.dry_run,
    };

    if let Err(e) = run(&client, &options) {
        log::error!("{}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_filter(0), LevelFilter::Error);
        assert_eq!(level_filter(1), LevelFilter::Warn);
        assert_eq!(level_filter(2), LevelFilter::Info);
        assert_eq!(level_filter(3), LevelFilter::Debug);
        assert_eq!(level_filter(4), LevelFilter::Trace);
        assert_eq!(level_filter(42), LevelFilter::Trace);
    }

    #[test]
    fn args_require_account() {
        // Guard against the positional becoming optional by accident.
        use clap::CommandFactory;
        let result = Args::command().try_get_matches_from([
            "firefly-fixer",
            "--url",
            "https://example.org/",
            "--access-token",
            "token",
            "--group",
            "Fixes",
        ]);
        assert!(result.is_err());
    }
}
