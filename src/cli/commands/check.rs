use anyhow::{Ok, Result};
use clap::ValueEnum;
use tracing::debug;

use super::super::args::CheckCommand;
use super::{
    helper::finish,
    {CommandResult, CommandSummary},
};

use crate::{
    core::CheckContext,
    issues::Issue,
    rules::{
        errors::check_error_issues, missing::check_missing_keys_issues,
        unused::check_unused_keys_issues,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum CheckRule {
    Unused,
    Missing,
}

impl CheckRule {
    pub fn all() -> Vec<CheckRule> {
        vec![CheckRule::Unused, CheckRule::Missing]
    }
}

pub fn check(cmd: CheckCommand) -> Result<CommandResult> {
    let args = &cmd.args;
    let ctx = CheckContext::new(&args.common)?;

    let checks = if cmd.checks.is_empty() {
        CheckRule::all()
    } else {
        cmd.checks.clone()
    };
    debug!("running checks: {:?}", checks);

    let mut all_issues: Vec<Issue> = Vec::new();

    for check in checks {
        match check {
            CheckRule::Unused => {
                let issues = check_unused_keys_issues(&ctx);
                all_issues.extend(issues.into_iter().map(Issue::UnusedKey));
            }
            CheckRule::Missing => {
                let issues = check_missing_keys_issues(&ctx);
                all_issues.extend(issues.into_iter().map(Issue::MissingKey));
            }
        }
    }

    all_issues.extend(check_error_issues(&ctx));

    let source_files = ctx.scanned_used_keys().map_or(0, |used| used.files_scanned());
    let locale_files = ctx.locale_messages().messages().len();

    Ok(finish(
        CommandSummary::Check,
        all_issues,
        source_files,
        locale_files,
        true,
    ))
}
