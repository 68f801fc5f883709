//! Configuration and parse failures as issues.

use crate::{
    core::{CheckContext, CheckError},
    issues::{ConfigErrorIssue, Issue, ParseErrorIssue},
};

/// Issues for everything that failed before the rules could look at it.
///
/// A configuration error is reported once and suppresses the source scan.
/// Otherwise every unreadable locale or source file yields one parse error.
pub fn check_error_issues(ctx: &CheckContext) -> Vec<Issue> {
    if let Some(error) = ctx.config_error() {
        return vec![error_issue(&error, &ctx.config_display_path())];
    }

    ctx.locale_messages()
        .errors()
        .iter()
        .chain(ctx.used_keys().errors())
        .map(|error| error_issue(error, &ctx.config_display_path()))
        .collect()
}

/// `config_path` is where a configuration error is reported.
pub fn error_issue(error: &CheckError, config_path: &str) -> Issue {
    match error {
        CheckError::Configuration(message) => Issue::ConfigError(ConfigErrorIssue {
            file_path: config_path.to_string(),
            error: message.clone(),
        }),
        CheckError::Parse { file_path, message } => Issue::ParseError(ParseErrorIssue {
            file_path: file_path.clone(),
            error: message.clone(),
        }),
    }
}
