use thiserror::Error;

/// File-scoped failures of the key-consistency check.
///
/// None of these abort a run. The context turns each one into a single
/// diagnostic at the sentinel location and moves on to the next file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// No locale source configured, or a source that resolved no locales.
    #[error("{0}")]
    Configuration(String),

    /// A locale or source file could not be read or parsed.
    #[error("{file_path}: {message}")]
    Parse { file_path: String, message: String },
}

impl CheckError {
    pub fn no_locale_source() -> Self {
        CheckError::Configuration(
            "No locale source configured. \
             Set 'localeDir' in .keycheckrc.json or pass --locale-dir."
                .to_string(),
        )
    }

    pub fn parse(file_path: impl Into<String>, message: impl Into<String>) -> Self {
        CheckError::Parse {
            file_path: file_path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert!(
            CheckError::no_locale_source()
                .to_string()
                .contains("localeDir")
        );
        assert_eq!(
            CheckError::parse("locales/en.json", "unterminated string").to_string(),
            "locales/en.json: unterminated string"
        );
    }
}
