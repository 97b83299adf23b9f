//! LTI configuration.
//!
//! Loaded from `<home>/config.toml`, where `<home>` is `LTI_HOME` when set and
//! `~/.lti` otherwise. Every key has a default, so a missing file is fine.

use std::path::PathBuf;
use std::{env, fs, io};

use serde::{Deserialize, Serialize};

use crate::related::{DEFAULT_PATTERN, PatternKey};

/// Default sendmail location on most Unix hosts.
const DEFAULT_SENDMAIL: &str = "/usr/sbin/sendmail";

/// LTI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Start reviews with auto-save on.
    pub auto_save: bool,

    /// Pattern whose first capture group is the equipment group key.
    /// Matched case-insensitively.
    pub group_pattern: String,

    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MailConfig {
    /// Sender address. Required by the mail commands only.
    pub from: Option<String>,

    /// Path to a sendmail-compatible program.
    pub sendmail: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_save: false,
            group_pattern: DEFAULT_PATTERN.to_string(),
            mail: MailConfig::default(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from: None,
            sendmail: PathBuf::from(DEFAULT_SENDMAIL),
        }
    }
}

impl Config {
    /// Load config from `<home>/config.toml`.
    /// Returns defaults when the file is missing, an error when it is invalid.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;

        let contents = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        Self::parse(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// Parses and checks config text.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(contents).map_err(|e| e.to_string())?;
        config.group_key()?;
        Ok(config)
    }

    /// The relation detector's key extractor.
    pub fn group_key(&self) -> Result<PatternKey, String> {
        PatternKey::new(&self.group_pattern)
            .map_err(|e| format!("group-pattern is not a valid pattern: {e}"))
    }

    /// The sender address, or an error explaining how to set one.
    pub fn mail_from(&self) -> Result<&str, String> {
        self.mail
            .from
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| {
                let path = Self::path().map_or_else(
                    || "config.toml".to_string(),
                    |p| p.display().to_string(),
                );
                format!(
                    "no sender address configured\n\
                     Add to {path}:\n\n\
                     [mail]\n\
                     from = \"lti@your-site.example\""
                )
            })
    }

    /// The LTI home directory: `LTI_HOME`, else `~/.lti`.
    pub fn home() -> Option<PathBuf> {
        if let Ok(dir) = env::var("LTI_HOME")
            && !dir.is_empty()
        {
            return Some(PathBuf::from(dir));
        }
        dirs::home_dir().map(|h| h.join(".lti"))
    }

    /// The config file path: `<home>/config.toml`.
    pub fn path() -> Option<PathBuf> {
        Self::home().map(|h| h.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::related::GroupKey;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();

        assert!(!config.auto_save);
        assert_eq!(config.group_pattern, DEFAULT_PATTERN);
        assert_eq!(config.mail.sendmail, PathBuf::from(DEFAULT_SENDMAIL));
        assert!(config.mail_from().is_err());
    }

    #[test]
    fn reads_kebab_case_keys() {
        let config = Config::parse(
            r#"
            auto-save = true
            group-pattern = 'unit-(\d+)'

            [mail]
            from = "lti@plant.example"
            sendmail = "/opt/bin/sendmail"
            "#,
        )
        .unwrap();

        assert!(config.auto_save);
        assert_eq!(config.mail_from().unwrap(), "lti@plant.example");
        assert_eq!(config.mail.sendmail, PathBuf::from("/opt/bin/sendmail"));
        let key = config.group_key().unwrap();
        assert_eq!(key.key("UNIT-42 feed").as_deref(), Some("42"));
    }

    #[test]
    fn rejects_invalid_pattern() {
        let err = Config::parse("group-pattern = 'CAHE-('").unwrap_err();
        assert!(err.contains("group-pattern"));
    }

    #[test]
    fn rejects_unparseable_toml() {
        assert!(Config::parse("auto-save = maybe").is_err());
    }
}
