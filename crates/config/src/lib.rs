use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Full configuration file stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Config {
    /// Load configuration from the provided path or the default config file.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let path = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or_else(Config::default_path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Unable to read config file at {}", path.display()))?;

        serde_yaml::from_str(&raw)
            .with_context(|| format!("Malformed YAML in config file {}", path.display()))
    }

    /// Persist the configuration to disk, creating parent directories if needed.
    pub fn save<P: AsRef<Path>>(&self, path: Option<P>) -> Result<()> {
        let path = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or_else(Config::default_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Unable to create config directory {}", parent.display())
            })?;
        }

        let serialized = serde_yaml::to_string(self)?;
        fs::write(&path, serialized)
            .with_context(|| format!("Unable to write config file {}", path.display()))?;

        Ok(())
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Returns the requested profile, the default one, or the first available.
    pub fn resolve_profile<'a>(
        &'a self,
        requested: Option<&'a str>,
    ) -> Option<(&'a str, &'a Profile)> {
        if let Some(name) = requested {
            self.profiles.get(name).map(|profile| (name, profile))
        } else if let Some(default_name) = self.default_profile.as_deref() {
            self.profiles
                .get(default_name)
                .map(|profile| (default_name, profile))
        } else {
            self.profiles
                .iter()
                .next()
                .map(|(name, profile)| (name.as_str(), profile))
        }
    }

    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".jira-panel");
        path.push("config.yaml");
        path
    }
}

/// One Jira site plus the identities used against it. Secrets normally live
/// in the credential store, so `api_token` is usually empty.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Profile {
    pub base_url: Option<String>,
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<AppProfile>,
    /// Per-request timeout; requests wait indefinitely when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Retry attempts for comment listing and search. Zero disables retries.
    #[serde(default)]
    pub read_retries: usize,
}

/// Claims used when acting as the installed application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppProfile {
    pub issuer: String,
    pub subject: String,
    /// Defaults to the profile's base URL when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
}

impl Profile {
    /// Audience claim for app assertions.
    pub fn app_audience(&self) -> Option<&str> {
        self.app
            .as_ref()
            .and_then(|app| app.audience.as_deref())
            .or(self.base_url.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_missing_file() {
        let config = Config::load(Some("/nonexistent/config.yaml")).unwrap();
        assert!(config.profiles.is_empty());
        assert!(config.default_profile.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let mut config = Config {
            default_profile: Some("work".to_string()),
            ..Default::default()
        };

        let profile = Profile {
            base_url: Some("https://test.atlassian.net".to_string()),
            email: Some("test@example.com".to_string()),
            app: Some(AppProfile {
                issuer: "com.example.panel".to_string(),
                subject: "app".to_string(),
                audience: None,
            }),
            timeout_secs: Some(20),
            ..Default::default()
        };
        config.profiles.insert("work".to_string(), profile);

        let temp_file = NamedTempFile::new().unwrap();
        config.save(Some(temp_file.path())).unwrap();
        let loaded = Config::load(Some(temp_file.path())).unwrap();

        assert_eq!(loaded.default_profile, Some("work".to_string()));
        let work = loaded.profile("work").unwrap();
        assert_eq!(work.email.as_deref(), Some("test@example.com"));
        assert_eq!(work.timeout_secs, Some(20));
        assert_eq!(work.read_retries, 0);
        assert_eq!(work.app.as_ref().unwrap().issuer, "com.example.panel");
    }

    #[test]
    fn test_load_malformed_yaml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "invalid: yaml: [unclosed").unwrap();

        let err = Config::load(Some(temp_file.path())).unwrap_err();
        assert!(err.to_string().contains("Malformed YAML"));
    }

    #[test]
    fn test_parse_handwritten_profile() {
        let yaml = r#"
default_profile: acme
profiles:
  acme:
    base_url: https://acme.atlassian.net
    email: dev@acme.io
    read_retries: 3
    app:
      issuer: com.acme.panel
      subject: panel-bot
      audience: https://acme.atlassian.net/rest
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let (name, profile) = config.resolve_profile(None).unwrap();
        assert_eq!(name, "acme");
        assert_eq!(profile.read_retries, 3);
        assert_eq!(
            profile.app_audience(),
            Some("https://acme.atlassian.net/rest")
        );
    }

    #[test]
    fn test_audience_falls_back_to_base_url() {
        let profile = Profile {
            base_url: Some("https://acme.atlassian.net".to_string()),
            app: Some(AppProfile {
                issuer: "iss".to_string(),
                subject: "sub".to_string(),
                audience: None,
            }),
            ..Default::default()
        };
        assert_eq!(profile.app_audience(), Some("https://acme.atlassian.net"));
    }

    #[test]
    fn test_resolve_profile_requested() {
        let mut config = Config {
            default_profile: Some("default".to_string()),
            ..Default::default()
        };
        config
            .profiles
            .insert("default".to_string(), Profile::default());
        config.profiles.insert(
            "work".to_string(),
            Profile {
                base_url: Some("https://work.atlassian.net".to_string()),
                ..Default::default()
            },
        );

        let (name, profile) = config.resolve_profile(Some("work")).unwrap();
        assert_eq!(name, "work");
        assert_eq!(
            profile.base_url.as_deref(),
            Some("https://work.atlassian.net")
        );
    }

    #[test]
    fn test_resolve_profile_default() {
        let mut config = Config {
            default_profile: Some("b".to_string()),
            ..Default::default()
        };
        config.profiles.insert("a".to_string(), Profile::default());
        config.profiles.insert("b".to_string(), Profile::default());

        let (name, _) = config.resolve_profile(None).unwrap();
        assert_eq!(name, "b");
    }

    #[test]
    fn test_resolve_profile_first_available() {
        let mut config = Config::default();
        config.profiles.insert("only".to_string(), Profile::default());

        let (name, _) = config.resolve_profile(None).unwrap();
        assert_eq!(name, "only");
    }

    #[test]
    fn test_resolve_profile_none_available() {
        let config = Config::default();
        assert!(config.resolve_profile(None).is_none());
        assert!(config.resolve_profile(Some("missing")).is_none());
    }
}
