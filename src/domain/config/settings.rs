// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::infrastructure::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_API_URL, ENV_API_URL, ENV_CONFIG_FILE,
    ENV_PASSWORD, ENV_TOKEN, ENV_USERNAME,
};
use crate::shared::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
}

impl FileConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| {
            CloudError::config_error(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let conf: Self = toml::from_str(&content)?;
        Ok(conf)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Token(String),
    Basic { username: String, password: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(***)"),
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub config_file: Option<PathBuf>,
    pub api_url: Option<String>,
}

/// Resolved client settings.
///
/// Priority: command line > environment > config file > defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub credentials: Option<Credentials>,
}

impl Settings {
    pub fn resolve(overrides: &SettingsOverrides) -> Result<Self> {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Self::resolve_with(overrides, |key| std::env::var(key).ok(), home)
    }

    pub fn resolve_with<E>(
        overrides: &SettingsOverrides,
        env: E,
        home: Option<PathBuf>,
    ) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.is_empty());

        let file = match config_file_path(overrides, &env, home)? {
            Some(path) => {
                debug!(path = %path.display(), "Loading config file");
                FileConfig::load(&path)?
            }
            None => FileConfig::default(),
        };

        let api_url = overrides
            .api_url
            .clone()
            .or_else(|| env(ENV_API_URL))
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        // Credentials are taken whole from one source, environment first.
        let credentials = match credentials_from(
            "environment",
            env(ENV_TOKEN),
            env(ENV_USERNAME),
            env(ENV_PASSWORD),
        )? {
            Some(credentials) => Some(credentials),
            None => credentials_from("config file", file.token, file.username, file.password)?,
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn require_credentials(&self) -> Result<&Credentials> {
        self.credentials.as_ref().ok_or_else(|| {
            CloudError::config_error(format!(
                "no credentials configured; set {} or {}/{}, or add them to the config file",
                ENV_TOKEN, ENV_USERNAME, ENV_PASSWORD
            ))
        })
    }
}

fn credentials_from(
    source: &str,
    token: Option<String>,
    username: Option<String>,
    password: Option<String>,
) -> Result<Option<Credentials>> {
    match (token, username, password) {
        (Some(token), _, _) => Ok(Some(Credentials::Token(token))),
        (None, Some(username), Some(password)) => {
            Ok(Some(Credentials::Basic { username, password }))
        }
        (None, Some(_), None) | (None, None, Some(_)) => Err(CloudError::config_error(format!(
            "both username and password are required for basic authentication ({})",
            source
        ))),
        (None, None, None) => Ok(None),
    }
}

fn config_file_path<E>(
    overrides: &SettingsOverrides,
    env: &E,
    home: Option<PathBuf>,
) -> Result<Option<PathBuf>>
where
    E: Fn(&str) -> Option<String>,
{
    // Explicit paths must exist; the default location is optional.
    if let Some(path) = overrides
        .config_file
        .clone()
        .or_else(|| env(ENV_CONFIG_FILE).map(PathBuf::from))
    {
        if !path.exists() {
            return Err(CloudError::config_error(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        return Ok(Some(path));
    }

    Ok(home
        .map(|h| h.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .filter(|p| p.exists()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_anything() {
        let settings =
            Settings::resolve_with(&SettingsOverrides::default(), env_of(&[]), None).unwrap();
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert!(settings.credentials.is_none());
        assert!(settings.require_credentials().is_err());
    }

    #[test]
    fn test_file_values_used() {
        let file = write_config(
            r#"
api_url = "https://api.example.test/v6/"
username = "alice"
password = "secret"
"#,
        );
        let overrides = SettingsOverrides {
            config_file: Some(file.path().to_path_buf()),
            api_url: None,
        };

        let settings = Settings::resolve_with(&overrides, env_of(&[]), None).unwrap();
        assert_eq!(settings.api_url, "https://api.example.test/v6");
        assert_eq!(
            settings.credentials,
            Some(Credentials::Basic {
                username: "alice".to_string(),
                password: "secret".to_string()
            })
        );
    }

    #[test]
    fn test_priority_flag_env_file() {
        let file = write_config("api_url = \"https://file.test\"\ntoken = \"file-token\"\n");
        let env = env_of(&[
            (ENV_CONFIG_FILE, file.path().to_str().unwrap()),
            (ENV_API_URL, "https://env.test"),
            (ENV_TOKEN, "env-token"),
        ]);

        let settings =
            Settings::resolve_with(&SettingsOverrides::default(), &env, None).unwrap();
        assert_eq!(settings.api_url, "https://env.test");
        assert_eq!(
            settings.credentials,
            Some(Credentials::Token("env-token".to_string()))
        );

        let overrides = SettingsOverrides {
            config_file: None,
            api_url: Some("https://flag.test".to_string()),
        };
        let settings = Settings::resolve_with(&overrides, &env, None).unwrap();
        assert_eq!(settings.api_url, "https://flag.test");
    }

    #[test]
    fn test_token_wins_over_basic() {
        let env = env_of(&[
            (ENV_USERNAME, "alice"),
            (ENV_PASSWORD, "secret"),
            (ENV_TOKEN, "tok"),
        ]);
        let settings =
            Settings::resolve_with(&SettingsOverrides::default(), env, None).unwrap();
        assert_eq!(
            settings.require_credentials().unwrap(),
            &Credentials::Token("tok".to_string())
        );
    }

    #[test]
    fn test_env_basic_auth_beats_file_token() {
        let file = write_config("token = \"file-token\"\n");
        let env = env_of(&[
            (ENV_CONFIG_FILE, file.path().to_str().unwrap()),
            (ENV_USERNAME, "alice"),
            (ENV_PASSWORD, "secret"),
        ]);

        let settings =
            Settings::resolve_with(&SettingsOverrides::default(), &env, None).unwrap();
        assert_eq!(
            settings.credentials,
            Some(Credentials::Basic {
                username: "alice".to_string(),
                password: "secret".to_string()
            })
        );
    }

    #[test]
    fn test_file_credentials_not_mixed_with_env() {
        let file = write_config("password = \"file-secret\"\n");
        let env = env_of(&[
            (ENV_CONFIG_FILE, file.path().to_str().unwrap()),
            (ENV_USERNAME, "alice"),
        ]);

        let err = Settings::resolve_with(&SettingsOverrides::default(), &env, None).unwrap_err();
        assert!(err.to_string().contains("environment"));
    }

    #[test]
    fn test_incomplete_basic_auth_rejected() {
        let env = env_of(&[(ENV_USERNAME, "alice")]);
        let err = Settings::resolve_with(&SettingsOverrides::default(), env, None).unwrap_err();
        assert!(matches!(err, CloudError::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let overrides = SettingsOverrides {
            config_file: Some(PathBuf::from("/definitely/not/here.toml")),
            api_url: None,
        };
        let err = Settings::resolve_with(&overrides, env_of(&[]), None).unwrap_err();
        assert!(err.to_string().contains("Configuration file not found"));
    }

    #[test]
    fn test_default_location_in_home() {
        let home = tempfile::tempdir().unwrap();
        let dir = home.path().join(CONFIG_DIR_NAME);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILE_NAME), "token = \"home-token\"\n").unwrap();

        let settings = Settings::resolve_with(
            &SettingsOverrides::default(),
            env_of(&[]),
            Some(home.path().to_path_buf()),
        )
        .unwrap();
        assert_eq!(
            settings.credentials,
            Some(Credentials::Token("home-token".to_string()))
        );
    }

    #[test]
    fn test_invalid_toml() {
        let file = write_config("api_url = [");
        let overrides = SettingsOverrides {
            config_file: Some(file.path().to_path_buf()),
            api_url: None,
        };
        let err = Settings::resolve_with(&overrides, env_of(&[]), None).unwrap_err();
        assert!(matches!(err, CloudError::TomlParse(_)));
    }

    #[test]
    fn test_credentials_debug_hides_secrets() {
        let basic = Credentials::Basic {
            username: "alice".to_string(),
            password: "secret".to_string(),
        };
        let rendered = format!("{:?}", basic);
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("secret"));
        assert_eq!(format!("{:?}", Credentials::Token("t".into())), "Token(***)");
    }
}
