use crate::error::{Result, TaggerError};
use crate::host::RepoSlug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "app-tagger.toml";

/// Represents the tool settings of app-tagger.
///
/// Run inputs (repository, application, change type) come from the command
/// line; this file only tunes how tags are written and fetched.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_user_name() -> String {
    "github-actions[bot]".to_string()
}

fn default_user_email() -> String {
    "github-actions[bot]@users.noreply.github.com".to_string()
}

fn default_host_url() -> String {
    "https://github.com".to_string()
}

fn default_tag_message() -> String {
    "Release {tag_version}".to_string()
}

fn default_api_url() -> String {
    crate::host::github::DEFAULT_API_URL.to_string()
}

fn default_page_size() -> u32 {
    crate::host::github::MAX_PAGE_SIZE
}

/// Settings for the local checkout and tag objects
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_user_name")]
    pub user_name: String,

    #[serde(default = "default_user_email")]
    pub user_email: String,

    /// Base URL used to clone when the working directory is not a repository
    #[serde(default = "default_host_url")]
    pub host_url: String,

    /// Annotated tag message; `{tag_version}` and `{tag}` are substituted
    #[serde(default = "default_tag_message")]
    pub tag_message: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            remote: default_remote(),
            user_name: default_user_name(),
            user_email: default_user_email(),
            host_url: default_host_url(),
            tag_message: default_tag_message(),
        }
    }
}

impl GitConfig {
    /// HTTPS clone URL of `repo` on the configured host
    pub fn clone_url(&self, repo: &RepoSlug) -> String {
        format!("{}/{}.git", self.host_url.trim_end_matches('/'), repo)
    }
}

/// Settings for the host REST API
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Upper bound on listed pages; unset lists everything
    #[serde(default)]
    pub max_pages: Option<u32>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_api_url(),
            page_size: default_page_size(),
            max_pages: None,
        }
    }
}

/// Fill a tag message template.
pub fn render_tag_message(template: &str, tag_version: &str, tag: &str) -> String {
    template
        .replace("{tag_version}", tag_version)
        .replace("{tag}", tag)
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `app-tagger.toml` in current directory
/// 3. `.app-tagger.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Errors
/// Returns [`TaggerError::Config`] if a file exists but cannot be read or parsed.
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);

    let path = if let Some(path) = config_path {
        Path::new(path).to_path_buf()
    } else if local.exists() {
        local
    } else if let Some(config_dir) = dirs::config_dir() {
        let user = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if user.exists() {
            user
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config_str = fs::read_to_string(&path).map_err(|e| {
        TaggerError::config(format!("Cannot read {}: {}", path.display(), e))
    })?;
    parse_config(&config_str).map_err(|e| match e {
        TaggerError::Config(msg) => TaggerError::config(format!("{} ({})", msg, path.display())),
        other => other,
    })
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)
        .map_err(|e| TaggerError::config(format!("Invalid configuration: {}", e)))?;

    if config.api.page_size == 0 {
        return Err(TaggerError::config("api.page_size must be at least 1"));
    }
    if config.api.max_pages == Some(0) {
        return Err(TaggerError::config("api.max_pages must be at least 1"));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.git.remote, "origin");
        assert_eq!(config.git.user_name, "github-actions[bot]");
        assert_eq!(config.git.tag_message, "Release {tag_version}");
        assert_eq!(config.api.base_url, "https://api.github.com");
        assert_eq!(config.api.page_size, 100);
        assert_eq!(config.api.max_pages, None);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = parse_config(
            r#"
[git]
remote = "upstream"

[api]
max_pages = 5
"#,
        )
        .unwrap();
        assert_eq!(config.git.remote, "upstream");
        assert_eq!(config.git.user_email, default_user_email());
        assert_eq!(config.api.max_pages, Some(5));
        assert_eq!(config.api.page_size, 100);
    }

    #[test]
    fn test_rejects_zero_limits() {
        assert!(parse_config("[api]\npage_size = 0\n").is_err());
        assert!(parse_config("[api]\nmax_pages = 0\n").is_err());
    }

    #[test]
    fn test_rejects_invalid_toml() {
        let err = parse_config("[git\nremote =").unwrap_err();
        assert!(matches!(err, TaggerError::Config(_)));
    }

    #[test]
    fn test_clone_url() {
        let git = GitConfig {
            host_url: "https://git.example.com/".to_string(),
            ..GitConfig::default()
        };
        assert_eq!(
            git.clone_url(&RepoSlug::new("acme", "mono")),
            "https://git.example.com/acme/mono.git"
        );
    }

    #[test]
    fn test_render_tag_message() {
        assert_eq!(
            render_tag_message("Release {tag_version}", "V1.2.0-beta", "app/V1.2.0-beta"),
            "Release V1.2.0-beta"
        );
        assert_eq!(
            render_tag_message("{tag} ({tag_version})", "V2.0.0", "app/V2.0.0"),
            "app/V2.0.0 (V2.0.0)"
        );
    }
}
