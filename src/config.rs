// 配置管理
use crate::utils::error::ConfigError;
use crate::utils::file::expand_home;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "config.toml";
pub const DEFAULT_LOG_SUFFIX: &str = "_upload_log";
const DEFAULT_REFRESH_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub remote: RemoteConfig,
    pub log_path: PathBuf,
    pub source_dir: Option<PathBuf>,
    pub filters: FilterPolicy,
    pub viewer: Option<ViewerConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Ftp,
    Sftp,
}

impl Protocol {
    pub fn default_port(self) -> u16 {
        match self {
            Protocol::Ftp => 21,
            Protocol::Sftp => 22,
        }
    }
}

#[derive(Clone)]
pub struct RemoteConfig {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub directory: String,
    pub key_file: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

// 不打印密码
impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("directory", &self.directory)
            .field("key_file", &self.key_file)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RemoteConfig {
    /// Same endpoint and credentials, pointed at another remote directory.
    pub fn with_directory(&self, directory: &str) -> Self {
        Self {
            directory: directory.to_string(),
            ..self.clone()
        }
    }

    pub fn location(&self) -> String {
        format!("{}/{}", self.host, self.directory)
    }
}

/// Which local entries qualify for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPolicy {
    pub extensions: Vec<String>,
    pub min_size: u64,
}

impl FilterPolicy {
    /// Case-sensitive suffix match against any configured extension.
    pub fn matches_name(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    pub fn accepts(&self, name: &str, size: u64) -> bool {
        self.matches_name(name) && size >= self.min_size
    }
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub remote_log_dir: String,
    pub mirror_dir: PathBuf,
    pub refresh: Duration,
    pub suffix: String,
}

// 配置文件的原始结构
#[derive(Deserialize)]
struct RawConfig {
    ftp: RawFtp,
    paths: RawPaths,
    filters: RawFilters,
    viewer: Option<RawViewer>,
}

#[derive(Deserialize)]
struct RawFtp {
    host: String,
    port: Option<u16>,
    protocol: Option<Protocol>,
    user: String,
    password: String,
    directory: String,
    key_file: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

#[derive(Deserialize)]
struct RawPaths {
    log: PathBuf,
    source: Option<PathBuf>,
}

#[derive(Deserialize)]
struct RawFilters {
    extensions: String,
    min_size: u64,
}

#[derive(Deserialize)]
struct RawViewer {
    remote_log_dir: String,
    mirror_dir: PathBuf,
    refresh_secs: Option<u64>,
    suffix: Option<String>,
}

impl Config {
    /// `config.toml` next to the running executable.
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_CONFIG_NAME)))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_NAME))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let raw: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_raw(raw)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        require_non_empty("ftp.host", &raw.ftp.host)?;
        require_non_empty("ftp.user", &raw.ftp.user)?;
        require_non_empty("ftp.directory", &raw.ftp.directory)?;

        let protocol = raw.ftp.protocol.unwrap_or(Protocol::Ftp);
        let remote = RemoteConfig {
            protocol,
            host: raw.ftp.host.trim().to_string(),
            port: raw.ftp.port.unwrap_or_else(|| protocol.default_port()),
            user: raw.ftp.user,
            password: raw.ftp.password,
            directory: raw.ftp.directory,
            key_file: raw.ftp.key_file.map(|p| expand_home(&p)),
            timeout: raw.ftp.timeout_secs.map(Duration::from_secs),
        };

        let filters = FilterPolicy {
            extensions: parse_extensions(&raw.filters.extensions)?,
            min_size: raw.filters.min_size,
        };

        let viewer = match raw.viewer {
            Some(v) => {
                require_non_empty("viewer.remote_log_dir", &v.remote_log_dir)?;
                let suffix = v.suffix.unwrap_or_else(|| DEFAULT_LOG_SUFFIX.to_string());
                require_non_empty("viewer.suffix", &suffix)?;
                let refresh_secs = v.refresh_secs.unwrap_or(DEFAULT_REFRESH_SECS);
                if refresh_secs == 0 {
                    return Err(ConfigError::Invalid {
                        field: "viewer.refresh_secs",
                        message: "must be at least 1".to_string(),
                    });
                }
                Some(ViewerConfig {
                    remote_log_dir: v.remote_log_dir,
                    mirror_dir: v.mirror_dir,
                    refresh: Duration::from_secs(refresh_secs),
                    suffix,
                })
            }
            None => None,
        };

        Ok(Config {
            remote,
            log_path: raw.paths.log,
            source_dir: raw.paths.source,
            filters,
            viewer,
        })
    }

    pub fn viewer(&self) -> Result<&ViewerConfig, ConfigError> {
        self.viewer.as_ref().ok_or_else(|| ConfigError::Invalid {
            field: "viewer",
            message: "section is required for sync/status/watch".to_string(),
        })
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field,
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

// 逗号分隔，去掉空白和空项
fn parse_extensions(list: &str) -> Result<Vec<String>, ConfigError> {
    let extensions: Vec<String> = list
        .split(',')
        .map(str::trim)
        .filter(|ext| !ext.is_empty())
        .map(str::to_string)
        .collect();

    if extensions.is_empty() {
        return Err(ConfigError::Invalid {
            field: "filters.extensions",
            message: format!("no usable extension in {:?}", list),
        });
    }
    Ok(extensions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[ftp]
host = "10.86.254.61"
user = "eagle"
password = "eagle123"
directory = "ENG_DATA/HR"

[paths]
log = "logs/tde_upload_log.csv"

[filters]
extensions = ".csv, .txt,,"
min_size = 100
"#;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.remote.protocol, Protocol::Ftp);
        assert_eq!(config.remote.port, 21);
        assert_eq!(config.remote.location(), "10.86.254.61/ENG_DATA/HR");
        assert_eq!(config.filters.extensions, vec![".csv", ".txt"]);
        assert_eq!(config.filters.min_size, 100);
        assert!(config.source_dir.is_none());
        assert!(config.viewer.is_none());
        assert!(config.viewer().is_err());
    }

    #[test]
    fn sftp_defaults_to_port_22_and_reads_viewer() {
        let content = SAMPLE.replace("[ftp]", "[ftp]\nprotocol = \"sftp\"\ntimeout_secs = 5")
            + "\n[viewer]\nremote_log_dir = \"HR/log\"\nmirror_dir = \"mirror\"\n";
        let config = Config::from_toml_str(&content).unwrap();
        assert_eq!(config.remote.protocol, Protocol::Sftp);
        assert_eq!(config.remote.port, 22);
        assert_eq!(config.remote.timeout, Some(Duration::from_secs(5)));

        let viewer = config.viewer().unwrap();
        assert_eq!(viewer.refresh, Duration::from_secs(60));
        assert_eq!(viewer.suffix, DEFAULT_LOG_SUFFIX);
    }

    #[test]
    fn missing_required_field_fails() {
        let content = SAMPLE.replace("password = \"eagle123\"\n", "");
        assert!(matches!(
            Config::from_toml_str(&content),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn non_integer_min_size_fails() {
        let content = SAMPLE.replace("min_size = 100", "min_size = \"big\"");
        assert!(matches!(
            Config::from_toml_str(&content),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn empty_extension_list_fails() {
        let content = SAMPLE.replace(".csv, .txt,,", " , ");
        assert!(matches!(
            Config::from_toml_str(&content),
            Err(ConfigError::Invalid { field: "filters.extensions", .. })
        ));
    }

    #[test]
    fn empty_viewer_suffix_fails() {
        let content = SAMPLE.to_string()
            + "\n[viewer]\nremote_log_dir = \"HR/log\"\nmirror_dir = \"mirror\"\nsuffix = \" \"\n";
        assert!(matches!(
            Config::from_toml_str(&content),
            Err(ConfigError::Invalid { field: "viewer.suffix", .. })
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        assert!(matches!(Config::load(&path), Err(ConfigError::NotFound(_))));

        std::fs::write(&path, SAMPLE).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.remote.user, "eagle");
    }

    #[test]
    fn debug_output_hides_password() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        let printed = format!("{:?}", config.remote);
        assert!(!printed.contains("eagle123"));
    }

    #[test]
    fn filter_policy_is_case_sensitive_suffix_match() {
        let policy = FilterPolicy {
            extensions: vec![".csv".to_string()],
            min_size: 100,
        };
        assert!(policy.accepts("a.csv", 500));
        assert!(policy.accepts("a.csv", 100));
        assert!(!policy.accepts("c.csv", 50));
        assert!(!policy.accepts("b.txt", 500));
        assert!(!policy.accepts("A.CSV", 500));
    }
}
