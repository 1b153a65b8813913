use serde::{Deserialize, Serialize};
use url::Url;

use crate::mapping::FieldMappingSpec;
use crate::record::PathQueryError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("required setting `{0}` is empty")]
    MissingField(&'static str),
    #[error("root url `{url}` is invalid: {message}")]
    InvalidRootUrl { url: String, message: String },
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("extra variable path `{path}` is invalid: {source}")]
    InvalidVariablePath {
        path: String,
        #[source]
        source: PathQueryError,
    },
}

/// Where the Basic-Auth credential comes from. When `password_env_var` is
/// set it takes precedence over `password`.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub user: String,
    pub password: String,
    pub password_env_var: String,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("password_env_var", &self.password_env_var)
            .finish()
    }
}

/// Immutable parameters of one harvesting run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub root_url: String,
    pub credentials: CredentialsConfig,
    pub process_name: String,
    pub project: String,
    pub from_date: String,
    pub from_date_criteria: String,
    pub to_date: String,
    pub to_date_criteria: String,
    /// Empty means no status filter.
    pub status_filter: String,
    /// Server-side page size of the instance search; 0 means unlimited.
    pub instance_limit: usize,
    pub offset: usize,
    /// Instances summarized and harvested per iteration; 0 means all.
    pub paging_size: usize,
    /// Simultaneous in-flight requests during the summary and detail phases.
    pub concurrency: usize,
    pub mapping: FieldMappingSpec,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            root_url: String::new(),
            credentials: CredentialsConfig::default(),
            process_name: String::new(),
            project: String::new(),
            from_date: String::new(),
            from_date_criteria: "createdAfter".to_string(),
            to_date: String::new(),
            to_date_criteria: "modifiedBefore".to_string(),
            status_filter: String::new(),
            instance_limit: 0,
            offset: 0,
            paging_size: 0,
            concurrency: 10,
            mapping: FieldMappingSpec::baw_default(),
        }
    }
}

impl HarvestConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_root_url()?;
        let required = [
            ("process_name", &self.process_name),
            ("project", &self.project),
            ("from_date", &self.from_date),
            ("from_date_criteria", &self.from_date_criteria),
            ("to_date", &self.to_date),
            ("to_date_criteria", &self.to_date_criteria),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField(name));
            }
        }
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        self.mapping.compile()?;
        Ok(())
    }

    /// The root URL with a trailing slash so endpoint paths join under it.
    pub fn parsed_root_url(&self) -> Result<Url, ConfigError> {
        if self.root_url.trim().is_empty() {
            return Err(ConfigError::MissingField("root_url"));
        }
        let mut raw = self.root_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw).map_err(|err| ConfigError::InvalidRootUrl {
            url: self.root_url.clone(),
            message: err.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidRootUrl {
                url: self.root_url.clone(),
                message: format!("unsupported scheme `{}`", url.scheme()),
            });
        }
        Ok(url)
    }
}
