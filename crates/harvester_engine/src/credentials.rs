use std::sync::atomic::{AtomicBool, Ordering};

use engine_logging::engine_error;
use harvester_core::CredentialsConfig;

use crate::{FailureKind, FetchError};

/// A resolved Basic-Auth credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub trait CredentialResolver: Send + Sync {
    fn resolve(&self) -> Result<Credential, FetchError>;
}

/// Reads the password from `password_env_var` when one is configured,
/// falling back to the static password when the variable is unset. The
/// missing variable is logged once per resolver, not once per request.
#[derive(Debug)]
pub struct ConfigCredentialResolver {
    config: CredentialsConfig,
    missing_env_reported: AtomicBool,
}

impl ConfigCredentialResolver {
    pub fn new(config: CredentialsConfig) -> Self {
        Self {
            config,
            missing_env_reported: AtomicBool::new(false),
        }
    }

    fn password(&self) -> Option<String> {
        let env_var = self.config.password_env_var.trim();
        if !env_var.is_empty() {
            match std::env::var(env_var) {
                Ok(password) => return Some(password),
                Err(_) => {
                    if self.report_missing_env() {
                        engine_error!(
                            "Environment variable {} for the password not found",
                            env_var
                        );
                    }
                }
            }
        }
        Some(self.config.password.clone()).filter(|p| !p.is_empty())
    }

    /// True only for the first caller.
    fn report_missing_env(&self) -> bool {
        !self.missing_env_reported.swap(true, Ordering::Relaxed)
    }
}

impl CredentialResolver for ConfigCredentialResolver {
    fn resolve(&self) -> Result<Credential, FetchError> {
        if self.config.user.trim().is_empty() {
            return Err(FetchError::new(
                FailureKind::AuthResolutionFailed,
                "no user configured",
            ));
        }
        let password = self.password().ok_or_else(|| {
            FetchError::new(FailureKind::AuthResolutionFailed, "missing password")
        })?;
        Ok(Credential {
            user: self.config.user.clone(),
            password,
        })
    }
}

/// A fixed credential, for callers that resolved it elsewhere.
#[derive(Debug, Clone)]
pub struct StaticCredential(pub Credential);

impl CredentialResolver for StaticCredential {
    fn resolve(&self) -> Result<Credential, FetchError> {
        Ok(self.0.clone())
    }
}
