use crate::error::{QueueError, Result};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::time::Duration;
use url::Url;

/// Connection and behaviour settings for a queue.
///
/// When `uri` is set its host, username and password win over the
/// discrete fields; see [`Config::connection_url`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Store address as `host:port`.
    pub host: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Connect with `rediss://`. Certificate checks need the `tls` crate feature.
    pub tls: bool,
    /// A single `redis://` or `rediss://` connection string.
    pub uri: Option<String>,
    /// Deadline for connecting and for every individual store command.
    pub timeout: Duration,
    /// Drop items that fail to decode instead of putting them back.
    pub no_retry: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost:6379".to_string(),
            username: None,
            password: None,
            tls: false,
            uri: None,
            timeout: Duration::from_secs(3),
            no_retry: false,
        }
    }
}

impl Config {
    /// Rejects settings that can never produce a working connection.
    pub fn validate(&self) -> Result<()> {
        if self.uri.is_none() && self.host.trim().is_empty() {
            return Err(QueueError::Validation("Host must not be empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(QueueError::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolves the settings into the URL handed to the Redis driver.
    ///
    /// Discrete credentials are taken literally and percent-encoded here;
    /// credentials inside `uri` are expected to be encoded already.
    pub fn connection_url(&self) -> Result<Url> {
        let mut host = self.host.clone();
        let mut username = self.username.as_deref().map(encode_credential);
        let mut password = self.password.as_deref().map(encode_credential);
        let mut tls = self.tls;

        if let Some(uri) = &self.uri {
            let parsed = Url::parse(uri)?;
            let parsed_host = parsed.host_str().ok_or_else(|| {
                QueueError::Validation(format!("Connection URI has no host: {}", uri))
            })?;
            host = match parsed.port() {
                Some(port) => format!("{}:{}", parsed_host, port),
                None => parsed_host.to_string(),
            };
            username = Some(parsed.username().to_string()).filter(|u| !u.is_empty());
            password = parsed.password().map(str::to_string);
            tls = tls || parsed.scheme() == "rediss";
        }

        let scheme = if tls { "rediss" } else { "redis" };
        let mut url = Url::parse(&format!("{}://{}/", scheme, host))?;
        if let Some(username) = &username {
            url.set_username(username).map_err(|_| {
                QueueError::Validation("Username cannot be set for this host".to_string())
            })?;
        }
        if let Some(password) = &password {
            url.set_password(Some(password)).map_err(|_| {
                QueueError::Validation("Password cannot be set for this host".to_string())
            })?;
        }
        Ok(url)
    }
}

fn encode_credential(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = Some(password.into());
        self
    }

    pub fn tls(mut self, enabled: bool) -> Self {
        self.config.tls = enabled;
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.config.uri = Some(uri.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout = Duration::from_millis(ms);
        self
    }

    pub fn no_retry(mut self) -> Self {
        self.config.no_retry = true;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
