//! Payout settings read from the gateway configuration
//!
//! [`PayoutConfigExt`] adds the payout-specific keys to `adyconfig::Config`,
//! and [`PayoutSettings`] is the value object handed to the service.

use adyconfig::{Config, ConfigError, Environment};
use adysoap::{Credentials, Substitution, XmlBackend};
use serde_yaml::Value;
use std::time::Duration;

const DEFAULT_ENDPOINT_TEMPLATE: &str = "https://pal-%s.adyen.com/pal/servlet/soap/Payout";

/// Extension trait for the payout keys of the configuration
///
/// # Exemple
///
/// ```rust,ignore
/// use adyconfig::Config;
/// use adypayout::PayoutConfigExt;
///
/// let config = Config::load_config("")?;
/// let (username, password) = config.get_payout_credentials()?;
/// ```
pub trait PayoutConfigExt {
    /// Credentials of the account allowed to submit payouts
    fn get_payout_credentials(&self) -> Result<(String, String), ConfigError>;

    fn set_payout_credentials(&self, username: &str, password: &str) -> Result<(), ConfigError>;

    /// Endpoint URI with a `%s` slot for the environment
    fn get_payout_endpoint_template(&self) -> String;

    fn set_payout_endpoint_template(&self, template: &str) -> Result<(), ConfigError>;
}

impl PayoutConfigExt for Config {
    fn get_payout_credentials(&self) -> Result<(String, String), ConfigError> {
        let username = self.get_required_string(&["gateway", "payout", "username"])?;
        let password = self.get_password(&["gateway", "payout", "password"])?;
        Ok((username, password))
    }

    fn set_payout_credentials(&self, username: &str, password: &str) -> Result<(), ConfigError> {
        self.set_value(
            &["gateway", "payout", "username"],
            Value::String(username.to_string()),
        )?;
        self.set_value(
            &["gateway", "payout", "password"],
            Value::String(password.to_string()),
        )
    }

    fn get_payout_endpoint_template(&self) -> String {
        self.get_optional_string(&["gateway", "payout", "endpoint"])
            .unwrap_or_else(|| DEFAULT_ENDPOINT_TEMPLATE.to_string())
    }

    fn set_payout_endpoint_template(&self, template: &str) -> Result<(), ConfigError> {
        self.set_value(
            &["gateway", "payout", "endpoint"],
            Value::String(template.to_string()),
        )
    }
}

/// Everything the payout service needs from its environment
#[derive(Debug, Clone)]
pub struct PayoutSettings {
    pub environment: Environment,
    /// Used when the call parameters carry no `merchant_account`
    pub merchant_account: Option<String>,
    pub api_credentials: Credentials,
    /// Used by `submit`
    pub payout_credentials: Credentials,
    pub endpoint_template: String,
    pub timeout: Duration,
    pub substitution: Substitution,
    pub backend: XmlBackend,
}

impl PayoutSettings {
    pub fn new(
        environment: Environment,
        api_credentials: Credentials,
        payout_credentials: Credentials,
    ) -> Self {
        Self {
            environment,
            merchant_account: None,
            api_credentials,
            payout_credentials,
            endpoint_template: DEFAULT_ENDPOINT_TEMPLATE.to_string(),
            timeout: Duration::from_secs(30),
            substitution: Substitution::default(),
            backend: XmlBackend::default(),
        }
    }

    pub fn with_merchant_account(mut self, account: impl Into<String>) -> Self {
        self.merchant_account = Some(account.into());
        self
    }

    pub fn with_substitution(mut self, substitution: Substitution) -> Self {
        self.substitution = substitution;
        self
    }

    pub fn with_backend(mut self, backend: XmlBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Reads the settings from a loaded configuration
    ///
    /// Fails with [`ConfigError::NotConfigured`] when a set of credentials is
    /// missing. The merchant account stays optional.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let (api_username, api_password) = config.get_api_credentials()?;
        let (payout_username, payout_password) = config.get_payout_credentials()?;

        Ok(Self {
            environment: config.get_environment()?,
            merchant_account: config.get_merchant_account().ok(),
            api_credentials: Credentials::new(api_username, api_password),
            payout_credentials: Credentials::new(payout_username, payout_password),
            endpoint_template: config.get_payout_endpoint_template(),
            timeout: Duration::from_secs(config.get_http_timeout_secs()),
            substitution: Substitution::default(),
            backend: XmlBackend::default(),
        })
    }

    /// Endpoint URI for the configured environment
    pub fn endpoint(&self) -> String {
        self.endpoint_template
            .replacen("%s", self.environment.as_str(), 1)
    }
}
