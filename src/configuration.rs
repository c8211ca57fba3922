use std::time::Duration;

use lettre::message::Mailbox;
use lettre::Address;
use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;

/// Environment variables the relay reads, and the settings key each one fills.
const RELAY_ENVIRONMENT: [(&str, &str); 9] = [
    ("SMTP_HOST", "relay.smtp_host"),
    ("SMTP_PORT", "relay.smtp_port"),
    ("SMTP_USER", "relay.smtp_user"),
    ("SMTP_PASS", "relay.smtp_pass"),
    ("SMTP_VERIFY", "relay.verify_connection"),
    ("SMTP_TIMEOUT_MS", "relay.timeout_milliseconds"),
    ("MAIL_TO", "relay.mail_to"),
    ("FROM_NAME", "relay.from_name"),
    ("FROM_EMAIL", "relay.from_email"),
];

const IMPLICIT_TLS_PORT: u16 = 465;

#[derive(serde::Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationSettings,
    #[serde(default)]
    pub relay: RelaySettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
        }
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct RelaySettings {
    pub smtp_host: Option<String>,
    #[serde(
        default = "default_smtp_port",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<Secret<String>>,
    #[serde(default = "default_verify_connection")]
    pub verify_connection: bool,
    #[serde(
        default = "default_timeout_milliseconds",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub timeout_milliseconds: u64,
    #[serde(default = "default_mail_to")]
    pub mail_to: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    pub from_email: Option<String>,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_user: None,
            smtp_pass: None,
            verify_connection: default_verify_connection(),
            timeout_milliseconds: default_timeout_milliseconds(),
            mail_to: default_mail_to(),
            from_name: default_from_name(),
            from_email: None,
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_verify_connection() -> bool {
    true
}

fn default_timeout_milliseconds() -> u64 {
    10_000
}

fn default_mail_to() -> String {
    "contact@example.com".into()
}

fn default_from_name() -> String {
    "Portfolio".into()
}

fn default_from_email() -> &'static str {
    "noreply@example.com"
}

/// Everything needed to open one authenticated SMTP session.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Secret<String>,
    pub timeout: Duration,
}

impl SmtpSettings {
    /// Port 465 speaks TLS from the first byte, anything else upgrades with STARTTLS.
    pub fn implicit_tls(&self) -> bool {
        self.port == IMPLICIT_TLS_PORT
    }
}

#[derive(thiserror::Error, Debug)]
pub enum MailboxError {
    #[error("{0} is not a valid mailbox address")]
    InvalidAddress(String, #[source] lettre::address::AddressError),
}

impl Settings {
    pub fn get() -> Result<Self, config::ConfigError> {
        Self::load(|variable| std::env::var(variable).ok())
    }

    /// Builds settings from `config.yaml`, `APP_`-prefixed variables and the relay
    /// variables returned by `lookup`. Blank relay variables count as unset.
    pub fn load<F>(lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder()
            .add_source(config::File::new("config.yaml", config::FileFormat::Yaml).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            );

        for (variable, key) in RELAY_ENVIRONMENT {
            let value = lookup(variable).filter(|value| !value.trim().is_empty());
            builder = builder.set_override_option(key, value)?;
        }

        builder.build()?.try_deserialize::<Self>()
    }
}

impl RelaySettings {
    /// Returns the session settings, or the names of the required variables that are unset.
    pub fn smtp(&self) -> Result<SmtpSettings, Vec<&'static str>> {
        match (&self.smtp_host, &self.smtp_user, &self.smtp_pass) {
            (Some(host), Some(user), Some(password)) => Ok(SmtpSettings {
                host: host.clone(),
                port: self.smtp_port,
                user: user.clone(),
                password: password.clone(),
                timeout: self.timeout(),
            }),
            (host, user, password) => {
                let mut missing = Vec::new();
                if host.is_none() {
                    missing.push("SMTP_HOST");
                }
                if user.is_none() {
                    missing.push("SMTP_USER");
                }
                if password.is_none() {
                    missing.push("SMTP_PASS");
                }
                Err(missing)
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }

    /// `FROM_NAME <FROM_EMAIL>`. Without `FROM_EMAIL` the SMTP login is used
    /// when it is an address, and a fixed default identity otherwise.
    pub fn sender(&self, smtp: &SmtpSettings) -> Result<Mailbox, MailboxError> {
        let address = match &self.from_email {
            Some(from_email) => parse_address(from_email)?,
            None => parse_address(&smtp.user).or_else(|_| parse_address(default_from_email()))?,
        };
        Ok(Mailbox::new(Some(self.from_name.clone()), address))
    }

    pub fn recipient(&self) -> Result<Mailbox, MailboxError> {
        Ok(Mailbox::new(None, parse_address(&self.mail_to)?))
    }
}

fn parse_address(address: &str) -> Result<Address, MailboxError> {
    address
        .trim()
        .parse::<Address>()
        .map_err(|e| MailboxError::InvalidAddress(address.to_string(), e))
}
