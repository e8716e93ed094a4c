//! Service configuration.
//!
//! Loaded in priority order: environment variables over `config.toml` over
//! built-in defaults. The defaults are enough to run the mock locally;
//! deployments override the callback URL and compression through the
//! environment.

use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use bizmock_core::Contact;
use bizmock_webhook::{ClientConfig, WebhookConfig, MIN_STATUS_MERGE_INTERVAL};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// A contact seeded into the synthetic traffic generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactEntry {
    /// Platform account id.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Complete service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind host.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,

    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,

    /// Callback URL webhook requests are delivered to. Must be `https`.
    ///
    /// Environment variable: `WEBHOOK_URL`
    #[serde(default = "default_webhook_url", alias = "WEBHOOK_URL")]
    pub webhook_url: String,

    /// Whether to gzip webhook payloads above the size threshold.
    ///
    /// Environment variable: `WEBHOOK_COMPRESS`
    #[serde(default, alias = "WEBHOOK_COMPRESS")]
    pub compress: bool,

    /// Minimum payload size in bytes before compression applies.
    ///
    /// Environment variable: `WEBHOOK_COMPRESS_MIN_SIZE`
    #[serde(default = "default_compress_min_size", alias = "WEBHOOK_COMPRESS_MIN_SIZE")]
    pub compress_min_size: usize,

    /// Maximum status events merged into one webhook request.
    ///
    /// Environment variable: `WEBHOOK_MAX_STATUS_BATCH`
    #[serde(default = "default_max_status_batch", alias = "WEBHOOK_MAX_STATUS_BATCH")]
    pub max_status_batch: usize,

    /// Seconds between status batch drains; two at minimum.
    ///
    /// Environment variable: `WEBHOOK_STATUS_MERGE_INTERVAL_SECS`
    #[serde(
        default = "default_status_merge_interval_secs",
        alias = "WEBHOOK_STATUS_MERGE_INTERVAL_SECS"
    )]
    pub status_merge_interval_secs: u64,

    /// Capacity of the delivery work queue.
    ///
    /// Environment variable: `WEBHOOK_QUEUE_CAPACITY`
    #[serde(default = "default_queue_capacity", alias = "WEBHOOK_QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    /// Seconds added to the delivery backoff per consecutive failure.
    ///
    /// Environment variable: `WEBHOOK_BACKOFF_INCREMENT_SECS`
    #[serde(default = "default_backoff_increment_secs", alias = "WEBHOOK_BACKOFF_INCREMENT_SECS")]
    pub backoff_increment_secs: u64,

    /// Timeout in seconds for one callback request.
    ///
    /// Environment variable: `WEBHOOK_TIMEOUT_SECS`
    #[serde(default = "default_delivery_timeout_secs", alias = "WEBHOOK_TIMEOUT_SECS")]
    pub delivery_timeout_secs: u64,

    /// Whether to verify the callback endpoint's TLS certificate.
    ///
    /// Environment variable: `WEBHOOK_VERIFY_TLS`
    #[serde(default = "default_verify_tls", alias = "WEBHOOK_VERIFY_TLS")]
    pub verify_tls: bool,

    /// Contacts seeded into the generator.
    #[serde(default = "default_contacts")]
    pub contacts: Vec<ContactEntry>,

    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Loads configuration from defaults, `config.toml`, and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Fails when a source cannot be parsed or validation rejects the
    /// merged result.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the merged configuration for values the pipeline cannot run
    /// with.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }
        if self.queue_capacity == 0 {
            anyhow::bail!("queue_capacity must be greater than 0");
        }
        if self.max_status_batch == 0 {
            anyhow::bail!("max_status_batch must be greater than 0");
        }
        if !self.webhook_url.starts_with("https://") {
            anyhow::bail!("webhook_url must use https");
        }
        if Duration::from_secs(self.status_merge_interval_secs) < MIN_STATUS_MERGE_INTERVAL {
            anyhow::bail!(
                "status_merge_interval_secs must be at least {}s to avoid starving the queue",
                MIN_STATUS_MERGE_INTERVAL.as_secs()
            );
        }
        if self.contacts.is_empty() {
            anyhow::bail!("at least one contact is required");
        }
        Ok(())
    }

    /// Converts to the pipeline's configuration.
    pub fn to_webhook_config(&self) -> WebhookConfig {
        WebhookConfig {
            url: self.webhook_url.clone(),
            compress: self.compress,
            compress_min_size: self.compress_min_size,
            max_status_batch: self.max_status_batch,
            status_merge_interval: Duration::from_secs(self.status_merge_interval_secs),
            queue_capacity: self.queue_capacity,
            backoff_increment: Duration::from_secs(self.backoff_increment_secs),
            backoff_floor: Duration::ZERO,
            client: ClientConfig {
                timeout: Duration::from_secs(self.delivery_timeout_secs),
                verify_tls: self.verify_tls,
                ..ClientConfig::default()
            },
        }
    }

    /// The generator's contact set.
    pub fn contacts(&self) -> Vec<Contact> {
        self.contacts.iter().map(|c| Contact::new(&c.id, &c.name)).collect()
    }

    /// Parses the bind address from host and port.
    ///
    /// # Errors
    ///
    /// Fails when host and port do not form a valid socket address.
    pub fn server_addr(&self) -> Result<SocketAddr> {
        SocketAddr::from_str(&format!("{}:{}", self.host, self.port))
            .context("invalid server address")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            webhook_url: default_webhook_url(),
            compress: false,
            compress_min_size: default_compress_min_size(),
            max_status_batch: default_max_status_batch(),
            status_merge_interval_secs: default_status_merge_interval_secs(),
            queue_capacity: default_queue_capacity(),
            backoff_increment_secs: default_backoff_increment_secs(),
            delivery_timeout_secs: default_delivery_timeout_secs(),
            verify_tls: default_verify_tls(),
            contacts: default_contacts(),
            rust_log: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9090
}

fn default_webhook_url() -> String {
    "https://localhost:9000/webhook".to_string()
}

fn default_compress_min_size() -> usize {
    2048
}

fn default_max_status_batch() -> usize {
    1000
}

fn default_status_merge_interval_secs() -> u64 {
    3
}

fn default_queue_capacity() -> usize {
    100
}

fn default_backoff_increment_secs() -> u64 {
    3
}

fn default_delivery_timeout_secs() -> u64 {
    30
}

fn default_verify_tls() -> bool {
    true
}

fn default_contacts() -> Vec<ContactEntry> {
    vec![
        ContactEntry { id: "491710000001".into(), name: "TestUser One".into() },
        ContactEntry { id: "491710000002".into(), name: "TestUser Two".into() },
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.port, 9090);
        assert_eq!(config.queue_capacity, 100);
    }

    #[test]
    fn non_https_webhook_rejected() {
        let config = Config { webhook_url: "http://localhost:9000/webhook".into(), ..Default::default() };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("https"));
    }

    #[test]
    fn sub_two_second_merge_interval_rejected() {
        let config = Config { status_merge_interval_secs: 1, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_queue_capacity_rejected() {
        let config = Config { queue_capacity: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn webhook_config_conversion_carries_settings() {
        let config = Config {
            compress: true,
            compress_min_size: 512,
            status_merge_interval_secs: 5,
            backoff_increment_secs: 7,
            ..Default::default()
        };
        let webhook = config.to_webhook_config();
        assert!(webhook.compress);
        assert_eq!(webhook.compress_min_size, 512);
        assert_eq!(webhook.status_merge_interval, Duration::from_secs(5));
        assert_eq!(webhook.backoff_increment, Duration::from_secs(7));
        assert_eq!(webhook.backoff_floor, Duration::ZERO);
    }

    #[test]
    fn server_addr_parses() {
        let config = Config { host: "127.0.0.1".into(), port: 9999, ..Default::default() };
        let addr = config.server_addr().unwrap();
        assert_eq!(addr.port(), 9999);
    }
}
