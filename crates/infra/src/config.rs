//! Environment-driven process configuration.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::lifecycle::LifecycleConfig;

pub const ENV_BIND_ADDR: &str = "STOREFRONT_BIND_ADDR";
pub const ENV_TICK_MS: &str = "STOREFRONT_TICK_MS";
pub const ENV_DWELL_MS: &str = "STOREFRONT_DWELL_MS";
pub const ENV_SEED_DEMO_PRODUCTS: &str = "STOREFRONT_SEED_DEMO_PRODUCTS";

#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub bind_addr: SocketAddr,
    pub lifecycle: LifecycleConfig,
    pub seed_demo_products: bool,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            lifecycle: LifecycleConfig::default(),
            seed_demo_products: true,
        }
    }
}

impl StorefrontConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Unset keys keep their
    /// defaults; unparsable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(addr) = parse_var(&lookup, ENV_BIND_ADDR) {
            cfg.bind_addr = addr;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_TICK_MS).filter(|ms| positive(ENV_TICK_MS, *ms)) {
            cfg.lifecycle.tick_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_DWELL_MS) {
            cfg.lifecycle.dwell_threshold = Duration::from_millis(ms);
        }
        if let Some(seed) = lookup(ENV_SEED_DEMO_PRODUCTS) {
            match parse_bool(&seed) {
                Some(b) => cfg.seed_demo_products = b,
                None => warn!(key = ENV_SEED_DEMO_PRODUCTS, value = %seed, "ignoring invalid boolean"),
            }
        }

        cfg
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "ignoring invalid configuration value");
            None
        }
    }
}

fn positive(key: &str, ms: u64) -> bool {
    if ms == 0 {
        warn!(key, "ignoring zero interval");
    }
    ms > 0
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
