//! Process configuration read from the environment

use std::str::FromStr;

use anyhow::{Context, Result};
use cardgen_core::GenerationPolicy;

/// Server, database and generation policy settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub policy: GenerationPolicy,
}

impl Settings {
    /// Read settings from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for
    /// everything except `DATABASE_URL`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let mut policy = GenerationPolicy::default();
        if let Some(value) = parse(&lookup, "MAX_CARDS_PER_GENERATION")? {
            policy.default_max_cards = value;
        }
        if let Some(value) = parse(&lookup, "DECK_CAPACITY_MULTIPLIER")? {
            policy.deck_capacity_multiplier = value;
        }
        if let Some(value) = parse(&lookup, "DUPLICATE_THRESHOLD")? {
            policy.duplicate_threshold = value;
        }
        if let Some(value) = parse(&lookup, "SIMILAR_WORD_THRESHOLD")? {
            policy.similar_word_threshold = value;
        }
        policy.validate().context("invalid generation policy")?;

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&lookup, "PORT")?.unwrap_or(3000),
            db_max_connections: parse(&lookup, "DB_MAX_CONNECTIONS")?.unwrap_or(10),
            policy,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{key} has an invalid value: {raw}"))
        })
        .transpose()
}
