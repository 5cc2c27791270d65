//! Environment configuration.

use std::net::SocketAddr;

use anyhow::Context;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_ISSUER: &str = "herald-registry";

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// `LISTEN_ADDR`
    pub listen_addr: SocketAddr,
    /// `DATABASE_URL`. Unset means bindings live in memory only.
    pub database_url: Option<String>,
    /// `JWT_SEED_B64`. Unset means an ephemeral key.
    pub jwt_seed_b64: Option<String>,
    /// `JWT_ISSUER`
    pub jwt_issuer: String,
    /// `DEV_ISSUE_TOKEN=<role>:<subject>`: log a signed bearer token at startup.
    pub dev_issue_token: Option<String>,
}

impl RegistryConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let listen_addr = non_empty("LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.into())
            .parse()
            .context("invalid LISTEN_ADDR")?;

        Ok(Self {
            listen_addr,
            database_url: non_empty("DATABASE_URL"),
            jwt_seed_b64: non_empty("JWT_SEED_B64"),
            jwt_issuer: non_empty("JWT_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.into()),
            dev_issue_token: non_empty("DEV_ISSUE_TOKEN"),
        })
    }
}
