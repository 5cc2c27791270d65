//! Push platforms and authenticated roles.
//!
//! Every role keeps its own bearer credential under a role-specific storage
//! key, and several roles may be signed in at once in the same browser
//! profile. [`Role::PRIORITY`] fixes the order in which an un-scoped lookup
//! scans those keys.

use serde::{Deserialize, Serialize};

// ── Platform ────────────────────────────────────────────────────────

/// Platform a device token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Web,
    Ios,
    Android,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Web => "web",
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }

    /// Storage key holding the cached device registration for this platform.
    pub fn registration_key(self) -> String {
        format!("herald.device_registration.{}", self.as_str())
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web" => Ok(Platform::Web),
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

// ── Role ────────────────────────────────────────────────────────────

/// An authenticated role. Each role logs in through its own flow and keeps
/// an independent bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    Pm,
    Sales,
    Employee,
    Client,
    ChannelPartner,
}

impl Role {
    /// Scan order for un-scoped credential lookups. The earliest role with a
    /// stored credential wins.
    pub const PRIORITY: [Role; 6] = [
        Role::Admin,
        Role::Pm,
        Role::Sales,
        Role::Employee,
        Role::Client,
        Role::ChannelPartner,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Pm => "pm",
            Role::Sales => "sales",
            Role::Employee => "employee",
            Role::Client => "client",
            Role::ChannelPartner => "channel-partner",
        }
    }

    /// Storage key holding this role's bearer credential.
    pub fn credential_key(self) -> String {
        format!("herald.credential.{}", self.as_str())
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::PRIORITY
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("unknown role: {s}"))
    }
}
