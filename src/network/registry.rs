//! Ordered registry of network profiles.

use std::collections::HashMap;

use crate::error::{ConfigError, ConfigResult};
use crate::network::profile::NetworkProfile;

/// Name → profile mapping that remembers declaration order.
///
/// Profiles are immutable once registered.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    profiles: Vec<NetworkProfile>,
    by_name: HashMap<String, usize>,
    by_network_id: HashMap<u64, usize>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add a profile.
    ///
    /// On error the registry is left unchanged.
    pub fn register(&mut self, profile: NetworkProfile) -> ConfigResult<()> {
        if self.by_name.contains_key(&profile.name) {
            return Err(ConfigError::DuplicateNetwork(profile.name));
        }
        if let Some(&idx) = self.by_network_id.get(&profile.network_id) {
            return Err(ConfigError::DuplicateNetworkId {
                network: profile.name,
                network_id: profile.network_id,
                existing: self.profiles[idx].name.clone(),
            });
        }
        profile.validate()?;

        let idx = self.profiles.len();
        self.by_name.insert(profile.name.clone(), idx);
        self.by_network_id.insert(profile.network_id, idx);

        tracing::debug!(
            network = %profile.name,
            kind = %profile.kind(),
            network_id = profile.network_id,
            "Registered network"
        );
        self.profiles.push(profile);
        Ok(())
    }

    /// Look up a profile by name.
    pub fn lookup(&self, name: &str) -> ConfigResult<&NetworkProfile> {
        self.by_name
            .get(name)
            .map(|&idx| &self.profiles[idx])
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()))
    }

    /// Names in registration order.
    pub fn list(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    /// Profiles in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &NetworkProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
