//! Provider registry
//!
//! `Security` keeps the ordered provider list and the global properties.
//! Lookups are first-match over the list, or exact-name when a provider is
//! named. The mutex is held only while searching or mutating; instantiators
//! run after it is released.
//!
//! Providers are installed from a properties file listing
//! `provider.1 = <module>`, `provider.2 = <module>`, ... up to the first gap.
//! Modules are looked up in a [`ProviderCatalog`], which replaces loading
//! shared libraries with explicit registration.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};
use once_cell::sync::Lazy;

use crate::common::{Result, SecurityError};
use crate::config::{defaults, Properties, SecuritySettings};

use super::provider::{Provider, ALIAS_PREFIX};
use super::spi::{Instantiator, ServiceType, Spi};

/// A resolved engine with its canonical algorithm name and provider
#[derive(Debug)]
pub struct SpiHandle {
    pub spi: Spi,
    pub algorithm: String,
    pub provider: Arc<Provider>,
}

/// Constructor of a provider module
pub type ProviderModule = fn() -> Provider;

/// Named provider modules that configuration files may refer to
#[derive(Debug, Clone)]
pub struct ProviderCatalog {
    modules: HashMap<String, ProviderModule>,
}

impl ProviderCatalog {
    /// A catalog with no modules
    pub fn empty() -> Self {
        Self { modules: HashMap::new() }
    }

    /// A catalog containing the built-in BeeCrypt provider
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        catalog.register(defaults::BUILTIN_PROVIDER_MODULE, crate::provider::beecrypt_provider);
        catalog
    }

    pub fn register(&mut self, name: impl Into<String>, module: ProviderModule) {
        self.modules.insert(name.into(), module);
    }

    /// Find a module by its exact name, or by the file stem of a library path
    /// (`/usr/lib/libbeecrypt.so` matches `beecrypt`)
    pub fn lookup(&self, name: &str) -> Option<ProviderModule> {
        if let Some(m) = self.modules.get(name) {
            return Some(*m);
        }
        let stem = Path::new(name).file_stem()?.to_str()?;
        let stem = stem.strip_prefix("lib").unwrap_or(stem);
        self.modules.get(stem).copied()
    }
}

impl Default for ProviderCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

struct Inner {
    providers: Vec<Arc<Provider>>,
    properties: Properties,
}

/// The provider registry
pub struct Security {
    inner: Mutex<Inner>,
}

static GLOBAL: Lazy<Security> = Lazy::new(|| {
    let settings = SecuritySettings::load().unwrap_or_else(|e| {
        warn!("Unable to load security settings ({}), using defaults", e);
        SecuritySettings::default()
    });
    Security::from_settings(&settings, &ProviderCatalog::builtin())
});

impl Security {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner { providers: Vec::new(), properties: Properties::new() }),
        }
    }

    /// A registry with only the built-in provider installed
    pub fn with_builtin() -> Self {
        let security = Self::new();
        security.add_provider(crate::provider::beecrypt_provider());
        security
    }

    /// Process-wide registry, initialized from [`SecuritySettings`] on first use
    pub fn global() -> &'static Security {
        &GLOBAL
    }

    /// Build a registry from the provider configuration named in `settings`
    ///
    /// An unreadable configuration file is logged and the built-in provider
    /// is installed instead.
    pub fn from_settings(settings: &SecuritySettings, catalog: &ProviderCatalog) -> Self {
        match Properties::load_file(&settings.conf_file) {
            Ok(props) => {
                debug!("Loaded provider configuration from {}", settings.conf_file.display());
                Self::from_properties(props, catalog)
            }
            Err(e) => {
                warn!(
                    "Unable to read provider configuration {}: {}; installing built-in provider",
                    settings.conf_file.display(),
                    e
                );
                Self::with_builtin()
            }
        }
    }

    /// Build a registry from already parsed configuration properties
    pub fn from_properties(properties: Properties, catalog: &ProviderCatalog) -> Self {
        let security = Self::new();

        let mut index = 1;
        while let Some(module) = properties.get(&format!("provider.{}", index)) {
            match catalog.lookup(module) {
                Some(create) => {
                    let provider = create();
                    let name = provider.name().to_string();
                    match security.add_provider(provider) {
                        Some(pos) => info!("Registered provider {} from {} at position {}", name, module, pos),
                        None => warn!("Provider {} from {} is already installed", name, module),
                    }
                }
                None => warn!("Unknown provider module {} (provider.{})", module, index),
            }
            index += 1;
        }

        security.lock().properties = properties;
        security
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Append a provider
    ///
    /// Returns the 1-based position, or `None` if a provider with the same
    /// name is already installed.
    pub fn add_provider(&self, provider: impl Into<Arc<Provider>>) -> Option<usize> {
        let provider = provider.into();
        let mut inner = self.lock();
        if inner.providers.iter().any(|p| p.name() == provider.name()) {
            return None;
        }
        inner.providers.push(provider);
        Some(inner.providers.len())
    }

    /// Insert a provider at a 1-based position; out-of-range positions append
    pub fn insert_provider_at(&self, provider: impl Into<Arc<Provider>>, position: usize) -> Option<usize> {
        let provider = provider.into();
        let mut inner = self.lock();
        if inner.providers.iter().any(|p| p.name() == provider.name()) {
            return None;
        }
        if position == 0 || position > inner.providers.len() {
            inner.providers.push(provider);
            Some(inner.providers.len())
        } else {
            inner.providers.insert(position - 1, provider);
            Some(position)
        }
    }

    /// Remove a provider by name
    pub fn remove_provider(&self, name: &str) -> bool {
        let mut inner = self.lock();
        let before = inner.providers.len();
        inner.providers.retain(|p| p.name() != name);
        before != inner.providers.len()
    }

    /// Installed providers in lookup order
    pub fn providers(&self) -> Vec<Arc<Provider>> {
        self.lock().providers.clone()
    }

    pub fn provider(&self, name: &str) -> Option<Arc<Provider>> {
        self.lock().providers.iter().find(|p| p.name() == name).cloned()
    }

    pub fn property(&self, key: &str) -> Option<String> {
        self.lock().properties.get(key).map(str::to_string)
    }

    pub fn set_property(&self, key: &str, value: &str) {
        self.lock().properties.set(key, value);
    }

    /// Default keystore type (`keystore.default`, else "BEE")
    pub fn keystore_default(&self) -> String {
        self.property(defaults::KEYSTORE_DEFAULT_PROPERTY)
            .unwrap_or_else(defaults::keystore_type)
    }

    /// Find `algorithm` for `service` in one provider
    ///
    /// Checks `"<type>.<alg>"`, then `"Alg.Alias.<type>.<alg>"`, whose value
    /// is either a full key or a bare algorithm name. Names match exactly
    /// first and case-insensitively second.
    fn find_in(provider: &Provider, algorithm: &str, service: ServiceType) -> Option<(Instantiator, String)> {
        let prefix = format!("{}.", service);

        let key = format!("{}{}", prefix, algorithm);
        let key = if provider.property(&key).is_some() {
            Some(key)
        } else {
            provider.find_key_ignore_case(&key).map(str::to_string)
        };
        if let Some(key) = key {
            if let Some(inst) = provider.instantiator(&key) {
                let canonical = key[prefix.len()..].to_string();
                return Some((inst, canonical));
            }
        }

        let alias = format!("{}{}{}", ALIAS_PREFIX, prefix, algorithm);
        let target = provider.property(&alias).or_else(|| {
            provider
                .find_key_ignore_case(&alias)
                .and_then(|k| provider.property(k))
        })?;
        let canonical = target.strip_prefix(&prefix).unwrap_or(target);
        let inst = provider.instantiator(&format!("{}{}", prefix, canonical))?;
        Some((inst, canonical.to_string()))
    }

    fn not_available(algorithm: &str, service: ServiceType) -> SecurityError {
        SecurityError::NoSuchAlgorithm(format!("{} {} not available", algorithm, service))
    }

    /// Resolve an engine from the first provider that publishes it
    pub fn get_spi(&self, algorithm: &str, service: ServiceType) -> Result<SpiHandle> {
        let found = {
            let inner = self.lock();
            inner.providers.iter().find_map(|p| {
                Self::find_in(p, algorithm, service).map(|(inst, alg)| (inst, alg, Arc::clone(p)))
            })
        };

        match found {
            Some((inst, alg, provider)) => {
                debug!("{} {} resolved by {}", alg, service, provider.name());
                Ok(SpiHandle { spi: inst(), algorithm: alg, provider })
            }
            None => {
                debug!("{} {} not available from any provider", algorithm, service);
                Err(Self::not_available(algorithm, service))
            }
        }
    }

    /// Resolve an engine from the provider with the given name
    pub fn get_spi_with_provider(&self, algorithm: &str, service: ServiceType, provider: &str) -> Result<SpiHandle> {
        let p = self
            .provider(provider)
            .ok_or_else(|| SecurityError::NoSuchProvider(format!("{} Provider not available", provider)))?;
        Self::get_spi_from(algorithm, service, &p)
    }

    /// Resolve an engine from an explicit provider
    pub fn get_spi_from(algorithm: &str, service: ServiceType, provider: &Arc<Provider>) -> Result<SpiHandle> {
        let (inst, alg) = Self::find_in(provider, algorithm, service)
            .ok_or_else(|| Self::not_available(algorithm, service))?;
        Ok(SpiHandle { spi: inst(), algorithm: alg, provider: Arc::clone(provider) })
    }

    /// Resolve the first engine of a service type, regardless of algorithm
    pub fn get_first_spi(&self, service: ServiceType) -> Result<SpiHandle> {
        let prefix = format!("{}.", service);
        let found = {
            let inner = self.lock();
            inner.providers.iter().find_map(|p| {
                p.properties()
                    .filter(|(k, _)| k.starts_with(&prefix))
                    .find_map(|(k, _)| p.instantiator(k).map(|inst| (inst, k[prefix.len()..].to_string())))
                    .map(|(inst, alg)| (inst, alg, Arc::clone(p)))
            })
        };

        let (inst, alg, provider) = found.ok_or_else(|| {
            SecurityError::NoSuchAlgorithm(format!("no {} available", service))
        })?;
        Ok(SpiHandle { spi: inst(), algorithm: alg, provider })
    }
}

impl Default for Security {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Security {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.lock().providers.iter().map(|p| p.name().to_string()).collect();
        f.debug_struct("Security").field("providers", &names).finish()
    }
}
