//! Providers
//!
//! A provider is a named bundle of `"<ServiceType>.<Algorithm>"` properties.
//! Property values without spaces name an instantiator registered in the
//! provider's symbol table; values containing spaces are plain literals.
//! Symbols are resolved lazily and the result is cached per provider.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Mutex;

use log::{trace, warn};

use super::spi::{Instantiator, ServiceType};

/// Prefix of alias properties
pub const ALIAS_PREFIX: &str = "Alg.Alias.";

pub struct Provider {
    name: String,
    version: f64,
    info: String,
    properties: BTreeMap<String, String>,
    symbols: HashMap<String, Instantiator>,
    resolved: Mutex<HashMap<String, Instantiator>>,
}

impl Provider {
    /// Create a provider with no services
    pub fn new(name: impl Into<String>, version: f64, info: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version,
            info: info.into(),
            properties: BTreeMap::new(),
            symbols: HashMap::new(),
            resolved: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> f64 {
        self.version
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    /// Set a property
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Make `symbol` resolvable to `instantiator`
    pub fn register_symbol(&mut self, symbol: impl Into<String>, instantiator: Instantiator) {
        self.symbols.insert(symbol.into(), instantiator);
    }

    /// Bind `"<service>.<algorithm>"` to an instantiator under `symbol`
    pub fn add_service(&mut self, service: ServiceType, algorithm: &str, symbol: &str, instantiator: Instantiator) {
        self.put(format!("{}.{}", service, algorithm), symbol);
        self.register_symbol(symbol, instantiator);
    }

    /// Publish `alias` as another name for `algorithm`
    pub fn add_alias(&mut self, service: ServiceType, alias: &str, algorithm: &str) {
        self.put(
            format!("{}{}.{}", ALIAS_PREFIX, service, alias),
            format!("{}.{}", service, algorithm),
        );
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// All properties in key order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Property keys that denote services
    ///
    /// Only `"<ServiceType>.<Algorithm>"` keys bound to a symbol count;
    /// aliases, attribute keys such as `"Signature.X KeySize"` and literal
    /// values are skipped.
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|(k, v)| !k.contains(' ') && !v.contains(' ') && ServiceType::from_key(k).is_some())
            .map(|(k, _)| k.as_str())
    }

    /// Case-insensitive match of a property key
    pub(crate) fn find_key_ignore_case(&self, key: &str) -> Option<&str> {
        self.properties
            .keys()
            .find(|k| k.eq_ignore_ascii_case(key))
            .map(String::as_str)
    }

    /// Resolve the instantiator bound to a property key
    ///
    /// Returns `None` when the key is absent, its value is a literal, or the
    /// symbol is not registered.
    pub fn instantiator(&self, key: &str) -> Option<Instantiator> {
        let symbol = self.properties.get(key)?;
        if symbol.contains(' ') {
            return None;
        }

        let mut resolved = match self.resolved.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(inst) = resolved.get(key) {
            return Some(*inst);
        }

        match self.symbols.get(symbol) {
            Some(inst) => {
                trace!("{}: resolved {} to symbol {}", self.name, key, symbol);
                resolved.insert(key.to_string(), *inst);
                Some(*inst)
            }
            None => {
                warn!("{}: symbol {} for {} is not registered", self.name, symbol, key);
                None
            }
        }
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("properties", &self.properties.len())
            .finish()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} version {}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::digest::Sha1Digest;
    use crate::security::spi::Spi;

    fn sha1() -> Spi {
        Spi::MessageDigest(Box::new(Sha1Digest::new()))
    }

    #[test]
    fn test_symbol_resolution() {
        let mut p = Provider::new("Test", 1.0, "test provider");
        p.add_service(ServiceType::MessageDigest, "SHA-1", "sha1_create", sha1);
        p.put("MessageDigest.Broken", "missing_symbol");
        p.put("Provider.note", "a literal value");

        assert!(p.instantiator("MessageDigest.SHA-1").is_some());
        // cached path
        assert!(p.instantiator("MessageDigest.SHA-1").is_some());
        assert!(p.instantiator("MessageDigest.Broken").is_none());
        assert!(p.instantiator("Provider.note").is_none());
        assert!(p.instantiator("MessageDigest.MD2").is_none());
    }

    #[test]
    fn test_services_and_aliases() {
        let mut p = Provider::new("Test", 1.0, "test provider");
        p.add_service(ServiceType::MessageDigest, "SHA-1", "sha1_create", sha1);
        p.add_alias(ServiceType::MessageDigest, "SHA", "SHA-1");
        p.put("Provider.note", "a literal value");

        p.put("Provider.id className", "beecrypt::provider::Test");
        p.put("Provider.id", "test");
        p.put("MessageDigest.SHA-1 ImplementedIn", "Software");

        let services: Vec<&str> = p.services().collect();
        assert_eq!(services, vec!["MessageDigest.SHA-1"]);
        assert_eq!(p.property("Alg.Alias.MessageDigest.SHA"), Some("MessageDigest.SHA-1"));
        assert_eq!(p.find_key_ignore_case("messagedigest.sha-1"), Some("MessageDigest.SHA-1"));
        assert_eq!(p.to_string(), "Test version 1");
    }

    #[test]
    fn test_service_type_from_key() {
        assert_eq!(ServiceType::from_key("Signature.SHA1withDSA"), Some(ServiceType::Signature));
        assert_eq!(ServiceType::from_key("Provider.id"), None);
        assert_eq!(ServiceType::from_key("Signature."), None);
        assert_eq!(ServiceType::from_key("Mac"), None);
        assert_eq!(ServiceType::from_key("Alg.Alias.Mac.HmacSHA"), None);
    }
}
