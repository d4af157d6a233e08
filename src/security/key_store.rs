//! Key store façade

use std::io::{Read, Write};
use std::sync::Arc;

use crate::common::{Result, SecurityError};

use super::cert::Certificate;
use super::key::Key;
use super::provider::Provider;
use super::registry::{Security, SpiHandle};
use super::spi::{KeyStoreSpi, ServiceType};

/// Storage for keys and certificates
///
/// Every operation except `load` requires a prior `load`, either from a
/// stream or with `None` to start an empty store.
pub struct KeyStore {
    spi: Box<dyn KeyStoreSpi>,
    store_type: String,
    provider: Arc<Provider>,
    loaded: bool,
}

impl KeyStore {
    pub fn get_instance(security: &Security, store_type: &str) -> Result<Self> {
        Self::from_handle(security.get_spi(store_type, ServiceType::KeyStore)?)
    }

    pub fn get_instance_with_provider(security: &Security, store_type: &str, provider: &str) -> Result<Self> {
        Self::from_handle(security.get_spi_with_provider(store_type, ServiceType::KeyStore, provider)?)
    }

    pub fn get_instance_from(store_type: &str, provider: &Arc<Provider>) -> Result<Self> {
        Self::from_handle(Security::get_spi_from(store_type, ServiceType::KeyStore, provider)?)
    }

    /// Key store of the registry's default type
    pub fn get_default(security: &Security) -> Result<Self> {
        Self::get_instance(security, &security.keystore_default())
    }

    fn from_handle(handle: SpiHandle) -> Result<Self> {
        let SpiHandle { spi, algorithm, provider } = handle;
        let spi = spi.into_key_store().ok_or_else(|| {
            SecurityError::NoSuchAlgorithm(format!("{} KeyStore not available", algorithm))
        })?;
        Ok(Self { spi, store_type: algorithm, provider, loaded: false })
    }

    pub fn store_type(&self) -> &str {
        &self.store_type
    }

    pub fn provider(&self) -> &Arc<Provider> {
        &self.provider
    }

    fn require_loaded(&self) -> Result<()> {
        if !self.loaded {
            return Err(SecurityError::KeyStore("Uninitialized keystore".to_string()));
        }
        Ok(())
    }

    /// Load from `reader`, or start empty when `reader` is `None`
    pub fn load(&mut self, security: &Security, reader: Option<&mut dyn Read>, password: Option<&str>) -> Result<()> {
        self.spi.load(security, reader, password)?;
        self.loaded = true;
        Ok(())
    }

    pub fn store(&mut self, writer: &mut dyn Write, password: Option<&str>) -> Result<()> {
        self.require_loaded()?;
        self.spi.store(writer, password)
    }

    pub fn aliases(&self) -> Result<Vec<String>> {
        self.require_loaded()?;
        Ok(self.spi.aliases())
    }

    pub fn contains_alias(&self, alias: &str) -> Result<bool> {
        self.require_loaded()?;
        Ok(self.spi.contains_alias(alias))
    }

    pub fn delete_entry(&mut self, alias: &str) -> Result<()> {
        self.require_loaded()?;
        self.spi.delete_entry(alias)
    }

    /// Creation time of an entry in milliseconds since the epoch
    pub fn creation_date(&self, alias: &str) -> Result<Option<i64>> {
        self.require_loaded()?;
        Ok(self.spi.creation_date(alias))
    }

    pub fn get_key(&self, security: &Security, alias: &str, password: &str) -> Result<Option<Key>> {
        self.require_loaded()?;
        self.spi.get_key(security, alias, password)
    }

    pub fn get_certificate(&self, alias: &str) -> Result<Option<Arc<dyn Certificate>>> {
        self.require_loaded()?;
        Ok(self.spi.get_certificate(alias))
    }

    pub fn get_certificate_chain(&self, alias: &str) -> Result<Option<Vec<Arc<dyn Certificate>>>> {
        self.require_loaded()?;
        Ok(self.spi.get_certificate_chain(alias))
    }

    pub fn get_certificate_alias(&self, cert: &dyn Certificate) -> Result<Option<String>> {
        self.require_loaded()?;
        Ok(self.spi.get_certificate_alias(cert))
    }

    pub fn is_key_entry(&self, alias: &str) -> Result<bool> {
        self.require_loaded()?;
        Ok(self.spi.is_key_entry(alias))
    }

    pub fn is_certificate_entry(&self, alias: &str) -> Result<bool> {
        self.require_loaded()?;
        Ok(self.spi.is_certificate_entry(alias))
    }

    pub fn set_key_entry(&mut self, alias: &str, key: &Key, password: &str, chain: Vec<Arc<dyn Certificate>>) -> Result<()> {
        self.require_loaded()?;
        self.spi.set_key_entry(alias, key, password, chain)
    }

    pub fn set_certificate_entry(&mut self, alias: &str, cert: Arc<dyn Certificate>) -> Result<()> {
        self.require_loaded()?;
        self.spi.set_certificate_entry(alias, cert)
    }

    pub fn size(&self) -> Result<usize> {
        self.require_loaded()?;
        Ok(self.spi.size())
    }
}
