//! AlgorithmParameters for DSA and DH

use crate::common::{Result, SecurityError};
use crate::security::key::{DhParams, DsaParams};
use crate::security::spec::ParameterSpec;
use crate::security::spi::AlgorithmParametersSpi;

fn not_initialized() -> SecurityError {
    SecurityError::InvalidParameter("parameters not initialized".to_string())
}

/// AlgorithmParameters.DSA
#[derive(Debug, Default)]
pub struct DsaParameters {
    params: Option<DsaParams>,
}

impl DsaParameters {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlgorithmParametersSpi for DsaParameters {
    fn init(&mut self, spec: &ParameterSpec) -> Result<()> {
        match spec {
            ParameterSpec::Dsa(params) => {
                self.params = Some(params.clone());
                Ok(())
            }
            other => Err(SecurityError::InvalidParameter(format!("expected DSAParameterSpec, got {}", other.name()))),
        }
    }

    fn parameter_spec(&self) -> Result<ParameterSpec> {
        self.params.clone().map(ParameterSpec::Dsa).ok_or_else(not_initialized)
    }

    fn describe(&self) -> String {
        match &self.params {
            Some(p) => format!("DSA parameters\np: {:x}\nq: {:x}\ng: {:x}", p.p, p.q, p.g),
            None => "DSA parameters (uninitialized)".to_string(),
        }
    }
}

/// AlgorithmParameters.DH
#[derive(Debug, Default)]
pub struct DhParameters {
    params: Option<DhParams>,
}

impl DhParameters {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlgorithmParametersSpi for DhParameters {
    fn init(&mut self, spec: &ParameterSpec) -> Result<()> {
        match spec {
            ParameterSpec::Dh(params) => {
                self.params = Some(params.clone());
                Ok(())
            }
            other => Err(SecurityError::InvalidParameter(format!("expected DHParameterSpec, got {}", other.name()))),
        }
    }

    fn parameter_spec(&self) -> Result<ParameterSpec> {
        self.params.clone().map(ParameterSpec::Dh).ok_or_else(not_initialized)
    }

    fn describe(&self) -> String {
        match &self.params {
            Some(p) if p.l > 0 => format!("DH parameters\np: {:x}\ng: {:x}\nl: {}", p.p, p.g, p.l),
            Some(p) => format!("DH parameters\np: {:x}\ng: {:x}", p.p, p.g),
            None => "DH parameters (uninitialized)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint_dig::BigUint;

    #[test]
    fn test_dsa_parameters() {
        let mut params = DsaParameters::new();
        assert!(params.parameter_spec().is_err());

        let spec = ParameterSpec::Dsa(DsaParams::new(BigUint::from(23u32), BigUint::from(11u32), BigUint::from(4u32)));
        params.init(&spec).unwrap();
        assert_eq!(params.parameter_spec().unwrap(), spec);
        assert!(params.describe().contains("q: b"));
    }

    #[test]
    fn test_dh_rejects_other_specs() {
        let mut params = DhParameters::new();
        let spec = ParameterSpec::DhGen { prime_size: 1024, exponent_size: 0 };
        assert!(matches!(params.init(&spec), Err(SecurityError::InvalidParameter(_))));
    }
}
