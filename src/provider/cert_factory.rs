//! CertificateFactory.BEE

use std::io::Read;
use std::sync::Arc;

use crate::beeyond::BeeCertificate;
use crate::common::Result;
use crate::security::cert::Certificate;
use crate::security::registry::Security;
use crate::security::spi::CertificateFactorySpi;

#[derive(Debug, Default)]
pub struct BeeCertificateFactory;

impl BeeCertificateFactory {
    pub fn new() -> Self {
        BeeCertificateFactory
    }
}

impl CertificateFactorySpi for BeeCertificateFactory {
    fn generate_certificate(&mut self, security: &Security, reader: &mut dyn Read) -> Result<Arc<dyn Certificate>> {
        Ok(Arc::new(BeeCertificate::decode(security, reader)?))
    }

    fn generate_certificates(&mut self, security: &Security, reader: &mut dyn Read) -> Result<Vec<Arc<dyn Certificate>>> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        let mut rest = data.as_slice();
        let mut certs: Vec<Arc<dyn Certificate>> = Vec::new();
        while !rest.is_empty() {
            certs.push(Arc::new(BeeCertificate::decode(security, &mut rest)?));
        }
        Ok(certs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::key_pair_generator::KeyPairGenerator;

    #[test]
    fn test_reads_concatenated_certificates() {
        let security = Security::with_builtin();
        let mut kpg = KeyPairGenerator::get_instance(&security, "DSA").unwrap();
        kpg.initialize(512).unwrap();
        let pair = kpg.generate_key_pair().unwrap();
        let cert = BeeCertificate::self_signed(&security, pair.public(), pair.private(), "SHA1withDSA").unwrap();

        let one = Certificate::encoded(&cert).unwrap().to_vec();
        let mut two = one.clone();
        two.extend_from_slice(&one);

        let mut factory = BeeCertificateFactory::new();
        let certs = factory.generate_certificates(&security, &mut two.as_slice()).unwrap();
        assert_eq!(certs.len(), 2);
        assert_eq!(certs[0].encoded().unwrap(), one.as_slice());
        assert!(*certs[0] == *certs[1]);

        let truncated = &one[..one.len() - 3];
        assert!(factory.generate_certificates(&security, &mut &truncated[..]).is_err());
    }
}
