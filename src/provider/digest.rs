//! SHA-1 and SHA-256 message digests

use sha1::Sha1;
use sha2::digest::FixedOutputReset;
use sha2::{Digest, Sha256};

use crate::security::spi::MessageDigestSpi;

/// Message digest engine over any `digest` hash
#[derive(Clone, Default)]
pub struct HashDigest<D: Digest + FixedOutputReset + Clone + Send + 'static> {
    hasher: D,
}

impl<D: Digest + FixedOutputReset + Clone + Send + 'static> HashDigest<D> {
    pub fn new() -> Self {
        Self { hasher: D::new() }
    }
}

impl<D: Digest + FixedOutputReset + Clone + Send + 'static> MessageDigestSpi for HashDigest<D> {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.hasher, data);
    }

    fn digest(&mut self) -> Vec<u8> {
        self.hasher.finalize_reset().to_vec()
    }

    fn digest_length(&self) -> usize {
        <D as Digest>::output_size()
    }

    fn reset(&mut self) {
        Digest::reset(&mut self.hasher);
    }

    fn box_clone(&self) -> Box<dyn MessageDigestSpi> {
        Box::new(self.clone())
    }
}

pub type Sha1Digest = HashDigest<Sha1>;
pub type Sha256Digest = HashDigest<Sha256>;
