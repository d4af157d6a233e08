//! Key model
//!
//! Asymmetric keys are closed enums over the supported algorithms so callers
//! match on the variant instead of inspecting types at run time. Every
//! asymmetric key carries its BEE encoding, computed on first request and
//! cached. Secret scalars are overwritten when a key is dropped.

use std::fmt;

use num_bigint_dig::BigUint;
use once_cell::sync::OnceCell;
use zeroize::Zeroize;

use crate::common::Result;
use crate::provider::bee_codec;

/// Name of the BEE key encoding format
pub const BEE_FORMAT: &str = "BEE";

/// Diffie-Hellman domain parameters
///
/// `l` is the requested bit length of private values; zero leaves it to the
/// generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhParams {
    pub p: BigUint,
    pub g: BigUint,
    pub l: usize,
}

impl DhParams {
    pub fn new(p: BigUint, g: BigUint) -> Self {
        Self { p, g, l: 0 }
    }

    pub fn with_private_length(p: BigUint, g: BigUint, l: usize) -> Self {
        Self { p, g, l }
    }
}

/// DSA domain parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsaParams {
    pub p: BigUint,
    pub q: BigUint,
    pub g: BigUint,
}

impl DsaParams {
    pub fn new(p: BigUint, q: BigUint, g: BigUint) -> Self {
        Self { p, q, g }
    }
}

fn cached_encoding(cell: &OnceCell<Vec<u8>>, encode: impl FnOnce() -> Result<Vec<u8>>) -> Option<&[u8]> {
    match cell.get_or_try_init(encode) {
        Ok(bytes) => Some(bytes.as_slice()),
        Err(e) => {
            log::warn!("Unable to encode key: {}", e);
            None
        }
    }
}

fn cell_with(bytes: Option<Vec<u8>>) -> OnceCell<Vec<u8>> {
    match bytes {
        Some(b) => OnceCell::with_value(b),
        None => OnceCell::new(),
    }
}

fn wipe_cache(cell: &mut OnceCell<Vec<u8>>) {
    if let Some(bytes) = cell.get_mut() {
        bytes.zeroize();
    }
}

/// Diffie-Hellman public key
#[derive(Debug, Clone)]
pub struct DhPublicKey {
    params: DhParams,
    y: BigUint,
    encoded: OnceCell<Vec<u8>>,
}

impl DhPublicKey {
    pub fn new(params: DhParams, y: BigUint) -> Self {
        Self { params, y, encoded: OnceCell::new() }
    }

    pub(crate) fn with_encoding(params: DhParams, y: BigUint, encoded: Option<Vec<u8>>) -> Self {
        Self { params, y, encoded: cell_with(encoded) }
    }

    pub fn params(&self) -> &DhParams {
        &self.params
    }

    pub fn y(&self) -> &BigUint {
        &self.y
    }
}

impl PartialEq for DhPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.params.p == other.params.p && self.params.g == other.params.g && self.y == other.y
    }
}

/// Diffie-Hellman private key
#[derive(Clone)]
pub struct DhPrivateKey {
    params: DhParams,
    x: BigUint,
    encoded: OnceCell<Vec<u8>>,
}

impl DhPrivateKey {
    pub fn new(params: DhParams, x: BigUint) -> Self {
        Self { params, x, encoded: OnceCell::new() }
    }

    pub(crate) fn with_encoding(params: DhParams, x: BigUint, encoded: Option<Vec<u8>>) -> Self {
        Self { params, x, encoded: cell_with(encoded) }
    }

    pub fn params(&self) -> &DhParams {
        &self.params
    }

    pub fn x(&self) -> &BigUint {
        &self.x
    }
}

impl PartialEq for DhPrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.params.p == other.params.p && self.params.g == other.params.g && self.x == other.x
    }
}

impl Drop for DhPrivateKey {
    fn drop(&mut self) {
        self.x.zeroize();
        wipe_cache(&mut self.encoded);
    }
}

impl fmt::Debug for DhPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DhPrivateKey").field("params", &self.params).finish_non_exhaustive()
    }
}

/// DSA public key
#[derive(Debug, Clone)]
pub struct DsaPublicKey {
    params: DsaParams,
    y: BigUint,
    encoded: OnceCell<Vec<u8>>,
}

impl DsaPublicKey {
    pub fn new(params: DsaParams, y: BigUint) -> Self {
        Self { params, y, encoded: OnceCell::new() }
    }

    pub(crate) fn with_encoding(params: DsaParams, y: BigUint, encoded: Option<Vec<u8>>) -> Self {
        Self { params, y, encoded: cell_with(encoded) }
    }

    pub fn params(&self) -> &DsaParams {
        &self.params
    }

    pub fn y(&self) -> &BigUint {
        &self.y
    }
}

impl PartialEq for DsaPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params && self.y == other.y
    }
}

/// DSA private key
#[derive(Clone)]
pub struct DsaPrivateKey {
    params: DsaParams,
    x: BigUint,
    encoded: OnceCell<Vec<u8>>,
}

impl DsaPrivateKey {
    pub fn new(params: DsaParams, x: BigUint) -> Self {
        Self { params, x, encoded: OnceCell::new() }
    }

    pub(crate) fn with_encoding(params: DsaParams, x: BigUint, encoded: Option<Vec<u8>>) -> Self {
        Self { params, x, encoded: cell_with(encoded) }
    }

    pub fn params(&self) -> &DsaParams {
        &self.params
    }

    pub fn x(&self) -> &BigUint {
        &self.x
    }
}

impl PartialEq for DsaPrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params && self.x == other.x
    }
}

impl Drop for DsaPrivateKey {
    fn drop(&mut self) {
        self.x.zeroize();
        wipe_cache(&mut self.encoded);
    }
}

impl fmt::Debug for DsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DsaPrivateKey").field("params", &self.params).finish_non_exhaustive()
    }
}

/// RSA public key
#[derive(Debug, Clone)]
pub struct RsaPublicKey {
    n: BigUint,
    e: BigUint,
    encoded: OnceCell<Vec<u8>>,
}

impl RsaPublicKey {
    pub fn new(n: BigUint, e: BigUint) -> Self {
        Self { n, e, encoded: OnceCell::new() }
    }

    pub(crate) fn with_encoding(n: BigUint, e: BigUint, encoded: Option<Vec<u8>>) -> Self {
        Self { n, e, encoded: cell_with(encoded) }
    }

    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    pub fn public_exponent(&self) -> &BigUint {
        &self.e
    }
}

impl PartialEq for RsaPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n && self.e == other.e
    }
}

/// RSA private key without CRT components
#[derive(Clone)]
pub struct RsaPrivateKey {
    n: BigUint,
    d: BigUint,
    encoded: OnceCell<Vec<u8>>,
}

impl RsaPrivateKey {
    pub fn new(n: BigUint, d: BigUint) -> Self {
        Self { n, d, encoded: OnceCell::new() }
    }

    pub(crate) fn with_encoding(n: BigUint, d: BigUint, encoded: Option<Vec<u8>>) -> Self {
        Self { n, d, encoded: cell_with(encoded) }
    }

    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    pub fn private_exponent(&self) -> &BigUint {
        &self.d
    }
}

impl PartialEq for RsaPrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n && self.d == other.d
    }
}

impl Drop for RsaPrivateKey {
    fn drop(&mut self) {
        self.d.zeroize();
        wipe_cache(&mut self.encoded);
    }
}

impl fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPrivateKey").field("n", &self.n).finish_non_exhaustive()
    }
}

/// RSA private key carrying the Chinese Remainder components
#[derive(Clone)]
pub struct RsaPrivateCrtKey {
    n: BigUint,
    e: BigUint,
    d: BigUint,
    p: BigUint,
    q: BigUint,
    dp: BigUint,
    dq: BigUint,
    qinv: BigUint,
    encoded: OnceCell<Vec<u8>>,
}

impl RsaPrivateCrtKey {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        n: BigUint,
        e: BigUint,
        d: BigUint,
        p: BigUint,
        q: BigUint,
        dp: BigUint,
        dq: BigUint,
        qinv: BigUint,
    ) -> Self {
        Self { n, e, d, p, q, dp, dq, qinv, encoded: OnceCell::new() }
    }

    pub(crate) fn set_encoding(self, encoded: Vec<u8>) -> Self {
        let _ = self.encoded.set(encoded);
        self
    }

    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    pub fn public_exponent(&self) -> &BigUint {
        &self.e
    }

    pub fn private_exponent(&self) -> &BigUint {
        &self.d
    }

    pub fn prime_p(&self) -> &BigUint {
        &self.p
    }

    pub fn prime_q(&self) -> &BigUint {
        &self.q
    }

    pub fn prime_exponent_p(&self) -> &BigUint {
        &self.dp
    }

    pub fn prime_exponent_q(&self) -> &BigUint {
        &self.dq
    }

    pub fn crt_coefficient(&self) -> &BigUint {
        &self.qinv
    }
}

impl PartialEq for RsaPrivateCrtKey {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n
            && self.e == other.e
            && self.d == other.d
            && self.p == other.p
            && self.q == other.q
            && self.dp == other.dp
            && self.dq == other.dq
            && self.qinv == other.qinv
    }
}

impl Drop for RsaPrivateCrtKey {
    fn drop(&mut self) {
        self.d.zeroize();
        self.p.zeroize();
        self.q.zeroize();
        self.dp.zeroize();
        self.dq.zeroize();
        self.qinv.zeroize();
        wipe_cache(&mut self.encoded);
    }
}

impl fmt::Debug for RsaPrivateCrtKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPrivateCrtKey")
            .field("n", &self.n)
            .field("e", &self.e)
            .finish_non_exhaustive()
    }
}

/// Public half of an asymmetric key pair
#[derive(Debug, Clone, PartialEq)]
pub enum PublicKey {
    Dh(DhPublicKey),
    Dsa(DsaPublicKey),
    Rsa(RsaPublicKey),
}

impl PublicKey {
    /// "DH", "DSA" or "RSA"
    pub fn algorithm(&self) -> &'static str {
        match self {
            PublicKey::Dh(_) => "DH",
            PublicKey::Dsa(_) => "DSA",
            PublicKey::Rsa(_) => "RSA",
        }
    }

    pub fn format(&self) -> Option<&'static str> {
        Some(BEE_FORMAT)
    }

    /// BEE encoding of the key, computed once
    pub fn encoded(&self) -> Option<&[u8]> {
        let cell = match self {
            PublicKey::Dh(k) => &k.encoded,
            PublicKey::Dsa(k) => &k.encoded,
            PublicKey::Rsa(k) => &k.encoded,
        };
        cached_encoding(cell, || bee_codec::encode_public(self))
    }
}

/// Private half of an asymmetric key pair
#[derive(Debug, Clone, PartialEq)]
pub enum PrivateKey {
    Dh(DhPrivateKey),
    Dsa(DsaPrivateKey),
    Rsa(RsaPrivateKey),
    RsaCrt(RsaPrivateCrtKey),
}

impl PrivateKey {
    /// "DH", "DSA" or "RSA"
    pub fn algorithm(&self) -> &'static str {
        match self {
            PrivateKey::Dh(_) => "DH",
            PrivateKey::Dsa(_) => "DSA",
            PrivateKey::Rsa(_) | PrivateKey::RsaCrt(_) => "RSA",
        }
    }

    pub fn format(&self) -> Option<&'static str> {
        Some(BEE_FORMAT)
    }

    /// BEE encoding of the key, computed once
    pub fn encoded(&self) -> Option<&[u8]> {
        let cell = match self {
            PrivateKey::Dh(k) => &k.encoded,
            PrivateKey::Dsa(k) => &k.encoded,
            PrivateKey::Rsa(k) => &k.encoded,
            PrivateKey::RsaCrt(k) => &k.encoded,
        };
        cached_encoding(cell, || bee_codec::encode_private(self))
    }
}

/// Symmetric key material, e.g. for a MAC
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey {
    algorithm: String,
    bytes: Vec<u8>,
}

impl SecretKey {
    pub fn new(algorithm: impl Into<String>, bytes: &[u8]) -> Self {
        Self { algorithm: algorithm.into(), bytes: bytes.to_vec() }
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey").field("algorithm", &self.algorithm).finish_non_exhaustive()
    }
}

/// Password based key for the PKCS#12 derivation
#[derive(Clone, PartialEq, Eq)]
pub struct Pkcs12PbeKey {
    password: String,
    salt: Vec<u8>,
    iterations: u32,
}

impl Pkcs12PbeKey {
    pub fn new(password: &str, salt: &[u8], iterations: u32) -> Self {
        Self { password: password.to_string(), salt: salt.to_vec(), iterations }
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Drop for Pkcs12PbeKey {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

impl fmt::Debug for Pkcs12PbeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pkcs12PbeKey").field("iterations", &self.iterations).finish_non_exhaustive()
    }
}

/// Any key the framework handles
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Public(PublicKey),
    Private(PrivateKey),
    Secret(SecretKey),
    Pbe(Pkcs12PbeKey),
}

impl Key {
    pub fn algorithm(&self) -> &str {
        match self {
            Key::Public(k) => k.algorithm(),
            Key::Private(k) => k.algorithm(),
            Key::Secret(k) => k.algorithm(),
            Key::Pbe(_) => "PKCS#12/PBE",
        }
    }

    pub fn format(&self) -> Option<&str> {
        match self {
            Key::Public(k) => k.format(),
            Key::Private(k) => k.format(),
            Key::Secret(_) => Some("RAW"),
            Key::Pbe(_) => None,
        }
    }

    pub fn encoded(&self) -> Option<&[u8]> {
        match self {
            Key::Public(k) => k.encoded(),
            Key::Private(k) => k.encoded(),
            Key::Secret(k) => Some(k.as_bytes()),
            Key::Pbe(_) => None,
        }
    }
}

impl From<PublicKey> for Key {
    fn from(k: PublicKey) -> Self {
        Key::Public(k)
    }
}

impl From<PrivateKey> for Key {
    fn from(k: PrivateKey) -> Self {
        Key::Private(k)
    }
}

/// A matching public and private key
#[derive(Debug, Clone)]
pub struct KeyPair {
    public: PublicKey,
    private: PrivateKey,
}

impl KeyPair {
    pub fn new(public: PublicKey, private: PrivateKey) -> Self {
        Self { public, private }
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    pub fn private(&self) -> &PrivateKey {
        &self.private
    }

    pub fn into_parts(self) -> (PublicKey, PrivateKey) {
        (self.public, self.private)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_dsa() -> DsaParams {
        DsaParams::new(BigUint::from(23u32), BigUint::from(11u32), BigUint::from(4u32))
    }

    #[test]
    fn test_algorithm_and_format() {
        let public = PublicKey::Dsa(DsaPublicKey::new(small_dsa(), BigUint::from(9u32)));
        let private = PrivateKey::Rsa(RsaPrivateKey::new(BigUint::from(55u32), BigUint::from(27u32)));
        assert_eq!(public.algorithm(), "DSA");
        assert_eq!(private.algorithm(), "RSA");
        assert_eq!(public.format(), Some("BEE"));
        assert_eq!(Key::Pbe(Pkcs12PbeKey::new("pw", b"salt", 10)).encoded(), None);
    }

    #[test]
    fn test_encoding_is_cached() {
        let public = PublicKey::Dsa(DsaPublicKey::new(small_dsa(), BigUint::from(9u32)));
        let first = public.encoded().unwrap().as_ptr();
        let second = public.encoded().unwrap().as_ptr();
        assert_eq!(first, second, "encoding should be computed once");
    }

    #[test]
    fn test_equality_ignores_cache() {
        let a = DsaPrivateKey::new(small_dsa(), BigUint::from(3u32));
        let b = a.clone();
        let _ = PrivateKey::Dsa(a.clone()).encoded();
        assert_eq!(a, b);
        assert_ne!(a, DsaPrivateKey::new(small_dsa(), BigUint::from(5u32)));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let key = DsaPrivateKey::new(small_dsa(), BigUint::from(987654321u32));
        let text = format!("{:?}", key);
        assert!(!text.contains("987654321"));
    }
}
