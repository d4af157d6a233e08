//! Cryptographic primitives
//!
//! Number theoretic building blocks the provider engines are written on:
//! integer/octet conversions, DER signature encoding, DSA, Diffie-Hellman
//! and RSA arithmetic, and the PKCS#12 key derivation.

pub mod der;
pub mod dh;
pub mod dsa;
pub mod mp;
pub mod pkcs12;
pub mod rsa;
