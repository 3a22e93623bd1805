// src/wallet/mod.rs
//! Key derivation and local signing.

pub mod key_management;
