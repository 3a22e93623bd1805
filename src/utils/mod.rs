// src/utils/mod.rs
//! Shared cryptographic and encoding helpers.

pub mod crypto;
