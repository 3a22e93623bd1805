// src/models/mod.rs
//! Data structures exchanged during the DID-Auth flow.

pub mod key;
pub mod payload;
