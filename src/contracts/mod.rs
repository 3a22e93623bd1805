// src/contracts/mod.rs
//! On-chain collaborators, specified by the interface the core needs.

pub mod did_registry;
