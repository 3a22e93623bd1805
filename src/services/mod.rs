// src/services/mod.rs
//! Protocol orchestration: request/response builders and verifiers plus the
//! HTTP bridge they share.

pub mod http_bridge;
pub mod request;
pub mod response;
