// app/src/services/mod.rs

//! Credential handling used by the auth pipelines and the request extractor.

pub mod password;
pub mod token;
