// app/src/lib.rs

//! Storefront backend: accounts, catalog and cart checkout over HTTP.
//!
//! Checkout, signup and signin each run as an `orderflow` pipeline registered
//! on the shared [`state::AppState`].

pub mod checkout;
pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod web;
