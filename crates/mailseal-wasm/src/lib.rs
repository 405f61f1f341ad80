//! WASM bindings for mailseal.
//!
//! Exposes the sealing service, envelope helpers and localStorage-backed
//! preferences to browser code via wasm-bindgen.

pub mod envelope;
mod error;
#[cfg(target_arch = "wasm32")]
pub mod identity;
pub mod preferences;
pub mod service;
