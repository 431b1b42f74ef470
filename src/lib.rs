//! Gopherman - record live HTTP traffic as Postman collections and replay it
//!
//! The [`recording::Recorder`] wraps any [`recording::Handler`], captures each
//! exchange through an in-memory [`recording::CaptureWriter`] and persists the
//! session on demand. The [`replay::Tester`] loads persisted collections plus
//! an environment and reissues named requests against a running service.

#![deny(unsafe_code)]
#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod error;
pub mod model;
pub mod network;
pub mod proxy;
pub mod recording;
pub mod replay;
pub mod storage;
pub mod template;

pub use error::{GophermanError, ReplayError, Result};
