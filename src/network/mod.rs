//! Network layer for Gopherman
//!
//! Provides the HTTP client used to issue live requests and the server
//! that mounts the recorder on a TCP listener.

mod client;
mod server;

pub use client::{with_authority, ClientResponse, HttpClient};
pub use server::RecordingServer;
