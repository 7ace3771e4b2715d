//! StayHub API client and types.
//!
//! This module provides the interface for communicating with the StayHub
//! REST API.

mod auth;
mod client;
pub mod error;
mod finance;
mod properties;
pub mod session;
mod stays;
pub mod types;

pub use client::StayHubClient;
pub use error::{ApiError, ValidationError};
pub use finance::MovementKind;
pub use session::Session;
