// src/lib.rs

//! Host-side protocol engine for Roboteq MDC2250 motor controllers.
//!
//! The [`common`] layer classifies and decodes the controller's ASCII
//! response lines and formats requests; it builds without `std`.
//! The [`controller`] layer (feature `std`) shares one serial channel
//! between many concurrent waiters and resolves every command or query to
//! success, explicit rejection or timeout.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod common;
#[cfg(feature = "std")]
pub mod controller;

// Re-export key types for convenience
pub use common::{classify, decode, DecodedReading, DecodingError, ResponseKind};
#[cfg(feature = "std")]
pub use common::ControllerError;
#[cfg(feature = "std")]
pub use controller::{ConnectionState, ControllerConfig, RequestOutcome, SyncController};
