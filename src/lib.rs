#![cfg_attr(not(feature = "std"), no_std)]

//! Acceptance of expiring trusted data.
//!
//! A producer signs a payload, stamps it with a signed (optionally encrypted)
//! timestamp, and ships it. A consumer accepts it only while the timestamp is
//! within a tolerance of its own clock, and only once.
//!
//! # Components
//! - `capability`: Signing, verification and encryption seams, plus reference adapters.
//! - `freshness`: Clocks and the window predicate.
//! - `payload`: `SecureData` and its `TimestampProof`.
//! - `manager`: Replay-rejecting acceptance with periodic eviction (`std` only).
//! - `config`: Tolerance and scheduling settings.

extern crate alloc;

pub mod capability;
pub mod config;
pub mod freshness;
#[cfg(feature = "std")]
pub mod manager;
pub mod payload;

pub use capability::{CryptoError, Decryptor, Encryptor, Signer, Verifier};
pub use config::{ManagerConfig, TimeUnit};
pub use freshness::{Clock, ManualClock, TimeTester};
#[cfg(feature = "std")]
pub use freshness::SystemClock;
#[cfg(feature = "std")]
pub use manager::{AcceptParams, ExpiringDataManager, ReplayProtection};
pub use payload::{PayloadError, SecureData, TimestampProof};

/// Crate version, as published.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
