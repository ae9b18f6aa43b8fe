//! Tor binary fetcher for OnionShare packaging.
//!
//! This crate downloads the pinned Tor Browser distribution for the host
//! platform, verifies it against a known SHA-256 digest, extracts the Tor
//! daemon and its pluggable transports with the platform's native archive
//! tool, and stages them into OnionShare's resource directory. It also
//! refreshes the built-in bridge torrc templates from the Tor Project's
//! circumvention API.
//!
//! # Modules
//!
//! - [`artifact`] - Download-if-absent and SHA-256 verification of archives
//! - [`bridges`] - Built-in bridge discovery and torrc template rendering
//! - [`cli`] - Command-line argument definitions
//! - [`digest`] - SHA-256 digest newtype and file hashing
//! - [`distribution`] - Pinned per-platform archives and staging tables
//! - [`download`] - HTTP download trait and `ureq` implementation
//! - [`error`] - Semantic error types
//! - [`executor`] - External command abstraction
//! - [`extraction`] - Native archive tool invocation per platform
//! - [`layout`] - Project directory layout derived from the project root
//! - [`output`] - Progress output helpers
//! - [`pipeline`] - The fetch, verify, extract, and stage flow
//! - [`platform`] - Host platform detection
//! - [`stager`] - Copying extracted files into the resource directory

pub mod artifact;
pub mod bridges;
pub mod cli;
pub mod digest;
pub mod distribution;
pub mod download;
pub mod error;
pub mod executor;
pub mod extraction;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod stager;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
