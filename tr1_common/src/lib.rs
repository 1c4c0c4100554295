//! TR1 Common Library
//!
//! This crate provides shared constants, configuration loading and the
//! hardware driver boundary for all TR1 workspace crates.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Defaults and loop constants
//! - [`controller`] - Controller configuration types
//! - [`hal`] - Hardware configuration, driver trait and joint types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use tr1_common::prelude::*;
//! ```

pub mod config;
pub mod consts;
pub mod controller;
pub mod hal;
pub mod prelude;
