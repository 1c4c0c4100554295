//! Hardware abstraction types.
//!
//! This module contains the hardware configuration, the arm driver trait
//! and the joint data types shared between drivers and the adapter.

pub mod config;
pub mod driver;
pub mod types;
