//! Build-time configuration of the UV furnace controller firmware.
//!
//! Everything here is fixed when the image is built: cargo features select the
//! debug stream and the optional integrations, and `cfg.toml` provides the
//! network identity (see `build.rs`).

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod constants;
pub mod debug;
pub mod features;
pub mod network;
pub mod parse;
