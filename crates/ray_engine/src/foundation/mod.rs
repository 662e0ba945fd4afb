//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types shared by parameters, cameras and frame buffers
//! - Handle collections backing the object arena
//! - Logging setup and the process-wide verbosity level
//! - Contract-violation reporting for misuse of the device API

pub mod math;
pub mod collections;
pub mod logging;
pub mod contract;
