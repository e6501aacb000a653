//! Data models for the pool registry.
//!
//! This module re-exports the model types used throughout the crate.

pub mod descriptor;

pub use descriptor::DbDescriptor;
