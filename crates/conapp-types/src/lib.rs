//! Foundation types for conapp.
//!
//! This crate contains the types shared by every conapp crate: the error
//! taxonomy of the resolution pipeline and the resolver configuration.

pub mod config;
pub mod error;
