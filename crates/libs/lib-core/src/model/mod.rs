//! # Model Layer
//!
//! Persistence models and repositories.

pub mod store;
