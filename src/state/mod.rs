//! State management module
//!
//! This module handles everything that lives on disk:
//! - The JSON datasheet of tagged entries (store.rs)
//! - The log of already processed images (processed.rs)
//! - The entry records themselves (data.rs)

pub mod data;
pub mod processed;
pub mod store;
