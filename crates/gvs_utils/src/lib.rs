//! Small shared utilities for the `gvs` crates.
//!
//! Currently this only provides hash containers with a fixed seed,
//! so registry iteration order and identity tables behave the same
//! on every run.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Modules

pub mod hash;
