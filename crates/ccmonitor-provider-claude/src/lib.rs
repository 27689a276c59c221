//! Claude Code usage source for ccmonitor
//!
//! This crate implements [`ccmonitor_core::provider::UsageSource`] over the
//! JSONL project logs Claude Code writes, with a built-in price table for
//! entries that carry no pre-computed cost.

pub mod data_loader;
pub mod entry;
pub mod pricing;

#[cfg(test)]
pub mod test_utils;

pub use data_loader::DataLoader;
