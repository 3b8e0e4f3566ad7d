//! Core building blocks for aipaca.
//!
//! The pattern engine (`pathset`, `tree`, `reconcile`) is pure filesystem
//! logic with no knowledge of profiles or backups. `store`, `state` and
//! `config` describe where things live on disk; the rest are small helpers
//! shared by every operation.

pub mod checksum;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod output;
pub mod pathset;
pub mod reconcile;
pub mod state;
pub mod store;
pub mod time;
pub mod tree;
