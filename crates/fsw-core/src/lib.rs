//! ForkSwitch Core Library
//!
//! This crate provides the decision logic for the ForkSwitch extension:
//! everything that can be computed without touching a document. The wasm
//! boundary crate feeds it snapshots of what the marketplace page currently
//! shows and applies whatever edits come back.
//!
//! # Architecture
//!
//! The marketplace UI is rendered by a framework that regenerates the
//! elements we patch, so every judgement call lives here where it can be
//! tested headlessly: which href/label edits a button needs, whether a batch
//! of observed mutations plausibly touched a button at all, and how long the
//! startup poll may keep running. The DOM driver stays a thin applicator.
//!
//! # Modules
//!
//! - `fork`: the closed set of install targets and their expected state
//! - `buttons`: install-button markup contract and per-button edit planning
//! - `classify`: relevance classification for observed mutation batches
//! - `schedule`: debounce and startup-poll timing policy

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod buttons;
pub mod classify;
pub mod fork;
pub mod schedule;

// Re-export commonly used types
pub use buttons::{plan_button, rewrite_href, ButtonEdits, ButtonSnapshot, PassOutcome};
pub use classify::{batch_is_relevant, ChangeRecord, NodeInterest, WatchedAttr};
pub use fork::{Fork, UnknownFork};
pub use schedule::{PollVerdict, StartupPoll};
