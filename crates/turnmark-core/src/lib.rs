//! # turnmark-core
//!
//! Foundation types and utilities shared by every turnmark crate.
//!
//! - **IDs**: [`ids::TurnId`], the host turn id or a locally minted UUID v7
//! - **Text**: [`text::truncate_str`], [`text::summarize`] and friends
//! - **Logging**: [`logging::init_subscriber`] and the [`logging::capture_logs`] test helper
//! - **Constants**: [`constants`] shared defaults (debounce delays, summary sizing)
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other turnmark crates.

#![deny(unsafe_code)]

pub mod constants;
pub mod ids;
pub mod logging;
pub mod text;
