//! bump-merger - merge dependency bump PRs when their branch is pushed
//!
//! A push by the automation account triggers one stateless pass: find the
//! PR for the pushed branch, decide whether it is eligible, and merge it
//! with bounded retry.

pub mod error;
pub mod event;
pub mod handler;
pub mod merge;
pub mod platform;
pub mod policy;
pub mod types;
