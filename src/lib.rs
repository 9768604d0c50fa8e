//! Gymnastics scoring engine
//!
//! Derives final scores from raw judge components and aggregates them into
//! live, filterable event leaderboards.

pub mod application;
pub mod config;
pub mod domain;
pub mod persistence;
