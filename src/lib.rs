//! Quire - site document store and single-use review links.
//!
//! A course-catalog site keeps all of its content in one shared document.
//! This crate owns the rules for mutating that document under concurrent
//! requests and the ledger of one-time review tokens that let external
//! reviewers submit exactly one testimonial each.

pub mod config;
pub mod model;
pub mod services;
pub mod storage;
pub mod utils;
