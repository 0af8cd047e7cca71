//! Cucumber step definitions for interface tests.

pub mod review_links;
