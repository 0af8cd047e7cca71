//! Interface tests for the review-link workflow using Cucumber.
//!
//! The same scenarios run against every storage backend. Select one via
//! environment variable:
//!
//! ```bash
//! # SQLite (default)
//! cargo test --test interfaces
//!
//! # In-memory
//! STORAGE_BACKEND=memory cargo test --test interfaces
//!
//! # PostgreSQL (uses testcontainers)
//! STORAGE_BACKEND=postgres cargo test --test interfaces --features postgres
//! ```

mod backend;
mod steps;

use cucumber::World;
use steps::review_links::ReviewLinkWorld;

#[tokio::main]
async fn main() {
    println!("\n=== Running Review Link Interface Tests ===\n");
    ReviewLinkWorld::cucumber()
        .fail_on_skipped()
        .run_and_exit("tests/interfaces/features/review_links.feature")
        .await;
}
