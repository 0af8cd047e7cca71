//! Review-link workflow step definitions.

use std::collections::HashSet;

use cucumber::{given, then, when, World};
use quire::config::Config;
use quire::model::{ReviewToken, TestimonialInput, TestimonialSource, TestimonialStatus};
use quire::services::{ActionResponse, SiteService, SubmitRequest};

use crate::backend::{StorageBackend, StorageContext};

/// Test context for review-link scenarios.
#[derive(World)]
#[world(init = Self::new)]
pub struct ReviewLinkWorld {
    backend: StorageBackend,
    context: Option<StorageContext>,
    site: Option<SiteService>,
    issued: Vec<String>,
    last_valid: Option<bool>,
    last_response: Option<ActionResponse>,
}

impl std::fmt::Debug for ReviewLinkWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewLinkWorld")
            .field("backend", &self.backend)
            .field("context", &self.context)
            .field("issued", &self.issued)
            .field("last_valid", &self.last_valid)
            .field("last_response", &self.last_response)
            .finish()
    }
}

impl ReviewLinkWorld {
    fn new() -> Self {
        Self {
            backend: StorageBackend::from_env(),
            context: None,
            site: None,
            issued: Vec::new(),
            last_valid: None,
            last_response: None,
        }
    }

    fn site(&self) -> &SiteService {
        self.site.as_ref().expect("Site service not initialized")
    }

    fn context(&self) -> &StorageContext {
        self.context.as_ref().expect("Storage context not initialized")
    }
}

// --- Background ---

#[given("a provisioned site backend")]
async fn given_site_backend(world: &mut ReviewLinkWorld) {
    println!("Using backend: {}", world.backend.name());
    let ctx = StorageContext::new(world.backend).await;
    let stores = (ctx.documents.clone(), ctx.tokens.clone());
    world.site = Some(SiteService::new(stores, &Config::for_test()));
    world.context = Some(ctx);
}

// --- Given steps ---

#[given(expr = "a review link {string}")]
async fn given_review_link(world: &mut ReviewLinkWorld, token: String) {
    world
        .context()
        .tokens
        .insert(&ReviewToken::issued(token))
        .await
        .expect("Failed to insert review token");
}

// --- When steps ---

#[when(expr = "I issue {int} review link(s)")]
async fn when_issue_links(world: &mut ReviewLinkWorld, count: usize) {
    for _ in 0..count {
        let response = world.site().issue_token().await;
        let token = response.token.expect("issuance should succeed");
        world.issued.push(token);
    }
}

#[when(expr = "I validate the link {string}")]
async fn when_validate(world: &mut ReviewLinkWorld, token: String) {
    let response = world.site().validate_token(&token).await;
    world.last_valid = Some(response.valid);
}

#[when(expr = "a reviewer submits a testimonial by {string} with link {string}")]
async fn when_submit(world: &mut ReviewLinkWorld, author: String, token: String) {
    let request = SubmitRequest {
        testimonial: TestimonialInput::new(author, "Practical and well paced"),
        token,
    };
    let response = world.site().submit_testimonial(request).await;
    world.last_response = Some(response);
}

#[when(expr = "the page is viewed {int} time(s)")]
async fn when_page_viewed(world: &mut ReviewLinkWorld, count: usize) {
    for _ in 0..count {
        let response = world.site().append_view().await;
        assert!(response.success, "append_view failed: {:?}", response.error);
    }
}

#[when("an admin approves the newest testimonial")]
async fn when_admin_approves(world: &mut ReviewLinkWorld) {
    let document = world.site().mutator().read().await.expect("read failed");
    let id = document.testimonials[0].id.clone();
    let response = world
        .site()
        .moderate_testimonial(&id, TestimonialStatus::Approved)
        .await;
    assert!(response.success, "moderation failed: {:?}", response.error);
}

// --- Then steps ---

#[then("the link is valid")]
async fn then_link_valid(world: &mut ReviewLinkWorld) {
    assert_eq!(world.last_valid, Some(true));
}

#[then("the link is invalid")]
async fn then_link_invalid(world: &mut ReviewLinkWorld) {
    assert_eq!(world.last_valid, Some(false));
}

#[then("the submission succeeds")]
async fn then_submission_succeeds(world: &mut ReviewLinkWorld) {
    let response = world.last_response.as_ref().expect("no submission made");
    assert!(response.success, "submission failed: {:?}", response.error);
}

#[then(expr = "the submission fails with {string}")]
async fn then_submission_fails(world: &mut ReviewLinkWorld, message: String) {
    let response = world.last_response.as_ref().expect("no submission made");
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some(message.as_str()));
}

#[then(expr = "the site has {int} testimonial(s)")]
async fn then_testimonial_count(world: &mut ReviewLinkWorld, count: usize) {
    let document = world.site().mutator().read().await.expect("read failed");
    assert_eq!(document.testimonials.len(), count);
}

#[then("the newest testimonial is pending and external")]
async fn then_newest_pending_external(world: &mut ReviewLinkWorld) {
    let document = world.site().mutator().read().await.expect("read failed");
    let newest = &document.testimonials[0];
    assert_eq!(newest.status, TestimonialStatus::Pending);
    assert_eq!(newest.source, TestimonialSource::External);
    assert_eq!(document.audit_logs.newest().unwrap().user, "Public User");
}

#[then("all issued links are distinct")]
async fn then_links_distinct(world: &mut ReviewLinkWorld) {
    let unique: HashSet<_> = world.issued.iter().collect();
    assert_eq!(unique.len(), world.issued.len());
}

#[then("every issued link is valid")]
async fn then_links_valid(world: &mut ReviewLinkWorld) {
    for token in &world.issued {
        assert!(world.site().validate_token(token).await.valid, "{token} should be valid");
    }
}

#[then(expr = "the site has {int} total view(s)")]
async fn then_total_views(world: &mut ReviewLinkWorld, count: u64) {
    let document = world.site().mutator().read().await.expect("read failed");
    assert_eq!(document.stats.total_views, count);
}

#[then(expr = "today's view count is {int}")]
async fn then_today_views(world: &mut ReviewLinkWorld, count: u64) {
    let document = world.site().mutator().read().await.expect("read failed");
    let today = chrono::Utc::now().date_naive();
    assert_eq!(document.stats.views_on(today), count);
}

#[then(expr = "the public listing has {int} testimonial(s)")]
async fn then_public_listing(world: &mut ReviewLinkWorld, count: usize) {
    assert_eq!(world.site().public_testimonials().await.len(), count);
}
