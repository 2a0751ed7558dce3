use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use primrose::accounts::memory::InMemoryAccountRepository;
use primrose::accounts::session::InMemorySessionStore;
use primrose::accounts::AccountService;
use primrose::engagement::memory::InMemoryEngagementRepository;
use primrose::engagement::EngagementService;
use primrose::listings::memory::InMemoryListingRepository;
use primrose::listings::ListingService;
use primrose::newsletter::memory::InMemoryNewsletterRepository;
use primrose::newsletter::NewsletterService;

pub type Accounts = AccountService<InMemoryAccountRepository, InMemorySessionStore>;
pub type Listings = ListingService<
    InMemoryListingRepository,
    InMemoryAccountRepository,
    InMemoryEngagementRepository,
>;
pub type Engagement = EngagementService<InMemoryEngagementRepository, InMemoryListingRepository>;
pub type Newsletter = NewsletterService<InMemoryNewsletterRepository>;

#[derive(Clone)]
pub struct AppState {
    pub readiness: Arc<AtomicBool>,
    pub metrics: Arc<PrometheusHandle>,
}

/// The four service facades, wired over one shared set of stores so that
/// cross-module reads (seller names on listings, listing cards on
/// favorites) observe the same data.
#[derive(Clone)]
pub struct ApiContext {
    pub accounts: Arc<Accounts>,
    pub listings: Arc<Listings>,
    pub engagement: Arc<Engagement>,
    pub newsletter: Arc<Newsletter>,
}

impl ApiContext {
    pub fn new() -> Self {
        let account_repo = Arc::new(InMemoryAccountRepository::default());
        let listing_repo = Arc::new(InMemoryListingRepository::default());
        let engagement_repo = Arc::new(InMemoryEngagementRepository::default());
        let newsletter_repo = Arc::new(InMemoryNewsletterRepository::default());
        let sessions = Arc::new(InMemorySessionStore::default());

        Self {
            accounts: Arc::new(AccountService::new(
                Arc::clone(&account_repo),
                sessions,
            )),
            listings: Arc::new(ListingService::new(
                Arc::clone(&listing_repo),
                Arc::clone(&account_repo),
                Arc::clone(&engagement_repo),
            )),
            engagement: Arc::new(EngagementService::new(
                engagement_repo,
                listing_repo,
            )),
            newsletter: Arc::new(NewsletterService::new(newsletter_repo)),
        }
    }
}

impl Default for ApiContext {
    fn default() -> Self {
        Self::new()
    }
}
