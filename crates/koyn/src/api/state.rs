//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthState, IdentityResolver, PathPolicy, TokenCodec};
use crate::config::AppConfig;
use crate::db::Database;
use crate::exchange::{ExchangeAccountRepository, ExchangeApi, ExchangeService};
use crate::file::{FileRepository, FileService, FsObjectStore, ObjectStore};
use crate::news::{NewsRepository, NewsService};
use crate::notify::SlackNotifier;
use crate::oauth::OAuthClient;
use crate::post::{PostRepository, PostService};
use crate::user::{UserRepository, UserService};

/// Application state shared across handlers.
///
/// Everything in here is wired once at startup and immutable afterwards;
/// handlers get cheap clones.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub codec: Arc<TokenCodec>,
    pub auth: AuthState,
    pub users: UserService,
    pub posts: PostService,
    pub files: FileService,
    pub news: NewsService,
    pub exchange: ExchangeService,
    pub oauth: Arc<OAuthClient>,
    pub notifier: Arc<SlackNotifier>,
}

impl AppState {
    /// Wire every service from the config plus an open database.
    ///
    /// The signing secret arrives pre-resolved (the caller already ran
    /// config validation); the exchange client is injectable so tests can
    /// substitute a stub venue.
    pub fn new(
        config: AppConfig,
        db: &Database,
        secret: &str,
        exchange_client: Arc<dyn ExchangeApi>,
    ) -> Self {
        let pool = db.pool().clone();

        let codec = Arc::new(TokenCodec::new(secret));
        let policy = Arc::new(PathPolicy::new(&config.auth.public_paths));
        let user_repo = UserRepository::new(pool.clone());
        let resolver = Arc::new(IdentityResolver::new(
            user_repo.clone(),
            Duration::from_millis(config.auth.lookup_timeout_ms.max(1)),
        ));
        let auth = AuthState::new(codec.clone(), policy, resolver);

        let store: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(
            config.storage.root.clone(),
            &config.storage.public_base,
        ));

        let users = UserService::new(user_repo);
        let posts = PostService::new(PostRepository::new(pool.clone()), store.clone());
        let files = FileService::new(FileRepository::new(pool.clone()), store);
        let news = NewsService::new(NewsRepository::new(pool.clone()));
        let exchange = ExchangeService::new(
            ExchangeAccountRepository::new(pool),
            exchange_client,
        );
        let oauth = Arc::new(OAuthClient::new(config.oauth.clone()));
        let notifier = Arc::new(SlackNotifier::new(config.slack.clone()));

        Self {
            config: Arc::new(config),
            codec,
            auth,
            users,
            posts,
            files,
            news,
            exchange,
            oauth,
            notifier,
        }
    }

    /// Configured credential validity window.
    pub fn token_validity(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.config.auth.token_validity_secs)
    }
}
