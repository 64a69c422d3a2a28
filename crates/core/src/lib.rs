pub mod auth;
pub mod catalog;
pub mod config;
pub mod feed;
pub mod metrics;
pub mod movie;
pub mod sync;
pub mod testing;

pub use auth::{
    create_authenticator, ApiKeyAuthenticator, AuthError, AuthRequest, Authenticator, Identity,
    NoneAuthenticator, Role,
};
pub use catalog::{
    CatalogError, CatalogService, DeleteConfirmation, ListQuery, PageMeta, Paginated, QueryPlan,
    UniquenessGuard,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthMethod, Config, ConfigError,
    SanitizedConfig,
};
pub use feed::{FeedError, FeedSource, SwapiClient};
pub use movie::{
    Movie, MovieFilter, MoviePatch, MovieRecord, MovieStore, NewMovie, SqliteMovieStore,
    StoreError,
};
pub use sync::{SyncScheduler, SyncSummary};
