/// Business logic for blog-service
///
/// Every service is generic over the repository traits it needs and holds an
/// `Arc` to the store, so handlers can build one per request from `AppState`.
pub mod accounts;
pub mod aggregator;
pub mod comments;
pub mod mailer;
pub mod media;
pub mod posts;
pub mod ratings;
pub mod tags;

pub use accounts::AccountService;
pub use aggregator::{CommentSummary, PostAggregator, PostImageView, PostView};
pub use comments::CommentService;
pub use mailer::{mailer_from_config, LogMailer, Mailer, SmtpMailer};
pub use media::{MediaStorage, MediaUpload};
pub use posts::{PostListParams, PostService};
pub use ratings::RatingService;
pub use tags::TagService;
