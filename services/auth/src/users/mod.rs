//! User credential collaborator: records, storage and password checks.

pub mod model;
pub mod service;
pub mod store;

pub use model::{User, UserSummary, DEFAULT_ROLE};
pub use service::UserService;
pub use store::{InMemoryUserStore, UserStore};
