pub mod cli;
pub mod error;
pub mod github;
pub mod types;

pub use error::{Result, StarCountError};
pub use github::{FetcherConfig, StarCountFetcher};
pub use types::{RepositoryId, StarCount};
