//! Client side of the organizations listing: typed environment, the HTTP
//! fetch adapter and the view that renders the fetched names.

pub mod environment;
pub mod error;
pub mod fetch;
pub mod view;

pub use environment::Environment;
pub use error::{ConfigError, FetchError};
pub use fetch::{fetch_organizations, request_url, Fetcher, HttpFetcher};
pub use view::{MountedView, OrganizationsView, VIEW_TITLE};
