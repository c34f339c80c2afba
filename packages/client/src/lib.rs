//! # Lectern Client
//!
//! HTTP implementations of the editor's persistence boundary and the AI
//! metadata service, plus the debounce helper used for search lookups.
//!
//! ```rust,ignore
//! let client = Client::new("http://localhost:3000/api", Duration::from_secs(30))?;
//! let persistence = HttpPersistence::new(client.clone());
//! let service = HttpMetadataService::new(client);
//! ```

mod debounce;
mod http;
mod metadata;
mod persistence;

pub use debounce::Debouncer;
pub use http::Client;
pub use metadata::HttpMetadataService;
pub use persistence::HttpPersistence;
