//! Filtered, paginated property search with an assistant override channel.
//!
//! The pipeline runs filters → query → paged fetch → aggregated results.
//! [`session::SearchSession`] holds the state machine without doing I/O;
//! [`controller::SearchController`] drives it against a
//! [`sources::ListingSource`].

pub mod aggregate;
pub mod assistant;
pub mod budget;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod filters;
pub mod models;
pub mod query;
pub mod scroll;
pub mod session;
pub mod settings;
pub mod sources;

#[cfg(test)]
mod testing;

pub use controller::SearchController;
pub use error::{FetchError, MappingError, OverrideChannelError};
pub use filters::{BedroomCategory, FilterSet, FilterUpdate, PossessionTag, SortKey};
pub use models::{Property, ResultPage};
pub use query::{QueryMapper, QueryParams};
pub use session::{SearchSession, SessionView};
