pub mod api;
pub mod traits;

pub use api::ApiClient;
pub use traits::{ChatSource, ListingSource};
