pub mod error;
pub mod pagination;
pub mod search;

pub use error::PageError;
pub use pagination::{LimitOffset, Listing, Page, PageQuery};
pub use search::{SearchQuery, SearchTerms};
