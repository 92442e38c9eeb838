pub mod advertisement;
pub mod pager;
pub mod scrape_error;
pub mod search_endpoint;
pub mod selector_table;

pub use advertisement::*;
pub use scrape_error::*;
