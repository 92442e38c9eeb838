pub mod ad_stream;
pub mod direct_client;
pub mod direct_scraper;

pub use ad_stream::*;
pub use direct_client::*;
pub use direct_scraper::*;
