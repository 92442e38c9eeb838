pub mod ad_csv;
pub mod query_file;

pub use ad_csv::*;
pub use query_file::*;
