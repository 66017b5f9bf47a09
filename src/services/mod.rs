// Services module - memoized read paths over the repositories

pub mod batch;
pub mod browse_service;
pub mod cart_service;

pub use batch::{distinct_ids, fetch_distinct};
pub use browse_service::BrowseService;
pub use cart_service::CartService;
