// Repositories module - data access contracts

pub mod browse_repository;
pub mod cart_repository;
pub mod product_repository;

pub use browse_repository::BrowseRepository;
pub use cart_repository::CartRepository;
pub use product_repository::ProductRepository;
