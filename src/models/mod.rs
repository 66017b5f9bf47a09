// Re-export all model types
pub use self::browse::*;
pub use self::cart::*;
pub use self::errors::*;
pub use self::product::*;
pub use self::row::*;
pub use self::validation::*;

mod browse;
mod cart;
mod errors;
mod product;
mod row;
mod validation;
