//! Shop controllers.

pub mod cart;
pub mod order;

pub use cart::CartController;
pub use order::OrderController;
