//! Domain models for the storefront.
//!
//! These types represent validated domain objects separate from database
//! row types. Everything serialized into a response body lives here.

pub mod cart;
pub mod catalog;
pub mod customer;
pub mod order;
pub mod session;
pub mod wishlist;

pub use cart::{Cart, CartItem};
pub use catalog::{Product, ProductSnapshot, Store, StoreSnapshot};
pub use customer::Customer;
pub use order::{Order, OrderItem, OrderSummary, StatusHistoryEntry};
pub use session::{CurrentCustomer, Session};
pub use wishlist::{NotificationSettings, Wishlist, WishlistItem};
