//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration, email verification, login, session lifecycle
//! - `cart` - Cart aggregate with stock checks and snapshot capture
//! - `catalog` - Public product/store lookups with a store-profile cache
//! - `email` - Email delivery via SMTP (or logging fallback)
//! - `orders` - Order history, ownership-scoped reads, status transitions
//! - `wishlist` - Wishlist aggregate with idempotent adds and sharing

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod email;
pub mod orders;
pub mod wishlist;

pub use auth::{AuthError, AuthService, RegisterInput};
pub use cart::{CartError, CartService, StockValidation};
pub use catalog::CatalogService;
pub use email::{EmailService, MailError, generate_verification_code};
pub use orders::{OrderError, OrderFilters, OrderPage, OrderService};
pub use wishlist::{WishlistError, WishlistItemOptions, WishlistService};
