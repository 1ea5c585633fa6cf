//! Domain types for the API.
//!
//! These types represent validated domain objects separate from database row
//! types, and double as the JSON response bodies.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{CartEntry, CartItem};
pub use order::{
    CreatedOrder, Order, OrderDetail, OrderDetailExpanded, OrderWithUser, PaymentDetail,
    PaymentDetailWithOrder, ShippingDetail,
};
pub use product::{Product, ProductDetail, ProductImage, ProductWithImages};
pub use user::User;
