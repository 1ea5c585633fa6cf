//! Order domain types.
//!
//! An [`Order`] never exists without its payment detail, shipping detail,
//! and at least one line item; the placement workflow creates all four
//! inside one transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use clove_core::{
    CompanyId, OrderDetailId, OrderId, OrderStatus, PaymentDetailId, ProductId, ShippingDetailId,
    UserId,
};

use super::product::Product;
use super::user::User;

/// An order header.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub company_id: Option<CompanyId>,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    /// Denormalized list of the products on this order.
    pub product_ids: Vec<ProductId>,
}

/// One order line item.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order_detail_id: OrderDetailId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    /// Unit price at order time.
    pub price: Decimal,
}

/// Payment record attached one-to-one to an order.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentDetail {
    pub payment_id: PaymentDetailId,
    pub order_id: OrderId,
    pub amount: Decimal,
    pub payment_method: String,
    pub payment_status: String,
}

/// Shipping record attached one-to-one to an order.
#[derive(Debug, Clone, Serialize)]
pub struct ShippingDetail {
    pub shipping_id: ShippingDetailId,
    pub order_id: OrderId,
    pub shipping_address: String,
    pub estimated_delivery_date: Option<DateTime<Utc>>,
}

/// An order joined with the user who placed it.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithUser {
    #[serde(flatten)]
    pub order: Order,
    pub user: User,
}

/// An order line item joined with its order and product.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetailExpanded {
    #[serde(flatten)]
    pub detail: OrderDetail,
    pub order: Order,
    pub product: Product,
}

/// A payment detail joined with its order and the ordering user.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentDetailWithOrder {
    #[serde(flatten)]
    pub detail: PaymentDetail,
    pub order: Order,
    pub user: User,
}

/// The full record set created for one order specification.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedOrder {
    #[serde(flatten)]
    pub order: Order,
    pub details: Vec<OrderDetail>,
    pub payment_detail: PaymentDetail,
    pub shipping_detail: ShippingDetail,
}
