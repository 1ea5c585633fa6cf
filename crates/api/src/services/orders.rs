//! Order placement workflow.
//!
//! A batch of order specifications is processed strictly in input order, one
//! at a time. Each order commits atomically (header, line items, payment
//! detail, shipping detail in one transaction), but the batch itself is not
//! atomic: when order *k* fails, orders 1..k-1 stay committed and the rest
//! of the batch is never attempted. The surfaced error names the failing
//! position.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use clove_core::{CompanyId, OrderStatus, ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::orders::{
    NewOrder, NewOrderDetail, NewPaymentDetail, NewShippingDetail, OrderRepository,
};
use crate::models::CreatedOrder;

/// Errors from the order placement workflow.
///
/// Positions are 1-based so the message matches the order's place in the
/// submitted batch.
#[derive(Debug, Error)]
pub enum OrderError {
    /// An order specification failed validation before any write.
    #[error("order {position}: {reason}")]
    InvalidOrder {
        position: usize,
        reason: &'static str,
    },

    /// An order's transaction failed; it was rolled back entirely.
    #[error("order {position} could not be created: {source}")]
    Failed {
        position: usize,
        source: RepositoryError,
    },
}

/// One line item in an order specification.
#[derive(Debug, Deserialize)]
pub struct OrderItemSpec {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

/// Payment payload of an order specification.
#[derive(Debug, Deserialize)]
pub struct PaymentSpec {
    pub amount: Decimal,
    pub payment_method: String,
    pub payment_status: String,
}

/// Shipping payload of an order specification.
#[derive(Debug, Deserialize)]
pub struct ShippingSpec {
    pub shipping_address: String,
    pub estimated_delivery_date: Option<DateTime<Utc>>,
}

/// One order specification in a batch.
///
/// The line items, payment, and shipping payloads are lenient at the parsing
/// layer so an invalid order mid-batch fails in the loop, after its
/// predecessors have committed, rather than rejecting the whole request
/// upfront.
#[derive(Debug, Deserialize)]
pub struct OrderSpec {
    pub company_id: Option<CompanyId>,
    pub order_date: DateTime<Utc>,
    #[serde(default)]
    pub status: OrderStatus,
    pub total_amount: Decimal,
    #[serde(default)]
    pub details: Vec<OrderItemSpec>,
    pub payment_detail: Option<PaymentSpec>,
    pub shipping_detail: Option<ShippingSpec>,
}

/// Order placement service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// Place a batch of orders for the given user, sequentially.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidOrder` or `OrderError::Failed` naming the
    /// 1-based position of the first failing specification. Orders before it
    /// are already committed.
    pub async fn create_orders(
        &self,
        user_id: UserId,
        batch: Vec<OrderSpec>,
    ) -> Result<Vec<CreatedOrder>, OrderError> {
        let mut created = Vec::with_capacity(batch.len());

        for (idx, spec) in batch.into_iter().enumerate() {
            let position = idx + 1;
            let (order, details, payment, shipping) = validate_spec(position, spec)?;

            let created_order = self
                .orders
                .create_order(user_id, order, &details, payment, shipping)
                .await
                .map_err(|source| OrderError::Failed { position, source })?;

            created.push(created_order);
        }

        Ok(created)
    }
}

type ValidatedSpec = (
    NewOrder,
    Vec<NewOrderDetail>,
    NewPaymentDetail,
    NewShippingDetail,
);

/// Check one specification and translate it into repository inputs.
fn validate_spec(position: usize, spec: OrderSpec) -> Result<ValidatedSpec, OrderError> {
    if spec.details.is_empty() {
        return Err(OrderError::InvalidOrder {
            position,
            reason: "at least one line item is required",
        });
    }

    let payment = spec.payment_detail.ok_or(OrderError::InvalidOrder {
        position,
        reason: "payment detail is required",
    })?;

    let shipping = spec.shipping_detail.ok_or(OrderError::InvalidOrder {
        position,
        reason: "shipping detail is required",
    })?;

    // Derive the denormalized product-id list from the line items.
    let product_ids: Vec<ProductId> = spec.details.iter().map(|d| d.product_id).collect();

    let order = NewOrder {
        company_id: spec.company_id,
        order_date: spec.order_date,
        status: spec.status,
        total_amount: spec.total_amount,
        product_ids,
    };

    let details = spec
        .details
        .into_iter()
        .map(|d| NewOrderDetail {
            product_id: d.product_id,
            quantity: d.quantity,
            price: d.price,
        })
        .collect();

    let payment = NewPaymentDetail {
        amount: payment.amount,
        payment_method: payment.payment_method,
        payment_status: payment.payment_status,
    };

    let shipping = NewShippingDetail {
        shipping_address: shipping.shipping_address,
        estimated_delivery_date: shipping.estimated_delivery_date,
    };

    Ok((order, details, payment, shipping))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn payload(with_payment: bool, with_details: bool) -> OrderSpec {
        let payment = if with_payment {
            r#","payment_detail":{"amount":"10.00","payment_method":"card","payment_status":"paid"}"#
        } else {
            ""
        };
        let details = if with_details {
            r#""details":[{"product_id":1,"quantity":2,"price":"5.00"}],"#
        } else {
            r#""details":[],"#
        };
        let json = format!(
            r#"{{"order_date":"2026-08-01T00:00:00Z","total_amount":"10.00",{details}"shipping_detail":{{"shipping_address":"12 Vine St"}}{payment}}}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_missing_payment_is_invalid_at_its_position() {
        let err = validate_spec(2, payload(false, true)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("order 2"), "message was: {message}");
        assert!(message.contains("payment"), "message was: {message}");
    }

    #[test]
    fn test_empty_details_are_invalid() {
        let err = validate_spec(1, payload(true, false)).unwrap_err();
        assert!(err.to_string().contains("line item"));
    }

    #[test]
    fn test_valid_spec_derives_product_ids() {
        let (order, details, _payment, _shipping) =
            validate_spec(1, payload(true, true)).unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(order.product_ids, vec![ProductId::new(1)]);
    }

    #[test]
    fn test_status_defaults_to_pending() {
        assert_eq!(payload(true, true).status, OrderStatus::Pending);
    }
}
