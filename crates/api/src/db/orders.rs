//! Order repository: the placement transaction and the read-side joins.
//!
//! `create_order` is the only multi-table write in the system. The header,
//! line items, payment detail, and shipping detail are inserted inside one
//! transaction; a failure anywhere rolls the whole order back, so an order
//! never exists without its dependent records.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use clove_core::{
    CompanyId, OrderDetailId, OrderId, OrderStatus, PageParams, PaymentDetailId, ProductId,
    ShippingDetailId, UserId,
};

use super::RepositoryError;
use super::products::ProductRepository;
use super::users::UserRepository;
use crate::models::{
    CreatedOrder, Order, OrderDetail, OrderDetailExpanded, OrderWithUser, PaymentDetail,
    PaymentDetailWithOrder, Product, ShippingDetail, User,
};

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    order_id: i32,
    user_id: i32,
    company_id: Option<i32>,
    order_date: DateTime<Utc>,
    status: OrderStatus,
    total_amount: Decimal,
    product_ids: Vec<i32>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            order_id: OrderId::new(row.order_id),
            user_id: UserId::new(row.user_id),
            company_id: row.company_id.map(CompanyId::new),
            order_date: row.order_date,
            status: row.status,
            total_amount: row.total_amount,
            product_ids: row.product_ids.into_iter().map(ProductId::new).collect(),
        }
    }
}

/// Internal row type for order detail queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderDetailRow {
    order_detail_id: i32,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    price: Decimal,
}

impl From<OrderDetailRow> for OrderDetail {
    fn from(row: OrderDetailRow) -> Self {
        Self {
            order_detail_id: OrderDetailId::new(row.order_detail_id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            price: row.price,
        }
    }
}

/// Internal row type for payment detail queries.
#[derive(Debug, sqlx::FromRow)]
struct PaymentDetailRow {
    payment_id: i32,
    order_id: i32,
    amount: Decimal,
    payment_method: String,
    payment_status: String,
}

impl From<PaymentDetailRow> for PaymentDetail {
    fn from(row: PaymentDetailRow) -> Self {
        Self {
            payment_id: PaymentDetailId::new(row.payment_id),
            order_id: OrderId::new(row.order_id),
            amount: row.amount,
            payment_method: row.payment_method,
            payment_status: row.payment_status,
        }
    }
}

/// Internal row type for shipping detail queries.
#[derive(Debug, sqlx::FromRow)]
struct ShippingDetailRow {
    shipping_id: i32,
    order_id: i32,
    shipping_address: String,
    estimated_delivery_date: Option<DateTime<Utc>>,
}

impl From<ShippingDetailRow> for ShippingDetail {
    fn from(row: ShippingDetailRow) -> Self {
        Self {
            shipping_id: ShippingDetailId::new(row.shipping_id),
            order_id: OrderId::new(row.order_id),
            shipping_address: row.shipping_address,
            estimated_delivery_date: row.estimated_delivery_date,
        }
    }
}

/// Fields for a new order header.
#[derive(Debug)]
pub struct NewOrder {
    pub company_id: Option<CompanyId>,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub product_ids: Vec<ProductId>,
}

/// Fields for one new order line item.
#[derive(Debug)]
pub struct NewOrderDetail {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

/// Fields for a new payment detail record.
#[derive(Debug)]
pub struct NewPaymentDetail {
    pub amount: Decimal,
    pub payment_method: String,
    pub payment_status: String,
}

/// Fields for a new shipping detail record.
#[derive(Debug)]
pub struct NewShippingDetail {
    pub shipping_address: String,
    pub estimated_delivery_date: Option<DateTime<Utc>>,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create one order with all of its dependent records, atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// committed in that case.
    pub async fn create_order(
        &self,
        user_id: UserId,
        order: NewOrder,
        details: &[NewOrderDetail],
        payment: NewPaymentDetail,
        shipping: NewShippingDetail,
    ) -> Result<CreatedOrder, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let product_ids: Vec<i32> = order.product_ids.iter().map(ProductId::as_i32).collect();

        let order_row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (user_id, company_id, order_date, status, total_amount, product_ids)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING order_id, user_id, company_id, order_date, status, total_amount, product_ids
            ",
        )
        .bind(user_id.as_i32())
        .bind(order.company_id.map(|id| id.as_i32()))
        .bind(order.order_date)
        .bind(order.status)
        .bind(order.total_amount)
        .bind(&product_ids)
        .fetch_one(&mut *tx)
        .await?;

        let mut created_details = Vec::with_capacity(details.len());
        for detail in details {
            let row = sqlx::query_as::<_, OrderDetailRow>(
                r"
                INSERT INTO order_details (order_id, product_id, quantity, price)
                VALUES ($1, $2, $3, $4)
                RETURNING order_detail_id, order_id, product_id, quantity, price
                ",
            )
            .bind(order_row.order_id)
            .bind(detail.product_id.as_i32())
            .bind(detail.quantity)
            .bind(detail.price)
            .fetch_one(&mut *tx)
            .await?;
            created_details.push(row.into());
        }

        let payment_row = sqlx::query_as::<_, PaymentDetailRow>(
            r"
            INSERT INTO payment_details (order_id, amount, payment_method, payment_status)
            VALUES ($1, $2, $3, $4)
            RETURNING payment_id, order_id, amount, payment_method, payment_status
            ",
        )
        .bind(order_row.order_id)
        .bind(payment.amount)
        .bind(&payment.payment_method)
        .bind(&payment.payment_status)
        .fetch_one(&mut *tx)
        .await?;

        let shipping_row = sqlx::query_as::<_, ShippingDetailRow>(
            r"
            INSERT INTO shipping_details (order_id, shipping_address, estimated_delivery_date)
            VALUES ($1, $2, $3)
            RETURNING shipping_id, order_id, shipping_address, estimated_delivery_date
            ",
        )
        .bind(order_row.order_id)
        .bind(&shipping.shipping_address)
        .bind(shipping.estimated_delivery_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CreatedOrder {
            order: order_row.into(),
            details: created_details,
            payment_detail: payment_row.into(),
            shipping_detail: shipping_row.into(),
        })
    }

    /// All orders joined with the users who placed them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all_with_users(&self) -> Result<Vec<OrderWithUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT order_id, user_id, company_id, order_date, status, total_amount, product_ids
            FROM orders
            ORDER BY order_id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        self.join_users(rows.into_iter().map(Into::into).collect())
            .await
    }

    /// One page of orders joined with their users, plus the total count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn paginate_with_users(
        &self,
        params: PageParams,
    ) -> Result<(Vec<OrderWithUser>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT order_id, user_id, company_id, order_date, status, total_amount, product_ids
            FROM orders
            ORDER BY order_id
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(params.page_size())
        .bind(params.offset())
        .fetch_all(self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;

        let orders = self
            .join_users(rows.into_iter().map(Into::into).collect())
            .await?;
        Ok((orders, total))
    }

    /// All orders placed by one user, joined with the user record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderWithUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT order_id, user_id, company_id, order_date, status, total_amount, product_ids
            FROM orders
            WHERE user_id = $1
            ORDER BY order_id
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        self.join_users(rows.into_iter().map(Into::into).collect())
            .await
    }

    /// Change an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            UPDATE orders
            SET status = $2
            WHERE order_id = $1
            RETURNING order_id, user_id, company_id, order_date, status, total_amount, product_ids
            ",
        )
        .bind(id.as_i32())
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Line items of one order, expanded with the order and product records.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn details_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<OrderDetailExpanded>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderDetailRow>(
            r"
            SELECT order_detail_id, order_id, product_id, quantity, price
            FROM order_details
            WHERE order_id = $1
            ORDER BY order_detail_id
            ",
        )
        .bind(order_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        self.expand_details(rows.into_iter().map(Into::into).collect())
            .await
    }

    /// Line items of all orders placed by one user, expanded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn details_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderDetailExpanded>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderDetailRow>(
            r"
            SELECT d.order_detail_id, d.order_id, d.product_id, d.quantity, d.price
            FROM order_details d
            JOIN orders o ON o.order_id = d.order_id
            WHERE o.user_id = $1
            ORDER BY d.order_detail_id
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        self.expand_details(rows.into_iter().map(Into::into).collect())
            .await
    }

    /// All line items across all orders, expanded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn details_all(&self) -> Result<Vec<OrderDetailExpanded>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderDetailRow>(
            r"
            SELECT order_detail_id, order_id, product_id, quantity, price
            FROM order_details
            ORDER BY order_detail_id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        self.expand_details(rows.into_iter().map(Into::into).collect())
            .await
    }

    /// All payment details joined with their orders and users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn payments_with_orders(
        &self,
    ) -> Result<Vec<PaymentDetailWithOrder>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentDetailRow>(
            r"
            SELECT payment_id, order_id, amount, payment_method, payment_status
            FROM payment_details
            ORDER BY payment_id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        self.join_payment_orders(rows.into_iter().map(Into::into).collect())
            .await
    }

    /// One payment detail joined with its order and user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn payment_with_order(
        &self,
        id: PaymentDetailId,
    ) -> Result<Option<PaymentDetailWithOrder>, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentDetailRow>(
            r"
            SELECT payment_id, order_id, amount, payment_method, payment_status
            FROM payment_details
            WHERE payment_id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(self
            .join_payment_orders(vec![row.into()])
            .await?
            .into_iter()
            .next())
    }

    /// All shipping details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn shipping_list(&self) -> Result<Vec<ShippingDetail>, RepositoryError> {
        let rows = sqlx::query_as::<_, ShippingDetailRow>(
            r"
            SELECT shipping_id, order_id, shipping_address, estimated_delivery_date
            FROM shipping_details
            ORDER BY shipping_id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// One shipping detail by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn shipping_get(
        &self,
        id: ShippingDetailId,
    ) -> Result<Option<ShippingDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, ShippingDetailRow>(
            r"
            SELECT shipping_id, order_id, shipping_address, estimated_delivery_date
            FROM shipping_details
            WHERE shipping_id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    // =========================================================================
    // Join helpers
    // =========================================================================

    async fn join_users(
        &self,
        orders: Vec<Order>,
    ) -> Result<Vec<OrderWithUser>, RepositoryError> {
        let user_ids: Vec<UserId> = orders.iter().map(|o| o.user_id).collect();
        let users = self.users_by_id(&user_ids).await?;

        orders
            .into_iter()
            .map(|order| {
                let user = users
                    .get(&order.user_id.as_i32())
                    .cloned()
                    .ok_or_else(|| {
                        RepositoryError::DataCorruption(format!(
                            "order {} references missing user {}",
                            order.order_id, order.user_id
                        ))
                    })?;
                Ok(OrderWithUser { order, user })
            })
            .collect()
    }

    async fn expand_details(
        &self,
        details: Vec<OrderDetail>,
    ) -> Result<Vec<OrderDetailExpanded>, RepositoryError> {
        let order_ids: Vec<i32> = details.iter().map(|d| d.order_id.as_i32()).collect();
        let product_ids: Vec<ProductId> = details.iter().map(|d| d.product_id).collect();

        let order_rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT order_id, user_id, company_id, order_date, status, total_amount, product_ids
            FROM orders
            WHERE order_id = ANY($1)
            ",
        )
        .bind(&order_ids)
        .fetch_all(self.pool)
        .await?;
        let orders: HashMap<i32, Order> = order_rows
            .into_iter()
            .map(|row| (row.order_id, row.into()))
            .collect();

        let products: HashMap<i32, Product> = ProductRepository::new(self.pool)
            .get_many(&product_ids)
            .await?
            .into_iter()
            .map(|p| (p.product_id.as_i32(), p))
            .collect();

        details
            .into_iter()
            .map(|detail| {
                let order = orders
                    .get(&detail.order_id.as_i32())
                    .cloned()
                    .ok_or_else(|| {
                        RepositoryError::DataCorruption(format!(
                            "order detail {} references missing order {}",
                            detail.order_detail_id, detail.order_id
                        ))
                    })?;
                let product = products
                    .get(&detail.product_id.as_i32())
                    .cloned()
                    .ok_or_else(|| {
                        RepositoryError::DataCorruption(format!(
                            "order detail {} references missing product {}",
                            detail.order_detail_id, detail.product_id
                        ))
                    })?;
                Ok(OrderDetailExpanded {
                    detail,
                    order,
                    product,
                })
            })
            .collect()
    }

    async fn join_payment_orders(
        &self,
        payments: Vec<PaymentDetail>,
    ) -> Result<Vec<PaymentDetailWithOrder>, RepositoryError> {
        let order_ids: Vec<i32> = payments.iter().map(|p| p.order_id.as_i32()).collect();

        let order_rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT order_id, user_id, company_id, order_date, status, total_amount, product_ids
            FROM orders
            WHERE order_id = ANY($1)
            ",
        )
        .bind(&order_ids)
        .fetch_all(self.pool)
        .await?;
        let orders: HashMap<i32, Order> = order_rows
            .into_iter()
            .map(|row| (row.order_id, row.into()))
            .collect();

        let user_ids: Vec<UserId> = orders.values().map(|o| o.user_id).collect();
        let users = self.users_by_id(&user_ids).await?;

        payments
            .into_iter()
            .map(|detail| {
                let order = orders
                    .get(&detail.order_id.as_i32())
                    .cloned()
                    .ok_or_else(|| {
                        RepositoryError::DataCorruption(format!(
                            "payment detail {} references missing order {}",
                            detail.payment_id, detail.order_id
                        ))
                    })?;
                let user = users
                    .get(&order.user_id.as_i32())
                    .cloned()
                    .ok_or_else(|| {
                        RepositoryError::DataCorruption(format!(
                            "order {} references missing user {}",
                            order.order_id, order.user_id
                        ))
                    })?;
                Ok(PaymentDetailWithOrder {
                    detail,
                    order,
                    user,
                })
            })
            .collect()
    }

    async fn users_by_id(
        &self,
        ids: &[UserId],
    ) -> Result<HashMap<i32, User>, RepositoryError> {
        let users = UserRepository::new(self.pool).get_many(ids).await?;
        Ok(users
            .into_iter()
            .map(|u| (u.user_id.as_i32(), u))
            .collect())
    }
}
