//! Seed the database with reference data and a handful of sample products.
//!
//! Intended for development databases; every row is inserted unconditionally,
//! so running it twice duplicates the sample data.

use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

use super::{CommandError, database_url};

const CATEGORIES: &[&str] = &["Beverages", "Snacks", "Household", "Produce"];
const SUPPLIERS: &[&str] = &["Greenfield Co.", "Harbor Trading", "Northside Foods"];
const COMPANIES: &[&str] = &["Clove Retail", "Clove Wholesale"];

/// (name, price, stock, category index, supplier index)
const PRODUCTS: &[(&str, &str, i32, i32, i32)] = &[
    ("Cold Brew Coffee 1L", "6.50", 120, 1, 1),
    ("Sparkling Water 6-pack", "4.25", 300, 1, 2),
    ("Sea Salt Crackers", "2.80", 85, 2, 3),
    ("Dark Chocolate Bar", "3.10", 140, 2, 1),
    ("Dish Soap Refill", "5.90", 60, 3, 2),
    ("Organic Bananas 1kg", "1.95", 45, 4, 3),
];

/// Insert reference rows and sample products.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    for name in CATEGORIES {
        sqlx::query("INSERT INTO product_categories (category_name) VALUES ($1)")
            .bind(name)
            .execute(&pool)
            .await?;
    }
    info!(count = CATEGORIES.len(), "Seeded categories");

    for name in SUPPLIERS {
        sqlx::query("INSERT INTO suppliers (supplier_name) VALUES ($1)")
            .bind(name)
            .execute(&pool)
            .await?;
    }
    info!(count = SUPPLIERS.len(), "Seeded suppliers");

    for name in COMPANIES {
        sqlx::query("INSERT INTO companies (company_name) VALUES ($1)")
            .bind(name)
            .execute(&pool)
            .await?;
    }
    info!(count = COMPANIES.len(), "Seeded companies");

    for (name, price, stock, category, supplier) in PRODUCTS {
        let price = Decimal::from_str(price)
            .map_err(|e| CommandError::InvalidInput(format!("price for {name}: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO products
                (product_name, price, quantity_in_stock, category_id, supplier_id)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(name)
        .bind(price)
        .bind(stock)
        .bind(category)
        .bind(supplier)
        .execute(&pool)
        .await?;
    }
    info!(count = PRODUCTS.len(), "Seeded products");

    Ok(())
}
