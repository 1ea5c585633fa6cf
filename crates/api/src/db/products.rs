//! Product repository for catalog queries and admin mutations.
//!
//! Ranking queries use fixed page sizes: 5 for top-selling, 6 for related
//! products, 10 for popular/promotions/newest.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use clove_core::{CategoryId, PageParams, ProductId, ProductImageId, SupplierId};

use super::RepositoryError;
use crate::models::{Product, ProductDetail, ProductImage, ProductWithImages};

const TOP_SELLING_LIMIT: i64 = 5;
const RELATED_LIMIT: i64 = 6;
const RANKING_LIMIT: i64 = 10;

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    product_id: i32,
    product_name: String,
    description: Option<String>,
    price: Decimal,
    quantity_in_stock: i32,
    category_id: Option<i32>,
    supplier_id: Option<i32>,
    is_visible: bool,
    quantity_sold: i32,
    popularity_score: i32,
    promotion_percentage: i32,
    creation_date: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            description: row.description,
            price: row.price,
            quantity_in_stock: row.quantity_in_stock,
            category_id: row.category_id.map(CategoryId::new),
            supplier_id: row.supplier_id.map(SupplierId::new),
            is_visible: row.is_visible,
            quantity_sold: row.quantity_sold,
            popularity_score: row.popularity_score,
            promotion_percentage: row.promotion_percentage,
            creation_date: row.creation_date,
        }
    }
}

/// Internal row type for product image queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductImageRow {
    image_id: i32,
    product_id: i32,
    image_url: String,
}

impl From<ProductImageRow> for ProductImage {
    fn from(row: ProductImageRow) -> Self {
        Self {
            image_id: ProductImageId::new(row.image_id),
            product_id: ProductId::new(row.product_id),
            image_url: row.image_url,
        }
    }
}

const PRODUCT_COLUMNS: &str = "product_id, product_name, description, price, \
     quantity_in_stock, category_id, supplier_id, is_visible, quantity_sold, \
     popularity_score, promotion_percentage, creation_date";

/// Fields for a new product record.
#[derive(Debug)]
pub struct NewProduct<'a> {
    pub product_name: &'a str,
    pub description: Option<&'a str>,
    pub price: Decimal,
    pub quantity_in_stock: i32,
    pub category_id: Option<CategoryId>,
    pub supplier_id: Option<SupplierId>,
}

/// Optional product updates; `None` leaves the column unchanged.
#[derive(Debug, Default)]
pub struct ProductPatch<'a> {
    pub product_name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub price: Option<Decimal>,
    pub quantity_in_stock: Option<i32>,
    pub category_id: Option<CategoryId>,
    pub supplier_id: Option<SupplierId>,
    pub promotion_percentage: Option<i32>,
}

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY product_id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// One page of products plus the total count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn paginate(
        &self,
        params: PageParams,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY product_id LIMIT $1 OFFSET $2"
        ))
        .bind(params.page_size())
        .bind(params.offset())
        .fetch_all(self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Find products whose name contains the given fragment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_by_name(&self, fragment: &str) -> Result<Vec<Product>, RepositoryError> {
        let pattern = format!("%{}%", fragment.replace('%', r"\%").replace('_', r"\_"));

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_name ILIKE $1 ORDER BY product_id"
        ))
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// The five best-selling products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_selling(&self) -> Result<Vec<Product>, RepositoryError> {
        self.ranked("quantity_sold", TOP_SELLING_LIMIT).await
    }

    /// The ten most popular products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn popular(&self) -> Result<Vec<Product>, RepositoryError> {
        self.ranked("popularity_score", RANKING_LIMIT).await
    }

    /// The ten newest products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn newest(&self) -> Result<Vec<Product>, RepositoryError> {
        self.ranked("creation_date", RANKING_LIMIT).await
    }

    async fn ranked(&self, column: &str, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY {column} DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// The ten products with the steepest active promotion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_promotions(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE promotion_percentage > 0 \
             ORDER BY promotion_percentage DESC LIMIT $1"
        ))
        .bind(RANKING_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Products sharing a category or supplier with the given product,
    /// excluding the product itself.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn related(&self, id: ProductId) -> Result<Vec<Product>, RepositoryError> {
        let product = self.get(id).await?.ok_or(RepositoryError::NotFound)?;

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE (category_id = $1 OR supplier_id = $2) AND product_id <> $3 \
             ORDER BY product_id LIMIT $4"
        ))
        .bind(product.category_id.map(|id| id.as_i32()))
        .bind(product.supplier_id.map(|id| id.as_i32()))
        .bind(id.as_i32())
        .bind(RELATED_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get all products in a set of IDs, for batch joins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = ANY($1)"
        ))
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get full product detail: the product, resolved category and supplier
    /// names, and its images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_detail(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct DetailRow {
            #[sqlx(flatten)]
            product: ProductRow,
            category_name: Option<String>,
            supplier_name: Option<String>,
        }

        let columns = product_columns_qualified("p");
        let row = sqlx::query_as::<_, DetailRow>(&format!(
            "SELECT {columns}, c.category_name, s.supplier_name \
             FROM products p \
             LEFT JOIN product_categories c ON c.category_id = p.category_id \
             LEFT JOIN suppliers s ON s.supplier_id = p.supplier_id \
             WHERE p.product_id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let images = self.images_for(id).await?;

        Ok(Some(ProductDetail {
            product: row.product.into(),
            category_name: row.category_name,
            supplier_name: row.supplier_name,
            images,
        }))
    }

    /// All images for one product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn images_for(&self, id: ProductId) -> Result<Vec<ProductImage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductImageRow>(
            r"
            SELECT image_id, product_id, image_url
            FROM product_images
            WHERE product_id = $1
            ORDER BY image_id
            ",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// All images for a set of products, for batch joins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn images_for_products(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<ProductImage>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();

        let rows = sqlx::query_as::<_, ProductImageRow>(
            r"
            SELECT image_id, product_id, image_url
            FROM product_images
            WHERE product_id = ANY($1)
            ORDER BY image_id
            ",
        )
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a product together with its image rows.
    ///
    /// The product and all images are inserted in one transaction, so a
    /// failed image insert leaves no orphaned rows behind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn create(
        &self,
        new_product: NewProduct<'_>,
        image_urls: &[String],
    ) -> Result<ProductWithImages, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products \
             (product_name, description, price, quantity_in_stock, category_id, supplier_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(new_product.product_name)
        .bind(new_product.description)
        .bind(new_product.price)
        .bind(new_product.quantity_in_stock)
        .bind(new_product.category_id.map(|id| id.as_i32()))
        .bind(new_product.supplier_id.map(|id| id.as_i32()))
        .fetch_one(&mut *tx)
        .await?;

        let mut images = Vec::with_capacity(image_urls.len());
        for url in image_urls {
            let image = sqlx::query_as::<_, ProductImageRow>(
                r"
                INSERT INTO product_images (product_id, image_url)
                VALUES ($1, $2)
                RETURNING image_id, product_id, image_url
                ",
            )
            .bind(row.product_id)
            .bind(url)
            .fetch_one(&mut *tx)
            .await?;
            images.push(image.into());
        }

        tx.commit().await?;

        Ok(ProductWithImages {
            product: row.into(),
            images,
        })
    }

    /// Update a product; `None` fields are left unchanged. When `image_urls`
    /// is supplied the existing images are replaced in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch<'_>,
        image_urls: Option<&[String]>,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products \
             SET product_name = COALESCE($2, product_name), \
                 description = COALESCE($3, description), \
                 price = COALESCE($4, price), \
                 quantity_in_stock = COALESCE($5, quantity_in_stock), \
                 category_id = COALESCE($6, category_id), \
                 supplier_id = COALESCE($7, supplier_id), \
                 promotion_percentage = COALESCE($8, promotion_percentage) \
             WHERE product_id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(patch.product_name)
        .bind(patch.description)
        .bind(patch.price)
        .bind(patch.quantity_in_stock)
        .bind(patch.category_id.map(|id| id.as_i32()))
        .bind(patch.supplier_id.map(|id| id.as_i32()))
        .bind(patch.promotion_percentage)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if let Some(urls) = image_urls {
            sqlx::query("DELETE FROM product_images WHERE product_id = $1")
                .bind(id.as_i32())
                .execute(&mut *tx)
                .await?;

            for url in urls {
                sqlx::query("INSERT INTO product_images (product_id, image_url) VALUES ($1, $2)")
                    .bind(id.as_i32())
                    .bind(url)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        Ok(row.into())
    }

    /// Replace all images of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn replace_images(
        &self,
        id: ProductId,
        image_urls: &[String],
    ) -> Result<Vec<ProductImage>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, i32>("SELECT 1 FROM products WHERE product_id = $1")
            .bind(id.as_i32())
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM product_images WHERE product_id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;

        let mut images = Vec::with_capacity(image_urls.len());
        for url in image_urls {
            let image = sqlx::query_as::<_, ProductImageRow>(
                r"
                INSERT INTO product_images (product_id, image_url)
                VALUES ($1, $2)
                RETURNING image_id, product_id, image_url
                ",
            )
            .bind(id.as_i32())
            .bind(url)
            .fetch_one(&mut *tx)
            .await?;
            images.push(image.into());
        }

        tx.commit().await?;

        Ok(images)
    }

    /// Flip a product's visibility flag in a single atomic update.
    ///
    /// Returns the new visibility value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn toggle_visibility(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let visible = sqlx::query_scalar::<_, bool>(
            r"
            UPDATE products
            SET is_visible = NOT is_visible
            WHERE product_id = $1
            RETURNING is_visible
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(visible)
    }

    /// Delete a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matched at delete time.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

fn product_columns_qualified(alias: &str) -> String {
    PRODUCT_COLUMNS
        .split(", ")
        .map(|col| format!("{alias}.{}", col.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
