//! Catalog route handlers.
//!
//! Reads are public; every mutation calls the admin guard before touching
//! the catalog.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use clove_core::{CategoryId, Page, ProductId, SupplierId};

use crate::db::products::{NewProduct, ProductPatch, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{Product, ProductDetail, ProductImage, ProductWithImages};
use crate::routes::{MessageResponse, PageQuery};
use crate::services::authz::require_admin;
use crate::services::uploads;
use crate::state::AppState;

/// Product update request body; absent fields are left unchanged. When
/// `image_urls` is present the product's images are replaced.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity_in_stock: Option<i32>,
    pub category_id: Option<CategoryId>,
    pub supplier_id: Option<SupplierId>,
    pub promotion_percentage: Option<i32>,
    pub image_urls: Option<Vec<String>>,
}

/// `GET /product` - the whole catalog.
#[instrument(skip(state))]
pub async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    Ok(Json(products))
}

/// `GET /product/get-product/{id}` - full product detail.
#[instrument(skip(state))]
pub async fn get_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductDetail>> {
    let detail = ProductRepository::new(state.pool())
        .get_detail(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(detail))
}

/// `GET /product/pagination` - page through the catalog.
#[instrument(skip(state))]
pub async fn paginate(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Product>>> {
    let params = query.params();
    let (products, total) = ProductRepository::new(state.pool()).paginate(params).await?;

    Ok(Json(Page::new(products, params, total)))
}

/// `GET /product/search/{name}` - substring name search.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .search_by_name(&name)
        .await?;
    Ok(Json(products))
}

/// `GET /product/top-selling`
#[instrument(skip(state))]
pub async fn top_selling(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(ProductRepository::new(state.pool()).top_selling().await?))
}

/// `GET /product/related-products/{id}`
#[instrument(skip(state))]
pub async fn related(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .related(ProductId::new(id))
        .await?;
    Ok(Json(products))
}

/// `GET /product/popular`
#[instrument(skip(state))]
pub async fn popular(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(ProductRepository::new(state.pool()).popular().await?))
}

/// `GET /product/top-promotions`
#[instrument(skip(state))]
pub async fn top_promotions(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(
        ProductRepository::new(state.pool()).top_promotions().await?,
    ))
}

/// `GET /product/new-products`
#[instrument(skip(state))]
pub async fn newest(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(ProductRepository::new(state.pool()).newest().await?))
}

/// `POST /product` - create a product with images (admin, multipart).
///
/// Text fields carry the product payload; each `images` file field is stored
/// on disk and becomes a product image row.
#[instrument(skip(state, multipart))]
pub async fn create(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ProductWithImages>> {
    require_admin(state.pool(), user_id).await?;

    let form = parse_product_form(&state, multipart).await?;

    let product_name = form
        .product_name
        .ok_or_else(|| AppError::BadRequest("product_name is required".to_string()))?;
    let price = form
        .price
        .ok_or_else(|| AppError::BadRequest("price is required".to_string()))?;

    let created = ProductRepository::new(state.pool())
        .create(
            NewProduct {
                product_name: &product_name,
                description: form.description.as_deref(),
                price,
                quantity_in_stock: form.quantity_in_stock.unwrap_or(0),
                category_id: form.category_id,
                supplier_id: form.supplier_id,
            },
            &form.image_urls,
        )
        .await?;

    Ok(Json(created))
}

/// `PUT /product/{id}` - update a product (admin).
#[instrument(skip(state, body))]
pub async fn update(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    require_admin(state.pool(), user_id).await?;

    let product = ProductRepository::new(state.pool())
        .update(
            ProductId::new(id),
            ProductPatch {
                product_name: body.product_name.as_deref(),
                description: body.description.as_deref(),
                price: body.price,
                quantity_in_stock: body.quantity_in_stock,
                category_id: body.category_id,
                supplier_id: body.supplier_id,
                promotion_percentage: body.promotion_percentage,
            },
            body.image_urls.as_deref(),
        )
        .await?;

    Ok(Json(product))
}

/// `PUT /product/update-pictures/{id}` - replace product images (admin,
/// multipart `images` file fields).
#[instrument(skip(state, multipart))]
pub async fn update_pictures(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<Vec<ProductImage>>> {
    require_admin(state.pool(), user_id).await?;

    let form = parse_product_form(&state, multipart).await?;

    let images = ProductRepository::new(state.pool())
        .replace_images(ProductId::new(id), &form.image_urls)
        .await?;

    Ok(Json(images))
}

/// `PUT /product/hidden-product/{id}` - toggle product visibility (admin).
#[instrument(skip(state))]
pub async fn toggle_visibility(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>> {
    require_admin(state.pool(), user_id).await?;

    let visible = ProductRepository::new(state.pool())
        .toggle_visibility(ProductId::new(id))
        .await?;

    let message = if visible {
        "Product is now visible"
    } else {
        "Product is now hidden"
    };
    Ok(MessageResponse::json(message))
}

/// `DELETE /product/{id}` - delete a product (admin).
#[instrument(skip(state))]
pub async fn delete(
    CurrentUser(user_id): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>> {
    require_admin(state.pool(), user_id).await?;

    ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await?;

    Ok(MessageResponse::json("Product deleted successfully"))
}

/// Product fields collected from a multipart form.
#[derive(Debug, Default)]
struct ProductForm {
    product_name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    quantity_in_stock: Option<i32>,
    category_id: Option<CategoryId>,
    supplier_id: Option<SupplierId>,
    image_urls: Vec<String>,
}

/// Walk the multipart fields, storing `images` files to disk and collecting
/// the text fields.
async fn parse_product_form(state: &AppState, mut multipart: Multipart) -> Result<ProductForm> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        if name == "images" {
            let original = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;

            let dir = state.config().upload_dir.join("product");
            form.image_urls
                .push(uploads::save_file(&dir, &original, &data).await?);
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid field {name}: {e}")))?;

        match name.as_str() {
            "product_name" => form.product_name = Some(value),
            "description" => form.description = Some(value),
            "price" => {
                form.price = Some(Decimal::from_str(&value).map_err(|_| {
                    AppError::BadRequest(format!("price is not a valid number: {value}"))
                })?);
            }
            "quantity_in_stock" => {
                form.quantity_in_stock = Some(value.parse().map_err(|_| {
                    AppError::BadRequest(format!("quantity_in_stock is not an integer: {value}"))
                })?);
            }
            "category_id" => {
                form.category_id = Some(CategoryId::new(value.parse().map_err(|_| {
                    AppError::BadRequest(format!("category_id is not an integer: {value}"))
                })?));
            }
            "supplier_id" => {
                form.supplier_id = Some(SupplierId::new(value.parse().map_err(|_| {
                    AppError::BadRequest(format!("supplier_id is not an integer: {value}"))
                })?));
            }
            _ => {}
        }
    }

    Ok(form)
}
