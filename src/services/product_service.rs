use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, sea_query::Expr,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    allow_list::parse_patch,
    audit,
    dto::products::{CreateProductRequest, PRODUCT_UPDATE_FIELDS, ProductList, UpdateProductRequest},
    entity::{
        partners::{Column as PartnerCol, Entity as Partners},
        products::{ActiveModel, Column, Entity as Products},
        sea_orm_active_enums::ActiveUnactive,
    },
    error::{AppError, AppResult},
    media::ingest_images,
    middleware::auth::{AuthUser, Scope},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
    state::AppState,
    validation::{ensure_color_list, non_empty, required},
};

fn optional_colors(field: &str, colors: Option<Vec<String>>) -> AppResult<Option<Vec<String>>> {
    if let Some(colors) = &colors {
        ensure_color_list(field, colors)?;
    }
    Ok(colors)
}

fn ensure_price(price: i64) -> AppResult<i64> {
    if price <= 0 {
        return Err(AppError::bad_request("productPrice must be greater than 0"));
    }
    Ok(price)
}

fn ensure_images(images: &[String]) -> AppResult<()> {
    if images.is_empty() {
        return Err(AppError::bad_request("images must be a non-empty list"));
    }
    Ok(())
}

fn map_write_err(err: sea_orm::DbErr) -> AppError {
    match err.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
            AppError::bad_request("A product with this productCode already exists")
        }
        _ => AppError::OrmError(err),
    }
}

/// The partner a new product belongs to. Partner staff always write into
/// their own catalog; platform admins may name a live partner.
async fn owning_partner(
    state: &AppState,
    scope: Scope,
    requested: Option<Uuid>,
) -> AppResult<Option<Uuid>> {
    if let Some(partner_id) = scope.catalog_writer()? {
        return Ok(Some(partner_id));
    }
    let Some(partner_id) = requested else {
        return Ok(None);
    };
    let exists = Partners::find_by_id(partner_id)
        .filter(PartnerCol::DeletedAt.is_null())
        .count(state.db())
        .await?;
    if exists == 0 {
        return Err(AppError::not_found("Partner"));
    }
    Ok(Some(partner_id))
}

fn writer_condition(scope: Scope, id: Uuid) -> AppResult<Condition> {
    let mut condition = Condition::all()
        .add(Column::Id.eq(id))
        .add(Column::DeletedAt.is_null());
    if let Some(partner_id) = scope.catalog_writer()? {
        condition = condition.add(Column::PartnerId.eq(partner_id));
    }
    Ok(condition)
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let scope = user.scope()?;
    scope.catalog_writer()?;

    let product_code = required("productCode", payload.product_code)?;
    let product_name = required("productName", payload.product_name)?;
    let product_price = payload
        .product_price
        .ok_or_else(|| AppError::bad_request("productPrice is required"))
        .and_then(ensure_price)?;
    let type_of_product = payload
        .type_of_product
        .ok_or_else(|| AppError::bad_request("typeOfProduct is required"))?;
    let description = required("description", payload.description)?;
    let brand = required("brand", payload.brand)?;
    let colors = payload
        .colors
        .ok_or_else(|| AppError::bad_request("colors is required"))?;
    ensure_color_list("colors", &colors)?;
    let active_unactive = payload
        .active_unactive
        .ok_or_else(|| AppError::bad_request("activeUnactive is required"))?;
    let images = payload
        .images
        .ok_or_else(|| AppError::bad_request("images is required"))?;
    ensure_images(&images)?;

    let laces_color = optional_colors("lacesColor", payload.laces_color)?;
    let sole_color = optional_colors("soleColor", payload.sole_color)?;
    let inside_color = optional_colors("insideColor", payload.inside_color)?;
    let outside_color = optional_colors("outsideColor", payload.outside_color)?;

    let partner_id = owning_partner(state, scope, payload.partner_id).await?;
    let images = ingest_images(state.media.as_ref(), images).await?;

    let now = Utc::now();
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        product_code: Set(product_code),
        product_name: Set(product_name),
        product_price: Set(product_price),
        type_of_product: Set(type_of_product),
        description: Set(description),
        brand: Set(brand),
        colors: Set(colors),
        glass_color: Set(payload.glass_color),
        laces_color: Set(laces_color),
        sole_color: Set(sole_color),
        inside_color: Set(inside_color),
        outside_color: Set(outside_color),
        active_unactive: Set(active_unactive),
        images: Set(images),
        partner_id: Set(partner_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        deleted_at: Set(None),
    }
    .insert(state.db())
    .await
    .map_err(map_write_err)?;

    audit::record(
        state.db(),
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id, "partner_id": product.partner_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

/// Public catalog listing. A partner token narrows the listing to that
/// partner's products.
pub async fn list_products(
    state: &AppState,
    user: Option<&AuthUser>,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(Column::DeletedAt.is_null());

    if let Some(user) = user {
        if let Some(partner_id) = user.scope()?.catalog_reader() {
            condition = condition.add(Column::PartnerId.eq(partner_id));
        }
    }
    if let Some(type_of_product) = query.type_of_product {
        condition = condition.add(Column::TypeOfProduct.eq(type_of_product));
    }
    if let Some(brand) = query.brand.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
        condition = condition.add(Column::Brand.eq(brand));
    }
    if let Some(partner_id) = query.partner_id {
        condition = condition.add(Column::PartnerId.eq(partner_id));
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(state.db()).await?;
    let products = finder
        .limit(limit)
        .offset(offset)
        .all(state.db())
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::success(
        "Products",
        ProductList { products },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_product_by_code(
    state: &AppState,
    user: Option<&AuthUser>,
    product_code: &str,
) -> AppResult<ApiResponse<Product>> {
    let mut finder = Products::find()
        .filter(Column::ProductCode.eq(product_code))
        .filter(Column::DeletedAt.is_null());
    if let Some(user) = user {
        if let Some(partner_id) = user.scope()?.catalog_reader() {
            finder = finder.filter(Column::PartnerId.eq(partner_id));
        }
    }

    let product = finder
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    Ok(ApiResponse::success("Product", Product::from(product), None))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    body: Value,
) -> AppResult<ApiResponse<Product>> {
    let condition = writer_condition(user.scope()?, id)?;
    let patch: UpdateProductRequest = parse_patch(body, PRODUCT_UPDATE_FIELDS)?;

    let existing = Products::find()
        .filter(condition)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = patch.product_name {
        non_empty("productName", &name)?;
        active.product_name = Set(name.trim().to_string());
    }
    if let Some(price) = patch.product_price {
        active.product_price = Set(ensure_price(price)?);
    }
    if let Some(type_of_product) = patch.type_of_product {
        active.type_of_product = Set(type_of_product);
    }
    if let Some(description) = patch.description {
        active.description = Set(description);
    }
    if let Some(brand) = patch.brand {
        non_empty("brand", &brand)?;
        active.brand = Set(brand.trim().to_string());
    }
    if let Some(colors) = patch.colors {
        ensure_color_list("colors", &colors)?;
        active.colors = Set(colors);
    }
    if let Some(glass_color) = patch.glass_color {
        active.glass_color = Set(Some(glass_color));
    }
    if let Some(colors) = optional_colors("lacesColor", patch.laces_color)? {
        active.laces_color = Set(Some(colors));
    }
    if let Some(colors) = optional_colors("soleColor", patch.sole_color)? {
        active.sole_color = Set(Some(colors));
    }
    if let Some(colors) = optional_colors("insideColor", patch.inside_color)? {
        active.inside_color = Set(Some(colors));
    }
    if let Some(colors) = optional_colors("outsideColor", patch.outside_color)? {
        active.outside_color = Set(Some(colors));
    }
    if let Some(status) = patch.active_unactive {
        active.active_unactive = Set(status);
    }
    if let Some(images) = patch.images {
        ensure_images(&images)?;
        active.images = Set(ingest_images(state.media.as_ref(), images).await?);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(state.db()).await.map_err(map_write_err)?;

    audit::record(
        state.db(),
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

/// Tombstone a product. Orders keep their line-item snapshots.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let condition = writer_condition(user.scope()?, id)?;
    let result = Products::update_many()
        .col_expr(Column::DeletedAt, Expr::value(Utc::now()))
        .col_expr(Column::ActiveUnactive, Expr::value(ActiveUnactive::Inactive))
        .filter(condition)
        .exec(state.db())
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("Product"));
    }

    audit::record(
        state.db(),
        Some(user.user_id),
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::message("Product deleted successfully"))
}
