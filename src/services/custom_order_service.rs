use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    allow_list::parse_patch,
    audit,
    dto::orders::{CUSTOM_ORDER_UPDATE_FIELDS, CustomOrderList, UpdateCustomOrderRequest},
    entity::{
        custom_orders::{ActiveModel as CustomOrderActive, Column as CustomCol, Entity as CustomOrders},
        products::{Column as ProdCol, Entity as Products},
        sea_orm_active_enums::OrderStatus,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Scope},
    models::{CustomOrder, CustomerContact},
    response::{ApiResponse, Meta},
    routes::params::PageQuery,
    state::AppState,
    validation::{color_array, ensure_email, non_empty},
};

/// The four color choices of a configured product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorChoice {
    pub laces_color: Vec<String>,
    pub sole_color: Vec<String>,
    pub inside_color: Vec<String>,
    pub outside_color: Vec<String>,
}

/// Read the color fields from the raw body so scalars and mixed arrays are
/// rejected rather than coerced.
pub fn parse_color_choice(body: &Value) -> AppResult<ColorChoice> {
    Ok(ColorChoice {
        laces_color: color_array("lacesColor", body.get("lacesColor"))?,
        sole_color: color_array("soleColor", body.get("soleColor"))?,
        inside_color: color_array("insideColor", body.get("insideColor"))?,
        outside_color: color_array("outsideColor", body.get("outsideColor"))?,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomOrderEnvelope {
    product_id: Option<Uuid>,
    customer: Option<CustomerContact>,
}

fn validate_contact(contact: &CustomerContact) -> AppResult<()> {
    non_empty("customer.firstName", &contact.first_name)?;
    non_empty("customer.lastName", &contact.last_name)?;
    ensure_email("customer.email", contact.email.trim())?;
    non_empty("customer.address.street", &contact.address.street)?;
    non_empty("customer.address.houseNumber", &contact.address.house_number)?;
    non_empty("customer.address.postalCode", &contact.address.postal_code)?;
    non_empty("customer.address.city", &contact.address.city)?;
    Ok(())
}

/// Custom orders are visible to platform admins and to the partner owning the
/// configured product.
fn scope_condition(scope: Scope) -> AppResult<Condition> {
    match scope {
        Scope::Platform => Ok(Condition::all()),
        Scope::Partner(partner_id) => Ok(Condition::all().add(CustomCol::PartnerId.eq(partner_id))),
        Scope::Customer(_) => Err(AppError::Forbidden),
    }
}

/// Guest checkout for a single configurable product. The product must exist;
/// no price is computed.
pub async fn create_custom_order(state: &AppState, body: Value) -> AppResult<ApiResponse<CustomOrder>> {
    if !body.is_object() {
        return Err(AppError::bad_request("Request body must be a JSON object"));
    }
    let colors = parse_color_choice(&body)?;
    let envelope: CustomOrderEnvelope = serde_json::from_value(body)
        .map_err(|e| AppError::bad_request(format!("Invalid custom order: {e}")))?;

    let product_id = envelope
        .product_id
        .ok_or_else(|| AppError::bad_request("productId is required"))?;
    let customer = envelope
        .customer
        .ok_or_else(|| AppError::bad_request("customer is required"))?;
    validate_contact(&customer)?;

    let product = Products::find_by_id(product_id)
        .filter(ProdCol::DeletedAt.is_null())
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product with ID {product_id} not found")))?;

    let now = Utc::now();
    let order = CustomOrderActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        partner_id: Set(product.partner_id),
        laces_color: Set(colors.laces_color),
        sole_color: Set(colors.sole_color),
        inside_color: Set(colors.inside_color),
        outside_color: Set(colors.outside_color),
        order_status: Set(OrderStatus::Pending),
        first_name: Set(customer.first_name.trim().to_string()),
        last_name: Set(customer.last_name.trim().to_string()),
        email: Set(customer.email.trim().to_string()),
        street: Set(customer.address.street),
        house_number: Set(customer.address.house_number),
        postal_code: Set(customer.address.postal_code),
        city: Set(customer.address.city),
        message: Set(customer.message),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(state.db())
    .await?;

    audit::record(
        state.db(),
        None,
        "custom_order_create",
        "custom_orders",
        serde_json::json!({ "order_id": order.id, "product_id": order.product_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        CustomOrder::from(order),
        Some(Meta::empty()),
    ))
}

pub async fn list_custom_orders(
    state: &AppState,
    user: &AuthUser,
    query: PageQuery,
) -> AppResult<ApiResponse<CustomOrderList>> {
    let condition = scope_condition(user.scope()?)?;
    let (page, limit, offset) = query.pagination().normalize();

    let finder = CustomOrders::find()
        .filter(condition)
        .order_by_desc(CustomCol::CreatedAt);
    let total = finder.clone().count(state.db()).await?;
    let orders = finder
        .limit(limit)
        .offset(offset)
        .all(state.db())
        .await?
        .into_iter()
        .map(CustomOrder::from)
        .collect();

    Ok(ApiResponse::success(
        "Orders",
        CustomOrderList { orders },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_custom_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<CustomOrder>> {
    let order = CustomOrders::find_by_id(id)
        .filter(scope_condition(user.scope()?)?)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    Ok(ApiResponse::success("Order", CustomOrder::from(order), None))
}

pub async fn update_custom_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    body: Value,
) -> AppResult<ApiResponse<CustomOrder>> {
    let condition = scope_condition(user.scope()?)?;
    let patch: UpdateCustomOrderRequest = parse_patch(body, CUSTOM_ORDER_UPDATE_FIELDS)?;
    if let Some(customer) = &patch.customer {
        validate_contact(customer)?;
    }

    let existing = CustomOrders::find_by_id(id)
        .filter(condition)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let mut active: CustomOrderActive = existing.into();
    if let Some(status) = patch.order_status {
        active.order_status = Set(status);
    }
    if let Some(customer) = patch.customer {
        active.first_name = Set(customer.first_name.trim().to_string());
        active.last_name = Set(customer.last_name.trim().to_string());
        active.email = Set(customer.email.trim().to_string());
        active.street = Set(customer.address.street);
        active.house_number = Set(customer.address.house_number);
        active.postal_code = Set(customer.address.postal_code);
        active.city = Set(customer.address.city);
        active.message = Set(customer.message);
    }
    active.updated_at = Set(Utc::now().into());
    let order = active.update(state.db()).await?;

    audit::record(
        state.db(),
        Some(user.user_id),
        "custom_order_update",
        "custom_orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        CustomOrder::from(order),
        Some(Meta::empty()),
    ))
}

pub async fn delete_custom_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let result = CustomOrders::delete_many()
        .filter(CustomCol::Id.eq(id))
        .filter(scope_condition(user.scope()?)?)
        .exec(state.db())
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("Order"));
    }

    audit::record(
        state.db(),
        Some(user.user_id),
        "custom_order_delete",
        "custom_orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;

    Ok(ApiResponse::message("Order deleted successfully"))
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    use super::*;
    use crate::config::AppConfig;

    fn body() -> Value {
        json!({
            "productId": Uuid::new_v4(),
            "lacesColor": ["white"],
            "soleColor": ["gum"],
            "insideColor": ["navy"],
            "outsideColor": ["navy", "white"],
            "customer": {
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "address": {
                    "street": "Main street",
                    "houseNumber": "12",
                    "postalCode": "1000",
                    "city": "Brussels"
                },
                "message": "Gift wrap please"
            }
        })
    }

    #[test]
    fn parses_all_color_fields() {
        let colors = parse_color_choice(&body()).unwrap();
        assert_eq!(colors.outside_color, vec!["navy", "white"]);
        assert_eq!(colors.sole_color, vec!["gum"]);
    }

    #[test]
    fn rejects_scalar_and_mixed_colors() {
        let mut scalar = body();
        scalar["lacesColor"] = json!("white");
        assert!(parse_color_choice(&scalar).is_err());

        let mut mixed = body();
        mixed["soleColor"] = json!(["gum", 7]);
        assert!(parse_color_choice(&mixed).is_err());

        let mut missing = body();
        missing.as_object_mut().unwrap().remove("insideColor");
        assert!(parse_color_choice(&missing).is_err());
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<crate::entity::products::Model>::new()])
            .into_connection();
        let state = AppState::new(db, AppConfig::for_tests("mock://", "secret")).unwrap();

        let err = create_custom_order(&state, body()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn invalid_contact_is_rejected_before_lookup() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = AppState::new(db, AppConfig::for_tests("mock://", "secret")).unwrap();

        let mut invalid = body();
        invalid["customer"]["email"] = json!("not-an-email");
        let err = create_custom_order(&state, invalid).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
