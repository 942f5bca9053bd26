use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::sea_orm_active_enums::{OrderStatus, PaymentStatus},
    models::{CustomOrder, CustomerContact, Order},
};

/// `totalPrice` is derived from the line items and never read from a client.
pub const ORDER_UPDATE_FIELDS: &[&str] = &["orderStatus", "shippingAddress", "products"];

pub const CUSTOM_ORDER_UPDATE_FIELDS: &[&str] = &["orderStatus", "customer"];

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    pub product_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_id: Option<Uuid>,
    pub products: Option<Vec<LineItemRequest>>,
    pub shipping_address: Option<String>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub order_status: Option<OrderStatus>,
    pub shipping_address: Option<String>,
    pub products: Option<Vec<LineItemRequest>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub orders: Vec<Order>,
}

/// Documents the custom order body. The handler reads the raw JSON so that
/// color fields can be type-checked element by element.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomOrderRequest {
    pub product_id: Option<Uuid>,
    pub laces_color: Vec<String>,
    pub sole_color: Vec<String>,
    pub inside_color: Vec<String>,
    pub outside_color: Vec<String>,
    pub customer: Option<CustomerContact>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomOrderRequest {
    pub order_status: Option<OrderStatus>,
    pub customer: Option<CustomerContact>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomOrderList {
    pub orders: Vec<CustomOrder>,
}
