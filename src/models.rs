use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    custom_orders, order_items, orders, partners, products,
    sea_orm_active_enums::{
        ActiveUnactive, OrderStatus, PartnerPackage, PaymentStatus, ProductType, Role,
    },
    users,
};

/// A user as exposed over the API. Never carries the credential hash or the
/// reset code.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub role: Role,
    pub active_unactive: ActiveUnactive,
    pub company_id: Option<Uuid>,
    pub country: String,
    pub city: String,
    pub postal_code: String,
    pub profile_image: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            firstname: model.firstname,
            lastname: model.lastname,
            email: model.email,
            role: model.role,
            active_unactive: model.active_unactive,
            company_id: model.company_id,
            country: model.country,
            city: model.city,
            postal_code: model.postal_code,
            profile_image: model.profile_image,
            bio: model.bio,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: Uuid,
    pub name: String,
    pub address: PartnerAddress,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub package: PartnerPackage,
    pub created_at: DateTime<Utc>,
}

impl From<partners::Model> for Partner {
    fn from(model: partners::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address: PartnerAddress {
                street: model.street,
                city: model.city,
                postal_code: model.postal_code,
                country: model.country,
            },
            contact_email: model.contact_email,
            contact_phone: model.contact_phone,
            package: model.package,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub product_code: String,
    pub product_name: String,
    /// Minor currency units.
    pub product_price: i64,
    pub type_of_product: ProductType,
    pub description: String,
    pub brand: String,
    pub colors: Vec<String>,
    pub glass_color: Option<String>,
    pub laces_color: Option<Vec<String>>,
    pub sole_color: Option<Vec<String>>,
    pub inside_color: Option<Vec<String>>,
    pub outside_color: Option<Vec<String>>,
    pub active_unactive: ActiveUnactive,
    pub images: Vec<String>,
    pub partner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            product_code: model.product_code,
            product_name: model.product_name,
            product_price: model.product_price,
            type_of_product: model.type_of_product,
            description: model.description,
            brand: model.brand,
            colors: model.colors,
            glass_color: model.glass_color,
            laces_color: model.laces_color,
            sole_color: model.sole_color,
            inside_color: model.inside_color,
            outside_color: model.outside_color,
            active_unactive: model.active_unactive,
            images: model.images,
            partner_id: model.partner_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// Line item with the name and price captured when the order was priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub product_name: String,
    pub product_price: i64,
    pub partner_id: Option<Uuid>,
}

impl From<order_items::Model> for OrderLineItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            product_id: model.product_id,
            quantity: model.quantity,
            product_name: model.product_name,
            product_price: model.product_price,
            partner_id: model.partner_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub shipping_address: String,
    pub total_price: i64,
    pub products: Vec<OrderLineItem>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn from_entity(model: orders::Model, mut items: Vec<order_items::Model>) -> Self {
        items.sort_by_key(|item| item.position);
        Self {
            id: model.id,
            customer_id: model.customer_id,
            order_date: model.order_date.with_timezone(&Utc),
            order_status: model.order_status,
            payment_status: model.payment_status,
            shipping_address: model.shipping_address,
            total_price: model.total_price,
            products: items.into_iter().map(OrderLineItem::from).collect(),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

/// Current catalog data for a product referenced by an order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: Uuid,
    pub product_name: String,
    pub product_price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_details: Option<Vec<ProductSummary>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: String,
    pub house_number: String,
    pub postal_code: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: ShippingAddress,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomOrder {
    pub id: Uuid,
    pub product_id: Uuid,
    pub laces_color: Vec<String>,
    pub sole_color: Vec<String>,
    pub inside_color: Vec<String>,
    pub outside_color: Vec<String>,
    pub order_status: OrderStatus,
    pub customer: CustomerContact,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<custom_orders::Model> for CustomOrder {
    fn from(model: custom_orders::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            laces_color: model.laces_color,
            sole_color: model.sole_color,
            inside_color: model.inside_color,
            outside_color: model.outside_color,
            order_status: model.order_status,
            customer: CustomerContact {
                first_name: model.first_name,
                last_name: model.last_name,
                email: model.email,
                address: ShippingAddress {
                    street: model.street,
                    house_number: model.house_number,
                    postal_code: model.postal_code,
                    city: model.city,
                },
                message: model.message,
            },
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
