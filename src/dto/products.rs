use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::sea_orm_active_enums::{ActiveUnactive, ProductType},
    models::Product,
};

/// `productCode` and `partnerId` are not updatable: the code is the public
/// key of a product and ownership only follows the caller's scope.
pub const PRODUCT_UPDATE_FIELDS: &[&str] = &[
    "productName",
    "productPrice",
    "typeOfProduct",
    "description",
    "brand",
    "colors",
    "glassColor",
    "lacesColor",
    "soleColor",
    "insideColor",
    "outsideColor",
    "activeUnactive",
    "images",
];

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub product_code: Option<String>,
    pub product_name: Option<String>,
    /// Positive integer in minor currency units (cents): `49.99` is sent as `4999`.
    #[schema(minimum = 1, example = 4999)]
    pub product_price: Option<i64>,
    pub type_of_product: Option<ProductType>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub colors: Option<Vec<String>>,
    pub glass_color: Option<String>,
    pub laces_color: Option<Vec<String>>,
    pub sole_color: Option<Vec<String>>,
    pub inside_color: Option<Vec<String>>,
    pub outside_color: Option<Vec<String>>,
    pub active_unactive: Option<ActiveUnactive>,
    /// URLs are stored as-is, `data:` URIs are uploaded first.
    pub images: Option<Vec<String>>,
    /// Only honoured for platform admins; partner users always create in
    /// their own catalog.
    pub partner_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub product_name: Option<String>,
    /// Positive integer in minor currency units (cents): `49.99` is sent as `4999`.
    #[schema(minimum = 1, example = 4999)]
    pub product_price: Option<i64>,
    pub type_of_product: Option<ProductType>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub colors: Option<Vec<String>>,
    pub glass_color: Option<String>,
    pub laces_color: Option<Vec<String>>,
    pub sole_color: Option<Vec<String>>,
    pub inside_color: Option<Vec<String>>,
    pub outside_color: Option<Vec<String>>,
    pub active_unactive: Option<ActiveUnactive>,
    pub images: Option<Vec<String>>,
}

#[derive(Serialize, ToSchema)]
pub struct ProductList {
    pub products: Vec<Product>,
}
