use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::OrderStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "custom_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub partner_id: Option<Uuid>,
    pub laces_color: Vec<String>,
    pub sole_color: Vec<String>,
    pub inside_color: Vec<String>,
    pub outside_color: Vec<String>,
    pub order_status: OrderStatus,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub street: String,
    pub house_number: String,
    pub postal_code: String,
    pub city: String,
    pub message: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
