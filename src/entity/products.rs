use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::{ActiveUnactive, ProductType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub product_code: String,
    pub product_name: String,
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
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::partners::Entity",
        from = "Column::PartnerId",
        to = "super::partners::Column::Id"
    )]
    Partners,
}

impl Related<super::partners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Partners.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
