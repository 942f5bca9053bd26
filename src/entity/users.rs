use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::{ActiveUnactive, Role};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub active_unactive: ActiveUnactive,
    pub company_id: Option<Uuid>,
    pub country: String,
    pub city: String,
    pub postal_code: String,
    pub profile_image: String,
    pub bio: String,
    pub reset_code: Option<String>,
    pub reset_code_expires_at: Option<DateTimeWithTimeZone>,
    pub reset_code_verified: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::partners::Entity",
        from = "Column::CompanyId",
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
