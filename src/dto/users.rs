use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::sea_orm_active_enums::{ActiveUnactive, Role},
    models::User,
};

/// Fields a user may change on their own profile.
pub const USER_SELF_UPDATE_FIELDS: &[&str] = &[
    "firstname",
    "lastname",
    "country",
    "city",
    "postalCode",
    "profileImage",
    "bio",
];

/// Fields a platform admin may change on any profile.
pub const USER_ADMIN_UPDATE_FIELDS: &[&str] = &[
    "firstname",
    "lastname",
    "country",
    "city",
    "postalCode",
    "profileImage",
    "bio",
    "role",
    "activeUnactive",
    "companyId",
];

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
    pub active_unactive: Option<ActiveUnactive>,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub users: Vec<User>,
}
