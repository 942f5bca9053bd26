use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    allow_list::parse_patch,
    audit,
    dto::users::{USER_ADMIN_UPDATE_FIELDS, USER_SELF_UPDATE_FIELDS, UpdateUserRequest, UserList},
    entity::{
        partners::{Column as PartnerCol, Entity as Partners},
        users::{ActiveModel, Column, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_platform_admin, ensure_self_or_admin},
    models::User,
    response::{ApiResponse, Meta},
    routes::params::PageQuery,
    state::AppState,
    validation::non_empty,
};

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: PageQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_platform_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let finder = Users::find().order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(state.db()).await?;
    let users = finder
        .limit(limit)
        .offset(offset)
        .all(state.db())
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    Ok(ApiResponse::success(
        "Users",
        UserList { users },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_user(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<User>> {
    ensure_self_or_admin(user, id)?;
    let found = Users::find_by_id(id)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    Ok(ApiResponse::success("User", User::from(found), None))
}

/// Users edit their own profile fields; `role`, `activeUnactive` and
/// `companyId` are only honoured for platform admins.
pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    body: Value,
) -> AppResult<ApiResponse<User>> {
    ensure_self_or_admin(user, id)?;
    let allowed = if user.is_platform_admin() {
        USER_ADMIN_UPDATE_FIELDS
    } else {
        USER_SELF_UPDATE_FIELDS
    };
    let patch: UpdateUserRequest = parse_patch(body, allowed)?;

    let existing = Users::find_by_id(id)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    if let Some(company_id) = patch.company_id {
        let live = Partners::find_by_id(company_id)
            .filter(PartnerCol::DeletedAt.is_null())
            .count(state.db())
            .await?;
        if live == 0 {
            return Err(AppError::not_found("Partner"));
        }
    }

    let mut active: ActiveModel = existing.into();
    if let Some(firstname) = patch.firstname {
        non_empty("firstname", &firstname)?;
        active.firstname = Set(firstname.trim().to_string());
    }
    if let Some(lastname) = patch.lastname {
        non_empty("lastname", &lastname)?;
        active.lastname = Set(lastname.trim().to_string());
    }
    if let Some(country) = patch.country {
        active.country = Set(country);
    }
    if let Some(city) = patch.city {
        active.city = Set(city);
    }
    if let Some(postal_code) = patch.postal_code {
        active.postal_code = Set(postal_code);
    }
    if let Some(profile_image) = patch.profile_image {
        active.profile_image = Set(profile_image);
    }
    if let Some(bio) = patch.bio {
        active.bio = Set(bio);
    }
    if let Some(role) = patch.role {
        active.role = Set(role);
    }
    if let Some(status) = patch.active_unactive {
        active.active_unactive = Set(status);
    }
    if let Some(company_id) = patch.company_id {
        active.company_id = Set(Some(company_id));
    }

    let updated = active.update(state.db()).await?;

    audit::record(
        state.db(),
        Some(user.user_id),
        "user_update",
        "users",
        serde_json::json!({ "target_user_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User updated",
        User::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<()>> {
    ensure_platform_admin(user)?;
    let result = Users::delete_by_id(id).exec(state.db()).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("User"));
    }

    audit::record(
        state.db(),
        Some(user.user_id),
        "user_delete",
        "users",
        serde_json::json!({ "target_user_id": id }),
    )
    .await;

    Ok(ApiResponse::message("User deleted successfully"))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    use super::*;
    use crate::{
        config::AppConfig,
        entity::{
            sea_orm_active_enums::{ActiveUnactive, Role},
            users::Model as UserModel,
        },
    };

    fn stored(id: Uuid, role: Role) -> UserModel {
        UserModel {
            id,
            firstname: "Ada".into(),
            lastname: "Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$stub".into(),
            role,
            active_unactive: ActiveUnactive::Active,
            company_id: None,
            country: "BE".into(),
            city: "Brussels".into(),
            postal_code: "1000".into(),
            profile_image: String::new(),
            bio: String::new(),
            reset_code: None,
            reset_code_expires_at: None,
            reset_code_verified: false,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn self_update_ignores_privileged_fields() {
        let id = Uuid::new_v4();
        let mut renamed = stored(id, Role::Customer);
        renamed.city = "Ghent".into();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored(id, Role::Customer)], vec![renamed]])
            .into_connection();
        let state = AppState::new(db, AppConfig::for_tests("mock://", "secret")).unwrap();
        let caller = AuthUser {
            user_id: id,
            role: Role::Customer,
            company_id: None,
        };

        let res = update_user(
            &state,
            &caller,
            id,
            json!({ "city": "Ghent", "role": "platform_admin", "isAdmin": true }),
        )
        .await
        .unwrap();
        let user = res.data.unwrap();
        assert_eq!(user.city, "Ghent");
        assert_eq!(user.role, Role::Customer);
    }

    #[tokio::test]
    async fn users_cannot_read_other_profiles() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = AppState::new(db, AppConfig::for_tests("mock://", "secret")).unwrap();
        let caller = AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Customer,
            company_id: None,
        };

        let err = get_user(&state, &caller, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn listing_users_is_admin_only() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = AppState::new(db, AppConfig::for_tests("mock://", "secret")).unwrap();
        let caller = AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::PartnerOwner,
            company_id: Some(Uuid::new_v4()),
        };

        let err = list_users(&state, &caller, PageQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }
}
