use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    allow_list::parse_patch,
    audit,
    dto::partners::{CreatePartnerRequest, PARTNER_UPDATE_FIELDS, PartnerList, UpdatePartnerRequest},
    entity::{
        partners::{ActiveModel, Column, Entity as Partners},
        products::{Column as ProdCol, Entity as Products},
        sea_orm_active_enums::{ActiveUnactive, PartnerPackage},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Scope, ensure_platform_admin},
    models::Partner,
    response::{ApiResponse, Meta},
    routes::params::PageQuery,
    state::AppState,
    validation::{ensure_email, non_empty, required},
};

fn check_contact_email(email: Option<&str>) -> AppResult<()> {
    if let Some(email) = email {
        ensure_email("contactEmail", email.trim())?;
    }
    Ok(())
}

pub async fn create_partner(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePartnerRequest,
) -> AppResult<ApiResponse<Partner>> {
    ensure_platform_admin(user)?;
    let name = required("name", payload.name)?;
    check_contact_email(payload.contact_email.as_deref())?;
    let address = payload.address.unwrap_or_default();

    let partner = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        street: Set(address.street),
        city: Set(address.city),
        postal_code: Set(address.postal_code),
        country: Set(address.country),
        contact_email: Set(payload.contact_email),
        contact_phone: Set(payload.contact_phone),
        package: Set(payload.package.unwrap_or(PartnerPackage::Standard)),
        created_at: Set(Utc::now().into()),
        deleted_at: Set(None),
    }
    .insert(state.db())
    .await?;

    audit::record(
        state.db(),
        Some(user.user_id),
        "partner_create",
        "partners",
        serde_json::json!({ "partner_id": partner.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Partner created",
        Partner::from(partner),
        Some(Meta::empty()),
    ))
}

/// Platform admins see every live partner, partner staff only their own.
pub async fn list_partners(
    state: &AppState,
    user: &AuthUser,
    query: PageQuery,
) -> AppResult<ApiResponse<PartnerList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut finder = Partners::find()
        .filter(Column::DeletedAt.is_null())
        .order_by_asc(Column::Name);
    match user.scope()? {
        Scope::Platform => {}
        Scope::Partner(partner_id) => finder = finder.filter(Column::Id.eq(partner_id)),
        Scope::Customer(_) => return Err(AppError::Forbidden),
    }

    let total = finder.clone().count(state.db()).await?;
    let partners = finder
        .limit(limit)
        .offset(offset)
        .all(state.db())
        .await?
        .into_iter()
        .map(Partner::from)
        .collect();

    Ok(ApiResponse::success(
        "Partners",
        PartnerList { partners },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_partner(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Partner>> {
    match user.scope()? {
        Scope::Platform => {}
        Scope::Partner(partner_id) if partner_id == id => {}
        _ => return Err(AppError::Forbidden),
    }

    let partner = Partners::find_by_id(id)
        .filter(Column::DeletedAt.is_null())
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("Partner"))?;

    Ok(ApiResponse::success("Partner", Partner::from(partner), None))
}

pub async fn update_partner(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    body: Value,
) -> AppResult<ApiResponse<Partner>> {
    ensure_platform_admin(user)?;
    let patch: UpdatePartnerRequest = parse_patch(body, PARTNER_UPDATE_FIELDS)?;
    check_contact_email(patch.contact_email.as_deref())?;

    let existing = Partners::find_by_id(id)
        .filter(Column::DeletedAt.is_null())
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("Partner"))?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = patch.name {
        non_empty("name", &name)?;
        active.name = Set(name.trim().to_string());
    }
    if let Some(address) = patch.address {
        if address.street.is_some() {
            active.street = Set(address.street);
        }
        if address.city.is_some() {
            active.city = Set(address.city);
        }
        if address.postal_code.is_some() {
            active.postal_code = Set(address.postal_code);
        }
        if address.country.is_some() {
            active.country = Set(address.country);
        }
    }
    if let Some(email) = patch.contact_email {
        active.contact_email = Set(Some(email.trim().to_string()));
    }
    if let Some(phone) = patch.contact_phone {
        active.contact_phone = Set(Some(phone));
    }
    if let Some(package) = patch.package {
        active.package = Set(package);
    }

    let partner = active.update(state.db()).await?;

    audit::record(
        state.db(),
        Some(user.user_id),
        "partner_update",
        "partners",
        serde_json::json!({ "partner_id": partner.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Partner updated",
        Partner::from(partner),
        Some(Meta::empty()),
    ))
}

/// Tombstone a partner together with its live products in one transaction.
pub async fn delete_partner(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_platform_admin(user)?;
    let now = Utc::now();

    let txn = state.orm.begin().await?;
    let result = Partners::update_many()
        .col_expr(Column::DeletedAt, Expr::value(now))
        .filter(Column::Id.eq(id))
        .filter(Column::DeletedAt.is_null())
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        txn.rollback().await?;
        return Err(AppError::not_found("Partner"));
    }

    let products = Products::update_many()
        .col_expr(ProdCol::DeletedAt, Expr::value(now))
        .col_expr(ProdCol::ActiveUnactive, Expr::value(ActiveUnactive::Inactive))
        .filter(ProdCol::PartnerId.eq(id))
        .filter(ProdCol::DeletedAt.is_null())
        .exec(&txn)
        .await?;
    txn.commit().await?;

    tracing::info!(partner_id = %id, products = products.rows_affected, "partner tombstoned");
    audit::record(
        state.db(),
        Some(user.user_id),
        "partner_delete",
        "partners",
        serde_json::json!({ "partner_id": id, "products": products.rows_affected }),
    )
    .await;

    Ok(ApiResponse::message("Partner deleted successfully"))
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;
    use crate::{config::AppConfig, entity::sea_orm_active_enums::Role};

    fn admin() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::PlatformAdmin,
            company_id: None,
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn only_platform_admins_create_partners() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = AppState::new(db, AppConfig::for_tests("mock://", "secret")).unwrap();
        let partner_staff = AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::PartnerOwner,
            company_id: Some(Uuid::new_v4()),
        };

        let err = create_partner(
            &state,
            &partner_staff,
            CreatePartnerRequest {
                name: Some("Optics Co".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn delete_tombstones_partner_and_products_together() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1), exec(3)])
            .into_connection();
        let state = AppState::new(db, AppConfig::for_tests("mock://", "secret")).unwrap();

        delete_partner(&state, &admin(), Uuid::new_v4()).await.unwrap();

        // One transaction for both tombstones, then the audit insert.
        assert_eq!(state.into_orm().expect("sole owner").into_transaction_log().len(), 2);
    }

    #[tokio::test]
    async fn deleting_unknown_partner_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .into_connection();
        let state = AppState::new(db, AppConfig::for_tests("mock://", "secret")).unwrap();

        let err = delete_partner(&state, &admin(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn partner_staff_cannot_read_other_partners() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = AppState::new(db, AppConfig::for_tests("mock://", "secret")).unwrap();
        let staff = AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::PartnerAdmin,
            company_id: Some(Uuid::new_v4()),
        };

        let err = get_partner(&state, &staff, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }
}
