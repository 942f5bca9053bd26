use chrono::Utc;
use partner_shop_api::{
    config::AppConfig,
    db::{OrmConn, create_pool, orm_from_pool, run_migrations},
    entity::{
        partners::{ActiveModel as PartnerActive, Column as PartnerCol, Entity as Partners},
        products::{ActiveModel as ProductActive, Column as ProductCol, Entity as Products},
        sea_orm_active_enums::{ActiveUnactive, PartnerPackage, ProductType, Role},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    services::auth_service::hash_password,
};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;
    let orm = orm_from_pool(&pool);

    let partner_id = ensure_partner(&orm, "Demo Optics").await?;
    let admin_id = ensure_user(&orm, "admin@example.com", "admin123", Role::PlatformAdmin, None).await?;
    let owner_id = ensure_user(
        &orm,
        "owner@example.com",
        "owner123",
        Role::PartnerOwner,
        Some(partner_id),
    )
    .await?;
    let customer_id = ensure_user(&orm, "customer@example.com", "customer123", Role::Customer, None).await?;
    seed_products(&orm, partner_id).await?;

    println!(
        "Seed completed. Partner ID: {partner_id}, Admin ID: {admin_id}, Owner ID: {owner_id}, Customer ID: {customer_id}"
    );
    Ok(())
}

async fn ensure_partner(orm: &OrmConn, name: &str) -> anyhow::Result<Uuid> {
    if let Some(existing) = Partners::find()
        .filter(PartnerCol::Name.eq(name))
        .filter(PartnerCol::DeletedAt.is_null())
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let partner = PartnerActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        street: Set(Some("Meir 1".into())),
        city: Set(Some("Antwerp".into())),
        postal_code: Set(Some("2000".into())),
        country: Set(Some("BE".into())),
        contact_email: Set(Some("hello@demo-optics.example".into())),
        contact_phone: Set(None),
        package: Set(PartnerPackage::Pro),
        created_at: Set(Utc::now().into()),
        deleted_at: Set(None),
    }
    .insert(orm)
    .await?;

    println!("Ensured partner {name}");
    Ok(partner.id)
}

async fn ensure_user(
    orm: &OrmConn,
    email: &str,
    password: &str,
    role: Role,
    company_id: Option<Uuid>,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find().filter(UserCol::Email.eq(email)).one(orm).await? {
        return Ok(existing.id);
    }

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        firstname: Set("Demo".into()),
        lastname: Set(format!("{role:?}")),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password)?),
        role: Set(role),
        active_unactive: Set(ActiveUnactive::Active),
        company_id: Set(company_id),
        country: Set("BE".into()),
        city: Set("Antwerp".into()),
        postal_code: Set("2000".into()),
        profile_image: Set(String::new()),
        bio: Set(String::new()),
        reset_code: Set(None),
        reset_code_expires_at: Set(None),
        reset_code_verified: Set(false),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;

    println!("Ensured user {email} (role={role:?})");
    Ok(user.id)
}

async fn seed_products(orm: &OrmConn, partner_id: Uuid) -> anyhow::Result<()> {
    let products = [
        ("OPT-001", "Round Titanium", 18_900, ProductType::Optical, "Lindqvist", vec!["silver"]),
        ("SUN-001", "Aviator Classic", 14_500, ProductType::Sun, "Lindqvist", vec!["gold", "green"]),
        ("SNK-001", "Court Low", 11_000, ProductType::Sneaker, "Stride", vec!["white"]),
    ];

    for (code, name, price, type_of_product, brand, colors) in products {
        let exists = Products::find()
            .filter(ProductCol::ProductCode.eq(code))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let sneaker = type_of_product == ProductType::Sneaker;
        let palette = |c: &[&str]| Some(c.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        let now = Utc::now();
        ProductActive {
            id: Set(Uuid::new_v4()),
            product_code: Set(code.to_string()),
            product_name: Set(name.to_string()),
            product_price: Set(price),
            type_of_product: Set(type_of_product),
            description: Set(format!("{name} by {brand}")),
            brand: Set(brand.to_string()),
            colors: Set(colors.into_iter().map(str::to_string).collect()),
            glass_color: Set((!sneaker).then(|| "grey".to_string())),
            laces_color: Set(sneaker.then(|| palette(&["white", "black"])).flatten()),
            sole_color: Set(sneaker.then(|| palette(&["white", "gum"])).flatten()),
            inside_color: Set(sneaker.then(|| palette(&["navy"])).flatten()),
            outside_color: Set(sneaker.then(|| palette(&["white", "navy"])).flatten()),
            active_unactive: Set(ActiveUnactive::Active),
            images: Set(vec![format!("https://images.example.com/{code}.jpg")]),
            partner_id: Set(Some(partner_id)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
