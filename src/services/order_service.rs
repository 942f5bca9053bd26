use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::{LockType, SelectStatement};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    allow_list::parse_patch,
    audit,
    dto::orders::{
        CreateOrderRequest, LineItemRequest, ORDER_UPDATE_FIELDS, OrderList, UpdateOrderRequest,
    },
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
        sea_orm_active_enums::OrderStatus,
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Scope},
    models::{CustomerSummary, Order, OrderDetail, OrderLineItem, ProductSummary},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, ShowOrderQuery},
    state::AppState,
    validation::{non_empty, required},
};

/// A validated `{productId, quantity}` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub items: Vec<OrderLineItem>,
    pub total_price: i64,
}

pub fn validate_line_items(items: Option<Vec<LineItemRequest>>) -> AppResult<Vec<LineItem>> {
    let items = match items {
        Some(items) if !items.is_empty() => items,
        _ => return Err(AppError::bad_request("products must be a non-empty list")),
    };

    items
        .into_iter()
        .map(|item| {
            let quantity = i32::try_from(item.quantity)
                .ok()
                .filter(|q| *q > 0)
                .ok_or_else(|| {
                    AppError::bad_request(format!(
                        "quantity for product {} must be a positive integer",
                        item.product_id
                    ))
                })?;
            Ok(LineItem {
                product_id: item.product_id,
                quantity,
            })
        })
        .collect()
}

/// Price line items against resolved catalog entries, in line-item order.
///
/// The first product missing from `catalog` aborts pricing with a not-found
/// error naming it. Each item carries a snapshot of name, price and owner.
pub fn price_line_items(
    items: &[LineItem],
    catalog: &HashMap<Uuid, ProductModel>,
) -> AppResult<PricedOrder> {
    let mut total_price: i64 = 0;
    let mut priced = Vec::with_capacity(items.len());

    for item in items {
        let product = catalog.get(&item.product_id).ok_or_else(|| {
            AppError::NotFound(format!("Product with ID {} not found", item.product_id))
        })?;

        let line_total = product
            .product_price
            .checked_mul(i64::from(item.quantity))
            .and_then(|line| total_price.checked_add(line))
            .ok_or_else(|| AppError::bad_request("Order total is out of range"))?;
        total_price = line_total;

        priced.push(OrderLineItem {
            product_id: product.id,
            quantity: item.quantity,
            product_name: product.product_name.clone(),
            product_price: product.product_price,
            partner_id: product.partner_id,
        });
    }

    Ok(PricedOrder {
        items: priced,
        total_price,
    })
}

async fn resolve_catalog<C: ConnectionTrait>(
    db: &C,
    items: &[LineItem],
) -> AppResult<HashMap<Uuid, ProductModel>> {
    let ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let products = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .filter(ProdCol::DeletedAt.is_null())
        .all(db)
        .await?;
    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}

/// Resolve and price in one step; nothing is written.
pub async fn reprice<C: ConnectionTrait>(db: &C, items: &[LineItem]) -> AppResult<PricedOrder> {
    let catalog = resolve_catalog(db, items).await?;
    price_line_items(items, &catalog)
}

fn partner_orders(partner_id: Uuid) -> SelectStatement {
    OrderItems::find()
        .select_only()
        .column(OrderItemCol::OrderId)
        .filter(OrderItemCol::PartnerId.eq(partner_id))
        .into_query()
}

/// Orders a scope may see: everything, orders containing the partner's
/// products, or the customer's own orders.
pub fn scope_condition(scope: Scope) -> Condition {
    match scope {
        Scope::Platform => Condition::all(),
        Scope::Partner(partner_id) => {
            Condition::all().add(OrderCol::Id.in_subquery(partner_orders(partner_id)))
        }
        Scope::Customer(user_id) => Condition::all().add(OrderCol::CustomerId.eq(user_id)),
    }
}

fn foreign_lines(partner_id: Uuid) -> SelectStatement {
    OrderItems::find()
        .select_only()
        .column(OrderItemCol::OrderId)
        .filter(
            Condition::any()
                .add(OrderItemCol::PartnerId.ne(partner_id))
                .add(OrderItemCol::PartnerId.is_null()),
        )
        .into_query()
}

/// Orders a scope may change: partners only orders made up entirely of
/// their own lines, customers only their own orders.
pub fn writer_condition(scope: Scope) -> Condition {
    match scope {
        Scope::Platform => Condition::all(),
        Scope::Partner(partner_id) => Condition::all()
            .add(OrderCol::Id.in_subquery(partner_orders(partner_id)))
            .add(OrderCol::Id.not_in_subquery(foreign_lines(partner_id))),
        Scope::Customer(user_id) => Condition::all().add(OrderCol::CustomerId.eq(user_id)),
    }
}

/// Customers may only cancel; fulfilment statuses belong to staff.
pub fn ensure_status_allowed(scope: Scope, status: OrderStatus) -> AppResult<()> {
    match (scope, status) {
        (Scope::Customer(_), OrderStatus::Cancelled) => Ok(()),
        (Scope::Customer(_), _) => Err(AppError::Forbidden),
        _ => Ok(()),
    }
}

/// Repriced lines a partner writes must all come from its own catalog.
pub fn ensure_lines_owned(scope: Scope, items: &[OrderLineItem]) -> AppResult<()> {
    if let Scope::Partner(partner_id) = scope {
        if items.iter().any(|item| item.partner_id != Some(partner_id)) {
            return Err(AppError::Forbidden);
        }
    }
    Ok(())
}

fn item_models(order_id: Uuid, items: &[OrderLineItem]) -> Vec<OrderItemActive> {
    items
        .iter()
        .enumerate()
        .map(|(position, item)| OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            position: Set(position as i32),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            product_name: Set(item.product_name.clone()),
            product_price: Set(item.product_price),
            partner_id: Set(item.partner_id),
        })
        .collect()
}

async fn load_items<C: ConnectionTrait>(db: &C, order_id: Uuid) -> AppResult<Vec<OrderItemModel>> {
    Ok(OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::Position)
        .all(db)
        .await?)
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let scope = user.scope()?;
    let customer_id = match (scope, payload.customer_id) {
        (Scope::Customer(own), None) => own,
        (Scope::Customer(own), Some(id)) if id == own => own,
        (Scope::Customer(_), Some(_)) => return Err(AppError::Forbidden),
        (_, Some(id)) => id,
        (_, None) => return Err(AppError::bad_request("customerId is required")),
    };
    let items = validate_line_items(payload.products)?;
    let shipping_address = required("shippingAddress", payload.shipping_address)?;
    let payment_status = payload
        .payment_status
        .ok_or_else(|| AppError::bad_request("paymentStatus is required"))?;

    let priced = reprice(state.db(), &items).await?;

    let now = Utc::now();
    let order_id = Uuid::new_v4();
    let txn = state.orm.begin().await?;

    let order = OrderActive {
        id: Set(order_id),
        customer_id: Set(customer_id),
        order_date: Set(now.into()),
        order_status: Set(OrderStatus::Pending),
        payment_status: Set(payment_status),
        shipping_address: Set(shipping_address),
        total_price: Set(priced.total_price),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    OrderItems::insert_many(item_models(order_id, &priced.items))
        .exec_without_returning(&txn)
        .await?;

    txn.commit().await?;

    audit::record(
        state.db(),
        Some(user.user_id),
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order_id, "total_price": priced.total_price }),
    )
    .await;

    let mut order = Order::from_entity(order, Vec::new());
    order.products = priced.items;
    Ok(ApiResponse::success("Order created", order, Some(Meta::empty())))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let scope = user.scope()?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = scope_condition(scope);
    if let Some(customer_id) = query.customer_id {
        condition = condition.add(OrderCol::CustomerId.eq(customer_id));
    }
    if let Some(status) = query.order_status {
        condition = condition.add(OrderCol::OrderStatus.eq(status));
    }
    if let Some(product_id) = query.product_id {
        condition = condition.add(
            OrderCol::Id.in_subquery(
                OrderItems::find()
                    .select_only()
                    .column(OrderItemCol::OrderId)
                    .filter(OrderItemCol::ProductId.eq(product_id))
                    .into_query(),
            ),
        );
    }

    let finder = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::OrderDate);
    let total = finder.clone().count(state.db()).await?;

    let orders = finder
        .limit(limit)
        .offset(offset)
        .all(state.db())
        .await?;

    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut items_by_order: HashMap<Uuid, Vec<OrderItemModel>> = HashMap::new();
    if !ids.is_empty() {
        for item in OrderItems::find()
            .filter(OrderItemCol::OrderId.is_in(ids))
            .all(state.db())
            .await?
        {
            items_by_order.entry(item.order_id).or_default().push(item);
        }
    }

    let orders = orders
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            Order::from_entity(order, items)
        })
        .collect();

    Ok(ApiResponse::success(
        "Orders",
        OrderList { orders },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    query: ShowOrderQuery,
) -> AppResult<ApiResponse<OrderDetail>> {
    let scope = user.scope()?;
    let order = Orders::find_by_id(id)
        .filter(scope_condition(scope))
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let items = load_items(state.db(), order.id).await?;
    let order = Order::from_entity(order, items);

    let mut detail = OrderDetail {
        order,
        customer: None,
        product_details: None,
    };

    if query.expand.unwrap_or(false) {
        detail.customer = Users::find_by_id(detail.order.customer_id)
            .one(state.db())
            .await?
            .map(|u| CustomerSummary {
                id: u.id,
                firstname: u.firstname,
                lastname: u.lastname,
                email: u.email,
            });

        let product_ids: Vec<Uuid> = detail.order.products.iter().map(|i| i.product_id).collect();
        let summaries = Products::find()
            .filter(ProdCol::Id.is_in(product_ids))
            .all(state.db())
            .await?
            .into_iter()
            .map(|p| ProductSummary {
                id: p.id,
                product_name: p.product_name,
                product_price: p.product_price,
            })
            .collect();
        detail.product_details = Some(summaries);
    }

    Ok(ApiResponse::success("Order", detail, Some(Meta::empty())))
}

/// Apply an allow-listed patch. When `products` is present every line is
/// re-resolved and the total recomputed; the order row is locked for the
/// duration so concurrent updates apply one after the other.
pub async fn update_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    body: Value,
) -> AppResult<ApiResponse<Order>> {
    let scope = user.scope()?;
    let patch: UpdateOrderRequest = parse_patch(body, ORDER_UPDATE_FIELDS)?;

    if let Some(address) = &patch.shipping_address {
        non_empty("shippingAddress", address)?;
    }
    if let Some(status) = patch.order_status {
        ensure_status_allowed(scope, status)?;
    }
    let items = match patch.products {
        Some(items) => Some(validate_line_items(Some(items))?),
        None => None,
    };

    let txn = state.orm.begin().await?;

    let existing = Orders::find_by_id(id)
        .filter(writer_condition(scope))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let priced = match &items {
        Some(items) => {
            let priced = reprice(&txn, items).await?;
            ensure_lines_owned(scope, &priced.items)?;
            Some(priced)
        }
        None => None,
    };

    let mut active: OrderActive = existing.into();
    if let Some(status) = patch.order_status {
        active.order_status = Set(status);
    }
    if let Some(address) = patch.shipping_address {
        active.shipping_address = Set(address.trim().to_string());
    }
    if let Some(priced) = &priced {
        active.total_price = Set(priced.total_price);
        OrderItems::delete_many()
            .filter(OrderItemCol::OrderId.eq(id))
            .exec(&txn)
            .await?;
        OrderItems::insert_many(item_models(id, &priced.items))
            .exec_without_returning(&txn)
            .await?;
    }
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    let order = match priced {
        Some(priced) => {
            let mut order = Order::from_entity(order, Vec::new());
            order.products = priced.items;
            order
        }
        None => {
            let items = load_items(&txn, id).await?;
            Order::from_entity(order, items)
        }
    };

    txn.commit().await?;

    audit::record(
        state.db(),
        Some(user.user_id),
        "order_update",
        "orders",
        serde_json::json!({ "order_id": id, "order_status": order.order_status }),
    )
    .await;

    Ok(ApiResponse::success("Order updated", order, Some(Meta::empty())))
}

/// Customers cancel through `update_order` instead of deleting.
pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let scope = user.scope()?;
    if let Scope::Customer(_) = scope {
        return Err(AppError::Forbidden);
    }
    let result = Orders::delete_many()
        .filter(OrderCol::Id.eq(id))
        .filter(writer_condition(scope))
        .exec(state.db())
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("Order"));
    }

    audit::record(
        state.db(),
        Some(user.user_id),
        "order_delete",
        "orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;

    Ok(ApiResponse::message("Order deleted successfully"))
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;
    use crate::{
        config::AppConfig,
        entity::{
            orders::Model as OrderModel,
            sea_orm_active_enums::{ActiveUnactive, PaymentStatus, ProductType, Role},
        },
    };

    fn product(price: i64, partner_id: Option<Uuid>) -> ProductModel {
        let now = Utc::now();
        ProductModel {
            id: Uuid::new_v4(),
            product_code: format!("P-{}", Uuid::new_v4()),
            product_name: format!("Frame {price}"),
            product_price: price,
            type_of_product: ProductType::Optical,
            description: "Acetate frame".into(),
            brand: "Lumen".into(),
            colors: vec!["black".into()],
            glass_color: Some("clear".into()),
            laces_color: None,
            sole_color: None,
            inside_color: None,
            outside_color: None,
            active_unactive: ActiveUnactive::Active,
            images: vec![],
            partner_id,
            created_at: now.into(),
            updated_at: now.into(),
            deleted_at: None,
        }
    }

    fn catalog(products: &[ProductModel]) -> HashMap<Uuid, ProductModel> {
        products.iter().map(|p| (p.id, p.clone())).collect()
    }

    fn line(product_id: Uuid, quantity: i64) -> LineItemRequest {
        LineItemRequest {
            product_id,
            quantity,
        }
    }

    #[test]
    fn total_is_sum_of_price_times_quantity() {
        let a = product(1_250, None);
        let b = product(4_999, Some(Uuid::new_v4()));
        let items = validate_line_items(Some(vec![line(a.id, 2), line(b.id, 3)])).unwrap();

        let priced = price_line_items(&items, &catalog(&[a.clone(), b.clone()])).unwrap();

        assert_eq!(priced.total_price, 2 * 1_250 + 3 * 4_999);
        assert_eq!(priced.items.len(), 2);
        assert_eq!(priced.items[0].product_name, a.product_name);
        assert_eq!(priced.items[1].product_price, 4_999);
        assert_eq!(priced.items[1].partner_id, b.partner_id);
    }

    #[test]
    fn unknown_product_aborts_pricing_and_is_named() {
        let a = product(100, None);
        let missing = Uuid::new_v4();
        let items = validate_line_items(Some(vec![line(a.id, 1), line(missing, 1)])).unwrap();

        let err = price_line_items(&items, &catalog(&[a])).unwrap_err();
        match err {
            AppError::NotFound(msg) => assert!(msg.contains(&missing.to_string())),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn line_items_must_be_present_and_positive() {
        assert!(validate_line_items(None).is_err());
        assert!(validate_line_items(Some(vec![])).is_err());
        assert!(validate_line_items(Some(vec![line(Uuid::new_v4(), 0)])).is_err());
        assert!(validate_line_items(Some(vec![line(Uuid::new_v4(), -2)])).is_err());
        assert!(validate_line_items(Some(vec![line(Uuid::new_v4(), i64::from(i32::MAX) + 1)])).is_err());
    }

    #[test]
    fn overflowing_total_is_rejected() {
        let a = product(i64::MAX / 2, None);
        let items = validate_line_items(Some(vec![line(a.id, 3)])).unwrap();
        assert!(matches!(
            price_line_items(&items, &catalog(&[a])),
            Err(AppError::BadRequest(_))
        ));
    }

    fn customer() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Customer,
            company_id: None,
        }
    }

    #[tokio::test]
    async fn create_order_snapshots_catalog_prices() {
        let user = customer();
        let a = product(2_000, None);
        let b = product(350, None);
        let now = Utc::now();
        let stored = OrderModel {
            id: Uuid::new_v4(),
            customer_id: user.user_id,
            order_date: now.into(),
            order_status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            shipping_address: "Keizersgracht 1".into(),
            total_price: 2 * 2_000 + 350,
            updated_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![a.clone(), b.clone()]])
            .append_query_results([vec![stored.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();
        let state = AppState::new(db, AppConfig::for_tests("mock://", "secret")).unwrap();

        let resp = create_order(
            &state,
            &user,
            CreateOrderRequest {
                customer_id: None,
                products: Some(vec![line(a.id, 2), line(b.id, 1)]),
                shipping_address: Some("Keizersgracht 1".into()),
                payment_status: Some(PaymentStatus::Pending),
            },
        )
        .await
        .unwrap();

        let order = resp.data.unwrap();
        assert_eq!(order.total_price, 4_350);
        assert_eq!(order.order_status, OrderStatus::Pending);
        assert_eq!(order.products.len(), 2);
        assert_eq!(order.products[0].product_price, 2_000);
        assert_eq!(order.products[1].quantity, 1);
    }

    #[tokio::test]
    async fn create_order_with_unknown_product_writes_nothing() {
        let user = customer();
        let known = product(500, None);
        let missing = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![known.clone()]])
            .into_connection();
        let state = AppState::new(db, AppConfig::for_tests("mock://", "secret")).unwrap();

        let err = create_order(
            &state,
            &user,
            CreateOrderRequest {
                customer_id: None,
                products: Some(vec![line(known.id, 1), line(missing, 4)]),
                shipping_address: Some("Somewhere 2".into()),
                payment_status: Some(PaymentStatus::Pending),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::NotFound(ref msg) if msg.contains(&missing.to_string())));
        // Only the catalog lookup reached the database.
        assert_eq!(state.into_orm().expect("sole owner").into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn customers_cannot_order_for_someone_else() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = AppState::new(db, AppConfig::for_tests("mock://", "secret")).unwrap();

        let err = create_order(
            &state,
            &customer(),
            CreateOrderRequest {
                customer_id: Some(Uuid::new_v4()),
                products: Some(vec![line(Uuid::new_v4(), 1)]),
                shipping_address: Some("Somewhere 2".into()),
                payment_status: Some(PaymentStatus::Pending),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    fn partner_staff(partner_id: Uuid) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::PartnerAdmin,
            company_id: Some(partner_id),
        }
    }

    fn stored_order(customer_id: Uuid) -> OrderModel {
        let now = Utc::now();
        OrderModel {
            id: Uuid::new_v4(),
            customer_id,
            order_date: now.into(),
            order_status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            shipping_address: "Rue Neuve 5".into(),
            total_price: 1_000,
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn customers_may_cancel_but_not_ship() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = AppState::new(db, AppConfig::for_tests("mock://", "secret")).unwrap();

        let err = update_order(
            &state,
            &customer(),
            Uuid::new_v4(),
            serde_json::json!({ "orderStatus": "shipped" }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let own = Scope::Customer(Uuid::new_v4());
        assert!(ensure_status_allowed(own, OrderStatus::Cancelled).is_ok());
        assert!(ensure_status_allowed(own, OrderStatus::Delivered).is_err());
        assert!(ensure_status_allowed(Scope::Partner(Uuid::new_v4()), OrderStatus::Shipped).is_ok());
    }

    #[tokio::test]
    async fn customers_cannot_delete_orders() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = AppState::new(db, AppConfig::for_tests("mock://", "secret")).unwrap();

        let err = delete_order(&state, &customer(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[test]
    fn partner_writes_exclude_orders_with_foreign_lines() {
        let partner_id = Uuid::new_v4();
        let write_sql = Orders::find()
            .filter(writer_condition(Scope::Partner(partner_id)))
            .build(DatabaseBackend::Postgres)
            .to_string();
        let read_sql = Orders::find()
            .filter(scope_condition(Scope::Partner(partner_id)))
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(write_sql.contains("NOT IN"));
        assert!(!read_sql.contains("NOT IN"));
    }

    #[tokio::test]
    async fn partner_cannot_reprice_with_another_partners_products() {
        let own = Uuid::new_v4();
        let staff = partner_staff(own);
        let foreign = product(900, Some(Uuid::new_v4()));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored_order(Uuid::new_v4())]])
            .append_query_results([vec![foreign.clone()]])
            .into_connection();
        let state = AppState::new(db, AppConfig::for_tests("mock://", "secret")).unwrap();

        let err = update_order(
            &state,
            &staff,
            Uuid::new_v4(),
            serde_json::json!({ "products": [{ "productId": foreign.id, "quantity": 1 }] }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[test]
    fn repriced_lines_must_belong_to_the_partner() {
        let own = Uuid::new_v4();
        let mine = product(100, Some(own));
        let platform = product(100, None);
        let items = validate_line_items(Some(vec![line(mine.id, 1), line(platform.id, 1)])).unwrap();
        let priced = price_line_items(&items, &catalog(&[mine, platform])).unwrap();

        assert!(ensure_lines_owned(Scope::Partner(own), &priced.items).is_err());
        assert!(ensure_lines_owned(Scope::Partner(own), &priced.items[..1]).is_ok());
        assert!(ensure_lines_owned(Scope::Platform, &priced.items).is_ok());
    }
}
