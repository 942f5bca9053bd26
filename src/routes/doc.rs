use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{
            AuthResponse, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest,
            SignupRequest, VerifyCodeRequest,
        },
        orders::{
            CreateCustomOrderRequest, CreateOrderRequest, CustomOrderList, LineItemRequest,
            OrderList, UpdateCustomOrderRequest, UpdateOrderRequest,
        },
        partners::{CreatePartnerRequest, PartnerList, UpdatePartnerRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        users::{UpdateUserRequest, UserList},
    },
    entity::sea_orm_active_enums::{
        ActiveUnactive, OrderStatus, PartnerPackage, PaymentStatus, ProductType, Role,
    },
    models::{
        CustomOrder, CustomerContact, CustomerSummary, Order, OrderDetail, OrderLineItem,
        Partner, PartnerAddress, Product, ProductSummary, ShippingAddress, User,
    },
    response::{ApiResponse, Meta, ResponseStatus},
    routes::{custom_orders, health, orders, params, partners, products, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::signup,
        users::login,
        users::forgot_password,
        users::verify_code,
        users::reset_password,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        products::create_product,
        products::list_products,
        products::get_product,
        products::update_product,
        products::delete_product,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        custom_orders::create_custom_order,
        custom_orders::list_custom_orders,
        custom_orders::get_custom_order,
        custom_orders::update_custom_order,
        custom_orders::delete_custom_order,
        partners::create_partner,
        partners::list_partners,
        partners::get_partner,
        partners::update_partner,
        partners::delete_partner
    ),
    components(
        schemas(
            Role,
            ActiveUnactive,
            PartnerPackage,
            ProductType,
            OrderStatus,
            PaymentStatus,
            User,
            Partner,
            PartnerAddress,
            Product,
            Order,
            OrderLineItem,
            OrderDetail,
            CustomerSummary,
            ProductSummary,
            CustomOrder,
            CustomerContact,
            ShippingAddress,
            SignupRequest,
            LoginRequest,
            AuthResponse,
            ForgotPasswordRequest,
            VerifyCodeRequest,
            ResetPasswordRequest,
            UpdateUserRequest,
            UserList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            LineItemRequest,
            CreateOrderRequest,
            UpdateOrderRequest,
            OrderList,
            CreateCustomOrderRequest,
            UpdateCustomOrderRequest,
            CustomOrderList,
            CreatePartnerRequest,
            UpdatePartnerRequest,
            PartnerList,
            params::Pagination,
            Meta,
            ResponseStatus,
            health::HealthData,
            ApiResponse<AuthResponse>,
            ApiResponse<User>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Order>,
            ApiResponse<OrderDetail>,
            ApiResponse<OrderList>,
            ApiResponse<CustomOrder>,
            ApiResponse<Partner>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Users", description = "Signup, login, password reset and profiles"),
        (name = "Products", description = "Partner catalogs"),
        (name = "Orders", description = "Priced multi-item orders"),
        (name = "Custom orders", description = "Guest orders for configurable products"),
        (name = "Partners", description = "Partner administration"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
