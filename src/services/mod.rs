pub mod auth_service;
pub mod custom_order_service;
pub mod order_service;
pub mod partner_service;
pub mod product_service;
pub mod user_service;
