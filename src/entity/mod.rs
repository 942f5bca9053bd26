pub mod audit_logs;
pub mod custom_orders;
pub mod order_items;
pub mod orders;
pub mod partners;
pub mod products;
pub mod sea_orm_active_enums;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use custom_orders::Entity as CustomOrders;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use partners::Entity as Partners;
pub use products::Entity as Products;
pub use users::Entity as Users;
