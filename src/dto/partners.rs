use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::sea_orm_active_enums::PartnerPackage,
    models::{Partner, PartnerAddress},
};

pub const PARTNER_UPDATE_FIELDS: &[&str] =
    &["name", "address", "contactEmail", "contactPhone", "package"];

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartnerRequest {
    pub name: Option<String>,
    pub address: Option<PartnerAddress>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub package: Option<PartnerPackage>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePartnerRequest {
    pub name: Option<String>,
    pub address: Option<PartnerAddress>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub package: Option<PartnerPackage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PartnerList {
    pub partners: Vec<Partner>,
}
