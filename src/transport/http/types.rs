use crate::app::catalog_service::{CatalogService, HerbList};
use crate::domain::filters::Metadata;
use crate::domain::herb::{Herb, HerbPatch, NewHerb};
use crate::domain::price::{Price, PriceFormatError};
use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    /// Reported by the healthcheck.
    pub environment: String,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Body of `POST /v1/herbs`. Missing fields are reported by validation, not by the decoder.
#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateHerbRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Text form, e.g. `"8.25 USD"`. Decoded after the body so grammar errors
    /// surface as `InvalidFormat`.
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "8.25 USD")]
    pub price: Option<JsonValue>,
    #[serde(default)]
    pub culinary_uses: Vec<String>,
}

fn read_price(value: Option<JsonValue>) -> Result<Option<Price>, PriceFormatError> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(text)) => text.parse().map(Some),
        Some(_) => Err(PriceFormatError),
    }
}

impl TryFrom<CreateHerbRequest> for NewHerb {
    type Error = CatalogError;

    fn try_from(r: CreateHerbRequest) -> Result<Self, Self::Error> {
        Ok(NewHerb {
            name: r.name,
            description: r.description,
            price: read_price(r.price)?.unwrap_or_default(),
            culinary_uses: r.culinary_uses,
        })
    }
}

/// Body of `PATCH /v1/herbs/{id}`. Omitted fields keep their stored values.
#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateHerbRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "9.10 USD")]
    pub price: Option<JsonValue>,
    #[serde(default)]
    pub culinary_uses: Option<Vec<String>>,
}

impl TryFrom<UpdateHerbRequest> for HerbPatch {
    type Error = CatalogError;

    fn try_from(r: UpdateHerbRequest) -> Result<Self, Self::Error> {
        Ok(HerbPatch {
            name: r.name,
            description: r.description,
            price: read_price(r.price)?,
            culinary_uses: r.culinary_uses,
        })
    }
}

/// Query string of `GET /v1/herbs`. Kept as raw text so bad integers can be
/// reported alongside every other validation error.
#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListHerbsParams {
    /// Full-text match against the herb name.
    pub name: Option<String>,
    /// Comma-separated culinary uses; a herb must have all of them.
    pub culinary_uses: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    /// One of `id, name, description, price`, optionally prefixed with `-`.
    pub sort: Option<String>,
}

/// External view of a herb (`created_at` is internal).
#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
pub struct HerbView {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[schema(value_type = String, example = "8.25 USD")]
    pub price: Price,
    pub culinary_uses: Vec<String>,
    pub version: i32,
}

impl From<&Herb> for HerbView {
    fn from(h: &Herb) -> Self {
        HerbView {
            id: h.id,
            name: h.name.clone(),
            description: h.description.clone(),
            price: h.price,
            culinary_uses: h.culinary_uses.clone(),
            version: h.version,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct HerbEnvelope {
    pub herb: HerbView,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct HerbListView {
    pub herbs: Vec<HerbView>,
    pub metadata: Metadata,
}

impl From<&HerbList> for HerbListView {
    fn from(list: &HerbList) -> Self {
        HerbListView {
            herbs: list.herbs.iter().map(HerbView::from).collect(),
            metadata: list.metadata,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct SystemInfo {
    pub environment: String,
    pub version: String,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct HealthView {
    pub status: String,
    pub system_info: SystemInfo,
}
