use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Location information for a listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub city: Option<String>,
    /// Locality inside the city
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Core property record as returned by the listing API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Unique identity of the listing, used as the dedup key
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub developer: Option<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub bedrooms: Vec<u32>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub possession_date: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Fields the client does not model, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Property {
    /// Minimal record, mostly useful for fixtures and AI replies
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            developer: None,
            location: Location::default(),
            price: None,
            bedrooms: Vec::new(),
            property_type: None,
            status: None,
            possession_date: None,
            images: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// One listing page: `{ projects, totalCount }`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage {
    #[serde(default)]
    pub projects: Vec<Property>,
    #[serde(default)]
    pub total_count: u64,
}

impl ResultPage {
    pub fn new(projects: Vec<Property>, total_count: u64) -> Self {
        Self {
            projects,
            total_count,
        }
    }
}

/// Natural-language search request sent to the chat endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

/// Chat endpoint reply: human text plus zero or more matching listings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    #[serde(alias = "message")]
    pub reply: String,
    #[serde(default, alias = "projects")]
    pub properties: Vec<Property>,
}
