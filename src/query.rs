//! Projection of a [`FilterSet`] onto the listing API's query parameters.

use chrono::{DateTime, Months, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::budget::parse_budget;
use crate::error::MappingError;
use crate::filters::{BedroomCategory, FilterSet, PossessionTag, SortKey};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

const READY_TO_MOVE_STATUS: &str = "READY_TO_MOVE";

/// Display label → canonical property type token
const PROPERTY_TYPE_TOKENS: &[(&str, &str)] = &[
    ("apartment", "APARTMENT"),
    ("flat", "APARTMENT"),
    ("villa", "VILLA"),
    ("bungalow", "BUNGALOW"),
    ("row house", "ROW_HOUSE"),
    ("plot", "PLOT"),
    ("commercial", "COMMERCIAL"),
    ("office", "OFFICE"),
    ("shop", "SHOP"),
    ("penthouse", "PENTHOUSE"),
    ("duplex", "DUPLEX"),
];

/// Canonical token for a property type label; unknown labels pass through.
pub fn property_type_token(label: &str) -> String {
    let key = label.trim().to_ascii_lowercase();
    PROPERTY_TYPE_TOKENS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, token)| (*token).to_string())
        .unwrap_or_else(|| label.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl SortKey {
    /// `(sortBy, sortOrder)` directive sent to the API
    pub fn directive(&self) -> (&'static str, SortOrder) {
        match self {
            SortKey::Featured => ("featured", SortOrder::Desc),
            SortKey::Newest => ("createdAt", SortOrder::Desc),
            SortKey::PriceLowToHigh => ("price", SortOrder::Asc),
            SortKey::PriceHighToLow => ("price", SortOrder::Desc),
            SortKey::AreaLowToHigh => ("area", SortOrder::Asc),
            SortKey::AreaHighToLow => ("area", SortOrder::Desc),
        }
    }
}

impl PossessionTag {
    /// Years from now for "upto" windows
    fn upto_years(&self) -> Option<u32> {
        match self {
            PossessionTag::UptoOneYear => Some(1),
            PossessionTag::UptoTwoYears => Some(2),
            _ => None,
        }
    }
}

/// Query parameters for one listing page. Absent filters are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    pub limit: u32,
    pub offset: u64,
    pub sort_by: String,
    pub sort_order: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Comma-joined localities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_min: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_max: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub possession_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub possession_after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<Vec<u32>>,
}

impl QueryParams {
    /// URL query pairs, list fields comma-joined
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
            ("sortBy", self.sort_by.clone()),
            ("sortOrder", self.sort_order.as_str().to_string()),
        ];
        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(value) = value {
                pairs.push((key, value));
            }
        };
        push("search", self.search.clone());
        push("city", self.city.clone());
        push("area", self.area.clone());
        push("propertyType", self.property_type.as_ref().map(|v| v.join(",")));
        push("priceMin", self.price_min.map(|v| v.to_string()));
        push("priceMax", self.price_max.map(|v| v.to_string()));
        push("status", self.status.as_ref().map(|v| v.join(",")));
        push("possessionBefore", self.possession_before.clone());
        push("possessionAfter", self.possession_after.clone());
        push(
            "bedrooms",
            self.bedrooms.as_ref().map(|v| {
                v.iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            }),
        );
        pairs
    }
}

/// Pure FilterSet → QueryParams translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryMapper {
    page_size: u32,
}

impl Default for QueryMapper {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QueryMapper {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Map with `Utc::now()` as the reference time for possession windows.
    pub fn map_now(&self, filters: &FilterSet, page: u32) -> QueryParams {
        self.map(filters, page, Utc::now())
    }

    /// Map, dropping any field that fails to translate.
    ///
    /// A failure here means the FilterSet was built outside the closed
    /// vocabulary; it is logged and the field treated as "no constraint".
    pub fn map(&self, filters: &FilterSet, page: u32, now: DateTime<Utc>) -> QueryParams {
        match self.try_map(filters, page, now) {
            Ok(params) => params,
            Err(err) => {
                warn!("Dropping untranslatable filter field: {}", err);
                let mut sanitized = filters.clone();
                match err {
                    MappingError::ZeroBedrooms => {
                        sanitized.bedrooms = filters
                            .bedrooms
                            .iter()
                            .copied()
                            .filter(|c| *c != BedroomCategory::Count(0))
                            .collect();
                    }
                    MappingError::DateOutOfRange { .. } => {
                        sanitized.possession = filters
                            .possession
                            .iter()
                            .copied()
                            .filter(|t| *t == PossessionTag::ReadyToMove)
                            .collect();
                    }
                }
                self.map(&sanitized, page, now)
            }
        }
    }

    pub fn try_map(
        &self,
        filters: &FilterSet,
        page: u32,
        now: DateTime<Utc>,
    ) -> Result<QueryParams, MappingError> {
        let offset = u64::from(page) * u64::from(self.page_size);
        let (sort_by, sort_order) = filters.sort.directive();

        let mut bedrooms = Vec::new();
        let mut property_types: Vec<String> = filters
            .property_types
            .iter()
            .map(|label| property_type_token(label))
            .collect();
        for category in &filters.bedrooms {
            match category {
                BedroomCategory::Count(0) => return Err(MappingError::ZeroBedrooms),
                BedroomCategory::Count(n) => {
                    let n = u32::from(*n);
                    if !bedrooms.contains(&n) {
                        bedrooms.push(n);
                    }
                }
                other => {
                    if let Some(token) = other.sub_type_token() {
                        property_types.push(token.to_string());
                    }
                }
            }
        }
        let mut unique_types = Vec::with_capacity(property_types.len());
        for token in property_types {
            if !unique_types.contains(&token) {
                unique_types.push(token);
            }
        }

        let mut status = Vec::new();
        let mut possession_before: Option<DateTime<Utc>> = None;
        let mut possession_after = None;
        for tag in &filters.possession {
            if *tag == PossessionTag::ReadyToMove {
                status.push(READY_TO_MOVE_STATUS.to_string());
            } else if let Some(years) = tag.upto_years() {
                let cutoff = years_from(now, years)?;
                possession_before = Some(possession_before.map_or(cutoff, |b| b.max(cutoff)));
            } else {
                possession_after = Some(years_from(now, 2)?);
            }
        }

        let localities: Vec<&str> = filters
            .localities
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();

        Ok(QueryParams {
            limit: self.page_size,
            offset,
            sort_by: sort_by.to_string(),
            sort_order,
            search: non_blank(&filters.search),
            city: filters.city.as_deref().and_then(non_blank),
            area: (!localities.is_empty()).then(|| localities.join(",")),
            property_type: non_empty(unique_types),
            price_min: filters.min_budget.as_deref().and_then(parse_budget),
            price_max: filters.max_budget.as_deref().and_then(parse_budget),
            status: non_empty(status),
            possession_before: possession_before.map(iso_timestamp),
            possession_after: possession_after.map(iso_timestamp),
            bedrooms: non_empty(bedrooms),
        })
    }
}

fn years_from(now: DateTime<Utc>, years: u32) -> Result<DateTime<Utc>, MappingError> {
    now.checked_add_months(Months::new(years * 12))
        .ok_or(MappingError::DateOutOfRange { years })
}

fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    (!values.is_empty()).then_some(values)
}
