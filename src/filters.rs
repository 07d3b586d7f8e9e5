//! The filter model: every active search criterion, as one immutable snapshot.
//!
//! Snapshots are handed out as `Arc<FilterSet>` and only replaced through
//! [`FilterStore::update`] / [`FilterStore::reset`], so a pointer comparison is
//! enough for consumers to notice that the criteria changed.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

/// A display label that does not belong to a closed filter vocabulary
#[derive(Debug, Clone, Error, PartialEq)]
#[error("unrecognised {kind} label: {label:?}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub label: String,
}

impl UnknownLabel {
    fn new(kind: &'static str, label: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
        }
    }
}

/// Insertion-ordered list that never holds the same entry twice
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueList<T>(Vec<T>);

impl<T> Default for UniqueList<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T: PartialEq> UniqueList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` unless already present. Returns whether it was added.
    pub fn insert(&mut self, value: T) -> bool {
        if self.0.contains(&value) {
            return false;
        }
        self.0.push(value);
        true
    }

    pub fn remove(&mut self, value: &T) -> bool {
        let before = self.0.len();
        self.0.retain(|v| v != value);
        before != self.0.len()
    }

    /// Removes `value` if present, appends it otherwise.
    pub fn toggle(&mut self, value: T) {
        if !self.remove(&value) {
            self.0.push(value);
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.0.contains(value)
    }
}

impl<T> UniqueList<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }
}

impl<T: PartialEq> FromIterator<T> for UniqueList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        for value in iter {
            list.insert(value);
        }
        list
    }
}

impl<'a, T> IntoIterator for &'a UniqueList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: Serialize> Serialize for UniqueList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de> + PartialEq> Deserialize<'de> for UniqueList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(|values| values.into_iter().collect())
    }
}

/// Bedroom selection: a plain count or a layout category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BedroomCategory {
    Count(u8),
    Studio,
    Duplex,
    Penthouse,
}

impl BedroomCategory {
    pub fn label(&self) -> String {
        match self {
            BedroomCategory::Count(n) => n.to_string(),
            BedroomCategory::Studio => "Studio".to_string(),
            BedroomCategory::Duplex => "Duplex".to_string(),
            BedroomCategory::Penthouse => "Penthouse".to_string(),
        }
    }

    /// Property sub-type token for layout categories, `None` for counts
    pub fn sub_type_token(&self) -> Option<&'static str> {
        match self {
            BedroomCategory::Count(_) => None,
            BedroomCategory::Studio => Some("STUDIO"),
            BedroomCategory::Duplex => Some("DUPLEX"),
            BedroomCategory::Penthouse => Some("PENTHOUSE"),
        }
    }
}

impl FromStr for BedroomCategory {
    type Err = UnknownLabel;

    /// Accepts "3", "3 BHK", "5+ BHK", "Duplex", "Penthouse", "Studio".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        match label.to_ascii_lowercase().as_str() {
            "studio" | "1 rk" => return Ok(BedroomCategory::Studio),
            "duplex" => return Ok(BedroomCategory::Duplex),
            "penthouse" => return Ok(BedroomCategory::Penthouse),
            _ => {}
        }
        let digits: String = label.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits
            .parse()
            .map(BedroomCategory::Count)
            .map_err(|_| UnknownLabel::new("bedroom", s))
    }
}

impl TryFrom<String> for BedroomCategory {
    type Error = UnknownLabel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BedroomCategory> for String {
    fn from(value: BedroomCategory) -> Self {
        value.label()
    }
}

impl fmt::Display for BedroomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Possession-status selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PossessionTag {
    ReadyToMove,
    UptoOneYear,
    UptoTwoYears,
    TwoPlusYears,
}

impl PossessionTag {
    pub const ALL: [PossessionTag; 4] = [
        PossessionTag::ReadyToMove,
        PossessionTag::UptoOneYear,
        PossessionTag::UptoTwoYears,
        PossessionTag::TwoPlusYears,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PossessionTag::ReadyToMove => "Ready to Move",
            PossessionTag::UptoOneYear => "Upto 1 Year",
            PossessionTag::UptoTwoYears => "Upto 2 Years",
            PossessionTag::TwoPlusYears => "2+ Years",
        }
    }
}

impl FromStr for PossessionTag {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase()
            .replace("up to", "upto");
        match normalized.as_str() {
            "ready to move" => Ok(PossessionTag::ReadyToMove),
            "upto 1 year" => Ok(PossessionTag::UptoOneYear),
            "upto 2 years" => Ok(PossessionTag::UptoTwoYears),
            "2+ years" => Ok(PossessionTag::TwoPlusYears),
            _ => Err(UnknownLabel::new("possession", s)),
        }
    }
}

impl TryFrom<String> for PossessionTag {
    type Error = UnknownLabel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PossessionTag> for String {
    fn from(value: PossessionTag) -> Self {
        value.label().to_string()
    }
}

/// Result ordering chosen by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortKey {
    #[default]
    Featured,
    Newest,
    PriceLowToHigh,
    PriceHighToLow,
    AreaLowToHigh,
    AreaHighToLow,
}

impl SortKey {
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Featured => "Featured",
            SortKey::Newest => "Newest",
            SortKey::PriceLowToHigh => "Price: Low to High",
            SortKey::PriceHighToLow => "Price: High to Low",
            SortKey::AreaLowToHigh => "Area: Low to High",
            SortKey::AreaHighToLow => "Area: High to Low",
        }
    }

    /// Unknown labels fall back to `Featured`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "newest" | "newest first" => SortKey::Newest,
            "price: low to high" | "price-asc" => SortKey::PriceLowToHigh,
            "price: high to low" | "price-desc" => SortKey::PriceHighToLow,
            "area: low to high" | "area-asc" => SortKey::AreaLowToHigh,
            "area: high to low" | "area-desc" => SortKey::AreaHighToLow,
            _ => SortKey::Featured,
        }
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        SortKey::from_label(&value)
    }
}

impl From<SortKey> for String {
    fn from(value: SortKey) -> Self {
        value.label().to_string()
    }
}

/// All active search criteria
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSet {
    pub search: String,
    pub city: Option<String>,
    pub localities: UniqueList<String>,
    pub bedrooms: UniqueList<BedroomCategory>,
    pub property_types: UniqueList<String>,
    pub min_budget: Option<String>,
    pub max_budget: Option<String>,
    pub possession: UniqueList<PossessionTag>,
    pub sort: SortKey,
}

impl FilterSet {
    /// True when nothing but the defaults is selected
    pub fn is_default(&self) -> bool {
        *self == FilterSet::default()
    }

    /// Shallow merge: fields present in `update` replace the current ones.
    pub fn merged(&self, update: FilterUpdate) -> FilterSet {
        let mut next = self.clone();
        if let Some(search) = update.search {
            next.search = search;
        }
        if let Some(city) = update.city {
            next.city = city;
        }
        if let Some(localities) = update.localities {
            next.localities = localities.into_iter().collect();
        }
        if let Some(bedrooms) = update.bedrooms {
            next.bedrooms = bedrooms.into_iter().collect();
        }
        if let Some(property_types) = update.property_types {
            next.property_types = property_types.into_iter().collect();
        }
        if let Some(min_budget) = update.min_budget {
            next.min_budget = min_budget;
        }
        if let Some(max_budget) = update.max_budget {
            next.max_budget = max_budget;
        }
        if let Some(possession) = update.possession {
            next.possession = possession.into_iter().collect();
        }
        if let Some(sort) = update.sort {
            next.sort = sort;
        }
        next
    }
}

/// Partial FilterSet; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterUpdate {
    pub search: Option<String>,
    pub city: Option<Option<String>>,
    pub localities: Option<Vec<String>>,
    pub bedrooms: Option<Vec<BedroomCategory>>,
    pub property_types: Option<Vec<String>>,
    pub min_budget: Option<Option<String>>,
    pub max_budget: Option<Option<String>>,
    pub possession: Option<Vec<PossessionTag>>,
    pub sort: Option<SortKey>,
}

impl FilterUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(Some(city.into()));
        self
    }

    pub fn clear_city(mut self) -> Self {
        self.city = Some(None);
        self
    }

    pub fn localities<I, S>(mut self, localities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.localities = Some(localities.into_iter().map(Into::into).collect());
        self
    }

    pub fn bedrooms(mut self, bedrooms: impl IntoIterator<Item = BedroomCategory>) -> Self {
        self.bedrooms = Some(bedrooms.into_iter().collect());
        self
    }

    pub fn property_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.property_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn min_budget(mut self, budget: impl Into<String>) -> Self {
        self.min_budget = Some(Some(budget.into()));
        self
    }

    pub fn max_budget(mut self, budget: impl Into<String>) -> Self {
        self.max_budget = Some(Some(budget.into()));
        self
    }

    pub fn clear_budget(mut self) -> Self {
        self.min_budget = Some(None);
        self.max_budget = Some(None);
        self
    }

    pub fn possession(mut self, tags: impl IntoIterator<Item = PossessionTag>) -> Self {
        self.possession = Some(tags.into_iter().collect());
        self
    }

    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn toggle_bedroom(current: &FilterSet, category: BedroomCategory) -> Self {
        let mut bedrooms = current.bedrooms.clone();
        bedrooms.toggle(category);
        Self::new().bedrooms(bedrooms.iter().copied())
    }

    pub fn toggle_property_type(current: &FilterSet, label: &str) -> Self {
        let mut types = current.property_types.clone();
        types.toggle(label.to_string());
        Self::new().property_types(types.iter().cloned())
    }

    pub fn toggle_locality(current: &FilterSet, locality: &str) -> Self {
        let mut localities = current.localities.clone();
        localities.toggle(locality.to_string());
        Self::new().localities(localities.iter().cloned())
    }

    pub fn toggle_possession(current: &FilterSet, tag: PossessionTag) -> Self {
        let mut tags = current.possession.clone();
        tags.toggle(tag);
        Self::new().possession(tags.iter().copied())
    }
}

/// Owner of the current FilterSet snapshot
#[derive(Debug, Default)]
pub struct FilterStore {
    current: Arc<FilterSet>,
}

impl FilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(filters: FilterSet) -> Self {
        Self {
            current: Arc::new(filters),
        }
    }

    pub fn snapshot(&self) -> Arc<FilterSet> {
        Arc::clone(&self.current)
    }

    /// Merge `update` into the current snapshot.
    ///
    /// Returns `true` when the criteria actually changed; the snapshot is
    /// only replaced in that case.
    pub fn update(&mut self, update: FilterUpdate) -> bool {
        let next = self.current.merged(update);
        self.replace(next)
    }

    /// Restore the defaults ("clear filters").
    pub fn reset(&mut self) -> bool {
        self.replace(FilterSet::default())
    }

    fn replace(&mut self, next: FilterSet) -> bool {
        if *self.current == next {
            debug!("Filter update left criteria unchanged");
            return false;
        }
        self.current = Arc::new(next);
        true
    }
}
