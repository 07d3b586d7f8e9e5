use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::filters::{BedroomCategory, FilterUpdate, PossessionTag, SortKey};

const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const ENV_PREFIX: &str = "PROPERTY_SEARCH";

#[derive(Parser, Debug)]
#[command(version, about = "Search property listings from the command line")]
pub struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, value_name = "CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Free-text query.
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    /// Locality inside the city; repeatable.
    #[arg(long = "locality", value_name = "LOCALITY")]
    pub localities: Vec<String>,

    /// Bedroom category ("3", "3 BHK", "Duplex"); repeatable.
    #[arg(long = "bhk", value_name = "BHK")]
    pub bedrooms: Vec<String>,

    /// Property type label ("Apartment", "Villa"); repeatable.
    #[arg(long = "property-type", value_name = "TYPE")]
    pub property_types: Vec<String>,

    /// Lower budget, e.g. "50 Lac".
    #[arg(long)]
    pub min_budget: Option<String>,

    /// Upper budget, e.g. "1.5 Cr".
    #[arg(long)]
    pub max_budget: Option<String>,

    /// Possession status ("Ready to Move", "Upto 1 Year"); repeatable.
    #[arg(long = "possession", value_name = "STATUS")]
    pub possession: Vec<String>,

    /// Sort label, e.g. "Price: Low to High".
    #[arg(long)]
    pub sort: Option<String>,

    /// Number of result pages to load.
    #[arg(long, default_value_t = 1)]
    pub pages: u32,

    /// Ask the assistant a natural-language question after the filtered search.
    #[arg(long)]
    pub ask: Option<String>,

    /// Print the final result set as JSON.
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Filters given on the command line as a single update
    pub fn filter_update(&self) -> Result<FilterUpdate> {
        let mut update = FilterUpdate::new();
        if let Some(search) = &self.search {
            update = update.search(search.clone());
        }
        if let Some(city) = &self.city {
            update = update.city(city.clone());
        }
        if !self.localities.is_empty() {
            update = update.localities(self.localities.iter().cloned());
        }
        if !self.bedrooms.is_empty() {
            let bedrooms = self
                .bedrooms
                .iter()
                .map(|label| label.parse::<BedroomCategory>())
                .collect::<Result<Vec<_>, _>>()
                .context("Invalid --bhk value")?;
            update = update.bedrooms(bedrooms);
        }
        if !self.property_types.is_empty() {
            update = update.property_types(self.property_types.iter().cloned());
        }
        if let Some(min) = &self.min_budget {
            update = update.min_budget(min.clone());
        }
        if let Some(max) = &self.max_budget {
            update = update.max_budget(max.clone());
        }
        if !self.possession.is_empty() {
            let tags = self
                .possession
                .iter()
                .map(|label| label.parse::<PossessionTag>())
                .collect::<Result<Vec<_>, _>>()
                .context("Invalid --possession value")?;
            update = update.possession(tags);
        }
        if let Some(sort) = &self.sort {
            update = update.sort(SortKey::from_label(sort));
        }
        Ok(update)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    pub listings_path: String,
    pub chat_path: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn listings_url(&self) -> String {
        join_url(&self.base_url, &self.listings_path)
    }

    pub fn chat_url(&self) -> String {
        join_url(&self.base_url, &self.chat_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchSettings {
    pub page_size: u32,
    /// Distance from the end of the list that triggers the next page
    pub scroll_threshold_px: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub api: ApiSettings,
    pub search: SearchSettings,
}

impl Settings {
    /// Defaults, then the optional TOML file, then `PROPERTY_SEARCH__*` env vars.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("api.listings_path", "/projects")?
            .set_default("api.chat_path", "/chat")?
            .set_default("api.timeout_secs", 30_i64)?
            .set_default("api.user_agent", APP_USER_AGENT)?
            .set_default("search.page_size", 10_i64)?
            .set_default("search.scroll_threshold_px", 400.0)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_a_file() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.search.page_size, 10);
        assert_eq!(settings.search.scroll_threshold_px, 400.0);
        assert_eq!(settings.api.listings_url(), "http://localhost:5000/api/projects");
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"https://listings.example.com/v2/\"\ntimeout_secs = 5\n\n[search]\npage_size = 24"
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.api.timeout(), Duration::from_secs(5));
        assert_eq!(settings.search.page_size, 24);
        assert_eq!(settings.api.chat_url(), "https://listings.example.com/v2/chat");
        assert_eq!(settings.search.scroll_threshold_px, 400.0);
    }

    #[test]
    fn command_line_filters_become_one_update() {
        let args = Args::parse_from([
            "property-search",
            "--city",
            "Ahmedabad",
            "--bhk",
            "3",
            "--bhk",
            "Duplex",
            "--possession",
            "Upto 1 Year",
            "--min-budget",
            "50 Lac",
            "--sort",
            "Newest",
        ]);
        let update = args.filter_update().unwrap();
        assert_eq!(update.city, Some(Some("Ahmedabad".to_string())));
        assert_eq!(
            update.bedrooms,
            Some(vec![BedroomCategory::Count(3), BedroomCategory::Duplex])
        );
        assert_eq!(update.possession, Some(vec![PossessionTag::UptoOneYear]));
        assert_eq!(update.min_budget, Some(Some("50 Lac".to_string())));
        assert_eq!(update.sort, Some(SortKey::Newest));
        assert_eq!(update.localities, None);
    }

    #[test]
    fn unknown_possession_label_is_rejected() {
        let args = Args::parse_from(["property-search", "--possession", "Someday"]);
        assert!(args.filter_update().is_err());
    }
}
