use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod profile;
pub mod watchlist;

pub use profile::{AttributeWeights, ItemAttributes, TasteProfile};
pub use watchlist::{parse_watchlist_key, watchlist_key, WatchStatus, WatchlistEntry};

/// Kind of catalog item, used in watchlist keys and catalog URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Tv => write!(f, "tv"),
        }
    }
}

impl MediaKind {
    /// Parse the `media_type` string found in mixed-kind discovery results
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "movie" => Some(MediaKind::Movie),
            "tv" => Some(MediaKind::Tv),
            _ => None,
        }
    }
}

// ============================================================================
// Catalog Discovery API Types
// ============================================================================

/// One page of catalog discovery results with pagination metadata
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverPage {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page")]
    pub total_pages: u32,
    #[serde(default)]
    pub results: Vec<DiscoverItem>,
}

fn default_page() -> u32 {
    1
}

/// A catalog item as it appears in bulk discovery results
///
/// Only cheap categorical fields are present here; cast and crew require a
/// separate detail lookup. `media_type` is only populated in mixed-kind
/// responses, so the kind may be ambiguous at this stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverItem {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub origin_country: Vec<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl DiscoverItem {
    /// Resolve this row's kind, falling back to the kind the page was
    /// requested with when the row does not carry one
    pub fn kind_or(&self, requested: MediaKind) -> MediaKind {
        self.media_type
            .as_deref()
            .and_then(MediaKind::parse)
            .unwrap_or(requested)
    }
}

// ============================================================================
// Catalog Detail API Types
// ============================================================================

/// Full catalog item details including credits
///
/// The detail endpoint reports films and series through the same shape;
/// series carry `first_air_date` while films carry `release_date`, which is
/// what [`MediaDetails::kind`] keys off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaDetails {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub production_countries: Vec<ProductionCountry>,
    #[serde(default)]
    pub credits: Option<Credits>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionCountry {
    pub iso_3166_1: String,
}

/// Billed cast and crew; either list may be absent or empty
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
}

impl MediaDetails {
    /// Disambiguate the kind from the detailed payload: an air date marks a
    /// series, everything else is treated as a film
    pub fn kind(&self) -> MediaKind {
        if self.first_air_date.is_some() {
            MediaKind::Tv
        } else {
            MediaKind::Movie
        }
    }

    /// Person id of the first crew entry credited as "Director", if any
    pub fn director(&self) -> Option<u64> {
        self.credits
            .as_ref()?
            .crew
            .iter()
            .find(|member| member.job.as_deref() == Some("Director"))
            .map(|member| member.id)
    }

    /// Person ids of the top `limit` billed cast members, in billing order
    pub fn top_cast(&self, limit: usize) -> Vec<u64> {
        self.credits
            .as_ref()
            .map(|credits| credits.cast.iter().take(limit).map(|c| c.id).collect())
            .unwrap_or_default()
    }

    /// Display title, whichever of the film/series title fields is present
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("")
    }
}

/// A ranked recommendation produced by the pipeline
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub kind: MediaKind,
    pub score: f64,
    #[serde(flatten)]
    pub details: MediaDetails,
}
