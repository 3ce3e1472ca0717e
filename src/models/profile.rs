use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::watchlist::WatchStatus;
use super::{DiscoverItem, MediaDetails};

/// Number of billed cast members that carry taste signal
pub const TOP_CAST: usize = 5;

/// Weights below this magnitude are treated as zero and dropped, so a fully
/// reversed profile returns to literal emptiness
const WEIGHT_EPSILON: f64 = 1e-9;

/// Relative importance multiplier per attribute category
///
/// The same table is used when folding watch activity into the profile and
/// when scoring candidates, so "one unit of genre affinity" means the same
/// thing at build time and at query time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeWeights {
    pub genres: f64,
    pub languages: f64,
    pub countries: f64,
    pub director: f64,
    pub actors: f64,
}

impl Default for AttributeWeights {
    fn default() -> Self {
        Self {
            genres: 1.5,
            languages: 0.5,
            countries: 0.5,
            director: 2.0,
            actors: 1.0,
        }
    }
}

impl WatchStatus {
    /// Signed magnitude a status contributes to every attribute of an item.
    ///
    /// Watched outweighs intent-to-watch 2:1; an explicit rejection cancels
    /// more than a single bookmark; `Remove` contributes nothing and exists
    /// only to reverse a prior contribution.
    pub fn contribution(self) -> f64 {
        match self {
            WatchStatus::Watched => 2.0,
            WatchStatus::Watchlist => 1.0,
            WatchStatus::NotInterested => -1.5,
            WatchStatus::Remove => 0.0,
        }
    }
}

/// Categorical attribute bundle of one catalog item
///
/// Built either from a cheap discovery row (no director or cast available)
/// or from full details. Profile folds and both scoring stages operate on
/// this bundle, never on the raw payloads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemAttributes {
    pub genre_ids: Vec<u64>,
    pub language: Option<String>,
    pub countries: Vec<String>,
    pub director: Option<u64>,
    pub cast: Vec<u64>,
}

impl ItemAttributes {
    /// Attributes available in a bulk discovery row
    pub fn from_discover(item: &DiscoverItem) -> Self {
        Self {
            genre_ids: item.genre_ids.clone(),
            language: item.original_language.clone(),
            countries: item.origin_country.clone(),
            director: None,
            cast: Vec::new(),
        }
    }

    /// Attributes available after a full detail lookup
    pub fn from_details(details: &MediaDetails) -> Self {
        Self {
            genre_ids: details.genres.iter().map(|g| g.id).collect(),
            language: details.original_language.clone(),
            countries: details
                .production_countries
                .iter()
                .map(|c| c.iso_3166_1.clone())
                .collect(),
            director: details.director(),
            cast: details.top_cast(TOP_CAST),
        }
    }
}

/// Per-user linear preference model over categorical attributes
///
/// Each map goes from an attribute key to a signed weight; an absent key is
/// neutral (weight 0), never an error. The profile is the persisted
/// document, so it round-trips through serde.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TasteProfile {
    #[serde(default)]
    pub genres: HashMap<u64, f64>,
    #[serde(default)]
    pub languages: HashMap<String, f64>,
    #[serde(default)]
    pub countries: HashMap<String, f64>,
    #[serde(default)]
    pub directors: HashMap<u64, f64>,
    #[serde(default)]
    pub actors: HashMap<u64, f64>,
}

impl TasteProfile {
    /// True iff every category map is empty; an empty profile short-circuits
    /// recommendation generation
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
            && self.languages.is_empty()
            && self.countries.is_empty()
            && self.directors.is_empty()
            && self.actors.is_empty()
    }

    /// Reset every category map; idempotent
    pub fn clear(&mut self) {
        self.genres.clear();
        self.languages.clear();
        self.countries.clear();
        self.directors.clear();
        self.actors.clear();
    }

    /// Fold one item's attributes into the profile with a signed magnitude.
    ///
    /// Every attribute key gets `magnitude * category_weight` added to its
    /// weight. Reversing a contribution is a fold with the negated
    /// magnitude; keys that return to zero are pruned.
    pub fn apply(&mut self, attrs: &ItemAttributes, magnitude: f64, weights: &AttributeWeights) {
        if magnitude == 0.0 {
            return;
        }
        for genre_id in &attrs.genre_ids {
            *self.genres.entry(*genre_id).or_insert(0.0) += magnitude * weights.genres;
        }
        if let Some(language) = &attrs.language {
            *self.languages.entry(language.clone()).or_insert(0.0) +=
                magnitude * weights.languages;
        }
        for country in &attrs.countries {
            *self.countries.entry(country.clone()).or_insert(0.0) +=
                magnitude * weights.countries;
        }
        if let Some(director) = attrs.director {
            *self.directors.entry(director).or_insert(0.0) += magnitude * weights.director;
        }
        for actor in &attrs.cast {
            *self.actors.entry(*actor).or_insert(0.0) += magnitude * weights.actors;
        }
        self.prune_zeroes();
    }

    /// Affinity between the profile and one item's attributes.
    ///
    /// Pure dot product: each matched key contributes its profile weight
    /// times the category multiplier; unmatched keys contribute nothing.
    pub fn affinity(&self, attrs: &ItemAttributes, weights: &AttributeWeights) -> f64 {
        let mut score = 0.0;
        for genre_id in &attrs.genre_ids {
            score += self.genres.get(genre_id).copied().unwrap_or(0.0) * weights.genres;
        }
        if let Some(language) = &attrs.language {
            score += self.languages.get(language).copied().unwrap_or(0.0) * weights.languages;
        }
        for country in &attrs.countries {
            score += self.countries.get(country).copied().unwrap_or(0.0) * weights.countries;
        }
        if let Some(director) = attrs.director {
            score += self.directors.get(&director).copied().unwrap_or(0.0) * weights.director;
        }
        for actor in &attrs.cast {
            score += self.actors.get(actor).copied().unwrap_or(0.0) * weights.actors;
        }
        score
    }

    /// Language codes with strictly positive weight, sorted for a stable
    /// discovery filter
    pub fn positive_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self
            .languages
            .iter()
            .filter(|(_, weight)| **weight > 0.0)
            .map(|(code, _)| code.clone())
            .collect();
        languages.sort();
        languages
    }

    fn prune_zeroes(&mut self) {
        self.genres.retain(|_, w| w.abs() > WEIGHT_EPSILON);
        self.languages.retain(|_, w| w.abs() > WEIGHT_EPSILON);
        self.countries.retain(|_, w| w.abs() > WEIGHT_EPSILON);
        self.directors.retain(|_, w| w.abs() > WEIGHT_EPSILON);
        self.actors.retain(|_, w| w.abs() > WEIGHT_EPSILON);
    }
}
