//! Pure transformation functions for Hearthstone catalog API responses
//!
//! This module contains zero I/O operations and is fully testable with fixture data.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Display name used when a category id is missing from the catalog metadata.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

// ============================================================================
// Domain Models (Input from API)
// ============================================================================

/// OAuth token returned by the client-credentials grant
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AccessTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: u64,
}

/// Card as returned by the `/cards` search endpoint
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CardResponse {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub card_type_id: Option<u32>,
    #[serde(default)]
    pub rarity_id: Option<u32>,
    #[serde(default)]
    pub card_set_id: Option<u32>,
    #[serde(default)]
    pub class_id: Option<u32>,
    #[serde(default)]
    pub mana_cost: Option<u32>,
}

/// One page of the `/cards` search endpoint
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CardSearchResponse {
    #[serde(default)]
    pub cards: Vec<CardResponse>,
    #[serde(default)]
    pub card_count: usize,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub page: u32,
}

/// Id/slug/name triple shared by every metadata collection
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub id: u32,
    pub slug: String,
    pub name: String,
}

/// Subset of the `/metadata` endpoint used to resolve category ids
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Metadata {
    #[serde(default)]
    pub sets: Vec<MetadataEntry>,
    #[serde(default)]
    pub types: Vec<MetadataEntry>,
    #[serde(default)]
    pub rarities: Vec<MetadataEntry>,
    #[serde(default)]
    pub classes: Vec<MetadataEntry>,
}

// ============================================================================
// Output Models (Domain Model)
// ============================================================================

/// A named category (type, rarity, set, or class) attached to a card
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CardCategory {
    pub id: u32,
    pub slug: String,
    pub name: String,
}

impl CardCategory {
    pub fn unknown(id: u32) -> Self {
        Self {
            id,
            slug: String::new(),
            name: UNKNOWN_CATEGORY.to_string(),
        }
    }
}

impl From<&MetadataEntry> for CardCategory {
    fn from(entry: &MetadataEntry) -> Self {
        Self {
            id: entry.id,
            slug: entry.slug.clone(),
            name: entry.name.clone(),
        }
    }
}

/// Card record consumed by the shaping and rendering steps
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: u64,
    pub name: String,
    pub image: String,
    pub card_type: CardCategory,
    pub rarity: CardCategory,
    pub card_set: CardCategory,
    pub card_class: CardCategory,
}

// ============================================================================
// Transformations
// ============================================================================

/// Build the comma-separated `manaCost` filter covering `min..=max`.
///
/// Returns `None` when the range is empty.
pub fn mana_cost_filter(min: u32, max: u32) -> Option<String> {
    if min > max {
        return None;
    }

    Some(
        (min..=max)
            .map(|cost| cost.to_string())
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// Reduce a display name to the slug form used by the catalog API
///
/// Lowercases and drops anything that is not an ASCII letter, digit, or dash
/// (e.g., "Demon Hunter" becomes "demonhunter").
pub fn slugify(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Resolve a user supplied class or rarity name into a catalog slug
///
/// Matches case-insensitively against both the slug and the display name of
/// each entry. Falls back to [`slugify`] when nothing matches.
pub fn resolve_slug(name: &str, entries: &[MetadataEntry]) -> String {
    let needle = name.trim();

    entries
        .iter()
        .find(|entry| {
            entry.slug.eq_ignore_ascii_case(needle) || entry.name.eq_ignore_ascii_case(needle)
        })
        .map(|entry| entry.slug.clone())
        .unwrap_or_else(|| slugify(needle))
}

/// Look up a category by id, yielding an "Unknown" category when absent
pub fn resolve_category(id: Option<u32>, entries: &[MetadataEntry]) -> CardCategory {
    let id = id.unwrap_or_default();

    entries
        .iter()
        .find(|entry| entry.id == id)
        .map(CardCategory::from)
        .unwrap_or_else(|| CardCategory::unknown(id))
}

/// Page to request after `response`, if any
pub fn next_page(response: &CardSearchResponse) -> Option<u32> {
    if response.page < response.page_count {
        Some(response.page + 1)
    } else {
        None
    }
}

/// Query parameters for one `/cards` search request
pub fn card_search_params(
    locale: &str,
    class_slug: &str,
    mana_cost: &str,
    rarity_slug: &str,
    page: u32,
    page_size: u32,
) -> Vec<(&'static str, String)> {
    vec![
        ("locale", locale.to_string()),
        ("class", class_slug.to_string()),
        ("manaCost", mana_cost.to_string()),
        ("rarity", rarity_slug.to_string()),
        ("page", page.to_string()),
        ("pageSize", page_size.to_string()),
    ]
}

/// Transform raw API cards into domain cards
///
/// Drops repeated ids (multi-class cards show up once per class searched),
/// keeping the first occurrence, and resolves every category id against the
/// catalog metadata.
pub fn transform_cards(responses: Vec<CardResponse>, metadata: &Metadata) -> Vec<Card> {
    let mut seen = HashSet::new();

    responses
        .into_iter()
        .filter(|card| seen.insert(card.id))
        .map(|card| Card {
            id: card.id,
            name: card.name,
            image: card.image,
            card_type: resolve_category(card.card_type_id, &metadata.types),
            rarity: resolve_category(card.rarity_id, &metadata.rarities),
            card_set: resolve_category(card.card_set_id, &metadata.sets),
            card_class: resolve_category(card.class_id, &metadata.classes),
        })
        .collect()
}
