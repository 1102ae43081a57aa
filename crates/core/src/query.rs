//! Card search request parsing and validation
//!
//! Pure functions that turn query-string parameters into a validated
//! [`CardQuery`]. Lossy conversions (a non-numeric `manaCost`) are left to the
//! caller so it can log them.

use std::collections::HashMap;

/// Parameters every `/cards/list` request must carry, in the order they are checked
pub const REQUIRED_PARAMS: [&str; 3] = ["classes", "manaCost", "rarity"];

/// Error type for request validation
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Required parameters, borrowed from the query string and not yet parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCardQuery<'a> {
    pub classes: &'a str,
    pub mana_cost: &'a str,
    pub rarity: &'a str,
}

/// Validated, immutable filter for one card search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardQuery {
    classes: Vec<String>,
    mana_cost: u32,
    rarity: String,
}

impl CardQuery {
    /// Build a query and run semantic validation on it
    pub fn new(classes: Vec<String>, mana_cost: i64, rarity: String) -> Result<Self, QueryError> {
        if classes.is_empty() {
            return Err(invalid("Classes length is zero"));
        }

        if classes.iter().any(|class| class.is_empty()) {
            return Err(invalid("Class names must not be empty"));
        }

        if mana_cost <= 0 {
            return Err(invalid("Mana cost must be greater than 0"));
        }

        let mana_cost =
            u32::try_from(mana_cost).map_err(|_| invalid("Mana cost is out of range"))?;

        if rarity.trim().is_empty() {
            return Err(invalid("Rarity must be set"));
        }

        Ok(Self {
            classes,
            mana_cost,
            rarity,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Minimum mana cost, always greater than zero
    pub fn mana_cost(&self) -> u32 {
        self.mana_cost
    }

    pub fn rarity(&self) -> &str {
        &self.rarity
    }
}

fn invalid(reason: &str) -> QueryError {
    QueryError::InvalidRequest(reason.to_string())
}

/// Collect query-string pairs into a map, keeping the first value of a repeated key
pub fn first_values(pairs: Vec<(String, String)>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (key, value) in pairs {
        params.entry(key).or_insert(value);
    }
    params
}

/// Pull the required parameters out of a query string map
///
/// A parameter that is present but empty counts as missing. The first missing
/// key in [`REQUIRED_PARAMS`] order is reported.
pub fn extract_params(params: &HashMap<String, String>) -> Result<RawCardQuery<'_>, QueryError> {
    let [classes, mana_cost, rarity] = REQUIRED_PARAMS;

    Ok(RawCardQuery {
        classes: required(params, classes)?,
        mana_cost: required(params, mana_cost)?,
        rarity: required(params, rarity)?,
    })
}

fn required<'a>(params: &'a HashMap<String, String>, key: &str) -> Result<&'a str, QueryError> {
    params
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| QueryError::MissingParameter(key.to_string()))
}

/// Split the comma-separated `classes` parameter, trimming each entry
pub fn split_classes(raw: &str) -> Vec<String> {
    raw.split(',').map(|class| class.trim().to_string()).collect()
}
