//! Catalog lookup seam between request handling and the Hearthstone API

use crate::prelude::Error;
use cardlist_core::hearthstone::Card;

pub mod blizzard;

pub use blizzard::BlizzardCatalog;

/// Source of cards filtered by class set, mana range, and rarity
#[async_trait::async_trait]
pub trait CardCatalog: Send + Sync {
    /// Cards of any of `classes` costing `mana_min..=mana_max` with the given rarity
    async fn cards_by_classes_mana_rarity(
        &self,
        classes: &[String],
        mana_min: u32,
        mana_max: u32,
        rarity: &str,
    ) -> Result<Vec<Card>, Error>;
}
