//! Core library for cardlist
//!
//! This crate implements the **Functional Core** of the cardlist application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The cardlist project uses a two-crate architecture:
//!
//! - **`cardlist_core`** (this crate): Pure transformation functions with zero I/O
//! - **`cardlist`**: HTTP server, configuration, and the Hearthstone API client
//!   (the Imperative Shell)
//!
//! All functions in this crate are deterministic and can be tested with fixture
//! data. Nothing here talks to the network or logs.
//!
//! # Module Organization
//!
//! - [`hearthstone`]: Catalog API models and transformations into [`hearthstone::Card`]
//! - [`query`]: Request parameter extraction and [`query::CardQuery`] validation
//! - [`shape`]: Sort-then-truncate applied to card lists before rendering
//! - [`render`]: HTML table rendering
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use cardlist_core::{render::render_cards_table, shape::shape_cards};
//!
//! let cards = shape_cards(cards, Some(10));
//! let html = render_cards_table(&cards);
//! ```

pub mod hearthstone;
pub mod query;
pub mod render;
pub mod shape;
