use crate::catalog::{BlizzardCatalog, CardCatalog};
use crate::config::Config;
use crate::prelude::{eprintln, *};
use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Html, Response},
    routing::get,
    Router,
};
use cardlist_core::query::{extract_params, first_values, split_classes, CardQuery};
use cardlist_core::render::render_cards_table;
use cardlist_core::shape::shape_cards;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tower_http::timeout::TimeoutLayer;

const GREETING: &str = "Hello, Blizzard!";

/// Shared, read-only state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<dyn CardCatalog>,
}

impl AppState {
    pub fn new(config: Config, catalog: Arc<dyn CardCatalog>) -> Self {
        Self {
            config: Arc::new(config),
            catalog,
        }
    }
}

pub async fn run(config: Config) -> Result<()> {
    if config.verbose {
        eprintln!("Hearthstone API endpoint: {}", config.endpoint_url);
        eprintln!("Maximum mana cost: {}", config.max_mana_cost);
    }

    let catalog = BlizzardCatalog::connect(&config)
        .await
        .map_err(|e| eyre!("Failed to connect to the Hearthstone API: {e}"))?;

    let addr = config.addr();
    let state = AppState::new(config, Arc::new(catalog));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Listening on http://{addr}");

    axum::serve(listener, router(state))
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    let timeout = state.config.timeout();

    Router::new()
        .route("/", get(index_handler))
        .route("/cards/list", get(cards_list_handler))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Log method, path, status, and elapsed time for every request
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{method} {path} {} {:?}",
        response.status().as_u16(),
        start.elapsed()
    );

    response
}

async fn index_handler() -> &'static str {
    GREETING
}

/// Turn the query string into a validated [`CardQuery`]
///
/// A non-numeric `manaCost` is logged and treated as 0, which then fails
/// validation.
fn parse_card_query(params: &HashMap<String, String>) -> Result<CardQuery, ApiError> {
    let raw = extract_params(params)?;

    let mana_cost = raw.mana_cost.parse::<i64>().unwrap_or_else(|e| {
        log::warn!("Invalid manaCost {:?}: {e}", raw.mana_cost);
        0
    });

    Ok(CardQuery::new(
        split_classes(raw.classes),
        mana_cost,
        raw.rarity.to_string(),
    )?)
}

/// Optional `limit` parameter; unparsable values are logged and ignored
fn parse_limit(params: &HashMap<String, String>) -> Option<usize> {
    let raw = params.get("limit").filter(|value| !value.is_empty())?;

    raw.parse::<usize>()
        .map_err(|e| log::warn!("Ignoring invalid limit {raw:?}: {e}"))
        .ok()
}

async fn cards_list_handler(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Html<String>, ApiError> {
    let params = first_values(pairs);
    let query = parse_card_query(&params)?;
    let limit = parse_limit(&params);

    let cards = state
        .catalog
        .cards_by_classes_mana_rarity(
            query.classes(),
            query.mana_cost(),
            state.config.max_mana_cost,
            query.rarity(),
        )
        .await
        .map_err(|e| {
            log::error!("Card search failed for {query:?}: {e}");
            ApiError::Catalog(e)
        })?;

    let cards = shape_cards(cards, limit);

    Ok(Html(render_cards_table(&cards)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;
    use cardlist_core::hearthstone::{Card, CardCategory};
    use scraper::{Html as Document, Selector};
    use std::sync::{Mutex, Once};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        classes: Vec<String>,
        mana_min: u32,
        mana_max: u32,
        rarity: String,
    }

    #[derive(Default)]
    struct MockCatalog {
        cards: Vec<Card>,
        fail: bool,
        delay: Option<Duration>,
        calls: Mutex<Vec<Call>>,
    }

    static CAPTURED_LOGS: Mutex<Vec<String>> = Mutex::new(Vec::new());

    struct CapturingLogger;

    impl log::Log for CapturingLogger {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Info
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                CAPTURED_LOGS
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(record.args().to_string());
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: CapturingLogger = CapturingLogger;

    fn capture_logs() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            log::set_logger(&LOGGER).unwrap();
            log::set_max_level(log::LevelFilter::Info);
        });
    }

    fn captured_lines(prefix: &str) -> Vec<String> {
        CAPTURED_LOGS
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|line| line.starts_with(prefix))
            .cloned()
            .collect()
    }

    #[async_trait::async_trait]
    impl CardCatalog for MockCatalog {
        async fn cards_by_classes_mana_rarity(
            &self,
            classes: &[String],
            mana_min: u32,
            mana_max: u32,
            rarity: &str,
        ) -> Result<Vec<Card>, Error> {
            self.calls.lock().unwrap().push(Call {
                classes: classes.to_vec(),
                mana_min,
                mana_max,
                rarity: rarity.to_string(),
            });

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if self.fail {
                return Err(Error::Catalog {
                    status: 503,
                    body: "maintenance".to_string(),
                });
            }

            Ok(self.cards.clone())
        }
    }

    fn card(id: u64) -> Card {
        let category = |name: &str| CardCategory {
            id: 1,
            slug: name.to_lowercase(),
            name: name.to_string(),
        };

        Card {
            id,
            name: format!("Card {id}"),
            image: format!("https://example.com/{id}.png"),
            card_type: category("Minion"),
            rarity: category("Common"),
            card_set: category("Core"),
            card_class: category("Mage"),
        }
    }

    async fn spawn(catalog: Arc<MockCatalog>, max_mana_cost: u32) -> String {
        spawn_with_config(catalog, test_config(max_mana_cost)).await
    }

    async fn spawn_with_config(catalog: Arc<MockCatalog>, config: Config) -> String {
        let state = AppState::new(config, catalog);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router(state)).await.unwrap() });

        format!("http://{addr}")
    }

    fn row_ids(html: &str) -> Vec<u64> {
        let document = Document::parse_document(html);
        let first_cell = Selector::parse("tr td:first-child").unwrap();

        document
            .select(&first_cell)
            .map(|td| td.text().collect::<String>().trim().parse().unwrap())
            .collect()
    }

    async fn get(url: &str) -> (StatusCode, String) {
        let response = reqwest::get(url).await.unwrap();
        let status = response.status();
        (status, response.text().await.unwrap())
    }

    #[tokio::test]
    async fn test_index_greets() {
        let base = spawn(Arc::new(MockCatalog::default()), 10).await;

        let (status, body) = get(&base).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, GREETING);
    }

    #[tokio::test]
    async fn test_missing_rarity_is_bad_request() {
        let catalog = Arc::new(MockCatalog::default());
        let base = spawn(catalog.clone(), 10).await;

        let (status, body) = get(&format!("{base}/cards/list?classes=Mage&manaCost=3")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"message":"Missing parameter: rarity"}"#);
        assert!(catalog.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_each_missing_parameter_is_named() {
        let base = spawn(Arc::new(MockCatalog::default()), 10).await;

        let cases = [
            ("manaCost=3&rarity=Common", "classes"),
            ("classes=Mage&rarity=Common", "manaCost"),
            ("classes=Mage&manaCost=3", "rarity"),
            ("classes=&manaCost=3&rarity=Common", "classes"),
        ];

        for (query, missing) in cases {
            let (status, body) = get(&format!("{base}/cards/list?{query}")).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "query: {query}");

            let body: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(body["message"], format!("Missing parameter: {missing}"));
        }
    }

    #[tokio::test]
    async fn test_invalid_request_is_bad_request() {
        let catalog = Arc::new(MockCatalog::default());
        let base = spawn(catalog.clone(), 10).await;

        let cases = [
            (
                "classes=Mage&manaCost=0&rarity=Common",
                "Invalid request: Mana cost must be greater than 0",
            ),
            (
                "classes=Mage&manaCost=abc&rarity=Common",
                "Invalid request: Mana cost must be greater than 0",
            ),
            (
                "classes=Mage,&manaCost=3&rarity=Common",
                "Invalid request: Class names must not be empty",
            ),
            (
                "classes=Mage&manaCost=3&rarity=%20",
                "Invalid request: Rarity must be set",
            ),
        ];

        for (query, message) in cases {
            let (status, body) = get(&format!("{base}/cards/list?{query}")).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "query: {query}");

            let body: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(body["message"], message, "query: {query}");
        }

        assert!(catalog.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lists_cards_sorted_by_id() {
        let catalog = Arc::new(MockCatalog {
            cards: vec![card(30), card(10), card(20)],
            ..Default::default()
        });
        let base = spawn(catalog.clone(), 10).await;

        let response = reqwest::get(format!(
            "{base}/cards/list?classes=Mage,Warrior&manaCost=3&rarity=Common"
        ))
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/html"));

        let body = response.text().await.unwrap();
        assert_eq!(row_ids(&body), vec![10, 20, 30]);

        let calls = catalog.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![Call {
                classes: vec!["Mage".to_string(), "Warrior".to_string()],
                mana_min: 3,
                mana_max: 10,
                rarity: "Common".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_limit_truncates_after_sort() {
        let catalog = Arc::new(MockCatalog {
            cards: vec![card(30), card(10), card(20)],
            ..Default::default()
        });
        let base = spawn(catalog, 10).await;

        let (status, body) =
            get(&format!("{base}/cards/list?classes=Mage&manaCost=1&rarity=Common&limit=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(row_ids(&body), vec![10, 20]);

        let (_, body) =
            get(&format!("{base}/cards/list?classes=Mage&manaCost=1&rarity=Common&limit=9")).await;
        assert_eq!(row_ids(&body), vec![10, 20, 30]);
    }

    #[tokio::test]
    async fn test_invalid_limit_is_ignored() {
        let catalog = Arc::new(MockCatalog {
            cards: vec![card(2), card(1)],
            ..Default::default()
        });
        let base = spawn(catalog, 10).await;

        for limit in ["abc", "-1"] {
            let (status, body) = get(&format!(
                "{base}/cards/list?classes=Mage&manaCost=1&rarity=Common&limit={limit}"
            ))
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(row_ids(&body), vec![1, 2]);
        }
    }

    #[tokio::test]
    async fn test_catalog_failure_is_bad_gateway() {
        let catalog = Arc::new(MockCatalog {
            fail: true,
            ..Default::default()
        });
        let base = spawn(catalog, 10).await;

        let (status, body) =
            get(&format!("{base}/cards/list?classes=Mage&manaCost=3&rarity=Common")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            body["message"],
            "Catalog request failed: Catalog API error [503]: maintenance"
        );
    }

    #[tokio::test]
    async fn test_repeated_parameter_keeps_first_value() {
        let catalog = Arc::new(MockCatalog::default());
        let base = spawn(catalog.clone(), 10).await;

        let (status, _) = get(&format!(
            "{base}/cards/list?classes=Mage&classes=Warrior&manaCost=3&manaCost=7&rarity=Common"
        ))
        .await;
        assert_eq!(status, StatusCode::OK);

        let calls = catalog.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].classes, vec!["Mage".to_string()]);
        assert_eq!(calls[0].mana_min, 3);
    }

    #[tokio::test]
    async fn test_slow_catalog_times_out() {
        let catalog = Arc::new(MockCatalog {
            delay: Some(Duration::from_secs(3)),
            ..Default::default()
        });
        let mut config = test_config(10);
        config.timeout_secs = 1;
        let base = spawn_with_config(catalog, config).await;

        let (status, _) =
            get(&format!("{base}/cards/list?classes=Mage&manaCost=3&rarity=Common")).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_requests_are_logged() {
        capture_logs();
        let base = spawn(Arc::new(MockCatalog::default()), 10).await;

        let (status, _) = get(&format!("{base}/no-such-page?trace=1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let lines = captured_lines("GET /no-such-page ");
        assert!(!lines.is_empty(), "no request log line captured");

        // method, path without query, status, elapsed
        let fields: Vec<&str> = lines[0].split_whitespace().collect();
        assert_eq!(fields.len(), 4, "unexpected log line: {}", lines[0]);
        assert_eq!(fields[0], "GET");
        assert_eq!(fields[1], "/no-such-page");
        assert_eq!(fields[2], "404");
        assert!(fields[3].ends_with('s'), "unexpected elapsed: {}", fields[3]);
    }

    #[test]
    fn test_parse_limit() {
        let params = |limit: &str| HashMap::from([("limit".to_string(), limit.to_string())]);

        assert_eq!(parse_limit(&params("5")), Some(5));
        assert_eq!(parse_limit(&params("")), None);
        assert_eq!(parse_limit(&params("five")), None);
        assert_eq!(parse_limit(&HashMap::new()), None);
    }
}
