use std::sync::Arc;

use crate::error::{ AppError, Result };
use crate::models::Coin;
use crate::providers::CoinCatalog;

pub const MIN_SEARCH_LENGTH: usize = 2;
pub const MAX_SEARCH_RESULTS: usize = 20;

/// Searches the catalog and ranks the matches by relevance.
pub struct SearchService {
    catalog: Arc<dyn CoinCatalog>,
}

impl SearchService {
    pub fn new(catalog: Arc<dyn CoinCatalog>) -> Self {
        Self { catalog }
    }

    /// Search for coins by name or symbol.
    ///
    /// The query is trimmed and lower-cased first. Queries shorter than
    /// [`MIN_SEARCH_LENGTH`] are rejected without touching the catalog.
    pub async fn search(&self, raw_query: &str) -> Result<Vec<Coin>> {
        let query = normalize_query(raw_query);

        if query.chars().count() < MIN_SEARCH_LENGTH {
            return Err(
                AppError::InvalidInput(
                    format!("Search query must be at least {} characters", MIN_SEARCH_LENGTH)
                )
            );
        }

        let candidates = self.catalog.search_coins(&query).await?;
        let total = candidates.len();
        let ranked = rank_search_results(candidates, &query);

        tracing::debug!("Search '{}' ranked {} of {} candidates", query, ranked.len(), total);
        Ok(ranked)
    }
}

pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Order candidates by relevance to an already-normalized query, dropping
/// blank and irrelevant entries and keeping at most [`MAX_SEARCH_RESULTS`].
pub fn rank_search_results(coins: Vec<Coin>, query: &str) -> Vec<Coin> {
    let mut scored: Vec<(Coin, i32)> = coins
        .into_iter()
        .filter(|coin| !coin.name.trim().is_empty() && !coin.symbol.trim().is_empty())
        .map(|coin| {
            let score = relevance_score(&coin, query);
            (coin, score)
        })
        .filter(|(_, score)| *score > 0)
        .collect();

    // Stable, so equal scores keep catalog order
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    scored
        .into_iter()
        .take(MAX_SEARCH_RESULTS)
        .map(|(coin, _)| coin)
        .collect()
}

/// Additive relevance score. Every check is independent, so an exact symbol
/// match also collects the prefix and substring bonuses.
pub fn relevance_score(coin: &Coin, query: &str) -> i32 {
    let name = coin.name.to_lowercase();
    let symbol = coin.symbol.to_lowercase();

    let mut score = 0;

    if symbol == query {
        score += 100;
    }
    if name == query {
        score += 90;
    }
    if symbol.starts_with(query) {
        score += 80;
    }
    if name.starts_with(query) {
        score += 70;
    }
    if symbol.contains(query) {
        score += 40;
    }
    if name.contains(query) {
        score += 30;
    }

    score += match coin.market_cap_rank {
        Some(rank) if rank <= 10 => 20,
        Some(rank) if rank <= 50 => 10,
        Some(rank) if rank <= 100 => 5,
        _ => 0,
    };

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ coin, ranked, FakeCatalog };

    #[test]
    fn test_exact_symbol_match_dominates() {
        let input = vec![
            ranked("bitcoin-cash", "Bitcoin Cash", "BCH", 20),
            ranked("bitcoin", "Bitcoin", "BTC", 1)
        ];

        let names: Vec<String> = rank_search_results(input, "btc")
            .into_iter()
            .map(|c| c.name)
            .collect();

        assert_eq!(names, vec!["Bitcoin", "Bitcoin Cash"]);
    }

    #[test]
    fn test_scores_are_additive() {
        // equals + starts-with + contains on the symbol, plus top-10 boost
        let btc = ranked("bitcoin", "Bitcoin", "BTC", 1);
        assert_eq!(relevance_score(&btc, "btc"), 100 + 80 + 40 + 20);

        // name equals + starts-with + contains, no rank
        let eth = coin("ethereum", "Ethereum", "ETH");
        assert_eq!(relevance_score(&eth, "ethereum"), 90 + 70 + 30);

        assert_eq!(relevance_score(&coin("x", "Xyz", "XYZ"), "abc"), 0);
        assert_eq!(relevance_score(&ranked("x", "Xyz", "XYZ", 75), "abc"), 5);
        assert_eq!(relevance_score(&ranked("x", "Xyz", "XYZ", 101), "abc"), 0);
    }

    #[test]
    fn test_symbol_exact_outranks_symbol_prefix() {
        let input = vec![
            coin("prefix", "Something Else", "ETHX"),
            coin("exact", "Another", "ETH")
        ];

        let ids: Vec<String> = rank_search_results(input, "eth")
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["exact", "prefix"]);
    }

    #[test]
    fn test_drops_blank_and_irrelevant_candidates() {
        let input = vec![
            coin("blank-name", "  ", "DOGE"),
            coin("blank-symbol", "Dogecoin", ""),
            coin("unrelated", "Tether", "USDT"),
            coin("doge", "Dogecoin", "DOGE")
        ];

        let ids: Vec<String> = rank_search_results(input, "doge")
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["doge"]);
    }

    #[test]
    fn test_caps_results_and_keeps_arrival_order_on_ties() {
        let input: Vec<Coin> = (0..30)
            .map(|i| coin(&format!("coin-{}", i), &format!("Moon {}", i), &format!("MN{}", i)))
            .collect();

        let result = rank_search_results(input, "moon");
        assert_eq!(result.len(), MAX_SEARCH_RESULTS);
        assert_eq!(result[0].id, "coin-0");
        assert_eq!(result[19].id, "coin-19");
        assert!(result.iter().all(|c| relevance_score(c, "moon") > 0));
    }

    #[tokio::test]
    async fn test_short_query_never_reaches_catalog() {
        let catalog = Arc::new(FakeCatalog::default());
        let service = SearchService::new(catalog.clone());

        for query in ["", " ", "b", "  b  "] {
            let result = service.search(query).await;
            assert!(matches!(result, Err(AppError::InvalidInput(_))));
        }

        assert!(catalog.searched().is_empty());
    }

    #[tokio::test]
    async fn test_query_is_normalized_before_catalog_call() {
        let catalog = Arc::new(FakeCatalog {
            search_results: vec![ranked("bitcoin", "Bitcoin", "BTC", 1)],
            ..FakeCatalog::default()
        });
        let service = SearchService::new(catalog.clone());

        let result = service.search("  BiTcOiN  ").await.unwrap();

        assert_eq!(catalog.searched(), vec!["bitcoin"]);
        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_failure_propagates() {
        let catalog = Arc::new(FakeCatalog::default());
        catalog.set_failing(true);
        let service = SearchService::new(catalog);

        let result = service.search("eth").await;
        assert!(matches!(result, Err(AppError::Network(_))));
    }

    #[tokio::test]
    async fn test_no_match_is_empty_success() {
        let service = SearchService::new(Arc::new(FakeCatalog::default()));
        assert!(service.search("zzz").await.unwrap().is_empty());
    }
}
