use serde::Serialize;

use crate::{
    error::AppResult,
    models::CatalogItem,
    services::{
        providers::CatalogProvider,
        ranking::{rank, RankConfig, ScoredItem},
    },
};

/// Number of titles shown by the home page trending rows
pub const TRENDING_WIDGET_LIMIT: usize = 6;

/// Popular movies re-ordered by weighted rating
pub async fn trending_movies(
    provider: &dyn CatalogProvider,
    config: &RankConfig,
    limit: Option<usize>,
) -> AppResult<Vec<ScoredItem<CatalogItem>>> {
    let page = provider.popular_movies().await?;
    let ranked = rank(&page.results, config, limit);

    tracing::info!(
        fetched = page.results.len(),
        ranked = ranked.len(),
        limit = ?limit,
        provider = provider.name(),
        "Ranked trending movies"
    );

    Ok(ranked)
}

/// Popular TV series re-ordered by weighted rating
pub async fn trending_tv(
    provider: &dyn CatalogProvider,
    config: &RankConfig,
    limit: Option<usize>,
) -> AppResult<Vec<ScoredItem<CatalogItem>>> {
    let page = provider.popular_tv().await?;
    let ranked = rank(&page.results, config, limit);

    tracing::info!(
        fetched = page.results.len(),
        ranked = ranked.len(),
        limit = ?limit,
        provider = provider.name(),
        "Ranked trending series"
    );

    Ok(ranked)
}

/// The two trending rows on the home page
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HomeWidgets {
    pub trending_movies: Vec<ScoredItem<CatalogItem>>,
    pub trending_tv: Vec<ScoredItem<CatalogItem>>,
}

/// Both home rows, fetched concurrently and capped at `TRENDING_WIDGET_LIMIT`
pub async fn home_widgets(
    provider: &dyn CatalogProvider,
    config: &RankConfig,
) -> AppResult<HomeWidgets> {
    let (trending_movies, trending_tv) = tokio::try_join!(
        trending_movies(provider, config, Some(TRENDING_WIDGET_LIMIT)),
        trending_tv(provider, config, Some(TRENDING_WIDGET_LIMIT)),
    )?;

    Ok(HomeWidgets {
        trending_movies,
        trending_tv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, models::CatalogPage, services::providers::MockCatalogProvider};
    use serde_json::json;

    fn popular_page() -> CatalogPage<CatalogItem> {
        serde_json::from_value(json!({
            "page": 1,
            "results": [
                { "id": 1, "title": "Cult Hit", "vote_count": 60, "vote_average": 9.8, "popularity": 210.0 },
                { "id": 2, "title": "Blockbuster", "vote_count": 12000, "vote_average": 8.1, "popularity": 950.0 },
                { "id": 3, "title": "Obscure", "vote_count": 20, "vote_average": 9.9, "popularity": 600.0 },
                { "id": 4, "title": "Old Favourite", "vote_count": 30000, "vote_average": 8.6, "popularity": 150.0 },
                { "id": 5, "title": "Middling", "vote_count": 800, "vote_average": 6.2, "popularity": 300.0 }
            ],
            "total_pages": 1,
            "total_results": 5
        }))
        .unwrap()
    }

    fn mock_provider() -> MockCatalogProvider {
        let mut provider = MockCatalogProvider::new();
        provider.expect_name().return_const("mock");
        provider
    }

    #[tokio::test]
    async fn test_trending_movies_filters_and_orders() {
        let mut provider = mock_provider();
        provider
            .expect_popular_movies()
            .times(1)
            .returning(|| Ok(popular_page()));

        let ranked = trending_movies(&provider, &RankConfig::default(), None)
            .await
            .unwrap();

        let ids: Vec<u64> = ranked.iter().map(|s| s.item.id).collect();
        assert_eq!(ids, vec![2, 1, 5]);
    }

    #[tokio::test]
    async fn test_trending_tv_respects_limit() {
        let mut provider = mock_provider();
        provider
            .expect_popular_tv()
            .returning(|| Ok(popular_page()));

        let ranked = trending_tv(&provider, &RankConfig::default(), Some(1))
            .await
            .unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].item.id, 2);
    }

    #[tokio::test]
    async fn test_trending_propagates_provider_error() {
        let mut provider = mock_provider();
        provider
            .expect_popular_movies()
            .returning(|| Err(AppError::ExternalApi("down".to_string())));

        let result = trending_movies(&provider, &RankConfig::default(), None).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_home_widgets_capped_at_widget_limit() {
        let many: CatalogPage<CatalogItem> = serde_json::from_value(json!({
            "page": 1,
            "results": (1..=10)
                .map(|id| json!({
                    "id": id,
                    "name": format!("Show {}", id),
                    "vote_count": 100 * id,
                    "vote_average": 8.0,
                    "popularity": 400.0
                }))
                .collect::<Vec<_>>(),
            "total_pages": 1,
            "total_results": 10
        }))
        .unwrap();

        let mut provider = mock_provider();
        provider
            .expect_popular_movies()
            .returning(|| Ok(popular_page()));
        provider
            .expect_popular_tv()
            .returning(move || Ok(many.clone()));

        let home = home_widgets(&provider, &RankConfig::default()).await.unwrap();

        let movie_ids: Vec<u64> = home.trending_movies.iter().map(|s| s.item.id).collect();
        assert_eq!(movie_ids, vec![2, 1, 5]);

        let tv_ids: Vec<u64> = home.trending_tv.iter().map(|s| s.item.id).collect();
        assert_eq!(tv_ids.len(), TRENDING_WIDGET_LIMIT);
        assert_eq!(tv_ids, vec![10, 9, 8, 7, 6, 5]);
    }
}
