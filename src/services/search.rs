use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogPage, PersonSummary, SearchMediaType, SearchResult, TmdbId},
    services::providers::CatalogProvider,
};

/// Searches movies, series and people, filling in each person's department.
///
/// Person lookups run in parallel. A failed lookup is logged and the search
/// hit is returned as the catalog gave it.
pub async fn search_multi(
    provider: Arc<dyn CatalogProvider>,
    query: &str,
) -> AppResult<CatalogPage<SearchResult>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput("Missing query".to_string()));
    }

    let mut page = provider.search_multi(query).await?;
    let hits = std::mem::take(&mut page.results);
    let results = enrich_people(provider, hits).await;

    Ok(page.map_results(results))
}

async fn enrich_people(
    provider: Arc<dyn CatalogProvider>,
    results: Vec<SearchResult>,
) -> Vec<SearchResult> {
    let mut tasks = Vec::with_capacity(results.len());

    for result in results {
        if result.media_type != SearchMediaType::Person {
            tasks.push((None, result));
            continue;
        }

        let provider = provider.clone();
        let person_id = result.id;
        let task = tokio::spawn(async move { provider.person_details(person_id).await });
        tasks.push((Some(task), result));
    }

    let mut enriched = Vec::with_capacity(tasks.len());
    for (task, mut result) in tasks {
        if let Some(task) = task {
            match task.await {
                Ok(Ok(person)) => result.known_for_department = person.known_for_department,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, person_id = result.id, "Failed to fetch person details");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Task join error");
                }
            }
        }
        enriched.push(result);
    }

    enriched
}

/// Public summary of a person: id, name and main department
pub async fn person_summary(
    provider: &dyn CatalogProvider,
    person_id: TmdbId,
) -> AppResult<PersonSummary> {
    let person = provider.person_details(person_id).await?;
    Ok(person.into())
}
