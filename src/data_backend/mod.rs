pub mod feed_parser;

use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration, Utc};

use crate::cache::{Clock, MemoryCache};
use crate::constants::{CACHE_TTL_SECS, FETCH_TIMEOUT_SECS, MENSA_XML_URL_DE, MENSA_XML_URL_EN};
use crate::data_types::MealPlanDay;
use crate::errors::FeedError;

/// The two language variants of the upstream feed.
pub struct FeedUrls {
    pub german: String,
    pub english: String,
}

impl Default for FeedUrls {
    fn default() -> Self {
        Self {
            german: MENSA_XML_URL_DE.to_string(),
            english: MENSA_XML_URL_EN.to_string(),
        }
    }
}

/// Fetches, normalizes and caches the canteen meal plan.
///
/// Constructed once per process and shared across request handlers; the
/// cache lives inside instead of in module-level state so tests can run the
/// whole pipeline on a manual clock.
pub struct MealPlanService {
    client: reqwest::Client,
    cache: MemoryCache<Vec<MealPlanDay>>,
    urls: FeedUrls,
    clock: Clock,
}

impl MealPlanService {
    pub fn new(urls: FeedUrls) -> Self {
        Self::with_clock(urls, Arc::new(Utc::now))
    }

    pub fn with_clock(urls: FeedUrls, clock: Clock) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .expect("failed to build http client");

        Self {
            client,
            cache: MemoryCache::with_clock(Duration::seconds(CACHE_TTL_SECS), clock.clone()),
            urls,
            clock,
        }
    }

    /// Maps the `lang` query value to a feed URL.
    ///
    /// Absent and empty both fall back to German; everything that is not
    /// exactly "de" gets the English feed, garbage included. Intentionally
    /// kept that loose, callers only ever send "de" or "en".
    pub fn resolve_feed_url(&self, lang: Option<&str>) -> &str {
        match lang {
            None | Some("") | Some("de") => &self.urls.german,
            Some(_) => &self.urls.english,
        }
    }

    /// Returns the current plan, fetching the feed on cache miss.
    ///
    /// Two concurrent misses for the same URL both fetch and both write the
    /// cache. That costs a duplicate request once per TTL window at worst;
    /// the last writer wins and the values only differ by fetch timing.
    pub async fn get_meal_plan(&self, lang: Option<&str>) -> Result<Vec<MealPlanDay>, FeedError> {
        let url = self.resolve_feed_url(lang);

        if let Some(plan) = self.cache.get(url) {
            log::debug!("serving cached plan for {url}");
            return Ok(plan);
        }

        let now = Instant::now();
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        log::debug!("feed fetched in {:.2?}", now.elapsed());

        let plan = feed_parser::parse_plan_from_xml(&body, (self.clock)())?;
        self.cache.insert(url, plan.clone());

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::manual_clock;
    use chrono::DateTime;

    // nothing listens on these, so any cache miss shows up as a fetch error
    fn unroutable_urls() -> FeedUrls {
        FeedUrls {
            german: "http://127.0.0.1:1/de.xml".to_string(),
            english: "http://127.0.0.1:1/en.xml".to_string(),
        }
    }

    fn sample_plan() -> Vec<MealPlanDay> {
        vec![MealPlanDay {
            timestamp: "2023-11-14T22:13:20.000Z".to_string(),
            meals: Vec::new(),
        }]
    }

    #[test]
    fn only_exactly_de_resolves_to_the_german_feed() {
        let service = MealPlanService::new(FeedUrls::default());

        assert_eq!(service.resolve_feed_url(Some("de")), MENSA_XML_URL_DE);
        assert_eq!(service.resolve_feed_url(None), MENSA_XML_URL_DE);
        assert_eq!(service.resolve_feed_url(Some("")), MENSA_XML_URL_DE);

        assert_eq!(service.resolve_feed_url(Some("en")), MENSA_XML_URL_EN);
        assert_eq!(service.resolve_feed_url(Some("DE")), MENSA_XML_URL_EN);
        assert_eq!(service.resolve_feed_url(Some("fr")), MENSA_XML_URL_EN);
        assert_eq!(service.resolve_feed_url(Some("garbage")), MENSA_XML_URL_EN);
    }

    #[tokio::test]
    async fn fresh_cache_hit_skips_the_network() {
        let service = MealPlanService::new(unroutable_urls());
        service.cache.insert(&service.urls.german, sample_plan());

        let first = service.get_meal_plan(Some("de")).await.unwrap();
        let second = service.get_meal_plan(None).await.unwrap();

        assert_eq!(first, sample_plan());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn languages_are_cached_per_feed_url() {
        let service = MealPlanService::new(unroutable_urls());
        service.cache.insert(&service.urls.german, sample_plan());

        // German is cached, English misses and has to (fail to) fetch
        assert!(service.get_meal_plan(Some("de")).await.is_ok());
        assert!(service.get_meal_plan(Some("en")).await.is_err());
    }

    #[tokio::test]
    async fn expired_entry_triggers_a_new_fetch() {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let (clock, now) = manual_clock(start);
        let service = MealPlanService::with_clock(unroutable_urls(), clock);
        service.cache.insert(&service.urls.german, sample_plan());

        *now.write().unwrap() = start + Duration::seconds(CACHE_TTL_SECS - 1);
        assert!(service.get_meal_plan(None).await.is_ok());

        *now.write().unwrap() = start + Duration::seconds(CACHE_TTL_SECS);
        assert!(matches!(
            service.get_meal_plan(None).await,
            Err(FeedError::Fetch(_))
        ));
    }
}
