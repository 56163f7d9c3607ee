//! Saudi Press Agency adapter
//!
//! Search goes through the portal JSON API with a row-offset cursor; the
//! result list already carries epoch-second publish dates, so stale pages
//! terminate before any article fetch. The agency wires statements from
//! several speakers, so this is a multi-speaker target.

use crate::classify::Language;
use crate::dates::DateHint;
use crate::engine::{
    ArticleDraft, CandidateLink, CrawlTarget, ExtractError, ExtractResult, ResultPage,
    SearchCursor, SourceAdapter,
};
use crate::fetch::{HeaderProfile, RequestSpec};
use chrono::DateTime;
use scraper::{Html, Selector};

const SEARCH_ENDPOINT: &str = "https://portalapi.spa.gov.sa/api/v1/news/search";
const ROWS_PER_PAGE: u32 = 10;

pub struct SpaAdapter {
    target: CrawlTarget,
}

impl SpaAdapter {
    pub fn new(speakers: Vec<String>, accept_invalid_certs: bool) -> Self {
        Self {
            target: CrawlTarget {
                id: "spa".to_string(),
                domain: "https://www.spa.gov.sa/".to_string(),
                country: "Saudi Arabia".to_string(),
                speakers,
                language: Language::Arabic,
                accept_invalid_certs,
            },
        }
    }
}

impl SourceAdapter for SpaAdapter {
    fn target(&self) -> &CrawlTarget {
        &self.target
    }

    fn search_request(&self, cursor: &SearchCursor) -> RequestSpec {
        RequestSpec::get(SEARCH_ENDPOINT)
            .with_headers(HeaderProfile::SearchReferer)
            .with_query("title", &cursor.keyword)
            .with_query("exact_search", 1)
            .with_query("by_latest", 1)
            .with_query("start", cursor.position)
            .with_query("rows", ROWS_PER_PAGE)
            .with_query("l", "ar")
    }

    fn parse_result_page(&self, raw: &str, keyword: &str) -> ExtractResult<ResultPage> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| ExtractError(format!("search response was not JSON: {}", e)))?;
        let items = value
            .get("data")
            .and_then(|v| v.as_array())
            .ok_or_else(|| ExtractError::missing("data array"))?;

        let mut page = ResultPage::default();
        for item in items {
            let uuid = item
                .get("uuid")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ExtractError::missing("item uuid"))?;

            // Items without a timestamp are unverifiable; the normalizer's
            // fail-safe handles them downstream
            let published = item
                .get("published_at")
                .and_then(|v| v.as_i64())
                .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
                .map(|dt| dt.date_naive());

            page.links.push(CandidateLink {
                url: format!("{}{}", self.target.domain, uuid),
                published,
                keyword: keyword.to_string(),
            });
        }

        Ok(page)
    }

    fn parse_article(&self, raw: &str, _url: &str) -> ExtractResult<ArticleDraft> {
        let document = Html::parse_document(raw);

        let title_selector = Selector::parse("h1").expect("spa title selector");
        let title = document
            .select(&title_selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .ok_or_else(|| ExtractError::missing("article title"))?;

        let content_selector =
            Selector::parse("div.article-content, div.news-content").expect("spa body selector");
        let body = match document.select(&content_selector).next() {
            Some(element) => element.text().collect::<String>().trim().to_string(),
            None => {
                // Fall back to joining paragraph text
                let paragraph_selector = Selector::parse("p").expect("spa paragraph selector");
                document
                    .select(&paragraph_selector)
                    .map(|p| p.text().collect::<String>())
                    .collect::<Vec<_>>()
                    .join(" ")
                    .trim()
                    .to_string()
            }
        };

        if body.is_empty() {
            return Err(ExtractError::missing("article body"));
        }

        Ok(ArticleDraft {
            title,
            body,
            raw_date: None,
        })
    }

    fn step(&self) -> u64 {
        ROWS_PER_PAGE as u64
    }

    fn date_hint(&self) -> DateHint {
        DateHint::EpochSeconds
    }
}
