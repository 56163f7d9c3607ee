//! Bahrain News Agency adapter
//!
//! Search goes through a JSON web service that returns rendered HTML
//! fragments; articles are plain HTML pages dated with Arabic solar month
//! names.

use crate::classify::Language;
use crate::dates::DateHint;
use crate::engine::{
    ArticleDraft, CandidateLink, CrawlTarget, ExtractError, ExtractResult, ResultPage,
    SearchCursor, SourceAdapter,
};
use crate::fetch::{HeaderProfile, RequestSpec};
use scraper::{Html, Selector};
use serde_json::json;

const SEARCH_ENDPOINT: &str = "https://www.bna.bh/bnaWebService.aspx/fnGetWebsiteSearchNew";
const PAGE_SIZE: u32 = 30;

pub struct BnaAdapter {
    target: CrawlTarget,
}

impl BnaAdapter {
    pub fn new(speakers: Vec<String>, accept_invalid_certs: bool) -> Self {
        Self {
            target: CrawlTarget {
                id: "bna".to_string(),
                domain: "https://www.bna.bh/".to_string(),
                country: "Bahrain".to_string(),
                speakers,
                language: Language::Arabic,
                accept_invalid_certs,
            },
        }
    }
}

impl SourceAdapter for BnaAdapter {
    fn target(&self) -> &CrawlTarget {
        &self.target
    }

    fn search_request(&self, cursor: &SearchCursor) -> RequestSpec {
        RequestSpec::post(SEARCH_ENDPOINT)
            .with_headers(HeaderProfile::JsonApi)
            .with_json(json!({
                "RowNumber": 0,
                "NewsKeyword": cursor.keyword,
                "RowNumberArchive": 0,
                "pageIndex": cursor.position,
                "pagesize": PAGE_SIZE.to_string(),
            }))
    }

    fn parse_result_page(&self, raw: &str, keyword: &str) -> ExtractResult<ResultPage> {
        // The service wraps a rendered HTML fragment in {"d": [html, ...]}
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| ExtractError(format!("search response was not JSON: {}", e)))?;
        let fragment = value
            .pointer("/d/0")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ExtractError::missing("search result fragment"))?;

        let document = Html::parse_fragment(fragment);
        let title_selector = Selector::parse("h2.title a").expect("bna title selector");

        let mut page = ResultPage::default();
        for anchor in document.select(&title_selector) {
            if let Some(href) = anchor.value().attr("href") {
                page.links.push(CandidateLink {
                    url: format!("{}{}", self.target.domain, href.trim_start_matches('/')),
                    published: None,
                    keyword: keyword.to_string(),
                });
            }
        }

        Ok(page)
    }

    fn parse_article(&self, raw: &str, _url: &str) -> ExtractResult<ArticleDraft> {
        let document = Html::parse_document(raw);

        let title_selector = Selector::parse("h1.h2.title").expect("bna article title selector");
        let title = document
            .select(&title_selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .ok_or_else(|| ExtractError::missing("article title"))?;

        // The article text is the last section on the page
        let section_selector = Selector::parse("section").expect("bna section selector");
        let body = document
            .select(&section_selector)
            .last()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .ok_or_else(|| ExtractError::missing("article body"))?;

        let date_selector = Selector::parse("dd.createdby").expect("bna date selector");
        let raw_date = document
            .select(&date_selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string());

        Ok(ArticleDraft {
            title,
            body,
            raw_date,
        })
    }

    fn date_hint(&self) -> DateHint {
        DateHint::ArabicText
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> BnaAdapter {
        BnaAdapter::new(vec!["حمد بن عيسى آل خليفة".to_string()], false)
    }

    #[test]
    fn test_search_request_shape() {
        let cursor = SearchCursor::new("غزة", 1, 1);
        let spec = adapter().search_request(&cursor);

        assert_eq!(spec.url, SEARCH_ENDPOINT);
        let body = spec.json.unwrap();
        assert_eq!(body["NewsKeyword"], "غزة");
        assert_eq!(body["pageIndex"], 1);
    }

    #[test]
    fn test_parse_result_page() {
        let fragment = r#"<div>
            <h2 class="title"><a href="news/123.html">خبر أول</a></h2>
            <h2 class="title"><a href="news/456.html">خبر ثان</a></h2>
        </div>"#;
        let raw = serde_json::to_string(&json!({ "d": [fragment] })).unwrap();

        let page = adapter().parse_result_page(&raw, "غزة").unwrap();
        assert_eq!(page.links.len(), 2);
        assert_eq!(page.links[0].url, "https://www.bna.bh/news/123.html");
        assert_eq!(page.links[0].keyword, "غزة");
        assert!(page.links[0].published.is_none());
    }

    #[test]
    fn test_parse_result_page_empty() {
        let raw = serde_json::to_string(&json!({ "d": ["<div></div>"] })).unwrap();
        let page = adapter().parse_result_page(&raw, "غزة").unwrap();
        assert!(page.links.is_empty());
    }

    #[test]
    fn test_parse_result_page_not_json() {
        assert!(adapter().parse_result_page("<html>", "غزة").is_err());
    }

    #[test]
    fn test_parse_article() {
        let html = r#"<html><body>
            <h1 class="h2 title">عنوان الخبر</h1>
            <dd class="createdby">15 يناير 2024</dd>
            <section>مقدمة</section>
            <section>نص الخبر الكامل هنا</section>
        </body></html>"#;

        let draft = adapter().parse_article(html, "https://www.bna.bh/news/123.html").unwrap();
        assert_eq!(draft.title, "عنوان الخبر");
        assert_eq!(draft.body, "نص الخبر الكامل هنا");
        assert_eq!(draft.raw_date.as_deref(), Some("15 يناير 2024"));
    }

    #[test]
    fn test_parse_article_missing_title() {
        let html = "<html><body><section>نص</section></body></html>";
        assert!(adapter().parse_article(html, "https://www.bna.bh/x").is_err());
    }
}
