//! get_patch_notes：最新一期补丁说明全文
//!
//! 抓取补丁说明标签页，取第一篇精选文章链接，再抓取文章并提取 `patch-notes-container` 区块的纯文本。
//! 页面结构不符时返回固定提示文本。结果在进程生命周期内只抓取一次。

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use serde_json::Value;

use crate::config::SourcesSection;
use crate::core::{AgentError, OnceSlot};
use crate::tools::web::{build_client, get_text, html_to_text, truncate};
use crate::tools::{Tool, ToolName};

pub const NO_ARTICLE_LINK: &str = "No article link found.";
pub const PATCH_NOTES_NOT_FOUND: &str = "Patch notes not found.";

const FEATURED_CARD: &str = r#"a[data-testid="articlefeaturedcard-component"][href]"#;
const CONTAINER: &str = "#patch-notes-container";

/// 标签页中第一张精选文章卡片的链接（相对链接按页面地址补全）
pub fn find_article_link(html: &str, page_url: &str) -> Option<String> {
    let selector = Selector::parse(FEATURED_CARD).ok()?;
    let doc = Html::parse_document(html);
    let href = doc
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty())?;
    let url = Url::parse(page_url).ok()?.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

/// 文章页中补丁说明正文容器的内部 HTML
pub fn patch_notes_container(html: &str) -> Option<String> {
    let selector = Selector::parse(CONTAINER).ok()?;
    let doc = Html::parse_document(html);
    let container = doc.select(&selector).next()?;
    Some(container.inner_html())
}

/// 补丁说明数据源：持有 HTTP 客户端与单槽缓存
pub struct PatchNotesSource {
    client: Client,
    tag_url: String,
    max_chars: usize,
    cache: OnceSlot<String>,
}

impl PatchNotesSource {
    pub fn new(client: Client, tag_url: impl Into<String>, max_chars: usize) -> Self {
        Self {
            client,
            tag_url: tag_url.into(),
            max_chars,
            cache: OnceSlot::new(),
        }
    }

    pub fn from_config(cfg: &SourcesSection) -> Result<Self, AgentError> {
        Ok(Self::new(
            build_client(cfg.timeout_secs)?,
            cfg.patch_notes_url.clone(),
            cfg.max_result_chars,
        ))
    }

    /// 首次调用抓取并缓存；抓取失败不缓存
    pub async fn get(&self) -> Result<String, AgentError> {
        if self.cache.is_populated() {
            tracing::debug!("returning cached patch notes");
        }
        self.cache.get_or_fetch(|| self.fetch()).await.cloned()
    }

    async fn fetch(&self) -> Result<String, AgentError> {
        tracing::info!(url = %self.tag_url, "fetching patch notes index");
        let index = get_text(&self.client, &self.tag_url).await?;
        let Some(article_url) = find_article_link(&index, &self.tag_url) else {
            tracing::warn!(url = %self.tag_url, "no featured patch notes article");
            return Ok(NO_ARTICLE_LINK.to_string());
        };
        tracing::info!(url = %article_url, "fetching patch notes article");
        let article = get_text(&self.client, &article_url).await?;
        Ok(match patch_notes_container(&article) {
            Some(container) => truncate(html_to_text(&container), self.max_chars),
            None => PATCH_NOTES_NOT_FOUND.to_string(),
        })
    }
}

pub struct GetPatchNotesTool {
    source: Arc<PatchNotesSource>,
}

impl GetPatchNotesTool {
    pub fn new(source: Arc<PatchNotesSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for GetPatchNotesTool {
    fn name(&self) -> ToolName {
        ToolName::GetPatchNotes
    }

    fn description(&self) -> &str {
        "Fetch the authoritative full text of the latest Teamfight Tactics patch notes. Call this before any patch analysis. No arguments."
    }

    async fn execute(&self, _args: Value) -> Result<String, String> {
        self.source.get().await.map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAG_URL: &str = "https://www.leagueoflegends.com/en-us/news/tags/teamfight-tactics-patch-notes/";

    const TAG_PAGE: &str = r#"<html><body>
        <a href="/en-us/news/dev/" data-testid="articlecard">Dev blog</a>
        <a data-testid="articlefeaturedcard-component" class="card" href="/en-us/news/game-updates/tft-patch-15-2/">Patch 15.2</a>
        </body></html>"#;

    #[test]
    fn test_find_article_link_resolves_relative() {
        assert_eq!(
            find_article_link(TAG_PAGE, TAG_URL).as_deref(),
            Some("https://www.leagueoflegends.com/en-us/news/game-updates/tft-patch-15-2/")
        );
    }

    #[test]
    fn test_find_article_link_absolute_and_missing() {
        let html = r#"<a href="https://example.test/p" data-testid='articlefeaturedcard-component'>x</a>"#;
        assert_eq!(find_article_link(html, "https://a.test/x").as_deref(), Some("https://example.test/p"));
        assert!(find_article_link("<a href=\"/x\">x</a>", "https://a.test/").is_none());
    }

    #[test]
    fn test_find_article_link_with_angle_bracket_in_attribute() {
        let html = r#"<a aria-label="Patch 15.2 > notes" data-testid="articlefeaturedcard-component" href="/en-us/p/">Patch</a>"#;
        assert_eq!(
            find_article_link(html, TAG_URL).as_deref(),
            Some("https://www.leagueoflegends.com/en-us/p/")
        );
    }

    #[test]
    fn test_container_keeps_nested_markup() {
        let html = r#"<div class="page"><div id="patch-notes-container"><div><h3>Units</h3></div><p>Yasuo nerf</p></div><div>footer</div></div>"#;
        let inner = patch_notes_container(html).unwrap();
        assert!(inner.contains("Yasuo nerf"));
        assert!(inner.contains("<h3>Units</h3>"));
        assert!(!inner.contains("footer"));
        assert!(patch_notes_container("<div id=\"other\"></div>").is_none());
    }

    #[test]
    fn test_container_ignores_markup_inside_comments() {
        let html = r#"<div id="patch-notes-container"><!-- </div> --><p>Yasuo nerf</p></div>"#;
        let inner = patch_notes_container(html).unwrap();
        assert!(html_to_text(&inner).contains("Yasuo nerf"));
    }
}
