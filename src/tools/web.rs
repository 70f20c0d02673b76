//! 外部数据源的 HTTP 抓取公共部分：客户端、HTML 转文本、结果截断
//!
//! GET 请求带超时与 User-Agent；结果超过 max_result_chars 时截断并追加 ...[truncated]。

use std::time::Duration;

use html2text::from_read;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;

use crate::core::AgentError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// 带超时与浏览器 UA 的客户端
pub fn build_client(timeout_secs: u64) -> Result<Client, AgentError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()?)
}

/// GET 并返回正文；非 2xx 为 Fetch 错误
pub async fn get_text(client: &Client, url: &str) -> Result<String, AgentError> {
    let resp = client.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(AgentError::Fetch(format!("{url}: HTTP {}", resp.status())));
    }
    let body = resp
        .text()
        .await
        .map_err(|e| AgentError::Fetch(format!("{url}: read body: {e}")))?;
    Ok(body.trim_start_matches('\u{FEFF}').to_string())
}

/// 简易去除 HTML 标签（html2text 失败时的回退）
fn strip_html_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// HTML 片段转为按行排列的纯文本，去掉空行
pub fn html_to_text(html: &str) -> String {
    let text = match from_read(html.as_bytes(), 120) {
        Ok(text) if !text.trim().is_empty() => text,
        _ => strip_html_tags(html),
    };
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn truncate(body: String, max_chars: usize) -> String {
    if body.chars().count() > max_chars {
        body.chars().take(max_chars).collect::<String>() + "\n...[truncated]"
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_drops_blank_lines() {
        let text = html_to_text("<div><h2>Units</h2><p>Yasuo: AD 60 &rarr; 55</p><p></p></div>");
        assert!(text.contains("Units"));
        assert!(text.contains("Yasuo: AD 60"));
        assert!(!text.contains("\n\n"));
    }

    #[test]
    fn test_strip_tags_fallback() {
        assert_eq!(strip_html_tags("<b>Garen</b>\n<i>tank</i>"), "Garen\ntank");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef".into(), 10), "abcdef");
        assert_eq!(truncate("abcdef".into(), 3), "abc\n...[truncated]");
    }
}
