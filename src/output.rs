//! Rendering of a finished run as console text, JSON, or Markdown.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::NewsItem;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => anyhow::bail!("unknown output format: {}", other),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Console => write!(f, "console"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Render items in the requested format.
pub fn render(items: &[NewsItem], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(render_console(items)),
        OutputFormat::Json => serde_json::to_string_pretty(items)
            .context("failed to serialize items as JSON"),
        OutputFormat::Markdown => Ok(render_markdown(items)),
    }
}

/// Write rendered output to a file, creating parent directories as needed.
pub fn write_to_file(path: &Path, rendered: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))
}

fn render_console(items: &[NewsItem]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "AI News Digest - {} items - {}\n",
        items.len(),
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));
    out.push_str(&"=".repeat(72));
    out.push('\n');

    for (idx, item) in items.iter().enumerate() {
        out.push_str(&format!("\n{}. {}\n", idx + 1, item.title));
        out.push_str(&format!("   Source: {} ({})\n", item.source_name, item.feed_name));
        if let Some(published) = &item.published {
            out.push_str(&format!("   Published: {}\n", published));
        }
        out.push_str(&format!("   Link: {}\n", item.original_link));
        if !item.condensed_summary.is_empty() {
            out.push_str(&format!("   {}\n", item.condensed_summary));
        }
    }

    if items.is_empty() {
        out.push_str("\nNo items to report.\n");
    }

    out
}

fn render_markdown(items: &[NewsItem]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# AI News Digest\n\n_{} items, generated {}_\n",
        items.len(),
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));

    for item in items {
        out.push_str(&format!("\n## [{}]({})\n\n", item.title, item.original_link));
        out.push_str(&format!("**{}**", item.source_name));
        if let Some(published) = &item.published {
            out.push_str(&format!(" · {}", published));
        }
        out.push('\n');
        if !item.condensed_summary.is_empty() {
            out.push_str(&format!("\n{}\n", item.condensed_summary));
        }
    }

    if items.is_empty() {
        out.push_str("\nNo items to report.\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> NewsItem {
        NewsItem {
            title: "OpenAI releases new model".to_string(),
            original_link: "https://openai.com/blog/new-model".to_string(),
            source_name: "OpenAI".to_string(),
            published: Some("Mon, 01 Jan 2024 00:00:00 GMT".to_string()),
            published_at: None,
            feed_name: "OpenAI Blog".to_string(),
            summary: "A new model.".to_string(),
            condensed_summary: "OpenAI shipped a new model.".to_string(),
            relevance_score: 0.6,
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!(
            "console".parse::<OutputFormat>().unwrap(),
            OutputFormat::Console
        );
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_console_render() {
        let out = render(&[sample_item()], OutputFormat::Console).unwrap();
        assert!(out.contains("1. OpenAI releases new model"));
        assert!(out.contains("Source: OpenAI (OpenAI Blog)"));
        assert!(out.contains("https://openai.com/blog/new-model"));
    }

    #[test]
    fn test_json_render_round_trips() {
        let out = render(&[sample_item()], OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["title"], "OpenAI releases new model");
        assert_eq!(parsed[0]["relevance_score"], 0.6);
    }

    #[test]
    fn test_markdown_render() {
        let out = render(&[sample_item()], OutputFormat::Markdown).unwrap();
        assert!(out.contains("## [OpenAI releases new model](https://openai.com/blog/new-model)"));
        assert!(out.contains("**OpenAI**"));
    }

    #[test]
    fn test_empty_run_renders_placeholder() {
        let out = render(&[], OutputFormat::Console).unwrap();
        assert!(out.contains("No items to report."));
    }

    #[test]
    fn test_write_to_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("digest.md");
        write_to_file(&path, "# Digest\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Digest\n");
    }
}
