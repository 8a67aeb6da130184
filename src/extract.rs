//! Heuristic extraction of the main textual body from an article page.
//!
//! No readability model, just the cascade that works for most news sites:
//! the article container, then the main container, then the largest
//! "content"/"article"-classed block, then a paragraph sweep.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

/// A strategy result shorter than this is not trusted and the next
/// strategy is tried.
const MIN_STRATEGY_CHARS: usize = 100;
/// Extracted bodies shorter than this are useless for summarization.
const MIN_BODY_CHARS: usize = 50;
const MAX_BODY_CHARS: usize = 8000;
const MIN_PARAGRAPH_CHARS: usize = 40;
const MAX_PARAGRAPHS: usize = 10;

const STRIP_TAGS: &[&str] = &["script", "style", "header", "footer", "nav", "aside"];

static ARTICLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article").expect("static selector"));
static MAIN: Lazy<Selector> = Lazy::new(|| Selector::parse("main").expect("static selector"));
static CLASSED_DIV: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div[class]").expect("static selector"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("static selector"));

/// Extract the main body text from an HTML document. Returns an empty
/// string when nothing usable is found.
pub fn extract_body(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut content = document
        .select(&ARTICLE)
        .next()
        .map(|el| element_text(el))
        .unwrap_or_default();

    if char_len(&content) < MIN_STRATEGY_CHARS {
        if let Some(main) = document.select(&MAIN).next() {
            content = element_text(main);
        }
    }

    if char_len(&content) < MIN_STRATEGY_CHARS {
        for div in document.select(&CLASSED_DIV) {
            let class = div.value().attr("class").unwrap_or("").to_lowercase();
            if class.contains("content") || class.contains("article") {
                let text = element_text(div);
                if char_len(&text) > char_len(&content) {
                    content = text;
                }
            }
        }
    }

    if char_len(&content) < MIN_STRATEGY_CHARS {
        let paragraphs: Vec<String> = document
            .select(&PARAGRAPH)
            .map(|p| element_text(p))
            .filter(|text| char_len(text) > MIN_PARAGRAPH_CHARS)
            .take(MAX_PARAGRAPHS)
            .collect();
        if !paragraphs.is_empty() {
            content = paragraphs.join(" ");
        }
    }

    let content = collapse_whitespace(&content);
    if char_len(&content) < MIN_BODY_CHARS {
        return String::new();
    }

    content.chars().take(MAX_BODY_CHARS).collect()
}

/// Text of an element, skipping script/style/chrome subtrees.
fn element_text(element: ElementRef) -> String {
    let mut out = String::new();
    collect_text(*element, &mut out);
    collapse_whitespace(&out)
}

fn collect_text(node: ego_tree::NodeRef<'_, scraper::Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            scraper::Node::Text(text) => {
                out.push_str(&text.text);
                out.push(' ');
            }
            scraper::Node::Element(element) => {
                if !STRIP_TAGS.contains(&element.name()) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// All thresholds in this module count characters, not bytes; non-ASCII
/// text is several bytes per character.
fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_text(prefix: &str) -> String {
        format!(
            "{} artificial intelligence systems continue to improve across every benchmark \
             that researchers publish, and newsrooms keep covering each release in detail.",
            prefix
        )
    }

    #[test]
    fn test_article_tag_wins() {
        let html = format!(
            "<html><body><nav>menu menu menu</nav><article><p>{}</p></article>\
             <div class=\"content\">{}</div></body></html>",
            long_text("From the article tag."),
            long_text("From the content div.")
        );
        let body = extract_body(&html);
        assert!(body.starts_with("From the article tag."));
        assert!(!body.contains("From the content div."));
    }

    #[test]
    fn test_content_class_fallback_keeps_longest() {
        let short = "Too short to win.";
        let html = format!(
            "<html><body><div class=\"article-body\">{}</div>\
             <div class=\"main-content\">{} {}</div></body></html>",
            short,
            long_text("Longest block."),
            long_text("It keeps going.")
        );
        let body = extract_body(&html);
        assert!(body.starts_with("Longest block."));
    }

    #[test]
    fn test_paragraph_fallback() {
        let html = format!(
            "<html><body><p>tiny</p><p>{}</p><p>{}</p></body></html>",
            long_text("First real paragraph."),
            long_text("Second real paragraph.")
        );
        let body = extract_body(&html);
        assert!(body.contains("First real paragraph."));
        assert!(body.contains("Second real paragraph."));
        assert!(!body.contains("tiny"));
    }

    #[test]
    fn test_chrome_elements_are_stripped() {
        let html = format!(
            "<html><body><article><script>var x = 1;</script>\
             <aside>related links</aside><p>{}</p></article></body></html>",
            long_text("Visible body.")
        );
        let body = extract_body(&html);
        assert!(!body.contains("var x"));
        assert!(!body.contains("related links"));
        assert!(body.contains("Visible body."));
    }

    #[test]
    fn test_short_content_is_discarded() {
        let html = "<html><body><article>Just a stub.</article></body></html>";
        assert_eq!(extract_body(html), "");
    }

    #[test]
    fn test_short_non_ascii_content_is_discarded() {
        // 30 characters but ~90 bytes; the floor counts characters.
        let html = "<html><body><article>인공지능 모델이 새로운 기록을 세웠다는 소식이 전해졌다</article></body></html>";
        assert_eq!(extract_body(html), "");
    }

    #[test]
    fn test_non_ascii_body_passes_character_floor() {
        let sentence = "인공지능 모델이 새로운 벤치마크에서 최고 기록을 세웠다고 연구진이 발표했다. ";
        let html = format!(
            "<html><body><article>{}</article></body></html>",
            sentence.repeat(4)
        );
        let body = extract_body(&html);
        assert!(body.starts_with("인공지능 모델이"));
    }

    #[test]
    fn test_text_collected_through_nested_markup() {
        let html = format!(
            "<html><body><article><p>Intro <em>with</em> <a href=\"/x\">nested <b>inline</b></a> markup. {}</p></article></body></html>",
            long_text("Rest of the piece.")
        );
        let body = extract_body(&html);
        assert!(body.starts_with("Intro with nested inline markup."));
    }

    #[test]
    fn test_whitespace_collapses() {
        let html = format!(
            "<html><body><article><p>{}</p>\n\n\t<p>{}</p></article></body></html>",
            long_text("One."),
            long_text("Two.")
        );
        let body = extract_body(&html);
        assert!(!body.contains("\n"));
        assert!(!body.contains("  "));
    }

    #[test]
    fn test_body_is_truncated() {
        let paragraph = long_text("Filler.").repeat(100);
        let html = format!("<html><body><article>{}</article></body></html>", paragraph);
        assert!(extract_body(&html).chars().count() <= 8000);
    }
}
