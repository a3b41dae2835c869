use once_cell::sync::Lazy;
use ratatui::prelude::*;
use ratatui::text::Line;
use regex::{Captures, Regex};
use unicode_width::UnicodeWidthStr;

use crate::store::EmojiMap;

static BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static PARAGRAPH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</p>\s*<p[^>]*>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"https?://[^\s<>"]+"#).unwrap());
static MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\w/@])(@[A-Za-z0-9_]+(?:@[A-Za-z0-9.\-]*[A-Za-z0-9])?)").unwrap()
});
static TAG_FACET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|[^\w/&#])(#\w+)").unwrap());
static EMOJI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r":([A-Za-z0-9_]+):").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    pub start: usize,
    pub end: usize,
    pub kind: FacetKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetKind {
    Mention(String),
    Link(String),
    Tag(String),
    Emoji(String),
}

/// Flattens Mastodon status HTML into plain text.
pub fn html_to_text(html: &str) -> String {
    let text = PARAGRAPH_RE.replace_all(html, "\n\n");
    let text = BREAK_RE.replace_all(&text, "\n");
    let text = TAG_RE.replace_all(&text, "");
    let text = ENTITY_RE.replace_all(&text, |caps: &Captures| decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string()));
    text.trim().to_string()
}

fn decode_entity(name: &str) -> Option<String> {
    let decoded = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)?
        }
    };
    Some(decoded.to_string())
}

/// Finds mentions, hashtags, links and known custom emoji in plain text.
/// Offsets are byte offsets; overlapping matches keep the earliest kind
/// found in the order links, mentions, tags, emoji.
pub fn detect_facets(text: &str, emojis: &EmojiMap) -> Vec<Facet> {
    let mut facets: Vec<Facet> = Vec::new();

    let push = |facets: &mut Vec<Facet>, start: usize, end: usize, kind: FacetKind| {
        if facets.iter().all(|f| end <= f.start || start >= f.end) {
            facets.push(Facet { start, end, kind });
        }
    };

    for m in LINK_RE.find_iter(text) {
        push(&mut facets, m.start(), m.end(), FacetKind::Link(m.as_str().to_string()));
    }
    for caps in MENTION_RE.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            push(&mut facets, m.start(), m.end(), FacetKind::Mention(m.as_str()[1..].to_string()));
        }
    }
    for caps in TAG_FACET_RE.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            push(&mut facets, m.start(), m.end(), FacetKind::Tag(m.as_str()[1..].to_string()));
        }
    }
    for caps in EMOJI_RE.captures_iter(text) {
        let (Some(whole), Some(code)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if emojis.contains_key(code.as_str()) {
            push(&mut facets, whole.start(), whole.end(), FacetKind::Emoji(code.as_str().to_string()));
        }
    }

    facets.sort_by_key(|f| f.start);
    facets
}

/// Count how many terminal rows `text` occupies when wrapped at `max_width` columns.
/// Uses Unicode display width so emoji and CJK characters are measured correctly.
pub fn wrapped_line_count(text: &str, max_width: u16) -> u16 {
    let max_width = max_width as usize;
    if max_width == 0 {
        return 1;
    }
    text.split('\n')
        .map(|line| {
            let w = UnicodeWidthStr::width(line);
            if w == 0 { 1 } else { ((w - 1) / max_width + 1) as u16 }
        })
        .sum()
}

pub fn styled_text<'a>(text: &str, facets: &[Facet], base: Style) -> Vec<Line<'a>> {
    if facets.is_empty() {
        return text
            .split('\n')
            .map(|l| Line::from(Span::styled(l.to_string(), base)))
            .collect();
    }

    let mut spans: Vec<Span<'a>> = Vec::new();
    let mut pos = 0;

    for facet in facets {
        let start = facet.start.min(text.len());
        let end = facet.end.min(text.len());

        if start > pos {
            if let Some(s) = text.get(pos..start) {
                spans.push(Span::styled(s.to_string(), base));
            }
        }

        if start < end {
            if let Some(s) = text.get(start..end) {
                let style = match &facet.kind {
                    FacetKind::Mention(_) => base.fg(Color::Cyan),
                    FacetKind::Link(_) => base.fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                    FacetKind::Tag(_) => base.fg(Color::Magenta),
                    FacetKind::Emoji(_) => base.fg(Color::Yellow),
                };
                spans.push(Span::styled(s.to_string(), style));
            }
        }

        pos = pos.max(end);
    }

    if pos < text.len() {
        if let Some(s) = text.get(pos..) {
            spans.push(Span::styled(s.to_string(), base));
        }
    }

    if spans.is_empty() {
        return vec![Line::from("")];
    }

    let mut lines: Vec<Line<'a>> = Vec::new();
    let mut current_spans: Vec<Span<'a>> = Vec::new();

    for span in spans {
        let style = span.style;
        let content = span.content.to_string();
        let mut parts = content.split('\n').peekable();

        while let Some(part) = parts.next() {
            if !part.is_empty() {
                current_spans.push(Span::styled(part.to_string(), style));
            }
            // newline inside the span: flush
            if parts.peek().is_some() {
                lines.push(Line::from(std::mem::take(&mut current_spans)));
            }
        }
    }

    lines.push(Line::from(current_spans));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_paragraphs_and_breaks() {
        let html = "<p>Hello<br>world</p><p>second &amp; last</p>";
        assert_eq!(html_to_text(html), "Hello\nworld\n\nsecond & last");
    }

    #[test]
    fn keeps_link_text_split_by_invisible_spans() {
        let html = r#"<p><a href="https://example.social/x"><span class="invisible">https://</span><span class="">example.social/x</span></a></p>"#;
        assert_eq!(html_to_text(html), "https://example.social/x");
    }

    #[test]
    fn decodes_numeric_entities() {
        assert_eq!(html_to_text("it&#39;s &#x263A;"), "it's \u{263A}");
        assert_eq!(html_to_text("&bogus;"), "&bogus;");
    }

    #[test]
    fn detects_each_facet_kind() {
        let mut emojis = EmojiMap::new();
        emojis.insert("blobcat".into(), "https://example.social/blobcat.png".into());
        let text = "@alice@example.social look #rust https://example.social/a :blobcat: :nope:";
        let facets = detect_facets(text, &emojis);
        let kinds: Vec<&FacetKind> = facets.iter().map(|f| &f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &FacetKind::Mention("alice@example.social".into()),
                &FacetKind::Tag("rust".into()),
                &FacetKind::Link("https://example.social/a".into()),
                &FacetKind::Emoji("blobcat".into()),
            ]
        );
        assert_eq!(&text[facets[0].start..facets[0].end], "@alice@example.social");
    }

    #[test]
    fn url_fragments_are_not_tags() {
        let facets = detect_facets("see https://example.social/#anchor", &EmojiMap::new());
        assert_eq!(facets.len(), 1);
        assert!(matches!(facets[0].kind, FacetKind::Link(_)));
    }

    #[test]
    fn styled_text_splits_lines() {
        let text = "hi @bob\nbye";
        let facets = detect_facets(text, &EmojiMap::new());
        let lines = styled_text(text, &facets, Style::default());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans.len(), 2);
    }

    #[test]
    fn wrapped_line_count_measures_cjk_width() {
        assert_eq!(wrapped_line_count("显示前文", 4), 2);
        assert_eq!(wrapped_line_count("a\n\nb", 10), 3);
    }
}
