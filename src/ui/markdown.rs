//! Comment body rendering.
//!
//! Code hosts deliver review comment bodies as rendered HTML. This module
//! turns that HTML into wrapped terminal lines and picks out links to other
//! issues and pull requests so the viewer can navigate to them.

use std::fmt;

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// `owner/repo#number`, for either an issue or a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueishRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl IssueishRef {
    /// Accepts `https://<host>/<owner>/<repo>/(issues|pull)/<number>[/...][#...]`.
    pub fn from_url(url: &str) -> Option<Self> {
        let stripped = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))?;
        let path = stripped.split(['#', '?']).next().unwrap_or(stripped);

        let parts: Vec<&str> = path.split('/').collect();
        // host, owner, repo, kind, number
        if parts.len() < 5 || !matches!(parts[3], "issues" | "pull") {
            return None;
        }

        let number = parts[4].parse::<u64>().ok().filter(|n| *n > 0)?;
        let (owner, repo) = (parts[1], parts[2]);
        if owner.is_empty() || repo.is_empty() {
            return None;
        }

        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        })
    }
}

impl fmt::Display for IssueishRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Application-level navigation to another issue or pull request.
pub trait IssueishNavigator {
    fn switch_to_issueish(&self, target: &IssueishRef);
}

impl<F> IssueishNavigator for F
where
    F: Fn(&IssueishRef),
{
    fn switch_to_issueish(&self, target: &IssueishRef) {
        self(target)
    }
}

/// Renders a comment body. The navigator is handed through untouched so the
/// rendered body can follow cross-references.
pub trait MarkdownRenderer {
    fn render<'n>(
        &self,
        html: &str,
        navigator: &'n dyn IssueishNavigator,
        theme: &Theme,
        width: usize,
    ) -> RenderedBody<'n>;
}

pub struct RenderedBody<'n> {
    pub lines: Vec<Line<'static>>,
    /// Issue and pull request references in document order
    pub links: Vec<IssueishRef>,
    navigator: &'n dyn IssueishNavigator,
}

impl<'n> RenderedBody<'n> {
    pub fn new(
        lines: Vec<Line<'static>>,
        links: Vec<IssueishRef>,
        navigator: &'n dyn IssueishNavigator,
    ) -> Self {
        Self {
            lines,
            links,
            navigator,
        }
    }

    /// Navigates to the `index`th reference. Returns false if there is none.
    pub fn follow(&self, index: usize) -> bool {
        match self.links.get(index) {
            Some(target) => {
                self.navigator.switch_to_issueish(target);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for RenderedBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedBody")
            .field("lines", &self.lines)
            .field("links", &self.links)
            .finish_non_exhaustive()
    }
}

/// Default renderer for GitHub-style `bodyHTML`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlBodyRenderer;

impl MarkdownRenderer for HtmlBodyRenderer {
    fn render<'n>(
        &self,
        html: &str,
        navigator: &'n dyn IssueishNavigator,
        theme: &Theme,
        width: usize,
    ) -> RenderedBody<'n> {
        let text = html_to_text(html);
        let text_style = Style::default().fg(theme.fg_primary);
        let link_style = Style::default()
            .fg(theme.comment_link)
            .add_modifier(Modifier::UNDERLINED);

        let lines = text
            .lines
            .iter()
            .flat_map(|segments| {
                let styled: Vec<(&str, Style)> = segments
                    .iter()
                    .map(|s| (s.text.as_str(), if s.link { link_style } else { text_style }))
                    .collect();
                wrap_segments(&styled, width)
            })
            .collect();

        RenderedBody::new(lines, text.links, navigator)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    text: String,
    link: bool,
}

#[derive(Debug, Default)]
struct HtmlText {
    lines: Vec<Vec<Segment>>,
    links: Vec<IssueishRef>,
}

impl HtmlText {
    fn current(&mut self) -> &mut Vec<Segment> {
        if self.lines.is_empty() {
            self.lines.push(Vec::new());
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    fn current_is_empty(&self) -> bool {
        self.lines
            .last()
            .is_none_or(|l| l.iter().all(|s| s.text.is_empty()))
    }

    fn new_line(&mut self) {
        self.lines.push(Vec::new());
    }

    /// Starts a new line unless the current one is still empty.
    fn break_line(&mut self) {
        if !self.current_is_empty() {
            self.new_line();
        }
    }

    fn push(&mut self, text: &str, link: bool) {
        if text.is_empty() {
            return;
        }
        let line = self.current();
        match line.last_mut() {
            Some(last) if last.link == link => last.text.push_str(text),
            _ => line.push(Segment {
                text: text.to_string(),
                link,
            }),
        }
    }

    fn push_text(&mut self, raw: &str, link: bool, preformatted: bool) {
        let decoded = decode_entities(raw);
        if preformatted {
            for (i, part) in decoded.split('\n').enumerate() {
                if i > 0 {
                    self.new_line();
                }
                self.push(part, link);
            }
            return;
        }

        let mut collapsed = String::with_capacity(decoded.len());
        let mut last_space = self.current_is_empty()
            || self
                .lines
                .last()
                .and_then(|l| l.last())
                .is_some_and(|s| s.text.ends_with(' '));
        for ch in decoded.chars() {
            if ch.is_whitespace() {
                if !last_space {
                    collapsed.push(' ');
                    last_space = true;
                }
            } else {
                collapsed.push(ch);
                last_space = false;
            }
        }
        self.push(&collapsed, link);
    }

    fn finish(mut self) -> Self {
        for line in &mut self.lines {
            if let Some(last) = line.last_mut() {
                let trimmed = last.text.trim_end().len();
                last.text.truncate(trimmed);
            }
            line.retain(|s| !s.text.is_empty());
        }

        // Collapse blank runs and trim blank lines at both ends
        let mut lines: Vec<Vec<Segment>> = Vec::with_capacity(self.lines.len());
        for line in self.lines {
            let blank = line.is_empty();
            if blank && lines.last().is_none_or(|l| l.is_empty()) {
                continue;
            }
            lines.push(line);
        }
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        Self {
            lines,
            links: self.links,
        }
    }
}

struct Tag<'a> {
    name: String,
    closing: bool,
    raw: &'a str,
}

impl<'a> Tag<'a> {
    fn parse(raw: &'a str) -> Self {
        let trimmed = raw.trim();
        let (closing, body) = match trimmed.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let name = body
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        Self { name, closing, raw }
    }

    fn attr(&self, key: &str) -> Option<String> {
        let needle = format!("{key}=\"");
        let mut search = self.raw;
        while let Some(idx) = search.find(&needle) {
            let preceded_by_space = idx == 0
                || search[..idx]
                    .chars()
                    .next_back()
                    .is_some_and(char::is_whitespace);
            let value_start = idx + needle.len();
            if preceded_by_space {
                let value = &search[value_start..];
                let end = value.find('"')?;
                return Some(decode_entities(&value[..end]));
            }
            search = &search[value_start..];
        }
        None
    }
}

fn is_block_tag(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "li"
            | "ul"
            | "ol"
            | "pre"
            | "blockquote"
            | "table"
            | "tr"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "details"
            | "summary"
    )
}

fn html_to_text(html: &str) -> HtmlText {
    let mut out = HtmlText::default();
    let mut in_link = false;
    let mut pre_depth = 0usize;
    let mut rest = html;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('<') {
            let Some(end) = after.find('>') else {
                out.push_text(rest, in_link, pre_depth > 0);
                break;
            };
            let tag = Tag::parse(&after[..end]);
            rest = &after[end + 1..];

            match tag.name.as_str() {
                "br" => out.new_line(),
                "a" if tag.closing => in_link = false,
                "a" => {
                    let target = tag
                        .attr("data-url")
                        .and_then(|url| IssueishRef::from_url(&url))
                        .or_else(|| tag.attr("href").and_then(|url| IssueishRef::from_url(&url)));
                    if let Some(target) = target {
                        out.links.push(target);
                        in_link = true;
                    }
                }
                name if is_block_tag(name) => {
                    if name == "pre" {
                        pre_depth = if tag.closing {
                            pre_depth.saturating_sub(1)
                        } else {
                            pre_depth + 1
                        };
                    }
                    out.break_line();
                    if tag.closing && matches!(name, "p" | "pre" | "blockquote" | "ul" | "ol") {
                        out.new_line();
                    }
                    if !tag.closing && name == "li" {
                        out.push("• ", false);
                    }
                }
                _ => {}
            }
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            out.push_text(&rest[..end], in_link, pre_depth > 0);
            rest = &rest[end..];
        }
    }

    out.finish()
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Word-wraps styled text to `width` columns. Words wider than the line are
/// left for the terminal to clip.
pub fn wrap_segments(segments: &[(&str, Style)], width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0usize;

    for (text, style) in segments {
        for word in text.split_inclusive(' ') {
            let word_width = word.trim_end().width();
            if current_width > 0 && current_width + word_width > width {
                lines.push(Line::from(std::mem::take(&mut current)));
                current_width = 0;
            }
            // Leading indentation survives only on the first visual line
            let word = if current_width == 0 && !lines.is_empty() {
                word.trim_start()
            } else {
                word
            };
            if word.is_empty() {
                continue;
            }
            current_width += word.width();
            current.push(Span::styled(word.to_string(), *style));
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(Line::from(current));
    }
    lines
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    fn render(html: &str, width: usize) -> Vec<String> {
        let navigator = |_: &IssueishRef| {};
        let body = HtmlBodyRenderer.render(html, &navigator, &Theme::default(), width);
        plain(&body.lines)
    }

    #[test]
    fn should_parse_issue_and_pull_urls() {
        assert_eq!(
            IssueishRef::from_url("https://github.com/atom/github/pull/1234#issuecomment-1"),
            Some(IssueishRef {
                owner: "atom".to_string(),
                repo: "github".to_string(),
                number: 1234,
            })
        );
        assert_eq!(
            IssueishRef::from_url("https://ghe.example.com/org/repo/issues/7")
                .map(|r| r.to_string()),
            Some("org/repo#7".to_string())
        );
    }

    #[test]
    fn should_reject_non_issueish_urls() {
        assert_eq!(IssueishRef::from_url("https://github.com/atom/github"), None);
        assert_eq!(IssueishRef::from_url("https://github.com/atom/github/commit/abc"), None);
        assert_eq!(IssueishRef::from_url("https://github.com/atom/github/pull/0"), None);
        assert_eq!(IssueishRef::from_url("mailto:someone@example.com"), None);
    }

    #[test]
    fn should_strip_tags_and_collapse_whitespace() {
        assert_eq!(render("<div> yo   yo </div>", 80), vec!["yo yo"]);
    }

    #[test]
    fn should_break_paragraphs_and_list_items() {
        let lines = render("<p>first</p><p>second<br>third</p><ul><li>one</li><li>two</li></ul>", 80);
        assert_eq!(lines, vec!["first", "", "second", "third", "", "• one", "• two"]);
    }

    #[test]
    fn should_decode_entities() {
        assert_eq!(
            render("<p>a &lt;b&gt; &amp;&amp; &quot;c&quot; it&#39;s</p>", 80),
            vec!["a <b> && \"c\" it's"]
        );
    }

    #[test]
    fn should_preserve_preformatted_lines() {
        let lines = render("<pre><code>fn main() {\n    run();\n}</code></pre>", 80);
        assert_eq!(lines, vec!["fn main() {", "    run();", "}"]);
    }

    #[test]
    fn should_wrap_to_width() {
        let lines = render("<p>one two three four</p>", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn should_collect_issueish_links_and_style_them() {
        let html = r#"<p>see <a class="issue-link" data-url="https://github.com/atom/github/issues/12" href="https://github.com/atom/github/issues/12">#12</a> and <a href="https://example.com">docs</a></p>"#;
        let navigator = |_: &IssueishRef| {};
        let theme = Theme::default();

        let body = HtmlBodyRenderer.render(html, &navigator, &theme, 80);

        assert_eq!(plain(&body.lines), vec!["see #12 and docs"]);
        assert_eq!(body.links.len(), 1);
        assert_eq!(body.links[0].to_string(), "atom/github#12");
        let link_span = body.lines[0]
            .spans
            .iter()
            .find(|s| s.content.contains("#12"))
            .unwrap();
        assert_eq!(link_span.style.fg, Some(theme.comment_link));
    }

    #[test]
    fn follow_invokes_the_forwarded_navigator() {
        let visited = RefCell::new(Vec::new());
        let navigator = |target: &IssueishRef| visited.borrow_mut().push(target.clone());
        let html = r#"<a href="https://github.com/o/r/pull/3">#3</a>"#;

        let body = HtmlBodyRenderer.render(html, &navigator, &Theme::default(), 80);

        assert!(body.follow(0));
        assert!(!body.follow(1));
        assert_eq!(visited.borrow().len(), 1);
        assert_eq!(visited.borrow()[0].number, 3);
    }

    #[test]
    fn should_render_empty_body_as_no_lines() {
        assert!(render("", 80).is_empty());
        assert!(render("<p>  </p>", 80).is_empty());
    }
}
