//! Markdown rendering with the site's content plugins applied to the event
//! stream: external link attributes, image unwrapping and reading time.

use std::fmt;

use folio_core::{config::MarkdownConfig, util::same_host};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html::push_html};
use pulldown_cmark_escape::{escape_href, escape_html};
use url::Url;

const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone)]
pub struct Rendered {
    pub html: String,
    pub reading_time: ReadingTime,
    /// Absolute image URLs referenced by the post.
    pub remote_images: Vec<Url>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingTime {
    pub words: usize,
    pub minutes: usize,
}

impl ReadingTime {
    pub fn from_words(words: usize) -> Self {
        Self { words, minutes: words.div_ceil(WORDS_PER_MINUTE).max(1) }
    }
}

impl fmt::Display for ReadingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min read", self.minutes)
    }
}

pub struct MarkdownRenderer<'a> {
    config: &'a MarkdownConfig,
    site_host: &'a str,
}

impl<'a> MarkdownRenderer<'a> {
    pub fn new(config: &'a MarkdownConfig, site_host: &'a str) -> Self {
        Self { config, site_host }
    }

    pub fn render(&self, source: &str) -> Rendered {
        let options = Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES;
        let events = Parser::new_ext(source, options).collect::<Vec<_>>();

        let words = count_words(&events);
        let remote_images = events
            .iter()
            .filter_map(|event| match event {
                Event::Start(Tag::Image { dest_url, .. }) => absolute_url(dest_url),
                _ => None,
            })
            .collect();

        let events = if self.config.unwrap_images { unwrap_images(events) } else { events };
        let events = self.rewrite_external_links(events);

        let mut html = String::with_capacity(source.len() * 2);
        push_html(&mut html, events.into_iter());
        Rendered { html, reading_time: ReadingTime::from_words(words), remote_images }
    }

    fn is_external(&self, dest_url: &str) -> bool {
        absolute_url(dest_url)
            .and_then(|url| url.host_str().map(|host| !same_host(host, self.site_host)))
            .unwrap_or(false)
    }

    /// Replace the opening tag of external links with one carrying `rel` and `target`.
    fn rewrite_external_links<'e>(&self, events: Vec<Event<'e>>) -> Vec<Event<'e>> {
        let mut out = Vec::with_capacity(events.len());
        let mut open = Vec::<bool>::new();
        for event in events {
            match event {
                Event::Start(Tag::Link { ref dest_url, ref title, .. })
                    if self.is_external(dest_url) =>
                {
                    match self.external_link_tag(dest_url, title) {
                        Ok(tag) => {
                            out.push(Event::InlineHtml(CowStr::from(tag)));
                            open.push(true);
                        }
                        Err(_) => {
                            out.push(event);
                            open.push(false);
                        }
                    }
                }
                Event::Start(Tag::Link { .. }) => {
                    out.push(event);
                    open.push(false);
                }
                Event::End(TagEnd::Link) => {
                    if open.pop().unwrap_or(false) {
                        out.push(Event::InlineHtml(CowStr::Borrowed("</a>")));
                    } else {
                        out.push(event);
                    }
                }
                event => out.push(event),
            }
        }
        out
    }

    /// Opening `<a>` tag escaped the same way `push_html` escapes links.
    fn external_link_tag(&self, dest_url: &str, title: &str) -> Result<String, fmt::Error> {
        let config = &self.config.external_links;
        let mut tag = String::from("<a href=\"");
        escape_href(&mut tag, dest_url)?;
        if !title.is_empty() {
            tag.push_str("\" title=\"");
            escape_html(&mut tag, title)?;
        }
        if !config.rel.is_empty() {
            tag.push_str("\" rel=\"");
            escape_html(&mut tag, &config.rel.join(" "))?;
        }
        if let Some(target) = &config.target {
            tag.push_str("\" target=\"");
            escape_html(&mut tag, target)?;
        }
        tag.push_str("\">");
        Ok(tag)
    }
}

fn absolute_url(dest_url: &str) -> Option<Url> {
    Url::parse(dest_url).ok().filter(|url| matches!(url.scheme(), "http" | "https"))
}

fn count_words(events: &[Event<'_>]) -> usize {
    events
        .iter()
        .map(|event| match event {
            Event::Text(text) | Event::Code(text) => text.split_whitespace().count(),
            _ => 0,
        })
        .sum()
}

/// Drop paragraph tags around paragraphs that only contain images.
fn unwrap_images(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut i = 0;
    while i < events.len() {
        if matches!(events[i], Event::Start(Tag::Paragraph))
            && let Some(len) = events[i + 1..]
                .iter()
                .position(|e| matches!(e, Event::End(TagEnd::Paragraph)))
        {
            let inner = &events[i + 1..i + 1 + len];
            if only_images(inner) {
                out.extend_from_slice(inner);
                i += len + 2;
                continue;
            }
        }
        out.push(events[i].clone());
        i += 1;
    }
    out
}

fn only_images(events: &[Event<'_>]) -> bool {
    let mut depth = 0usize;
    let mut images = 0usize;
    for event in events {
        match event {
            Event::Start(Tag::Image { .. }) => {
                if depth == 0 {
                    images += 1;
                }
                depth += 1;
            }
            Event::End(TagEnd::Image) => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            Event::Text(text) if text.trim().is_empty() => {}
            Event::SoftBreak | Event::HardBreak => {}
            _ => return false,
        }
    }
    images > 0
}
