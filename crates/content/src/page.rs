use anyhow::Result;
use folio_core::{config::SiteConfig, models::Post};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use time::macros::format_description;
use url::Url;

use crate::markdown::Rendered;

pub fn post_path(slug: &str) -> String { format!("/posts/{}/", slug) }

/// Preview image for a post: its own `ogImage`, or the generated one.
pub fn og_image_url(site: &SiteConfig, post: &Post) -> Result<Url> {
    match post.data.og_image.as_deref().filter(|s| !s.is_empty()) {
        Some(image) => Ok(site.url.join(image)?),
        None => Ok(site.url.join(&format!("/og-image/{}.png", post.slug))?),
    }
}

fn head(site: &SiteConfig, post: &Post) -> Result<Markup> {
    let canonical = site.url.join(&post_path(&post.slug))?;
    let og_image = og_image_url(site, post)?;
    Ok(html! {
        (common_head(&format!("{} • {}", post.data.title, site.title), &post.data.description, &canonical))
        meta property="og:type" content="article";
        meta property="og:site_name" content=(site.title);
        meta property="og:title" content=(post.data.title);
        meta property="og:description" content=(post.data.description);
        meta property="og:url" content=(canonical);
        meta property="og:image" content=(og_image);
        meta name="twitter:card" content="summary_large_image";
        meta name="twitter:image" content=(og_image);
    })
}

fn common_head(title: &str, description: &str, canonical: &Url) -> Markup {
    html! {
        meta charset="utf-8";
        meta name="viewport" content="width=device-width, initial-scale=1.0";
        title { (title) }
        meta name="description" content=(description);
        link rel="canonical" href=(canonical);
        link rel="sitemap" href="/sitemap-index.xml";
    }
}

/// A post in a listing, with its display date.
pub struct Listed<'a> {
    pub post: &'a Post,
    pub date: String,
}

/// Site root: title, description and every post, newest first.
pub fn render_home(site: &SiteConfig, posts: &[Listed]) -> Result<String> {
    render_listing(site, "/", &site.title, &site.title, &site.description, posts)
}

/// `/posts/`: every post, newest first.
pub fn render_posts(site: &SiteConfig, posts: &[Listed]) -> Result<String> {
    let title = format!("Posts • {}", site.title);
    render_listing(site, "/posts/", &title, "Posts", &site.description, posts)
}

fn render_listing(
    site: &SiteConfig,
    path: &str,
    title: &str,
    heading: &str,
    description: &str,
    posts: &[Listed],
) -> Result<String> {
    let canonical = site.url.join(path)?;
    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                (common_head(title, description, &canonical))
                meta property="og:type" content="website";
                meta property="og:site_name" content=(site.title);
                meta property="og:title" content=(title);
                meta property="og:url" content=(canonical);
            }
            body {
                main {
                    h1 { (heading) }
                    @if !description.is_empty() {
                        p.description { (description) }
                    }
                    ul.posts {
                        @for item in posts {
                            li {
                                a href=(post_path(&item.post.slug)) { (item.post.data.title) }
                                " "
                                time datetime=(iso_date(item.post)?) { (item.date) }
                            }
                        }
                    }
                }
            }
        }
    };
    Ok(markup.into_string())
}

fn iso_date(post: &Post) -> Result<String> {
    Ok(post.data.display_date().format(format_description!("[year]-[month]-[day]"))?)
}

/// Standalone HTML page for a post. `date` is the display date string.
pub fn render_post(site: &SiteConfig, post: &Post, rendered: &Rendered, date: &str) -> Result<String> {
    let datetime = iso_date(post)?;
    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head { (head(site, post)?) }
            body {
                main {
                    article {
                        h1 { (post.data.title) }
                        p.meta {
                            time datetime=(datetime) { (date) }
                            " · "
                            (rendered.reading_time)
                        }
                        div.content { (PreEscaped(&rendered.html)) }
                        @if !post.data.tags.is_empty() {
                            ul.tags {
                                @for tag in &post.data.tags {
                                    li { "#" (tag) }
                                }
                            }
                        }
                    }
                }
            }
        }
    };
    Ok(markup.into_string())
}
