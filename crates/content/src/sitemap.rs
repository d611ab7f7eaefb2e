use anyhow::Result;
use folio_core::{config::SiteConfig, models::Post};
use maud::{PreEscaped, html};
use time::{Date, macros::format_description};
use url::Url;

pub const INDEX_FILE: &str = "sitemap-index.xml";
pub const PAGES_FILE: &str = "sitemap-0.xml";

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";
const NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

pub struct Sitemap {
    pub index: String,
    pub pages: String,
}

struct Entry {
    loc: Url,
    lastmod: Option<String>,
}

pub fn generate(site: &SiteConfig, posts: &[Post]) -> Result<Sitemap> {
    let mut entries = vec![
        Entry { loc: site.url.join("/")?, lastmod: None },
        Entry { loc: site.url.join("/posts/")?, lastmod: None },
    ];
    for post in posts {
        entries.push(Entry {
            loc: site.url.join(&format!("/posts/{}/", post.slug))?,
            lastmod: Some(format_date(post.data.display_date())?),
        });
    }
    let pages = html! {
        (PreEscaped(XML_DECL))
        urlset xmlns=(NAMESPACE) {
            @for entry in &entries {
                url {
                    loc { (entry.loc) }
                    @if let Some(lastmod) = &entry.lastmod {
                        lastmod { (lastmod) }
                    }
                }
            }
        }
    }
    .into_string();
    let pages_url = site.url.join(PAGES_FILE)?;
    let index = html! {
        (PreEscaped(XML_DECL))
        sitemapindex xmlns=(NAMESPACE) {
            sitemap { loc { (pages_url) } }
        }
    }
    .into_string();
    Ok(Sitemap { index, pages })
}

fn format_date(date: Date) -> Result<String> {
    Ok(date.format(format_description!("[year]-[month]-[day]"))?)
}
