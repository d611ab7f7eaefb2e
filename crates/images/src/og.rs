//! Social preview ("OG") images for posts without a custom `ogImage`.

use anyhow::{Context, Result};
use folio_core::{config::Config, models::Post};
use image::ImageFormat;
use maud::{PreEscaped, html};
use time::{
    Date,
    format_description::{self, OwnedFormatItem},
};

use crate::{fonts::Fonts, layout, svg};

pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 630;

const BACKGROUND: &str = "#141E46";
const FOREGROUND: &str = "#FFF5E0";
const DATE_COLOR: &str = "#FF0080";
const TITLE_COLOR: &str = "#8DECB4";
const BORDER_COLOR: &str = "#2bbc89";

const LOGO: &str = r##"<path d="M200,300 L400,50 L600,300 L800,550 L1000,300" fill="none" stroke="#FFF5E0" stroke-width="15"/><path d="M200,300 Q400,50 600,300 T1000,300" fill="none" stroke="#FF0080" stroke-width="35"/><g fill="#8DECB4"><circle cx="200" cy="300" r="30"/><circle cx="600" cy="300" r="30"/><circle cx="1000" cy="300" r="30"/></g><g fill="#8DECB4"><circle cx="400" cy="50" r="30"/><circle cx="800" cy="550" r="30"/></g>"##;

/// Values substituted into the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OgProps {
    pub title: String,
    pub description: String,
    pub pub_date: Date,
}

impl From<&Post> for OgProps {
    fn from(post: &Post) -> Self {
        Self {
            title: post.data.title.clone(),
            description: post.data.description.clone(),
            pub_date: post.data.display_date(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OgTarget {
    pub slug: String,
    pub props: OgProps,
}

impl OgTarget {
    pub fn path(&self) -> String { format!("/og-image/{}.png", self.slug) }
}

/// Posts that need a generated image, in source order.
pub fn og_targets(posts: &[Post]) -> Vec<OgTarget> {
    posts
        .iter()
        .filter(|post| !post.data.has_og_image())
        .map(|post| OgTarget { slug: post.slug.clone(), props: OgProps::from(post) })
        .collect()
}

pub fn parse_date_format(format: &str) -> Result<OwnedFormatItem> {
    format_description::parse_owned::<2>(format)
        .with_context(|| format!("Invalid date format {:?}", format))
}

pub fn format_date(date: Date, format: &OwnedFormatItem) -> Result<String> {
    date.format(format).context("Failed to format date")
}

pub struct OgRenderer {
    fonts: Fonts,
    date_format: OwnedFormatItem,
    site_title: String,
    site_host: String,
}

impl OgRenderer {
    pub fn new(config: &Config, fonts: Fonts) -> Result<Self> {
        Ok(Self {
            fonts,
            date_format: parse_date_format(&config.og.date_format)?,
            site_title: config.site.title.clone(),
            site_host: config.site.host().to_string(),
        })
    }

    pub fn render_svg(&self, props: &OgProps) -> Result<String> {
        let date = format_date(props.pub_date, &self.date_format)?;
        let header = layout::header(&date, &props.title, &props.description);
        let footer = layout::footer();
        let svg = html! {
            svg xmlns="http://www.w3.org/2000/svg" width=(WIDTH) height=(HEIGHT)
                viewBox=(format!("0 0 {WIDTH} {HEIGHT}")) font-family=(self.fonts.family()) {
                rect width=(WIDTH) height=(HEIGHT) fill=(BACKGROUND) {}
                text x=(layout::PADDING) y=(header.date.y) font-size=(layout::DATE_SIZE)
                    font-weight="400" fill=(DATE_COLOR) { (header.date.text) }
                @for line in &header.title {
                    text x=(layout::PADDING) y=(line.y) font-size=(layout::TITLE_SIZE)
                        font-weight="700" fill=(TITLE_COLOR) { (line.text) }
                }
                @for line in &header.subtitle {
                    text x=(layout::PADDING) y=(line.y) font-size=(layout::SUBTITLE_SIZE)
                        font-weight="700" fill=(FOREGROUND) { (line.text) }
                }
                rect x="0" y=(footer.border_y) width=(WIDTH) height=(layout::BORDER)
                    fill=(BORDER_COLOR) {}
                svg x=(layout::PADDING) y=(footer.logo_y) width=(layout::LOGO_WIDTH)
                    height=(layout::LOGO_HEIGHT) viewBox="0 0 1200 600" fill="none" {
                    (PreEscaped(LOGO))
                }
                text x=(footer.label_x) y=(footer.label_y) font-size=(layout::LABEL_SIZE)
                    font-weight="600" fill=(FOREGROUND) { (self.site_title) }
                text x=(WIDTH as f32 - layout::PADDING) y=(footer.label_y)
                    font-size=(layout::LABEL_SIZE) font-weight="600" text-anchor="end"
                    fill=(FOREGROUND) { (self.site_host) }
            }
        };
        Ok(svg.into_string())
    }

    /// Render the PNG for one post.
    pub fn render(&self, props: &OgProps) -> Result<Vec<u8>> {
        let svg = self.render_svg(props)?;
        svg::render_image(&svg, &self.fonts, ImageFormat::Png)
    }
}
