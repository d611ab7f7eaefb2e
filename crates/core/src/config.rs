use std::{
    collections::BTreeMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub sitemap: SitemapConfig,
    #[serde(default)]
    pub fonts: FontsConfig,
    #[serde(default)]
    pub og: OgConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        );
        serde_yaml::from_reader(file).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    pub title: String,
    pub url: Url,
    #[serde(default)]
    pub description: String,
}

impl SiteConfig {
    /// Host label shown on generated images, e.g. `oscargicast.com`.
    pub fn host(&self) -> &str { self.url.host_str().unwrap_or_default() }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self { Self { port: 4321 } }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    pub posts_dir: PathBuf,
    pub include_drafts: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self { posts_dir: PathBuf::from("src/content/post"), include_drafts: false }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self { Self { dir: PathBuf::from("dist") } }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MarkdownConfig {
    pub external_links: ExternalLinksConfig,
    /// Drop the `<p>` around paragraphs holding nothing but images.
    pub unwrap_images: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self { external_links: ExternalLinksConfig::default(), unwrap_images: true }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExternalLinksConfig {
    pub rel: Vec<String>,
    pub target: Option<String>,
}

impl Default for ExternalLinksConfig {
    fn default() -> Self {
        Self {
            rel: vec!["nofollow".to_string(), "noopener".to_string(), "noreferrer".to_string()],
            target: Some("_blank".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageConfig {
    pub domains: Vec<String>,
    pub remote_patterns: Vec<RemotePattern>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemotePattern {
    #[serde(default)]
    pub protocol: Option<String>,
    pub hostname: String,
    #[serde(default)]
    pub port: Option<u16>,
}

impl ImageConfig {
    /// Whether a remote image may be fetched and optimized.
    pub fn is_allowed(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        self.domains.iter().any(|d| d == host)
            || self.remote_patterns.iter().any(|p| p.matches(url))
    }
}

impl RemotePattern {
    pub fn matches(&self, url: &Url) -> bool {
        if let Some(protocol) = &self.protocol
            && protocol.trim_end_matches(':') != url.scheme()
        {
            return false;
        }
        if let Some(port) = self.port
            && url.port_or_known_default() != Some(port)
        {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        if let Some(suffix) = self.hostname.strip_prefix("**") {
            // One or more subdomain labels
            host.len() > suffix.len() && host.ends_with(suffix)
        } else if let Some(suffix) = self.hostname.strip_prefix('*') {
            // Exactly one subdomain label
            host.strip_suffix(suffix).is_some_and(|label| !label.is_empty() && !label.contains('.'))
        } else {
            self.hostname == host
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub enabled: bool,
    /// Emitted sorted by directive name.
    pub csp_directives: BTreeMap<String, String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            csp_directives: BTreeMap::from([("default-src".to_string(), "'none'".to_string())]),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SitemapConfig {
    pub enabled: bool,
}

impl Default for SitemapConfig {
    fn default() -> Self { Self { enabled: true } }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FontsConfig {
    pub family: String,
    pub regular: PathBuf,
    pub bold: PathBuf,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            family: "Roboto Mono".to_string(),
            regular: PathBuf::from("assets/roboto-mono-regular.ttf"),
            bold: PathBuf::from("assets/roboto-mono-700.ttf"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OgConfig {
    /// `time` format description used for the date line.
    pub date_format: String,
}

impl Default for OgConfig {
    fn default() -> Self {
        Self { date_format: "[weekday], [month repr:long] [day padding:none], [year]".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
site:
  title: Oscar Gi
  url: https://oscargicast.com
image:
  domains: [oscargicast.com, credly.com]
  remote_patterns:
    - protocol: https
      hostname: "**.amazonaws.com"
security:
  csp_directives:
    default-src: "'none'"
    img-src: "'self'"
"#;

    #[test]
    fn test_parse_config() {
        let config: Config = serde_yaml::from_str(CONFIG).unwrap();
        assert_eq!(config.site.host(), "oscargicast.com");
        assert_eq!(config.server.port, 4321);
        assert_eq!(config.output.dir, PathBuf::from("dist"));
        assert!(config.sitemap.enabled);
        assert!(config.markdown.unwrap_images);
        assert_eq!(config.markdown.external_links.target.as_deref(), Some("_blank"));
        assert_eq!(config.fonts.family, "Roboto Mono");
        assert_eq!(config.security.csp_directives.len(), 2);
    }

    #[test]
    fn test_image_allowed() {
        let config: Config = serde_yaml::from_str(CONFIG).unwrap();
        let cases: &[(&str, bool)] = &[
            ("https://oscargicast.com/a.png", true),
            ("https://credly.com/badge.png", true),
            ("https://www.credly.com/badge.png", false),
            ("https://bucket.s3.amazonaws.com/a.png", true),
            ("https://s3.amazonaws.com/a.png", true),
            ("https://amazonaws.com/a.png", false),
            ("http://bucket.s3.amazonaws.com/a.png", false),
            ("https://example.com/a.png", false),
        ];
        for &(url, expected) in cases {
            assert_eq!(config.image.is_allowed(&Url::parse(url).unwrap()), expected, "{url}");
        }
    }

    #[test]
    fn test_example_config() {
        let config: Config = serde_yaml::from_str(include_str!("../../../config.example.yml")).unwrap();
        assert_eq!(config.site.title, "Oscar Gi");
        assert_eq!(config.markdown.external_links.rel.len(), 3);
        assert_eq!(config.security.csp_directives["default-src"], "'none'");
    }

    #[test]
    fn test_csp_directives_sorted() {
        let config: Config = serde_yaml::from_str(
            "site:\n  title: T\n  url: https://example.org\nsecurity:\n  csp_directives:\n    script-src: \"'self'\"\n    default-src: \"'none'\"\n    img-src: \"*\"\n",
        )
        .unwrap();
        let names = config.security.csp_directives.keys().map(String::as_str).collect::<Vec<_>>();
        assert_eq!(names, ["default-src", "img-src", "script-src"]);
    }

    #[test]
    fn test_single_wildcard() {
        let pattern =
            RemotePattern { protocol: None, hostname: "*.example.com".to_string(), port: None };
        assert!(pattern.matches(&Url::parse("https://cdn.example.com/x").unwrap()));
        assert!(!pattern.matches(&Url::parse("https://a.cdn.example.com/x").unwrap()));
        assert!(!pattern.matches(&Url::parse("https://example.com/x").unwrap()));
    }
}
