pub mod frontmatter;
pub mod markdown;
pub mod page;
pub mod sitemap;

use std::path::Path;

use anyhow::{Context, Result};
use folio_core::{config::ContentConfig, models::Post};
use walkdir::WalkDir;

/// All posts of the site, newest first.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    posts: Vec<Post>,
}

impl ContentStore {
    pub fn load(config: &ContentConfig) -> Result<Self> {
        let dir = &config.posts_dir;
        let mut posts = Vec::new();
        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }
            let path = entry.path();
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let (data, body) = frontmatter::parse(&source)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            let slug = slug_for(dir, path)?;
            if data.draft && !config.include_drafts {
                tracing::debug!("Skipping draft {}", slug);
                continue;
            }
            posts.push(Post { slug, data, body: body.to_string() });
        }
        tracing::info!("Loaded {} posts from {}", posts.len(), dir.display());
        Ok(Self::from_posts(posts))
    }

    pub fn from_posts(mut posts: Vec<Post>) -> Self {
        posts.sort_by(|a, b| {
            b.data.publish_date.cmp(&a.data.publish_date).then_with(|| a.slug.cmp(&b.slug))
        });
        Self { posts }
    }

    pub fn posts(&self) -> &[Post] { &self.posts }

    pub fn get(&self, slug: &str) -> Option<&Post> { self.posts.iter().find(|p| p.slug == slug) }
}

fn is_markdown(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| matches!(e, "md" | "mdx"))
}

fn slug_for(dir: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(dir)?.with_extension("");
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use folio_core::config::ContentConfig;
    use time::macros::date;

    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "first.md", "---\ntitle: First\npublishDate: 2024-01-01\n---\nHello\n");
        write(
            dir.path(),
            "nested/second.mdx",
            "---\ntitle: Second\npublishDate: 2024-03-05\nogImage: /x.png\n---\n",
        );
        write(dir.path(), "draft.md", "---\ntitle: Draft\npublishDate: 2025-01-01\ndraft: true\n---\n");
        write(dir.path(), ".hidden/skip.md", "not a post");
        write(dir.path(), "notes.txt", "not a post");

        let config = ContentConfig { posts_dir: dir.path().to_path_buf(), include_drafts: false };
        let store = ContentStore::load(&config).unwrap();
        let slugs = store.posts().iter().map(|p| p.slug.as_str()).collect::<Vec<_>>();
        assert_eq!(slugs, ["nested/second", "first"]);
        let first = store.get("first").unwrap();
        assert_eq!(first.body, "Hello\n");
        assert_eq!(first.data.publish_date, date!(2024 - 01 - 01));
        assert!(store.get("draft").is_none());

        let config = ContentConfig { include_drafts: true, ..config };
        let store = ContentStore::load(&config).unwrap();
        assert_eq!(store.posts()[0].slug, "draft");
    }

    #[test]
    fn test_load_invalid() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken.md", "no frontmatter here");
        let config = ContentConfig { posts_dir: dir.path().to_path_buf(), include_drafts: false };
        let err = ContentStore::load(&config).unwrap_err();
        assert!(format!("{err:#}").contains("broken.md"));
    }

    #[test]
    fn test_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = ContentConfig { posts_dir: dir.path().to_path_buf(), include_drafts: false };
        assert!(ContentStore::load(&config).unwrap().posts().is_empty());
    }
}
