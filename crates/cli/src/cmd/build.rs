use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, anyhow};
use argp::FromArgs;
use folio_content::{
    ContentStore,
    markdown::MarkdownRenderer,
    page::{self, Listed, post_path},
    sitemap,
};
use folio_core::{config::Config, util::join_normalized};
use folio_images::{
    fonts::Fonts,
    og::{OgRenderer, OgTarget, format_date, og_targets, parse_date_format},
};
use tokio::{sync::Semaphore, task::JoinSet};
use typed_path::Utf8NativePathBuf;

use crate::util::{load, native_path};

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// Generate OG images, post pages and the sitemap.
#[argp(subcommand, name = "build")]
pub struct Args {
    #[argp(option, short = 'c', default = "Utf8NativePathBuf::from(\"config.yml\")", from_str_fn(native_path))]
    /// site configuration file
    config: Utf8NativePathBuf,
    #[argp(option, short = 'o', from_str_fn(native_path))]
    /// output directory (defaults to output.dir)
    output: Option<Utf8NativePathBuf>,
}

pub async fn run(args: Args) -> Result<()> {
    let (mut config, content) = load(&args.config)?;
    if let Some(output) = &args.output {
        config.output.dir = PathBuf::from(output.as_str());
    }
    let fonts = Fonts::load(&config.fonts)?;
    let renderer = OgRenderer::new(&config, fonts)?;
    build(&config, &content, renderer).await
}

pub async fn build(config: &Config, content: &ContentStore, renderer: OgRenderer) -> Result<()> {
    let out_dir = config.output.dir.as_path();
    let targets = og_targets(content.posts());
    let count = targets.len();
    write_og_images(out_dir, targets, renderer).await?;
    tracing::info!("Generated {} OG images", count);
    write_pages(config, content, out_dir).await?;
    if config.sitemap.enabled {
        let sitemap = sitemap::generate(&config.site, content.posts())?;
        write_file(&out_dir.join(sitemap::INDEX_FILE), sitemap.index.into_bytes()).await?;
        write_file(&out_dir.join(sitemap::PAGES_FILE), sitemap.pages.into_bytes()).await?;
    }
    tracing::info!("Build written to {}", out_dir.display());
    Ok(())
}

/// Each target renders on its own blocking task, bounded by the number of CPUs.
async fn write_og_images(out_dir: &Path, targets: Vec<OgTarget>, renderer: OgRenderer) -> Result<()> {
    let renderer = Arc::new(renderer);
    let permits = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
    let semaphore = Arc::new(Semaphore::new(permits));
    let mut tasks = JoinSet::new();
    for target in targets {
        let renderer = renderer.clone();
        let semaphore = semaphore.clone();
        let path = join_normalized(out_dir, target.path());
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let slug = target.slug.clone();
            let data = tokio::task::spawn_blocking(move || renderer.render(&target.props))
                .await?
                .with_context(|| format!("Failed to render OG image for {}", slug))?;
            write_file(&path, data).await?;
            tracing::debug!("Wrote {}", path.display());
            Ok::<_, anyhow::Error>(())
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.map_err(|e| anyhow!("OG image task failed: {e}"))??;
    }
    Ok(())
}

async fn write_pages(config: &Config, content: &ContentStore, out_dir: &Path) -> Result<()> {
    let renderer = MarkdownRenderer::new(&config.markdown, config.site.host());
    let date_format = parse_date_format(&config.og.date_format)?;
    let mut listed = Vec::with_capacity(content.posts().len());
    for post in content.posts() {
        let rendered = renderer.render(&post.body);
        for url in &rendered.remote_images {
            if !config.image.is_allowed(url) {
                tracing::warn!("{}: remote image {} is not in the image allow-list", post.slug, url);
            }
        }
        let date = format_date(post.data.display_date(), &date_format)?;
        let html = page::render_post(&config.site, post, &rendered, &date)?;
        let path = join_normalized(out_dir, post_path(&post.slug)).join("index.html");
        write_file(&path, html.into_bytes()).await?;
        listed.push(Listed { post, date });
    }
    tracing::info!("Wrote {} post pages", listed.len());
    let home = page::render_home(&config.site, &listed)?;
    write_file(&out_dir.join("index.html"), home.into_bytes()).await?;
    let posts = page::render_posts(&config.site, &listed)?;
    write_file(&out_dir.join("posts/index.html"), posts.into_bytes()).await?;
    Ok(())
}

async fn write_file(path: &Path, data: Vec<u8>) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, data).await.with_context(|| format!("Failed to write {}", path.display()))
}
