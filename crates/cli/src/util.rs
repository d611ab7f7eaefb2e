use anyhow::Result;
use folio_content::ContentStore;
use folio_core::config::Config;
use typed_path::Utf8NativePathBuf;

// For argp::FromArgs
pub fn native_path(value: &str) -> Result<Utf8NativePathBuf, String> {
    Ok(Utf8NativePathBuf::from(value))
}

pub fn load(config: &Utf8NativePathBuf) -> Result<(Config, ContentStore)> {
    let config = Config::load(config.with_platform_encoding())?;
    let content = ContentStore::load(&config.content)?;
    Ok((config, content))
}
