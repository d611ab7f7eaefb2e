use anyhow::Result;
use argp::FromArgs;
use folio_images::og::og_targets;
use typed_path::Utf8NativePathBuf;

use crate::util::{load, native_path};

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// List the OG image paths that would be generated.
#[argp(subcommand, name = "paths")]
pub struct Args {
    #[argp(option, short = 'c', default = "Utf8NativePathBuf::from(\"config.yml\")", from_str_fn(native_path))]
    /// site configuration file
    config: Utf8NativePathBuf,
}

pub fn run(args: Args) -> Result<()> {
    let (_, content) = load(&args.config)?;
    for target in og_targets(content.posts()) {
        println!("{}", target.path());
    }
    Ok(())
}
