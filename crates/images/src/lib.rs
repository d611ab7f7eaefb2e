pub mod fonts;
pub mod layout;
pub mod og;
pub mod svg;

use std::io::Cursor;

use anyhow::Result;
use image::{DynamicImage, ImageFormat};

pub fn encode_image(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format)?;
    Ok(out.into_inner())
}
