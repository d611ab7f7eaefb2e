use anyhow::{Context, Result, anyhow};
use image::{DynamicImage, ImageFormat, RgbaImage};
use resvg::{tiny_skia, usvg};

use crate::{encode_image, fonts::Fonts};

pub fn render_image(svg: &str, fonts: &Fonts, format: ImageFormat) -> Result<Vec<u8>> {
    let pixmap = render_pixmap(svg, fonts)?;
    let mut data = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        data.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    let image = RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .ok_or_else(|| anyhow!("Pixel buffer does not match image size"))?;
    encode_image(&DynamicImage::ImageRgba8(image), format)
}

pub fn render_pixmap(svg: &str, fonts: &Fonts) -> Result<tiny_skia::Pixmap> {
    let options = usvg::Options {
        font_family: fonts.family().to_string(),
        fontdb: fonts.database(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(svg, &options).context("Failed to parse SVG")?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow!("Invalid image size {}x{}", size.width(), size.height()))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    Ok(pixmap)
}
