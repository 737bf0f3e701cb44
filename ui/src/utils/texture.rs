use egui::{ColorImage, Context, TextureHandle, TextureOptions};
use qrgenie_business::RenderedImage;

pub fn color_image(image: &RenderedImage) -> ColorImage {
    ColorImage::from_rgba_unmultiplied(
        [image.width() as usize, image.height() as usize],
        image.rgba(),
    )
}

/// Uploads a rendered QR code. Nearest filtering keeps module edges sharp.
pub fn load_texture(
    ctx: &Context,
    name: impl Into<String>,
    image: &RenderedImage,
) -> TextureHandle {
    ctx.load_texture(name, color_image(image), TextureOptions::NEAREST)
}
