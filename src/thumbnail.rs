use eframe::egui::ColorImage;
use tracing::debug;

/// Downloads and decodes the thumbnail named in the video's metadata.
pub fn fetch_thumbnail(url: &str) -> Option<ColorImage> {
    // Perform a blocking HTTP GET request, returning None on any error
    let resp = match reqwest::blocking::get(url).and_then(|r| r.error_for_status()) {
        Ok(resp) => resp.bytes().ok()?,
        Err(err) => {
            debug!(%url, error = %err, "thumbnail request failed");
            return None;
        }
    };
    decode_thumbnail(&resp)
}

/// Decodes image bytes into an egui image, shrunk to fit beside the title.
pub fn decode_thumbnail(bytes: &[u8]) -> Option<ColorImage> {
    let img = image::load_from_memory(bytes).ok()?.thumbnail(160, 90).to_rgba8();
    let size = [img.width() as usize, img.height() as usize];
    // Create a ColorImage from the raw RGBA bytes without premultiplying alpha
    Some(ColorImage::from_rgba_unmultiplied(size, &img))
}
