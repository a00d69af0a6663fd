//! Verification URL construction and QR rendering to PNG.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};
use std::io::Cursor;

use crate::digest::keyed_digest;
use crate::error::{DataUriError, EncodeError, RenderError};
use crate::input::Identifier;

const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Raster parameters for one QR image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Output width and height in pixels, quiet zone included.
    pub size: u32,
    /// Quiet zone in modules on every side.
    pub margin: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { size: 400, margin: 2 }
    }
}

/// Everything the encoder needs besides the identifier and secret.
#[derive(Debug, Clone)]
pub struct EncoderSettings {
    pub base_url: String,
    pub render: RenderOptions,
}

/// One generated QR code. Lives only while its batch is processed.
#[derive(Debug, Clone)]
pub struct Record {
    pub identifier: Identifier,
    pub url: String,
    pub png: Vec<u8>,
}

impl Record {
    /// The PNG as an embeddable `data:image/png;base64,...` URI.
    pub fn data_uri(&self) -> String {
        format!("{DATA_URI_PREFIX}{}", STANDARD.encode(&self.png))
    }
}

/// Strip the data URI prefix and decode the base64 payload.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, DataUriError> {
    let (_, payload) = uri
        .split_once(";base64,")
        .filter(|(head, _)| head.starts_with("data:"))
        .ok_or(DataUriError::MissingPrefix)?;
    Ok(STANDARD.decode(payload)?)
}

/// `{base_url}/{identifier}-{sha256(identifier + secret)}`.
pub fn verification_url(base_url: &str, identifier: &str, secret: &str) -> String {
    format!(
        "{}/{}-{}",
        base_url.trim_end_matches('/'),
        identifier,
        keyed_digest(identifier, secret)
    )
}

/// Render `data` as a black-on-white QR code PNG of exactly `size` x `size` pixels.
/// Modules are mapped to pixels by nearest neighbour, so module edges may differ
/// by one pixel when `size` is not a multiple of the module count.
pub fn render_png(data: &str, opts: &RenderOptions) -> Result<Vec<u8>, RenderError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(RenderError::Symbol)?;
    let width = code.width();
    let colors = code.to_colors();

    let margin = opts.margin as usize;
    let modules = width + 2 * margin;
    if (opts.size as usize) < modules {
        return Err(RenderError::ImageTooSmall {
            size: opts.size,
            modules: modules as u32,
        });
    }

    let size = opts.size as usize;
    let img = GrayImage::from_fn(opts.size, opts.size, |px, py| {
        let mx = px as usize * modules / size;
        let my = py as usize * modules / size;
        let dark = mx >= margin
            && my >= margin
            && mx - margin < width
            && my - margin < width
            && colors[(my - margin) * width + (mx - margin)] == Color::Dark;
        Luma([if dark { 0 } else { 255 }])
    });

    let mut out = Vec::new();
    DynamicImage::ImageLuma8(img).write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}

/// Build the verification URL for `identifier` and render it.
pub fn encode(
    identifier: &Identifier,
    secret: &str,
    settings: &EncoderSettings,
) -> Result<Record, EncodeError> {
    let url = verification_url(&settings.base_url, identifier.as_str(), secret);
    let png = render_png(&url, &settings.render).map_err(|source| EncodeError {
        identifier: identifier.to_string(),
        source,
    })?;
    Ok(Record {
        identifier: identifier.clone(),
        url,
        png,
    })
}
