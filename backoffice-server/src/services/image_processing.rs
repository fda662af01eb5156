//! 图片预处理
//!
//! 上传到图床之前：校验格式与大小，解码确认是图片，
//! 长边超过上限时等比缩小，然后按原格式重新编码。

use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use crate::core::UploadConfig;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Supported extensions
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg"];

/// JPEG quality after re-encoding
const JPEG_QUALITY: u8 = 85;

/// File received from a multipart `image` field
#[derive(Debug, Clone, Default)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Image ready for the image host
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedImage {
    pub format: ImageKind,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

impl PreparedImage {
    /// `data:` URI form accepted by the image host's upload API
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.format.mime(), STANDARD.encode(&self.bytes))
    }
}

/// Extension from the file name, falling back to the declared content type
fn detect_extension(upload: &UploadedImage) -> Option<String> {
    let from_name = upload
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    if from_name.is_some() {
        return from_name;
    }

    upload
        .content_type
        .as_deref()
        .and_then(mime_guess::get_mime_extensions_str)
        .and_then(|exts| exts.iter().find(|e| SUPPORTED_FORMATS.contains(*e)))
        .map(|ext| ext.to_string())
}

/// Validate image file
fn validate_image(upload: &UploadedImage, config: &UploadConfig) -> AppResult<ImageKind> {
    if upload.bytes.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }

    if upload.bytes.len() > config.max_bytes {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!(
                "File too large. Maximum size is {} bytes ({}MB)",
                config.max_bytes,
                config.max_bytes / 1024 / 1024
            ),
        ));
    }

    let ext = detect_extension(upload).unwrap_or_default();
    ImageKind::from_extension(&ext).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!(
                "Unsupported file format '{}'. Supported: {}",
                ext,
                SUPPORTED_FORMATS.join(", ")
            ),
        )
    })
}

/// Process and re-encode an uploaded image
///
/// CPU bound; call from `spawn_blocking`.
pub fn prepare(upload: &UploadedImage, config: &UploadConfig) -> AppResult<PreparedImage> {
    let kind = validate_image(upload, config)?;

    let img = image::load_from_memory(&upload.bytes).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidImage, format!("Invalid image file: {e}"))
    })?;

    let img = limit_dimensions(img, config.max_dimension);
    let bytes = encode(&img, kind)?;

    Ok(PreparedImage {
        format: kind,
        width: img.width(),
        height: img.height(),
        bytes,
    })
}

/// Fit within `max` x `max`, keeping the aspect ratio; never upscale
fn limit_dimensions(img: DynamicImage, max: u32) -> DynamicImage {
    if max == 0 || (img.width() <= max && img.height() <= max) {
        return img;
    }
    img.resize(max, max, FilterType::Lanczos3)
}

fn encode(img: &DynamicImage, kind: ImageKind) -> AppResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    match kind {
        ImageKind::Jpeg => {
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
            img.to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|e| AppError::internal(format!("Failed to encode image: {e}")))?;
        }
        ImageKind::Png => {
            img.write_to(&mut cursor, kind.image_format())
                .map_err(|e| AppError::internal(format!("Failed to encode image: {e}")))?;
        }
    }
    Ok(buffer)
}
