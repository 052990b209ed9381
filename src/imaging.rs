//! Uploaded image validation and decoding

use std::path::Path;

use base64::Engine;
use image::DynamicImage;

/// Accepted upload extensions
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Image upload errors
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("No image data received")]
    Empty,

    #[error("Unsupported file type: {0} (expected .jpg, .jpeg or .png)")]
    UnsupportedType(String),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// An uploaded image, validated and decoded
pub struct UploadedImage {
    pub file_name: String,
    pub image: DynamicImage,
    /// `data:` URI of the original bytes, for previews
    pub preview: String,
}

/// Check the file name against the accepted extensions
pub fn validate_file_name(file_name: &str) -> Result<(), ImageError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension {
        Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(ImageError::UnsupportedType(file_name.to_string())),
    }
}

/// Validate and decode raw upload bytes into a pixel grid
pub fn decode_upload(file_name: &str, bytes: &[u8]) -> Result<UploadedImage, ImageError> {
    validate_file_name(file_name)?;
    if bytes.is_empty() {
        return Err(ImageError::Empty);
    }

    let image = image::load_from_memory(bytes)?;

    tracing::debug!(
        file_name = %file_name,
        width = image.width(),
        height = image.height(),
        "Decoded upload"
    );

    Ok(UploadedImage {
        file_name: file_name.to_string(),
        image,
        preview: preview_uri(file_name, bytes),
    })
}

fn preview_uri(file_name: &str, bytes: &[u8]) -> String {
    let mime = mime_guess::from_path(file_name).first_or_octet_stream();
    format!(
        "data:{};base64,{}",
        mime.essence_str(),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Vec::new();
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)
        .expect("encode test png");
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_extensions() {
        assert!(validate_file_name("scan.png").is_ok());
        assert!(validate_file_name("scan.JPG").is_ok());
        assert!(validate_file_name("photo.final.jpeg").is_ok());

        assert!(matches!(
            validate_file_name("scan.gif"),
            Err(ImageError::UnsupportedType(_))
        ));
        assert!(validate_file_name("scan").is_err());
    }

    #[test]
    fn test_decode_valid_png() {
        let upload = decode_upload("scan.png", &png_bytes(6, 3)).unwrap();

        assert_eq!(upload.image.width(), 6);
        assert_eq!(upload.image.height(), 3);
        assert!(upload.preview.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_decode_corrupt_bytes() {
        let result = decode_upload("scan.png", b"definitely not a png");
        assert!(matches!(result, Err(ImageError::Decode(_))));

        let result = decode_upload("scan.jpg", &[]);
        assert!(matches!(result, Err(ImageError::Empty)));
    }
}
