//! Preview decoding for the selected image.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::domain::UploadedFile;

/// Displayable rendition of the selected image.
#[derive(Clone, PartialEq, Eq)]
pub struct Preview {
    pub width: u32,
    pub height: u32,
    /// `data:` URL carrying the original bytes
    pub data_url: String,
}

impl std::fmt::Debug for Preview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preview")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("data_url_len", &self.data_url.len())
            .finish()
    }
}

/// Encode a file as a `data:` URL.
fn data_url(file: &UploadedFile) -> String {
    format!(
        "data:{};base64,{}",
        file.media_type,
        STANDARD.encode(file.bytes())
    )
}

/// Decode the image header and build a preview.
///
/// # Errors
/// Returns the decoder message if the bytes are not a supported image.
pub fn decode_preview(file: &UploadedFile) -> Result<Preview, String> {
    let reader = image::ImageReader::new(std::io::Cursor::new(file.bytes()))
        .with_guessed_format()
        .map_err(|e| e.to_string())?;
    let (width, height) = reader.into_dimensions().map_err(|e| e.to_string())?;

    Ok(Preview {
        width,
        height,
        data_url: data_url(file),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 120, 90]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .expect("encode png");
        out.into_inner()
    }

    #[test]
    fn test_decode_reads_dimensions() {
        let file = UploadedFile::new("lesion.png", "image/png", png_bytes(12, 7));
        let preview = decode_preview(&file).expect("Should decode");
        assert_eq!((preview.width, preview.height), (12, 7));
        assert!(preview.data_url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let file = UploadedFile::new("fake.png", "image/png", b"not an image".to_vec());
        assert!(decode_preview(&file).is_err());
    }
}
