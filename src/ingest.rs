//! Turning pasted or uploaded image files into markdown image tags.
//!
//! The bytes end up base64-encoded inside the post body. Nothing is resized,
//! deduplicated or size-checked.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::error::IngestError;

pub const PASTED_IMAGE_ALT: &str = "Image";

/// Where the image tag lands in the draft body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Clipboard paste: replaces the current selection.
    AtCaret,
    /// File picker: appended after the existing text.
    End,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    /// `\n![alt](data-uri)\n`, ready to splice into a body.
    pub fn markdown_tag(&self, alt: &str) -> String {
        let alt: String = alt.chars().filter(|c| !matches!(c, '[' | ']')).collect();
        format!("\n![{alt}]({})\n", self.data_uri())
    }
}

pub fn is_image_mime(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// First clipboard item that carries an image.
pub fn clipboard_image(event: &web_sys::ClipboardEvent) -> Option<web_sys::File> {
    let items = event.clipboard_data()?.items();
    (0..items.length())
        .filter_map(|i| items.get(i))
        .find(|item| item.type_().contains("image"))
        .and_then(|item| item.get_as_file().ok().flatten())
}

/// First file picked in an `<input type="file">`.
pub fn picked_file(input: &web_sys::HtmlInputElement) -> Option<web_sys::File> {
    input.files()?.get(0)
}

/// Reads a browser file into memory. Rejects anything that is not an image.
pub async fn read_image(file: web_sys::File) -> Result<ImageFile, IngestError> {
    let mime = file.type_();
    if !is_image_mime(&mime) {
        return Err(IngestError::UnsupportedMime(mime));
    }
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|err| IngestError::Read(format!("{err:?}")))?;
    let buffer: js_sys::ArrayBuffer = buffer
        .dyn_into()
        .map_err(|_| IngestError::Read("not an ArrayBuffer".to_string()))?;
    Ok(ImageFile {
        name: file.name(),
        mime,
        bytes: js_sys::Uint8Array::new(&buffer).to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png() -> ImageFile {
        ImageFile {
            name: "diagram.png".to_string(),
            mime: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[test]
    fn data_uri_uses_file_mime() {
        assert_eq!(png().data_uri(), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn markdown_tag_is_on_its_own_line() {
        assert_eq!(
            png().markdown_tag("diagram.png"),
            "\n![diagram.png](data:image/png;base64,iVBORw==)\n"
        );
    }

    #[test]
    fn brackets_are_stripped_from_alt() {
        let tag = png().markdown_tag("shot [1].png");
        assert!(tag.starts_with("\n![shot 1.png]("));
    }

    #[test]
    fn only_image_mimes_are_accepted() {
        assert!(is_image_mime("image/gif"));
        assert!(is_image_mime("image/svg+xml"));
        assert!(!is_image_mime("text/plain"));
        assert!(!is_image_mime(""));
    }
}
