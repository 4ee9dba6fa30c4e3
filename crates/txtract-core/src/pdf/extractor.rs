//! PDF page text and embedded-image extraction using lopdf and pdf-extract.

use image::{DynamicImage, ImageBuffer, Luma, Rgb};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;
use tracing::{debug, trace, warn};

use super::{PageReader, PageText, Result};
use crate::error::PdfError;

/// A loaded PDF document.
pub struct PdfExtractor {
    document: Document,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Read and load a PDF from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| PdfError::Parse(format!("{}: {}", path.display(), e)))?;
        Self::load(&data)
    }

    /// Load a PDF from bytes, decrypting empty-password documents.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        if document.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", document.get_pages().len());
        Ok(Self { document, raw_data })
    }

    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Text of a single page (1-indexed).
    pub fn page_text(&self, page: u32) -> Result<String> {
        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }
        self.document
            .extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(format!("page {}: {}", page, e)))
    }

    /// Whole-document text via pdf-extract.
    pub fn extract_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    /// Read every page; falls back to whole-document text when lopdf finds none.
    pub fn pages(&self) -> Vec<Result<PageText>> {
        let pages: Vec<Result<PageText>> = (1..=self.page_count())
            .map(|page| self.page_text(page).map(|text| PageText::from_text(page, text)))
            .collect();

        let has_text = pages
            .iter()
            .any(|p| p.as_ref().is_ok_and(|p| !p.raw_text.trim().is_empty()));
        if has_text {
            return pages;
        }

        match self.extract_text() {
            Ok(text) if !text.trim().is_empty() => {
                debug!("lopdf found no page text, using pdf-extract document text");
                vec![Ok(PageText::from_text(1, text))]
            }
            Ok(_) => pages,
            Err(e) => {
                warn!("pdf-extract fallback failed: {}", e);
                pages
            }
        }
    }

    /// Images drawn on a page, for scanned statements that embed one image per page.
    pub fn page_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let pages = self.document.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();
        if let Some(resources) = self.page_resources(*page_id) {
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobjects))) = self.document.dereference(xobjects) {
                    for (_, reference) in xobjects.iter() {
                        if let Ok((_, object)) = self.document.dereference(reference) {
                            if let Some(img) = self.decode_image(object) {
                                images.push(img);
                            }
                        }
                    }
                }
            }
        }

        debug!("Found {} embedded images on page {}", images.len(), page);
        Ok(images)
    }

    /// Resources dictionary of a page, following inheritance up the page tree.
    fn page_resources(&self, node_id: ObjectId) -> Option<lopdf::Dictionary> {
        let Ok(Object::Dictionary(dict)) = self.document.get_object(node_id) else {
            return None;
        };

        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok((_, Object::Dictionary(resources))) = self.document.dereference(resources) {
                return Some(resources.clone());
            }
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => self.page_resources(*parent_id),
            _ => None,
        }
    }

    fn decode_image(&self, object: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = object else {
            return None;
        };
        let dict = &stream.dict;
        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
        let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;

        let filter = dict.get(b"Filter").ok().and_then(|f| match f {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            _ => None,
        });

        match filter {
            Some(b"DCTDecode") => {
                trace!("Decoding {}x{} JPEG page image", width, height);
                return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                    .ok();
            }
            Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                trace!("Unsupported image filter {:?}", filter.map(String::from_utf8_lossy));
                return None;
            }
            _ => {}
        }

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);
        if bits != 8 {
            return None;
        }

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.clone()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()).map(<[u8]>::to_vec),
                _ => None,
            })
            .unwrap_or_else(|| b"DeviceRGB".to_vec());

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let pixels = (width * height) as usize;

        match color_space.as_slice() {
            b"DeviceRGB" | b"RGB" if data.len() >= pixels * 3 => {
                ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, data[..pixels * 3].to_vec())
                    .map(DynamicImage::ImageRgb8)
            }
            b"DeviceGray" | b"G" if data.len() >= pixels => {
                ImageBuffer::<Luma<u8>, _>::from_raw(width, height, data[..pixels].to_vec())
                    .map(DynamicImage::ImageLuma8)
            }
            _ => {
                trace!(
                    "Could not decode raw image: {}x{}, {} bytes",
                    width,
                    height,
                    data.len()
                );
                None
            }
        }
    }
}

/// [`PageReader`] backed by [`PdfExtractor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfPageReader;

impl PageReader for PdfPageReader {
    fn page_count(&self, path: &Path) -> Result<u32> {
        Ok(PdfExtractor::open(path)?.page_count())
    }

    fn read_pages(&self, path: &Path) -> Result<Vec<Result<PageText>>> {
        Ok(PdfExtractor::open(path)?.pages())
    }
}
