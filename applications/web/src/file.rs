//! Picked-file adapter

use crate::media::describe_js_error;
use async_trait::async_trait;
use cassette_core::{CassetteError, FileSource};
use wasm_bindgen_futures::JsFuture;

/// A `File` from an `<input type="file">`
#[derive(Debug, Clone)]
pub struct BrowserFile {
    file: web_sys::File,
}

impl BrowserFile {
    pub fn new(file: web_sys::File) -> Self {
        Self { file }
    }
}

#[async_trait(?Send)]
impl FileSource for BrowserFile {
    fn name(&self) -> String {
        self.file.name()
    }

    fn mime_type(&self) -> Option<String> {
        Some(self.file.type_()).filter(|mime| !mime.is_empty())
    }

    async fn read_all(&self) -> cassette_core::Result<Vec<u8>> {
        let buffer = JsFuture::from(self.file.array_buffer())
            .await
            .map_err(|e| {
                CassetteError::encoding(format!(
                    "cannot read {}: {}",
                    self.file.name(),
                    describe_js_error(e)
                ))
            })?;
        Ok(js_sys::Uint8Array::new(&buffer).to_vec())
    }
}
