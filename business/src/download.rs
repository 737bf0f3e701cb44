//! Saving rendered PNGs through the platform's download mechanism.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::error::DownloadError;

/// `qr-code-<unix millis>.png`
pub fn download_filename(at: DateTime<Utc>) -> String {
    format!("qr-code-{}.png", at.timestamp_millis())
}

/// Where downloaded files go.
pub trait DownloadSink {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<(), DownloadError>;
}

impl<T: DownloadSink + ?Sized> DownloadSink for Box<T> {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<(), DownloadError> {
        (**self).save(filename, bytes)
    }
}

/// A file handed to a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Keeps downloads in memory. Clones share the same file list.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: Rc<RefCell<Vec<SavedFile>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> Vec<SavedFile> {
        self.files.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.files.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.borrow().is_empty()
    }
}

impl DownloadSink for MemorySink {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<(), DownloadError> {
        self.files.borrow_mut().push(SavedFile {
            filename: filename.to_owned(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::DirectorySink;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::path::{Path, PathBuf};

    use super::DownloadSink;
    use crate::error::DownloadError;

    /// Writes downloads into a directory, usually the user's Downloads folder.
    #[derive(Debug, Clone)]
    pub struct DirectorySink {
        dir: PathBuf,
    }

    impl DirectorySink {
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self { dir: dir.into() }
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }
    }

    impl DownloadSink for DirectorySink {
        fn save(&self, filename: &str, bytes: &[u8]) -> Result<(), DownloadError> {
            let path = self.dir.join(filename);
            let io_err = |source: std::io::Error| DownloadError::Io {
                path: path.display().to_string(),
                source,
            };
            fs::create_dir_all(&self.dir).map_err(io_err)?;
            fs::write(&path, bytes).map_err(io_err)?;
            log::info!("saved {} ({} bytes)", path.display(), bytes.len());
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn writes_file_into_directory() {
            let dir = tempfile::tempdir().unwrap();
            let sink = DirectorySink::new(dir.path().join("downloads"));

            sink.save("qr-code-1.png", b"png").unwrap();

            let written = fs::read(dir.path().join("downloads/qr-code-1.png")).unwrap();
            assert_eq!(written, b"png");
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::BrowserDownload;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::js_sys;

    use super::DownloadSink;
    use crate::error::DownloadError;

    fn js_err(value: JsValue) -> DownloadError {
        DownloadError::Browser(format!("{value:?}"))
    }

    /// Triggers the browser's download of an object URL through a temporary
    /// `<a download>` element.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct BrowserDownload;

    impl DownloadSink for BrowserDownload {
        fn save(&self, filename: &str, bytes: &[u8]) -> Result<(), DownloadError> {
            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or_else(|| DownloadError::Browser("no document".to_owned()))?;
            let body = document
                .body()
                .ok_or_else(|| DownloadError::Browser("no body".to_owned()))?;

            let parts = js_sys::Array::new();
            parts.push(&js_sys::Uint8Array::from(bytes));
            let options = web_sys::BlobPropertyBag::new();
            options.set_type("image/png");
            let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
                .map_err(js_err)?;
            let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_err)?;

            let anchor: web_sys::HtmlAnchorElement = document
                .create_element("a")
                .map_err(js_err)?
                .dyn_into()
                .map_err(|el| js_err(el.into()))?;
            anchor.set_href(&url);
            anchor.set_download(filename);
            body.append_child(&anchor).map_err(js_err)?;
            anchor.click();
            body.remove_child(&anchor).map_err(js_err)?;
            web_sys::Url::revoke_object_url(&url).map_err(js_err)?;

            log::info!("downloaded {filename} ({} bytes)", bytes.len());
            Ok(())
        }
    }
}
