use std::path::Path;

use crate::cache::{url_from_record, UploadCache};
use crate::config::ClientOptions;
use crate::errors::AppResult;
use crate::hoster::HosterConfig;
use crate::security::InputValidator;

use super::transport::{FormPart, HttpTransport, Transport};

/// Map a hoster's mime parts onto request fields for `path`, keeping order.
pub fn build_form_parts(path: &Path, config: &HosterConfig) -> Vec<FormPart> {
    config
        .mime_parts
        .iter()
        .map(|part| {
            if part.is_file_data {
                FormPart::File {
                    name: part.name.clone(),
                    path: path.to_path_buf(),
                }
            } else {
                FormPart::Text {
                    name: part.name.clone(),
                    value: part.data.clone(),
                }
            }
        })
        .collect()
}

/// Uploads one file at a time, reusing cached URLs where possible.
pub struct Uploader<T: Transport = HttpTransport> {
    transport: T,
    cache: UploadCache,
}

impl Uploader<HttpTransport> {
    pub fn with_options(cache: UploadCache, options: &ClientOptions) -> AppResult<Self> {
        Ok(Self::new(HttpTransport::new(options)?, cache))
    }
}

impl<T: Transport> Uploader<T> {
    pub fn new(transport: T, cache: UploadCache) -> Self {
        Self { transport, cache }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn cache(&self) -> &UploadCache {
        &self.cache
    }

    /// Upload `path` to `config` and return the URL the hoster answered with.
    ///
    /// The response body is cached whatever the HTTP status, so an error page
    /// is reused until the record goes stale. The returned URL is the body's
    /// first non-blank line, the same value a later cache hit yields. A
    /// transport failure is logged and yields an empty string (also cached,
    /// but an empty record never counts as a hit). Callers must treat an
    /// empty or odd-looking result as a failed upload.
    ///
    /// Only a missing source file (when the config sends file data) or a
    /// failed cache write is an `Err`.
    pub fn upload_file(&self, path: impl AsRef<Path>, config: &HosterConfig) -> AppResult<String> {
        let path = path.as_ref();

        if let Some(url) = self.cache.check_upload_cache(path) {
            log::info!("Using cached URL for {}", path.display());
            return Ok(url);
        }

        if config.mime_parts.iter().any(|part| part.is_file_data) {
            InputValidator::validate_upload_file(path)?;
        }

        let parts = build_form_parts(path, config);
        log::info!("Uploading {} to {} ({})", path.display(), config.name, config.url);

        let body = match self.transport.post_multipart(&config.url, &parts) {
            Ok(response) => {
                log::debug!("Response code: {}", response.status);
                if !response.is_success() {
                    log::warn!(
                        "Hoster {} answered {} for {}",
                        config.name,
                        response.status,
                        path.display()
                    );
                }
                log::info!("Upload response: {}", response.body);
                response.body
            }
            Err(e) => {
                log::error!("Upload of {} to {} failed: {}", path.display(), config.url, e);
                String::new()
            }
        };

        self.cache.store_cached_url(path, &body)?;
        Ok(url_from_record(&body).to_string())
    }
}
