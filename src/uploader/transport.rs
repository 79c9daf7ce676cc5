use reqwest::blocking::{multipart, Client};
use std::path::{Path, PathBuf};

use crate::config::ClientOptions;
use crate::errors::AppResult;

/// One field of a multipart request, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a multipart POST and returns whatever came back.
///
/// `Err` means the request never produced a response (connection refused,
/// timeout, TLS failure, unreadable file). Any HTTP status is `Ok`.
pub trait Transport {
    fn post_multipart(&self, url: &str, parts: &[FormPart]) -> AppResult<TransportResponse>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(options: &ClientOptions) -> AppResult<Self> {
        if options.accept_invalid_certs {
            log::warn!("TLS certificate verification is disabled for uploads");
        }

        let client = Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()?;

        Ok(Self { client })
    }

    fn file_part(path: &Path) -> AppResult<multipart::Part> {
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let mime_type = mime_guess::from_path(path).first_or_octet_stream();

        Ok(multipart::Part::bytes(data)
            .file_name(filename)
            .mime_str(mime_type.essence_str())?)
    }

    fn build_form(parts: &[FormPart]) -> AppResult<multipart::Form> {
        let mut form = multipart::Form::new();

        for part in parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                FormPart::File { name, path } => form.part(name.clone(), Self::file_part(path)?),
            };
        }

        Ok(form)
    }
}

impl Transport for HttpTransport {
    fn post_multipart(&self, url: &str, parts: &[FormPart]) -> AppResult<TransportResponse> {
        let form = Self::build_form(parts)?;
        let response = self.client.post(url).multipart(form).send()?;

        let status = response.status().as_u16();
        let body = response.text()?;

        Ok(TransportResponse { status, body })
    }
}
