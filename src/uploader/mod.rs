// Uploader module - sends captures to the configured hoster
//
// The cache is consulted before any network activity. Requests go through
// the Transport trait; HttpTransport is the reqwest implementation.

pub mod client;
pub mod transport;

pub use client::{build_form_parts, Uploader};
pub use transport::{FormPart, HttpTransport, Transport, TransportResponse};
