//! HTTP client for the remote inpainting endpoint.
//!
//! Thin wrapper: posts the page image and its mask as multipart form
//! data and returns the cleaned image bytes. Timeout policy lives here,
//! not in the library; a timed-out request surfaces as
//! [`redeck::Error::CleaningTimeout`] so the resolver degrades the page.

use std::time::Duration;

use redeck::{Error, ImageCleaner, Mask, Result};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;

/// Default per-request timeout for cleaning calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Cleaning client for an HTTP inpainting service.
pub struct HttpCleaner {
    endpoint: String,
    timeout: Duration,
    client: Client,
}

impl HttpCleaner {
    /// Create a client for the given endpoint with a per-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Cleaning(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            timeout,
            client,
        })
    }
}

impl ImageCleaner for HttpCleaner {
    fn clean(&self, image: &[u8], mask: &Mask) -> Result<Vec<u8>> {
        let form = Form::new()
            .part("image", Part::bytes(image.to_vec()).file_name("page.png"))
            .part("mask", Part::bytes(mask.to_pgm()).file_name("mask.pgm"));

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    Error::CleaningTimeout(self.timeout)
                } else {
                    Error::Cleaning(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Cleaning(format!(
                "{} returned HTTP {}",
                self.endpoint, status
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| Error::Cleaning(format!("failed to read response body: {}", e)))?;

        if bytes.is_empty() {
            return Err(Error::Cleaning("empty response body".into()));
        }

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_endpoint_is_cleaning_error() {
        let cleaner =
            HttpCleaner::new("http://127.0.0.1:1/clean", Duration::from_millis(200)).unwrap();
        let mask = Mask::blank(4, 4);
        let result = cleaner.clean(b"image", &mask);
        assert!(matches!(
            result,
            Err(Error::Cleaning(_)) | Err(Error::CleaningTimeout(_))
        ));
    }
}
