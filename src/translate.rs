//! Translation capability.
//!
//! [`Translator`] is the seam the entry transformer calls through.
//! [`GoogleTranslator`] talks to the public Google Translate web endpoint,
//! the same one browser extensions use, so no API key is needed.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;

const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

pub trait Translator {
    /// Translate `text` from language `src` into `dest`.
    fn translate(&self, text: &str, src: &str, dest: &str) -> Result<String>;
}

impl<T: Translator + ?Sized> Translator for &T {
    fn translate(&self, text: &str, src: &str, dest: &str) -> Result<String> {
        (**self).translate(text, src, dest)
    }
}

pub struct GoogleTranslator {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl Translator for GoogleTranslator {
    fn translate(&self, text: &str, src: &str, dest: &str) -> Result<String> {
        // Abstracts run to a few thousand characters, so the text goes in
        // the form body rather than the query string.
        let body: Value = self
            .client
            .post(&self.endpoint)
            .query(&[("client", "gtx"), ("sl", src), ("tl", dest), ("dt", "t")])
            .form(&[("q", text)])
            .send()
            .context("translation request failed")?
            .error_for_status()
            .context("translation service rejected the request")?
            .json()
            .context("translation response is not JSON")?;

        parse_response(&body)
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The payload is a nested array; element 0 holds one
/// `[translated, original, ...]` array per sentence.
fn parse_response(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("unexpected translation response shape: {body}"))?;

    Ok(segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect())
}
