//! Translation capability consumed by the interactive single-item flows.
//! The provider is a black box: `translate(text, source, target) -> text`,
//! rate and availability not guaranteed.

use catloc_core::Locale;

mod sync;

pub use sync::{fold_translations, synchronize, SyncMode, BATCH_DELIMITER};

#[derive(thiserror::Error, Debug)]
pub enum TranslateError {
    /// Precondition defect: the source translation's mandatory field is
    /// blank, so there is nothing meaningful to fan out.
    #[error("source translation has a blank mandatory field `{0}`")]
    BlankSource(&'static str),
    #[error("translation transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("batched response came back as {got} segments, {sent} were sent")]
    SegmentMismatch { sent: usize, got: usize },
    #[error("translation worker panicked")]
    WorkerPanic,
}

pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, source: Locale, target: Locale)
        -> Result<String, TranslateError>;
}

/// LibreTranslate-shaped HTTP provider.
pub struct RestTranslator {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl RestTranslator {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        RestTranslator {
            endpoint: endpoint.into(),
            api_key,
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Translator for RestTranslator {
    fn translate(
        &self,
        text: &str,
        source: Locale,
        target: Locale,
    ) -> Result<String, TranslateError> {
        #[derive(serde::Serialize)]
        struct In<'a> {
            q: &'a str,
            source: &'a str,
            target: &'a str,
            format: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            api_key: Option<&'a str>,
        }
        #[derive(serde::Deserialize)]
        struct Out {
            #[serde(rename = "translatedText")]
            translated_text: String,
        }
        let url = format!("{}/translate", self.endpoint.trim_end_matches('/'));
        let resp = self
            .client
            .post(url)
            .json(&In {
                q: text,
                source: source.code(),
                target: target.code(),
                format: "text",
                api_key: self.api_key.as_deref(),
            })
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().unwrap_or_default();
            return Err(TranslateError::Provider {
                status: status.as_u16(),
                message,
            });
        }
        let out: Out = resp.json()?;
        Ok(out.translated_text)
    }
}
