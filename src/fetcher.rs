//! HTTP retrieval of the Sina gold price history page.
//!
//! One GET per category, no retries. The page is served in a legacy Chinese
//! encoding more often than not, so the body is decoded by trying a short
//! ordered list of encodings until one yields clean text.

use std::borrow::Cow;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use encoding_rs::Encoding;
use reqwest::blocking::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::config;
use crate::error::{GoldError, Result};
use crate::models::GoldType;

// ---------------------------------------------------------------------------
// FetchOptions
// ---------------------------------------------------------------------------

/// Per-call overrides for a fetch. Anything left `None` falls back to the
/// category's registry entry and a trailing 30-day window.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Replaces the registry's `(pp, pz)` pair.
    pub params: Option<(u32, u32)>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Replaces the builder's base URL.
    pub url: Option<String>,
}

impl FetchOptions {
    pub fn with_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn with_params(mut self, pp: u32, pz: u32) -> Self {
        self.params = Some((pp, pz));
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Resolve the full query for `gold_type`, relative to `today`.
    pub fn query_for(&self, gold_type: GoldType, today: NaiveDate) -> Result<QueryParams> {
        let cfg = gold_type.config();
        let (pp, pz) = self.params.unwrap_or((cfg.pp, cfg.pz));
        let end = self.end.unwrap_or(today);
        let start = self
            .start
            .unwrap_or_else(|| end - chrono::Duration::days(config::DEFAULT_LOOKBACK_DAYS));
        if start > end {
            return Err(GoldError::InvalidArgument(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(QueryParams { pp, pz, start, end })
    }
}

/// The exact query string sent for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryParams {
    pub pp: u32,
    pub pz: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl QueryParams {
    pub fn pairs(&self) -> [(&'static str, String); 4] {
        [
            ("pp", self.pp.to_string()),
            ("pz", self.pz.to_string()),
            ("start", self.start.format("%Y-%m-%d").to_string()),
            ("end", self.end.format("%Y-%m-%d").to_string()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Blocking HTTP client for the price history endpoint.
pub struct Fetcher {
    base_url: String,
    timeout: Duration,
    client: Option<Client>,
}

impl Fetcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            client: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lazy HTTP client, created on first use.
    fn client(&mut self) -> Result<&Client> {
        let client = match self.client.take() {
            Some(client) => client,
            None => {
                let mut headers = HeaderMap::new();
                headers.insert(header::ACCEPT, HeaderValue::from_static(config::ACCEPT));
                headers.insert(
                    header::ACCEPT_LANGUAGE,
                    HeaderValue::from_static(config::ACCEPT_LANGUAGE),
                );
                Client::builder()
                    .timeout(self.timeout)
                    .user_agent(config::USER_AGENT)
                    .default_headers(headers)
                    .redirect(reqwest::redirect::Policy::limited(10))
                    .build()?
            }
        };
        Ok(self.client.insert(client))
    }

    /// Fetch the raw page for `gold_type` and return it decoded.
    pub fn fetch(&mut self, gold_type: GoldType, opts: &FetchOptions) -> Result<String> {
        let query = opts.query_for(gold_type, Local::now().date_naive())?;
        let url = opts.url.clone().unwrap_or_else(|| self.base_url.clone());

        tracing::info!(
            category = %gold_type,
            %url,
            pp = query.pp,
            pz = query.pz,
            start = %query.start,
            end = %query.end,
            "fetching {}",
            gold_type.name()
        );

        let resp = self
            .client()?
            .get(&url)
            .query(&query.pairs())
            .send()?
            .error_for_status()?;

        let declared = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_label)
            .map(str::to_owned);
        let bytes = resp.bytes()?;

        let (text, encoding) = decode_body(&bytes, declared.as_deref())?;
        tracing::info!(
            category = %gold_type,
            encoding,
            chars = text.chars().count(),
            "decoded response"
        );
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Extract the `charset=` value from a `Content-Type` header.
fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Decode a response body, trying the declared charset (if known) and then
/// the fixed candidate list.
///
/// A candidate counts only if it decodes without a single malformed
/// sequence. The first clean decode that contains one of the page's marker
/// words wins; failing that, the first clean decode. Returns the text and
/// the name of the encoding used.
pub fn decode_body(bytes: &[u8], declared: Option<&str>) -> Result<(String, &'static str)> {
    let mut candidates: Vec<&'static Encoding> = Vec::with_capacity(4);
    if let Some(enc) = declared.and_then(|l| Encoding::for_label(l.as_bytes())) {
        candidates.push(enc);
    }
    for enc in config::candidate_encodings() {
        if !candidates.contains(&enc) {
            candidates.push(enc);
        }
    }

    let mut fallback: Option<(Cow<'_, str>, &'static str)> = None;
    for enc in &candidates {
        match enc.decode_without_bom_handling_and_without_replacement(bytes) {
            Some(text) => {
                if config::PAGE_MARKERS.iter().any(|m| text.contains(m)) {
                    return Ok((text.into_owned(), enc.name()));
                }
                tracing::debug!(encoding = enc.name(), "decoded cleanly but no marker words");
                if fallback.is_none() {
                    fallback = Some((text, enc.name()));
                }
            }
            None => tracing::debug!(encoding = enc.name(), "malformed sequences, trying next"),
        }
    }

    match fallback {
        Some((text, name)) => {
            tracing::warn!(encoding = name, "no marker words in any decoding; using first clean one");
            Ok((text.into_owned(), name))
        }
        None => Err(GoldError::Encoding {
            tried: candidates.iter().map(|e| e.name()).collect(),
        }),
    }
}
