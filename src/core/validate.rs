//! Field validators and the registry that maps metadata fields to them.
//!
//! A validator never fails the run. It answers with a [`Verdict`]: the value is
//! fine, the value is wrong, or the value could not be checked at all. The
//! reconciler treats the last two the same way and cuts a ticket.
//!
//! # Standard fields
//!
//! - `sopsUrl`: URL that must resolve to a document
//! - `architectureDocument`: URL that must resolve to a document
//! - `grafanaUrls`: list of `{url}` records, every URL must resolve
//! - `serviceOwners`: non-empty list of `{name, email}` owners

use crate::core::error::CheckpointError;
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, LazyLock};

/// Loose address grammar. Full RFC 5322 is rejected on purpose since many
/// mail clients choke on carefully crafted valid addresses.
static EMAIL_ADDRESS_REGEXP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+[-\w.]*@(?:\w[-\w]*\w\.)+\w+$").unwrap());

/// Per RFC 3696.
pub const MAX_EMAIL_ADDRESS_LENGTH: usize = 320;

/// First HTTP status that means the document is not there.
pub const HTTP_NOT_FOUND: u16 = 404;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid,
    /// The value could not be checked; carries the reason.
    Error(String),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

impl From<bool> for Verdict {
    fn from(ok: bool) -> Self {
        if ok { Verdict::Valid } else { Verdict::Invalid }
    }
}

pub trait FieldValidator {
    fn check(&self, value: Option<&Value>) -> Verdict;
}

impl<F> FieldValidator for F
where
    F: Fn(Option<&Value>) -> Verdict,
{
    fn check(&self, value: Option<&Value>) -> Verdict {
        self(value)
    }
}

/// Issues a GET against a URL and reports the final status code.
///
/// Transport failures (DNS, TLS, refused connections, timeouts) are errors;
/// any status the server answered with, including 4xx/5xx, is `Ok`.
pub trait HttpProbe {
    fn status(&self, url: &str) -> Result<u16, CheckpointError>;
}

/// A URL is acceptable when the server answers below 404. Codes 400-403 mean
/// the document exists but may need credentials we don't have.
pub struct UrlReachable {
    probe: Arc<dyn HttpProbe>,
}

impl UrlReachable {
    pub fn new(probe: Arc<dyn HttpProbe>) -> Self {
        Self { probe }
    }

    fn probe_url(&self, url: &str) -> Verdict {
        match self.probe.status(url) {
            Ok(code) => Verdict::from(code < HTTP_NOT_FOUND),
            Err(e) => Verdict::Error(format!("probing {} failed: {}", url, e)),
        }
    }
}

impl FieldValidator for UrlReachable {
    fn check(&self, value: Option<&Value>) -> Verdict {
        match value {
            None | Some(Value::Null) => Verdict::Invalid,
            Some(Value::String(url)) if url.is_empty() => Verdict::Invalid,
            Some(Value::String(url)) => self.probe_url(url),
            Some(other) => Verdict::Error(format!("expected a URL string, got {}", other)),
        }
    }
}

/// Every `url` in a list of records must be reachable. An empty list passes.
pub struct UrlListReachable {
    inner: UrlReachable,
}

impl UrlListReachable {
    pub fn new(probe: Arc<dyn HttpProbe>) -> Self {
        Self {
            inner: UrlReachable::new(probe),
        }
    }
}

impl FieldValidator for UrlListReachable {
    fn check(&self, value: Option<&Value>) -> Verdict {
        let items = match value {
            None | Some(Value::Null) => return Verdict::Invalid,
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Verdict::Error(format!("expected a list of URL records, got {}", other));
            }
        };
        for item in items {
            let Some(url) = item.get("url").and_then(Value::as_str) else {
                return Verdict::Error(format!("record without a url: {}", item));
            };
            let verdict = self.inner.probe_url(url);
            if !verdict.is_valid() {
                return verdict;
            }
        }
        Verdict::Valid
    }
}

pub struct OwnersValid;

impl FieldValidator for OwnersValid {
    fn check(&self, value: Option<&Value>) -> Verdict {
        match value {
            None | Some(Value::Null) => Verdict::Invalid,
            Some(Value::Array(owners)) => {
                Verdict::from(!owners.is_empty() && owners.iter().all(owner_is_valid))
            }
            Some(other) => Verdict::Error(format!("expected a list of owners, got {}", other)),
        }
    }
}

fn owner_is_valid(owner: &Value) -> bool {
    let name = owner.get("name").and_then(Value::as_str).unwrap_or("");
    let email = owner.get("email").and_then(Value::as_str).unwrap_or("");
    !name.is_empty() && email_is_valid(email)
}

pub fn email_is_valid(email: &str) -> bool {
    !email.is_empty()
        && email.chars().count() <= MAX_EMAIL_ADDRESS_LENGTH
        && EMAIL_ADDRESS_REGEXP.is_match(email)
}

/// Ordered field -> validator mapping. Order only decides check order.
#[derive(Default)]
pub struct ValidatorRegistry {
    entries: Vec<(String, Box<dyn FieldValidator>)>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn standard(probe: Arc<dyn HttpProbe>) -> Self {
        Self::new()
            .with("sopsUrl", UrlReachable::new(Arc::clone(&probe)))
            .with("architectureDocument", UrlReachable::new(Arc::clone(&probe)))
            .with("grafanaUrls", UrlListReachable::new(probe))
            .with("serviceOwners", OwnersValid)
    }

    /// Registers `validator` for `field`. Re-registering a field swaps the
    /// validator in place.
    pub fn with(mut self, field: &str, validator: impl FieldValidator + 'static) -> Self {
        let boxed: Box<dyn FieldValidator> = Box::new(validator);
        match self.entries.iter_mut().find(|(name, _)| name == field) {
            Some(entry) => entry.1 = boxed,
            None => self.entries.push((field.to_string(), boxed)),
        }
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn FieldValidator)> {
        self.entries
            .iter()
            .map(|(name, validator)| (name.as_str(), validator.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
