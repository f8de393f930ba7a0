use std::fmt;
use std::sync::Arc;

use http::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE, DATE};
use itertools::Itertools;
use regex::Regex;

use crate::canonicalize::{DigestVersion, Version1};
use crate::error::{HmacError, Result};
use crate::header::ConfiguredHeader;
use crate::message::MessageLike;
use crate::signature::{parse_timestamp, Signature};

/// Provider used when none is configured.
pub const DEFAULT_PROVIDER: &str = "Acquia";

/// Configuration for a [`Signer`].
///
/// The configuration is assembled once with the `with_*`/`add_*` methods and
/// then handed to [`Signer::new`], which validates and freezes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerConfig {
    provider: String,
    timestamp_headers: Vec<ConfiguredHeader>,
    custom_headers: Vec<ConfiguredHeader>,
}

impl Default for SignerConfig {
    fn default() -> Self {
        SignerConfig {
            provider: DEFAULT_PROVIDER.into(),
            timestamp_headers: vec![ConfiguredHeader::from(DATE)],
            custom_headers: Vec::new(),
        }
    }
}

fn parse_headers<I, S>(headers: I) -> Result<Vec<ConfiguredHeader>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    headers
        .into_iter()
        .map(|header| {
            let header = header.as_ref();
            header.parse().map_err(|_| {
                HmacError::invalid_argument(format!("Invalid header name: {:?}", header))
            })
        })
        .collect()
}

impl SignerConfig {
    /// Creates a new configuration using the default values: provider
    /// `Acquia`, timestamp header `Date` and no custom headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the provider label prefixing the `Authorization` value.
    pub fn provider(&self) -> &str {
        &self.provider
    }
    /// Set the provider label prefixing the `Authorization` value.
    pub fn with_provider(mut self, provider: &str) -> Self {
        self.provider = provider.into();
        self
    }

    /// Returns the candidate timestamp headers, in order of preference.
    pub fn timestamp_headers(&self) -> &[ConfiguredHeader] {
        &self.timestamp_headers
    }
    /// Replace the candidate timestamp headers. The first header present on a
    /// message is used.
    pub fn with_timestamp_headers<I, S>(mut self, headers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.timestamp_headers = parse_headers(headers)?;
        Ok(self)
    }
    /// Append a candidate timestamp header.
    pub fn add_timestamp_header(mut self, header: &str) -> Result<Self> {
        self.timestamp_headers.extend(parse_headers(Some(header))?);
        Ok(self)
    }

    /// Returns the custom headers folded into the signature, in order.
    pub fn custom_headers(&self) -> &[ConfiguredHeader] {
        &self.custom_headers
    }
    /// Replace the custom headers folded into the signature.
    pub fn with_custom_headers<I, S>(mut self, headers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.custom_headers = parse_headers(headers)?;
        Ok(self)
    }
    /// Append a custom header to be folded into the signature.
    pub fn add_custom_header(mut self, header: &str) -> Result<Self> {
        self.custom_headers.extend(parse_headers(Some(header))?);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.provider.is_empty() {
            return Err(HmacError::invalid_argument("Provider must not be empty"));
        }
        if !self.provider.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(HmacError::invalid_argument(
                "Provider must be visible ASCII without whitespace",
            ));
        }
        if self.timestamp_headers.is_empty() {
            return Err(HmacError::invalid_argument(
                "At least one timestamp header must be configured",
            ));
        }
        Ok(())
    }
}

/// Signs and verifies messages travelling in one direction.
///
/// A signer is a frozen configuration plus a digest version. Every operation
/// is a pure function of that configuration, the message and the secret key.
#[derive(Clone)]
pub struct Signer {
    config: SignerConfig,
    digest: Arc<dyn DigestVersion>,
    pattern: Regex,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Signer")
            .field("config", &self.config)
            .field("digest", &self.digest)
            .finish()
    }
}

impl Default for Signer {
    fn default() -> Self {
        Self::new(SignerConfig::default(), Version1::default())
            .expect("Default configuration is valid")
    }
}

impl Signer {
    /// Creates a signer from a configuration and a digest version.
    pub fn new<D: DigestVersion>(config: SignerConfig, digest: D) -> Result<Self> {
        Self::new_shared(config, Arc::new(digest))
    }

    /// Creates a signer sharing an existing digest version.
    pub fn new_shared(config: SignerConfig, digest: Arc<dyn DigestVersion>) -> Result<Self> {
        config.validate()?;
        let pattern = format!(
            "^{} ([a-zA-Z0-9]+):([a-zA-Z0-9+/]+={{0,2}})$",
            regex::escape(&config.provider)
        );
        let pattern = Regex::new(&pattern)
            .map_err(|e| HmacError::invalid_argument(format!("Invalid provider: {}", e)))?;
        Ok(Signer {
            config,
            digest,
            pattern,
        })
    }

    /// Returns the configuration this signer was built with.
    pub fn config(&self) -> &SignerConfig {
        &self.config
    }
    /// Returns the provider label.
    pub fn provider(&self) -> &str {
        &self.config.provider
    }
    /// Returns the candidate timestamp headers.
    pub fn timestamp_headers(&self) -> &[ConfiguredHeader] {
        &self.config.timestamp_headers
    }
    /// Returns the configured custom header names.
    pub fn custom_header_names(&self) -> &[ConfiguredHeader] {
        &self.config.custom_headers
    }
    /// Returns the digest version.
    pub fn digest(&self) -> &dyn DigestVersion {
        &*self.digest
    }

    /// Computes the digest of `message` under `secret_key`.
    pub fn sign_message<M: MessageLike + ?Sized>(
        &self,
        message: &M,
        secret_key: &[u8],
    ) -> Result<String> {
        self.digest.sign(self, &message, secret_key)
    }

    /// Returns the value of the `Authorization` header for `message`, in the
    /// form `<provider> <id>:<digest>`.
    pub fn authorization<M: MessageLike + ?Sized>(
        &self,
        message: &M,
        id: &str,
        secret_key: &[u8],
    ) -> Result<String> {
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(HmacError::invalid_argument(
                "Credential id must be alphanumeric",
            ));
        }
        let digest = self.sign_message(message, secret_key)?;
        debug!(
            "hmac: signed message for {:?} with provider {:?} (digest version {})",
            id,
            self.config.provider,
            self.digest.name()
        );
        Ok(format!("{} {}:{}", self.config.provider, id, digest))
    }

    /// Like [`Signer::authorization`], but returns a header value ready to be
    /// attached to the message.
    pub fn authorization_header<M: MessageLike + ?Sized>(
        &self,
        message: &M,
        id: &str,
        secret_key: &[u8],
    ) -> Result<HeaderValue> {
        let value = self.authorization(message, id, secret_key)?;
        HeaderValue::from_str(&value)
            .map_err(|_| HmacError::invalid_argument("Provider is not a valid header value"))
    }

    /// Gets the signature carried by `message`.
    pub fn extract_signature<M: MessageLike + ?Sized>(&self, message: &M) -> Result<Signature> {
        let auth_header = message
            .header(&AUTHORIZATION)
            .ok_or_else(|| HmacError::malformed("Authorization header required"))?;

        let (id, digest) = auth_header
            .to_str()
            .ok()
            .and_then(|value| self.pattern.captures(value))
            .map(|captures| (captures[1].to_owned(), captures[2].to_owned()))
            .ok_or_else(|| HmacError::malformed("Authorization header not valid"))?;

        let timestamp = self.timestamp(message)?;
        let timestamp = timestamp
            .to_str()
            .map_err(|_| HmacError::malformed("Timestamp not valid"))
            .and_then(parse_timestamp)?;

        Ok(Signature::new(id, digest, timestamp))
    }

    /// Returns the content type of `message`.
    pub fn content_type<M: MessageLike + ?Sized>(&self, message: &M) -> Result<HeaderValue> {
        message
            .header(&CONTENT_TYPE)
            .ok_or_else(|| HmacError::malformed("Content type header required"))
    }

    /// Returns the raw value of the first configured timestamp header present
    /// on `message`.
    pub fn timestamp<M: MessageLike + ?Sized>(&self, message: &M) -> Result<HeaderValue> {
        let headers = &self.config.timestamp_headers;
        if let Some(value) = headers.iter().find_map(|header| message.header(header.name())) {
            return Ok(value);
        }

        let reason = match headers.as_slice() {
            [header] => format!("{} header required", header),
            headers => format!(
                "At least one of the following headers is required: {}",
                headers.iter().join(", ")
            ),
        };
        Err(HmacError::malformed(reason))
    }

    /// Returns the configured custom headers present on `message`, in
    /// configured order. Absent headers are omitted.
    pub fn custom_headers<M: MessageLike + ?Sized>(
        &self,
        message: &M,
    ) -> Vec<(ConfiguredHeader, HeaderValue)> {
        self.config
            .custom_headers
            .iter()
            .filter_map(|header| {
                message
                    .header(header.name())
                    .map(|value| (header.clone(), value))
            })
            .collect()
    }

    /// Verifies `message` against `secret_key`, returning the signature it
    /// carries when the digest matches.
    ///
    /// A mismatch is reported as [`HmacError::VerificationFailed`] without
    /// further detail. The timestamp is parsed but no freshness policy is
    /// applied.
    pub fn verify<M: MessageLike + ?Sized>(
        &self,
        message: &M,
        secret_key: &[u8],
    ) -> Result<Signature> {
        let signature = self.extract_signature(message)?;
        self.verify_signature(message, signature, secret_key)
    }

    /// Checks an already extracted `signature` against the digest of `message`.
    pub(crate) fn verify_signature<M: MessageLike + ?Sized>(
        &self,
        message: &M,
        signature: Signature,
        secret_key: &[u8],
    ) -> Result<Signature> {
        if self
            .digest
            .verify(self, &message, secret_key, signature.digest())?
        {
            debug!("hmac: verified message for {:?}", signature.id());
            Ok(signature)
        } else {
            debug!("hmac: digest mismatch for {:?}", signature.id());
            Err(HmacError::VerificationFailed)
        }
    }
}
