use std::fmt::Debug;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::algorithm::{HmacSha256, HttpDigest, KeyedHash};
use crate::error::{HmacError, Result};
use crate::message::{MessageLike, StartLine};
use crate::signer::Signer;

/// Opaque struct storing a computed canonical message: the exact bytes that
/// are fed to the keyed hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalMessage {
    content: Vec<u8>,
}

impl CanonicalMessage {
    /// Obtain a view of this canonical message as a byte slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }
}

impl From<CanonicalMessage> for Vec<u8> {
    fn from(other: CanonicalMessage) -> Self {
        other.content
    }
}

/// A digest version: one fixed way of canonicalizing a message and hashing it.
///
/// The version used by a [`Signer`] is chosen when it is constructed and is
/// never inferred from the message being signed or verified.
pub trait DigestVersion: Debug + Send + Sync + 'static {
    /// Identifies this version.
    fn name(&self) -> &str;

    /// Compute the canonical representation of `message`, reading the content
    /// type, timestamp and custom headers through `signer`.
    fn canonicalize(&self, signer: &Signer, message: &dyn MessageLike)
        -> Result<CanonicalMessage>;

    /// The keyed hash applied to the canonical message.
    fn keyed_hash(&self) -> &dyn KeyedHash;

    /// Returns the base64-encoded digest of `message` under `secret_key`.
    fn sign(
        &self,
        signer: &Signer,
        message: &dyn MessageLike,
        secret_key: &[u8],
    ) -> Result<String> {
        if secret_key.is_empty() {
            return Err(HmacError::invalid_argument("Secret key must not be empty"));
        }
        let canonical = self.canonicalize(signer, message)?;
        Ok(self.keyed_hash().http_sign(secret_key, canonical.as_bytes()))
    }

    /// Returns true if `digest` is the digest of `message` under `secret_key`,
    /// compared in constant time.
    fn verify(
        &self,
        signer: &Signer,
        message: &dyn MessageLike,
        secret_key: &[u8],
        digest: &str,
    ) -> Result<bool> {
        if secret_key.is_empty() {
            return Err(HmacError::invalid_argument("Secret key must not be empty"));
        }
        let canonical = self.canonicalize(signer, message)?;
        Ok(self
            .keyed_hash()
            .http_verify(secret_key, canonical.as_bytes(), digest))
    }
}

/// The first digest version.
///
/// Parts are joined with `\n`. Requests contribute their method, the body
/// hash, the content type, the timestamp, the custom headers (one
/// `name: value` line each, lower-case names, configured order) and finally
/// the request target. Responses contribute their status code in place of the
/// method and nothing in place of the target.
#[derive(Debug, Clone)]
pub struct Version1 {
    keyed_hash: Arc<dyn KeyedHash>,
}

impl Default for Version1 {
    fn default() -> Self {
        Self::with_algorithm(HmacSha256)
    }
}

impl Version1 {
    /// Version 1 using `hmac-sha256`.
    pub fn new() -> Self {
        Self::default()
    }
    /// Version 1 using the given keyed hash.
    pub fn with_algorithm<K: KeyedHash>(keyed_hash: K) -> Self {
        Self::with_shared_algorithm(Arc::new(keyed_hash))
    }
    /// Version 1 using a keyed hash chosen at runtime, eg. through
    /// [`crate::keyed_hash_by_name`].
    pub fn with_shared_algorithm(keyed_hash: Arc<dyn KeyedHash>) -> Self {
        Version1 { keyed_hash }
    }
}

impl DigestVersion for Version1 {
    fn name(&self) -> &str {
        "1"
    }

    fn keyed_hash(&self) -> &dyn KeyedHash {
        &*self.keyed_hash
    }

    fn canonicalize(
        &self,
        signer: &Signer,
        message: &dyn MessageLike,
    ) -> Result<CanonicalMessage> {
        // Required headers come first so a malformed message is reported as
        // such even when its body is also unavailable.
        let content_type = signer.content_type(message)?;
        let timestamp = signer.timestamp(message)?;
        let custom_headers = signer.custom_headers(message);

        let body = message
            .body()
            .ok_or_else(|| HmacError::invalid_message("Message body could not be read"))?;
        let body_hash = Sha256::new().http_digest(body);

        let start_line = message.start_line();

        let mut content = Vec::new();
        match &start_line {
            StartLine::Request { method, .. } => content.extend(method.as_str().as_bytes()),
            StartLine::Response { status } => content.extend(status.as_str().as_bytes()),
        }
        content.push(b'\n');
        content.extend(body_hash.as_bytes());
        content.push(b'\n');
        content.extend(content_type.as_bytes());
        content.push(b'\n');
        content.extend(timestamp.as_bytes());
        content.push(b'\n');
        for (i, (name, value)) in custom_headers.iter().enumerate() {
            if i > 0 {
                content.push(b'\n');
            }
            content.extend(name.as_str().as_bytes());
            content.extend(b": ");
            content.extend(value.as_bytes());
        }
        if let StartLine::Request { target, .. } = &start_line {
            content.push(b'\n');
            content.extend(target.as_bytes());
        }

        Ok(CanonicalMessage { content })
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};

    use super::*;
    use crate::algorithm::HmacSha512;
    use crate::mock_message::{MockRequest, MockResponse};
    use crate::signer::SignerConfig;

    const DATE: &str = "Wed, 21 Oct 2015 07:28:00 GMT";

    fn signer(config: SignerConfig) -> Signer {
        Signer::new(config, Version1::new()).unwrap()
    }

    fn canonical_str(signer: &Signer, message: &dyn MessageLike) -> String {
        let canonical = signer.digest().canonicalize(signer, message).unwrap();
        String::from_utf8(canonical.into()).unwrap()
    }

    #[test]
    fn request_layout() {
        let signer = signer(
            SignerConfig::new()
                .add_custom_header("X-Custom-One")
                .unwrap()
                .add_custom_header("X-Custom-Two")
                .unwrap(),
        );
        let req = MockRequest::new(Method::POST, "http://example.com/resource/1?key=value")
            .with_header("Content-Type", "application/json")
            .with_header("Date", DATE)
            .with_header("X-Custom-Two", "two")
            .with_header("X-Custom-One", "one")
            .with_body(b"{}".to_vec());

        assert_eq!(
            canonical_str(&signer, &req),
            format!(
                "POST\n{}\napplication/json\n{}\nx-custom-one: one\nx-custom-two: two\n/resource/1?key=value",
                Sha256::new().http_digest(b"{}"),
                DATE
            )
        );
    }

    #[test]
    fn response_layout() {
        let signer = signer(SignerConfig::new());
        let res = MockResponse::new(StatusCode::OK)
            .with_header("Content-Type", "text/plain")
            .with_header("Date", DATE);

        assert_eq!(
            canonical_str(&signer, &res),
            format!("200\n{}\ntext/plain\n{}\n", Sha256::new().http_digest(b""), DATE)
        );
    }

    #[test]
    fn values_are_taken_verbatim() {
        let signer = signer(SignerConfig::new());
        let req = MockRequest::new(Method::GET, "http://example.com/")
            .with_header("Content-Type", "Text/Plain; Charset=UTF-8")
            .with_header("Date", DATE);

        assert!(canonical_str(&signer, &req).contains("\nText/Plain; Charset=UTF-8\n"));
    }

    #[test]
    fn missing_content_type_aborts() {
        let signer = signer(SignerConfig::new());
        let req = MockRequest::new(Method::GET, "http://example.com/").with_header("Date", DATE);

        assert_eq!(
            signer.digest().canonicalize(&signer, &req).unwrap_err(),
            HmacError::MalformedMessage("Content type header required".into())
        );
    }

    #[test]
    fn missing_timestamp_aborts() {
        let signer = signer(SignerConfig::new());
        let req = MockRequest::new(Method::GET, "http://example.com/")
            .with_header("Content-Type", "text/plain");

        assert_eq!(
            signer.digest().canonicalize(&signer, &req).unwrap_err(),
            HmacError::MalformedMessage("Date header required".into())
        );
    }

    #[test]
    fn unreadable_body_is_invalid() {
        let signer = signer(SignerConfig::new());
        let req = MockRequest::new(Method::PUT, "http://example.com/")
            .with_header("Content-Type", "text/plain")
            .with_header("Date", DATE)
            .with_unreadable_body();

        match signer.digest().canonicalize(&signer, &req) {
            Err(HmacError::InvalidMessage(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn empty_secret_key_is_rejected() {
        let signer = signer(SignerConfig::new());
        let req = MockRequest::new(Method::GET, "http://example.com/")
            .with_header("Content-Type", "text/plain")
            .with_header("Date", DATE);

        match signer.sign_message(&req, b"") {
            Err(HmacError::InvalidArgument(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn verify_matches_sign() {
        let signer = signer(SignerConfig::new());
        let req = MockRequest::new(Method::GET, "http://example.com/")
            .with_header("Content-Type", "text/plain")
            .with_header("Date", DATE);
        let digest = signer.sign_message(&req, b"secret").unwrap();

        let version = signer.digest();
        assert!(version.verify(&signer, &req, b"secret", &digest).unwrap());
        assert!(!version.verify(&signer, &req, b"other", &digest).unwrap());
        assert!(version.verify(&signer, &req, b"", &digest).is_err());
    }

    #[test]
    fn algorithm_changes_digest() {
        let sha256 = signer(SignerConfig::new());
        let sha512 = Signer::new(SignerConfig::new(), Version1::with_algorithm(HmacSha512)).unwrap();
        let req = MockRequest::new(Method::GET, "http://example.com/")
            .with_header("Content-Type", "text/plain")
            .with_header("Date", DATE);

        let a = sha256.sign_message(&req, b"secret").unwrap();
        let b = sha512.sign_message(&req, b"secret").unwrap();
        assert_eq!(base64::decode(&a).unwrap().len(), 32);
        assert_eq!(base64::decode(&b).unwrap().len(), 64);
    }
}
