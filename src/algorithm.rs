use std::fmt::Debug;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
use subtle::ConstantTimeEq;

/// Implementations of this trait are keyed-hash algorithms used to turn a
/// canonical message and a secret key into the digest carried in the
/// `Authorization` header.
pub trait KeyedHash: Debug + Send + Sync + 'static {
    /// Name of the algorithm, eg. `hmac-sha256`.
    fn name(&self) -> &str;
    /// Returns the base64-encoded keyed digest of `bytes_to_sign`.
    fn http_sign(&self, key: &[u8], bytes_to_sign: &[u8]) -> String;
    /// Returns true if the digest is valid for the provided content. The
    /// comparison runs in constant time.
    fn http_verify(&self, key: &[u8], bytes_to_verify: &[u8], digest: &str) -> bool {
        let expected_digest = self.http_sign(key, bytes_to_verify);
        expected_digest.as_bytes().ct_eq(digest.as_bytes()).into()
    }
}

macro_rules! hmac_algorithm {
    ($alg_name:ident($hash_alg:ident) = $name:literal) => {
        #[doc = "Implementation of the '"]
        #[doc = $name]
        #[doc = "' keyed-hash algorithm."]
        #[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
        pub struct $alg_name;

        impl KeyedHash for $alg_name {
            fn name(&self) -> &str {
                $name
            }
            fn http_sign(&self, key: &[u8], bytes_to_sign: &[u8]) -> String {
                let mut mac = <Hmac<$hash_alg>>::new_from_slice(key)
                    .expect("HMAC can take key of any size");
                mac.update(bytes_to_sign);
                base64::encode(&mac.finalize().into_bytes())
            }
        }
    };
}

hmac_algorithm!(HmacSha256(Sha256) = "hmac-sha256");
hmac_algorithm!(HmacSha512(Sha512) = "hmac-sha512");

/// Looks up a keyed-hash algorithm by name, ignoring case.
pub fn keyed_hash_by_name(name: &str) -> Option<Arc<dyn KeyedHash>> {
    match name.to_ascii_lowercase().as_str() {
        "hmac-sha256" => Some(Arc::new(HmacSha256)),
        "hmac-sha512" => Some(Arc::new(HmacSha512)),
        _ => None,
    }
}

/// Implementations of this trait hash message bodies before they are folded
/// into the canonical message.
pub trait HttpDigest: Debug + Send + Sync + 'static {
    /// Returns the base64-encoded digest of `bytes_to_digest`.
    fn http_digest(&self, bytes_to_digest: &[u8]) -> String;
}

impl HttpDigest for Sha256 {
    fn http_digest(&self, bytes_to_digest: &[u8]) -> String {
        base64::encode(&Self::digest(bytes_to_digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_sha256_known_answer() {
        // RFC 4231, test case 2
        let digest = HmacSha256.http_sign(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(digest, "W9zBRr9gdU5qBCQmCJV1x1oAPwidJzmDnexYuWTsOEM=");
    }

    #[test]
    fn verify_is_keyed() {
        let digest = HmacSha512.http_sign(b"secret", b"content");
        assert!(HmacSha512.http_verify(b"secret", b"content", &digest));
        assert!(!HmacSha512.http_verify(b"other", b"content", &digest));
        assert!(!HmacSha512.http_verify(b"secret", b"content!", &digest));
        assert!(!HmacSha512.http_verify(b"secret", b"content", ""));
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(keyed_hash_by_name("HMAC-SHA512").unwrap().name(), "hmac-sha512");
        assert!(keyed_hash_by_name("hmac-md5").is_none());
    }

    #[test]
    fn body_digest() {
        assert_eq!(
            Sha256::new().http_digest(b""),
            "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
        );
    }
}
