use std::collections::HashMap;
use std::fmt::Debug;

use crate::error::{HmacError, Result};
use crate::message::MessageLike;
use crate::signature::Signature;
use crate::signer::Signer;

/// The verification process will use this trait to find the secret key
/// belonging to the credential id carried by a message.
///
/// You do not need to implement this yourself: the `SimpleKeyProvider` type provides an
/// key store that should be suitable for many situations.
pub trait KeyProvider: Debug + Sync {
    /// Given a credential id, return the matching secret key, or `None` if
    /// the id is unknown.
    fn provide_key(&self, id: &str) -> Option<&[u8]>;
}

/// Implementation of a simple in-memory key store.
#[derive(Debug, Default, Clone)]
pub struct SimpleKeyProvider {
    keys: HashMap<String, Vec<u8>>,
}

impl SimpleKeyProvider {
    /// Initializes the key store from a list of credential ids and secret keys.
    pub fn new<I, S, K>(key_iter: I) -> Self
    where
        I: IntoIterator<Item = (S, K)>,
        S: Into<String>,
        K: Into<Vec<u8>>,
    {
        let keys = key_iter
            .into_iter()
            .map(|(id, key)| (id.into(), key.into()))
            .collect();
        Self { keys }
    }

    /// Adds a key to the key store, replacing any key with the same id
    pub fn add<K: Into<Vec<u8>>>(&mut self, id: &str, key: K) {
        self.keys.insert(id.into(), key.into());
    }
    /// Clears all keys from the key store
    pub fn clear(&mut self) {
        self.keys.clear();
    }
    /// Removes the key with the specified credential id from the key store
    pub fn remove(&mut self, id: &str) {
        self.keys.remove(id);
    }
}

impl KeyProvider for SimpleKeyProvider {
    fn provide_key(&self, id: &str) -> Option<&[u8]> {
        self.keys.get(id).map(Vec::as_slice)
    }
}

impl Signer {
    /// Verifies `message`, looking up the secret key for the credential id it
    /// carries in `keys`.
    ///
    /// An unknown credential id fails exactly like a digest mismatch.
    pub fn verify_with<M: MessageLike + ?Sized>(
        &self,
        message: &M,
        keys: &dyn KeyProvider,
    ) -> Result<Signature> {
        let signature = self.extract_signature(message)?;
        match keys.provide_key(signature.id()) {
            Some(key) => self.verify_signature(message, signature, key),
            None => {
                debug!("hmac: no key for {:?}", signature.id());
                Err(HmacError::VerificationFailed)
            }
        }
    }
}
