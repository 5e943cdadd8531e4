use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::errors::StoreError;
use crate::domain::ids::UserId;
use crate::domain::session::{Identity, USERS_COLLECTION, UserRecord};
use crate::domain::store::DocumentStore;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("account not found")]
    UnknownUser,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Account layer over the store's `users` collection.
///
/// The current identity is published on a watch channel; components that
/// must follow authentication state (the marker mirror, above all)
/// subscribe instead of reaching for a global.
pub struct AuthManager {
    store: Arc<dyn DocumentStore>,
    identity: watch::Sender<Option<Identity>>,
}

impl AuthManager {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let (identity, _) = watch::channel(None);
        Self { store, identity }
    }

    /// Subscribe to identity changes. Yields `None` while signed out.
    pub fn watch(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }

    pub fn current(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    /// Create an account and sign it in.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        if self.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let uid = UserId::new(Uuid::new_v4().to_string());
        let salt: [u8; 16] = rand::random();
        let record = UserRecord {
            uid: uid.clone(),
            username: username.to_string(),
            email: email.to_string(),
            password_salt: BASE64.encode(salt),
            password_digest: BASE64.encode(password_digest(&salt, password)),
        };
        let payload =
            serde_json::to_value(&record).map_err(|err| StoreError::unexpected(err.to_string()))?;
        self.store
            .write(USERS_COLLECTION, uid.as_str(), payload)
            .await?;

        let identity = Identity {
            uid,
            email: record.email,
        };
        self.identity.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let record = self
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let salt = BASE64
            .decode(&record.password_salt)
            .map_err(|err| StoreError::unexpected(format!("corrupt password salt: {err}")))?;
        if BASE64.encode(password_digest(&salt, password)) != record.password_digest {
            return Err(AuthError::InvalidCredentials);
        }

        let identity = Identity {
            uid: record.uid,
            email: record.email,
        };
        self.identity.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    /// Rehydrate a previously issued session (e.g. a uid persisted by the
    /// CLI) without a password round-trip.
    pub async fn resume(&self, uid: &UserId) -> Result<Identity, AuthError> {
        let document = self
            .store
            .get(USERS_COLLECTION, uid.as_str())
            .await?
            .ok_or(AuthError::UnknownUser)?;
        let record: UserRecord = serde_json::from_value(document.data)
            .map_err(|err| StoreError::unexpected(format!("corrupt user record: {err}")))?;

        let identity = Identity {
            uid: record.uid,
            email: record.email,
        };
        self.identity.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    pub fn sign_out(&self) {
        self.identity.send_replace(None);
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let documents = self.store.list(USERS_COLLECTION).await?;
        for document in documents {
            if let Ok(record) = serde_json::from_value::<UserRecord>(document.data)
                && record.email == email
            {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}

fn password_digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}
