//! Session credential cell
//!
//! Login yields a certificate/key pair. The pair and the HTTP client that
//! presents it are stored together and swapped as one value, so a reader
//! sees either the previous session or the new one, never a mix.

use std::sync::{Arc, PoisonError, RwLock};

use storekit_core::{Dispatcher, Result, StoreError, TransportSettings};

use crate::models::SessionCertificate;

/// An authenticated session: the issued pair plus a client presenting it
#[derive(Debug)]
pub struct Session {
    certificate: SessionCertificate,
    dispatcher: Dispatcher,
}

impl Session {
    /// Build a client identity from the issued pair
    pub fn establish(
        certificate: SessionCertificate,
        base_url: &str,
        settings: &TransportSettings,
    ) -> Result<Self> {
        if certificate.certificate.trim().is_empty() || certificate.key.trim().is_empty() {
            return Err(StoreError::InvalidCertificate {
                message: "login returned an empty certificate or key".to_string(),
            });
        }

        let pem = format!("{}\n{}\n", certificate.certificate.trim(), certificate.key.trim());
        let identity = reqwest::Identity::from_pem(pem.as_bytes()).map_err(|e| {
            StoreError::InvalidCertificate {
                message: e.to_string(),
            }
        })?;

        let client = settings
            .build_client(Some(identity))
            .map_err(|e| match e {
                StoreError::InvalidConfig { message } => StoreError::InvalidCertificate { message },
                other => other,
            })?;

        Ok(Self {
            certificate,
            dispatcher: Dispatcher::with_client(base_url, client)?,
        })
    }

    pub fn certificate(&self) -> &SessionCertificate {
        &self.certificate
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

/// Holds the current session, replaced whole on login and logout
#[derive(Debug, Default)]
pub struct SessionCell {
    current: RwLock<Option<Arc<Session>>>,
}

impl SessionCell {
    /// Snapshot of the current session
    pub fn current(&self) -> Option<Arc<Session>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install a new session (or none), returning the previous one
    pub fn replace(&self, session: Option<Session>) -> Option<Arc<Session>> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, session.map(Arc::new))
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }
}
