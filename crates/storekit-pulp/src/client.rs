//! Pulp v2 REST client

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

use storekit_core::{
    Dispatcher, ErrorFormat, PulpProfile, RawResponse, Result, StoreError, TransportSettings,
    decode_json,
};

use crate::models::{
    RepositoryDetails, SessionCertificate, UploadRequest, UploadRequests,
};
use crate::session::{Session, SessionCell};

const LOGIN_PATH: &str = "/pulp/api/v2/actions/login/";
const REPOSITORIES_PATH: &str = "/pulp/api/v2/repositories/";
const UPLOADS_PATH: &str = "/pulp/api/v2/content/uploads/";

/// Connection settings for a Pulp server
#[derive(Clone)]
pub struct PulpConfig {
    /// Service endpoint, e.g. `https://pulp.example.com`
    pub endpoint: String,
    pub username: String,
    password: String,
    pub transport: TransportSettings,
}

impl fmt::Debug for PulpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PulpConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("transport", &self.transport)
            .finish()
    }
}

impl PulpConfig {
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            transport: TransportSettings::default(),
        }
    }

    /// Build from a profile, resolving the password
    pub fn from_profile(profile: &PulpProfile) -> Result<Self> {
        Ok(Self {
            endpoint: profile.endpoint.clone(),
            username: profile.username.clone(),
            password: profile.resolve_password()?,
            transport: profile.transport.clone(),
        })
    }

    pub fn with_transport(mut self, transport: TransportSettings) -> Self {
        self.transport = transport;
        self
    }
}

/// Client for a Pulp server
///
/// Calls authenticate with basic credentials until [`login`](Self::login)
/// succeeds; afterwards they present the issued client certificate.
#[derive(Debug)]
pub struct PulpClient {
    config: PulpConfig,
    dispatcher: Dispatcher,
    session: SessionCell,
}

impl PulpClient {
    pub fn new(config: PulpConfig) -> Result<Self> {
        let dispatcher = Dispatcher::new(&config.endpoint, &config.transport)?;
        Ok(Self {
            config,
            dispatcher,
            session: SessionCell::default(),
        })
    }

    pub fn config(&self) -> &PulpConfig {
        &self.config
    }

    /// The certificate of the current session, if logged in
    pub fn session_certificate(&self) -> Option<SessionCertificate> {
        self.session.current().map(|s| s.certificate().clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Exchange basic credentials for a session certificate.
    ///
    /// The previous session stays in place if login fails.
    pub async fn login(&self) -> Result<()> {
        let request = self.basic_request(Method::POST, LOGIN_PATH);
        let response = self.dispatcher.execute(request, ErrorFormat::Json).await?;
        let certificate: SessionCertificate = decode_json(&response.body)?;

        let session =
            Session::establish(certificate, &self.config.endpoint, &self.config.transport)?;
        self.session.replace(Some(session));
        tracing::info!("Logged in to {} as {}", self.config.endpoint, self.config.username);
        Ok(())
    }

    /// Drop the cached session; later calls use basic credentials again
    pub fn logout(&self) {
        if self.session.replace(None).is_some() {
            tracing::debug!("Discarded session for {}", self.config.endpoint);
        }
    }

    fn basic_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.dispatcher
            .request(method, path)
            .basic_auth(&self.config.username, Some(&self.config.password))
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<RawResponse> {
        let session = self.session.current();
        let (dispatcher, mut request) = match &session {
            Some(session) => (session.dispatcher(), session.dispatcher().request(method, path)),
            None => (&self.dispatcher, self.basic_request(method, path)),
        };

        if let Some(body) = body {
            request = request.json(body);
        }
        dispatcher.execute(request, ErrorFormat::Json).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute(Method::GET, path, None::<&()>).await?;
        decode_json(&response.body)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<T> {
        let response = self.execute(Method::POST, path, body).await?;
        decode_json(&response.body)
    }

    pub async fn list_repositories(&self) -> Result<Vec<RepositoryDetails>> {
        self.get(REPOSITORIES_PATH).await
    }

    pub async fn get_repository(&self, id: &str) -> Result<RepositoryDetails> {
        let id = require_id(id, "repository id")?;
        self.get(&format!("{}{}/", REPOSITORIES_PATH, id)).await
    }

    /// Create a repository; `details.id` must be set
    pub async fn create_repository(
        &self,
        details: &RepositoryDetails,
    ) -> Result<RepositoryDetails> {
        require_id(&details.id, "repository id")?;
        let created: RepositoryDetails = self.post(REPOSITORIES_PATH, Some(details)).await?;
        tracing::info!("Created repository {}", created.id);
        Ok(created)
    }

    pub async fn list_upload_requests(&self) -> Result<UploadRequests> {
        self.get(UPLOADS_PATH).await
    }

    /// Open a new upload request
    pub async fn create_upload_request(&self) -> Result<UploadRequest> {
        self.post(UPLOADS_PATH, None::<&()>).await
    }

    /// Discard an upload request and its stored bits
    pub async fn delete_upload_request(&self, upload_id: &str) -> Result<()> {
        let upload_id = require_id(upload_id, "upload id")?;
        self.execute(
            Method::DELETE,
            &format!("{}{}/", UPLOADS_PATH, upload_id),
            None::<&()>,
        )
        .await?;
        Ok(())
    }
}

/// Ids become path segments; reject empty ones and separators
fn require_id<'a>(id: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(StoreError::validation(format!("{} is required", what)));
    }
    if trimmed.contains('/') {
        return Err(StoreError::validation(format!(
            "{} must not contain '/': {}",
            what, id
        )));
    }
    Ok(trimmed)
}
