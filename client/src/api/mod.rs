use std::error::Error as StdError;
use std::fmt;

use anyhow::Result;
use const_format::formatcp;
use displaydoc::Display;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT},
    Client as HttpClient, Response, StatusCode, Url,
};
use serde::Deserialize;

use crate::config::ServerConfig;
use crate::version::ATELIER_DISTRIBUTOR;
use atelier::api::v1::project::{
    ListProjectsResponse, ProjectRecord, UpdateProjectRequest, UpdateProjectResponse,
};
use atelier::project::ProjectId;

/// The User-Agent string of the Atelier client.
const ATELIER_USER_AGENT: &str = formatcp!(
    "Atelier/{} ({})",
    env!("CARGO_PKG_VERSION"),
    ATELIER_DISTRIBUTOR
);

/// The Atelier API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base endpoint of the server.
    endpoint: Url,

    /// An initialized HTTP client.
    client: HttpClient,
}

/// An API error.
#[derive(Debug, Display)]
pub enum ApiError {
    /// {0}
    Structured(StructuredApiError),

    /// HTTP {0}: {1}
    Unstructured(StatusCode, String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct StructuredApiError {
    #[allow(dead_code)]
    code: u16,
    error: String,
    message: String,
}

impl ApiClient {
    pub fn from_server_config(config: ServerConfig) -> Result<Self> {
        let client = build_http_client(config.token())?;

        Ok(Self {
            endpoint: Url::parse(&config.endpoint)?,
            client,
        })
    }

    /// Sets the API endpoint of this client.
    pub fn set_endpoint(&mut self, endpoint: &str) -> Result<()> {
        self.endpoint = Url::parse(endpoint)?;
        Ok(())
    }

    /// Fetches a project, or `None` if it does not exist.
    pub async fn get_project(&self, project_id: &ProjectId) -> Result<Option<ProjectRecord>> {
        let endpoint = self
            .endpoint
            .join("api/v1/projects/")?
            .join(project_id.as_str())?;

        let res = self.client.get(endpoint).send().await?;

        if res.status().is_success() {
            let project = res.json().await?;
            Ok(Some(project))
        } else {
            let api_error = ApiError::try_from_response(res).await?;

            if api_error.is_no_such_project() {
                Ok(None)
            } else {
                Err(api_error.into())
            }
        }
    }

    /// Returns all projects on the server.
    pub async fn list_projects(&self) -> Result<Vec<ProjectRecord>> {
        let endpoint = self.endpoint.join("api/v1/projects")?;

        let res = self.client.get(endpoint).send().await?;

        if res.status().is_success() {
            let list: ListProjectsResponse = res.json().await?;
            Ok(list.projects)
        } else {
            let api_error = ApiError::try_from_response(res).await?;
            Err(api_error.into())
        }
    }

    /// Creates or updates a project.
    ///
    /// This is the transport for both full updates and individual chunk
    /// submissions; the request's chunk fields decide which one the
    /// server performs.
    pub async fn update_project(
        &self,
        request: &UpdateProjectRequest,
    ) -> Result<UpdateProjectResponse> {
        let endpoint = self.endpoint.join("api/v1/projects")?;

        let res = self.client.post(endpoint).json(request).send().await?;

        if res.status().is_success() {
            let response = res.json().await?;
            Ok(response)
        } else {
            let api_error = ApiError::try_from_response(res).await?;
            Err(api_error.into())
        }
    }
}

impl StdError for ApiError {}

impl ApiError {
    async fn try_from_response(response: Response) -> Result<Self> {
        let status = response.status();
        let text = response.text().await?;
        match serde_json::from_str(&text) {
            Ok(s) => Ok(Self::Structured(s)),
            Err(_) => Ok(Self::Unstructured(status, text)),
        }
    }

    /// Whether this is the server's not-found signal for a project.
    pub fn is_no_such_project(&self) -> bool {
        matches!(self, Self::Structured(e) if e.error == "NoSuchProject")
    }
}

impl fmt::Display for StructuredApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

fn build_http_client(token: Option<&str>) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(ATELIER_USER_AGENT));

    if let Some(token) = token {
        let auth_header = HeaderValue::from_str(&format!("bearer {}", token))?;
        headers.insert(AUTHORIZATION, auth_header);
    }

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .build()?;

    Ok(client)
}
