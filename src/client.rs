//! Blocking client for the pipeline info endpoints.

use reqwest::{Url, blocking::Client};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::ApiConfig,
    error::{GraphError, Result},
    task::{PipelineSpec, RunStatus, payload::from_value_wrapped},
};

pub struct ApiClient {
    base_url: Url,
    auth_token: Option<String>,
    http: Client,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            GraphError::Config(format!("Invalid API base URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GraphError::Config(format!(
                "API base URL '{}' cannot hold a path",
                config.base_url
            )));
        }

        Ok(Self {
            base_url,
            auth_token: config.auth_token.clone(),
            http: Client::new(),
        })
    }

    /// `GET /api/v1/info/workflow/{workflow}/pipeline/{pipeline}`
    pub fn pipeline_spec(&self, workflow: &str, pipeline: &str) -> Result<PipelineSpec> {
        let body = self.get(&["workflow", workflow, "pipeline", pipeline])?;
        from_value_wrapped(body, "spec")
    }

    /// `GET /api/v1/info/workflow/{workflow}/pipeline/{pipeline}/runs/{run_id}`
    pub fn pipeline_run(&self, workflow: &str, pipeline: &str, run_id: &str) -> Result<RunStatus> {
        let body = self.get(&["workflow", workflow, "pipeline", pipeline, "runs", run_id])?;
        from_value_wrapped(body, "runInfo")
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v1", "info"]).extend(segments);
        }
        url
    }

    fn get(&self, segments: &[&str]) -> Result<Value> {
        let url = self.url(segments);
        debug!("GET {}", url);

        let mut request = self.http.get(url.clone());
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            warn!("Non 200 status when fetching {}: {}", url, status);
            return Err(GraphError::Api(format!(
                "Non 200 status when fetching {}: {}",
                url.path(),
                status
            )));
        }

        Ok(response.json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: base_url.to_string(),
            auth_token: None,
        })
        .unwrap()
    }

    #[test]
    fn builds_endpoint_paths() {
        let url = client("http://localhost:6060/").url(&["workflow", "w 1", "pipeline", "p"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:6060/api/v1/info/workflow/w%201/pipeline/p"
        );

        let url = client("http://host/prefix").url(&["workflow", "w"]);
        assert_eq!(url.as_str(), "http://host/prefix/api/v1/info/workflow/w");
    }

    #[test]
    fn rejects_invalid_base_url() {
        let result = ApiClient::new(&ApiConfig {
            base_url: "not a url".to_string(),
            auth_token: None,
        });
        assert!(matches!(result, Err(GraphError::Config(_))));
    }
}
