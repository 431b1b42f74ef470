//! Replays named requests from loaded collections against a live target

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::ReplayError;
use crate::model::{Collection, Environment, Item, Request, Response};
use crate::network::{with_authority, HttpClient};
use crate::storage;
use crate::template::substitute;
use crate::{GophermanError, Result};

use super::verify::ErrorCollector;

/// Default target hostname
pub const DEFAULT_HOSTNAME: &str = "localhost";

/// Default target port
pub const DEFAULT_PORT: &str = "3002";

/// Target used when the configured hostname/port cannot be resolved
pub const DEFAULT_TARGET: &str = "localhost:3002";

/// Replay engine holding one environment and an ordered set of collections
pub struct Tester {
    client: HttpClient,
    environment: Environment,
    collections: Vec<Collection>,
    hostname: String,
    port: String,
}

impl Tester {
    /// Create a tester from already-loaded data
    #[must_use]
    pub fn new(environment: Environment, collections: Vec<Collection>) -> Self {
        Self {
            client: HttpClient::new(),
            environment,
            collections,
            hostname: DEFAULT_HOSTNAME.to_string(),
            port: DEFAULT_PORT.to_string(),
        }
    }

    /// Load an environment and collections from files under `base`
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Decode` error for any unreadable or malformed file
    pub fn load<P: AsRef<Path>>(
        base: &Path,
        environment_file: &str,
        collection_files: &[P],
    ) -> Result<Self> {
        let environment = storage::load_environment(&base.join(environment_file))?;

        let collections = collection_files
            .iter()
            .map(|file| storage::load_collection(&base.join(file)))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Loaded environment '{}' and {} collections from {}",
            environment.name,
            collections.len(),
            base.display()
        );

        Ok(Self::new(environment, collections))
    }

    /// Override the target hostname; may contain placeholders
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Override the target port; may contain placeholders
    #[must_use]
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    /// Loaded environment
    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Loaded collections, in load order
    #[must_use]
    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    /// Resolve the `host:port` target, falling back to [`DEFAULT_TARGET`]
    /// when the template is malformed
    #[must_use]
    pub fn target(&self, variables: &HashMap<String, String>) -> String {
        let template = format!("{}:{}", self.hostname, self.port);
        match substitute(&template, variables) {
            Ok(target) => target,
            Err(e) => {
                warn!("Falling back to {DEFAULT_TARGET}: {e}");
                DEFAULT_TARGET.to_string()
            }
        }
    }

    /// Replay the request named `name` from every collection and verify
    /// each actual response with `verify`
    ///
    /// Collections are processed in load order; a failure in one never
    /// stops the others. Returns every error with collection/request
    /// provenance, empty when everything passed.
    pub async fn replay_named<F>(&self, name: &str, mut verify: F) -> Vec<ReplayError>
    where
        F: FnMut(&mut ErrorCollector, &Request, Option<&Response>, &Response),
    {
        let variables = self.environment.variables();
        let target = self.target(&variables);

        info!(
            "Replaying '{name}' against {target} across {} collections",
            self.collections.len()
        );

        let mut failures = Vec::new();
        for collection in &self.collections {
            let errors = self
                .replay_in_collection(collection, name, &variables, &target, &mut verify)
                .await;

            for error in errors {
                warn!("[{}] {name}: {error}", collection.info.name);
                failures.push(ReplayError::new(&collection.info.name, name, error));
            }
        }

        if failures.is_empty() {
            info!("Replay of '{name}' passed");
        }
        failures
    }

    /// Replay the request named `name` from a single collection
    pub async fn replay_in_collection<F>(
        &self,
        collection: &Collection,
        name: &str,
        variables: &HashMap<String, String>,
        target: &str,
        verify: &mut F,
    ) -> Vec<GophermanError>
    where
        F: FnMut(&mut ErrorCollector, &Request, Option<&Response>, &Response),
    {
        let mut errors = ErrorCollector::new();

        let Some(item) = collection.item_with_name(name) else {
            errors.push(GophermanError::NotFound {
                name: name.to_string(),
            });
            return errors.into_errors();
        };

        match self.issue(item, variables, target).await {
            Ok(actual) => {
                verify(
                    &mut errors,
                    &item.request,
                    item.expected_response(),
                    &actual,
                );
                debug!(
                    "[{}] {name}: {} verification errors",
                    collection.info.name,
                    errors.len()
                );
            }
            Err(e) => errors.push(e),
        }

        errors.into_errors()
    }

    async fn issue(
        &self,
        item: &Item,
        variables: &HashMap<String, String>,
        target: &str,
    ) -> Result<Response> {
        let request = item
            .request
            .to_live_request(variables)
            .ok_or_else(|| GophermanError::InvalidRequest("failed to build HTTP request".to_string()))?;
        let request = with_authority(request, target)?;

        let response = self.client.send(request).await?;
        let actual = Response::raw(&response.body, response.status.as_u16());

        if actual.status >= 300 {
            return Err(GophermanError::Status {
                status: actual.status,
                body: actual.raw,
            });
        }

        Ok(actual)
    }
}
