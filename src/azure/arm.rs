//! ARM REST client over `reqwest`.
//!
//! Implements [`ResourceManager`] with plain `PUT`/`GET`/`POST`/`DELETE`
//! calls and polls long-running operations until they finish.

use super::auth::TokenSource;
use super::lro::{
    retry_after, AsyncOperationStatus, ErrorResponse, Operation, OperationState, PollTarget,
    WaitUntil,
};
use super::ResourceManager;
use crate::error::{Error, Result};
use crate::models::{
    Connection, LocalNetworkGateway, Page, ProvisioningState, PublicIpAddress, ResourceGroup,
    VirtualNetwork, VirtualNetworkGateway,
};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

pub const RESOURCES_API_VERSION: &str = "2021-04-01";
pub const NETWORK_API_VERSION: &str = "2023-09-01";

/// Client for one subscription on one ARM endpoint.
pub struct ArmClient {
    http: reqwest::Client,
    endpoint: String,
    subscription_id: String,
    token: Arc<dyn TokenSource>,
    poll_interval: Duration,
}

impl ArmClient {
    pub fn new(endpoint: &str, subscription_id: &str, token: Arc<dyn TokenSource>) -> Self {
        ArmClient {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            subscription_id: subscription_id.to_string(),
            token,
            poll_interval: Duration::from_secs(crate::config::POLL_INTERVAL_SECS),
        }
    }

    /// Delay between polls when ARM sends no `Retry-After`.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn resource_group_path(&self, resource_group: &str) -> String {
        format!(
            "/subscriptions/{}/resourcegroups/{resource_group}",
            self.subscription_id
        )
    }

    fn network_path(&self, resource_group: &str, kind: &str, name: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{resource_group}/providers/Microsoft.Network/{kind}/{name}",
            self.subscription_id
        )
    }

    fn url(&self, path: &str, api_version: &str) -> String {
        format!("{}{path}?api-version={api_version}", self.endpoint)
    }

    /// Send with a fresh bearer token; non-2xx becomes [`Error::Api`].
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.token.bearer_token().await?;
        let response = request.bearer_auth(token).send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&text)
            .ok()
            .and_then(|e| e.error)
            .unwrap_or_default();
        log::debug!("ARM error status={status} body={text}");
        Err(Error::Api {
            status: status.as_u16(),
            code: if detail.code.is_empty() {
                status.canonical_reason().unwrap_or("Unknown").to_string()
            } else {
                detail.code
            },
            message: if detail.message.is_empty() {
                text
            } else {
                detail.message
            },
        })
    }

    async fn get_value(&self, url: &str) -> Result<Value> {
        let response = self.execute(self.http.get(url)).await?;
        let text = response.text().await?;
        parse(url, &text)
    }

    /// `PUT` a resource and wait until ARM reports it provisioned.
    async fn put_resource<T, R>(
        &self,
        resource: &str,
        path: &str,
        api_version: &str,
        body: &T,
    ) -> Result<R>
    where
        T: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.url(path, api_version);
        log::debug!("PUT {url}");
        let response = self.execute(self.http.put(&url).json(body)).await?;

        let status = response.status();
        let target = PollTarget::from_headers(response.headers());
        let delay = retry_after(response.headers(), self.poll_interval);
        let text = response.text().await?;
        let mut value = if text.trim().is_empty() {
            Value::Null
        } else {
            parse::<Value>(&url, &text)?
        };

        if target != PollTarget::None || status == StatusCode::ACCEPTED {
            self.wait(resource, &target, delay).await?;
            value = Value::Null;
        }
        let value = self.until_provisioned(resource, &url, value).await?;
        parse_value(&url, value)
    }

    /// Re-`GET` the resource until its `provisioningState` is terminal.
    async fn until_provisioned(
        &self,
        resource: &str,
        url: &str,
        mut value: Value,
    ) -> Result<Value> {
        loop {
            if value.is_null() {
                value = self.get_value(url).await?;
                continue;
            }
            match provisioning_state(&value) {
                Some(state @ (ProvisioningState::Failed | ProvisioningState::Canceled)) => {
                    return Err(Error::OperationFailed {
                        resource: resource.to_string(),
                        status: format!("{state:?}"),
                        message: "provisioningState reported by the resource".to_string(),
                    });
                }
                Some(state) if !state.is_terminal() => {
                    log::debug!("{resource} provisioningState={state:?}, waiting");
                    tokio::time::sleep(self.poll_interval).await;
                    value = self.get_value(url).await?;
                }
                _ => return Ok(value),
            }
        }
    }

    /// Poll a status URL until the operation finishes.
    async fn wait(&self, resource: &str, target: &PollTarget, first_delay: Duration) -> Result<()> {
        let mut delay = first_delay;
        match target {
            PollTarget::None => Ok(()),
            PollTarget::AsyncOperation(url) => loop {
                tokio::time::sleep(delay).await;
                let response = self.execute(self.http.get(url)).await?;
                delay = retry_after(response.headers(), self.poll_interval);
                let text = response.text().await?;
                let status: AsyncOperationStatus = parse(url, &text)?;
                match status.state() {
                    OperationState::InProgress => {
                        log::debug!("{resource}: operation {}", status.status);
                    }
                    OperationState::Succeeded => return Ok(()),
                    OperationState::Failed | OperationState::Canceled => {
                        let detail = status.error.unwrap_or_default();
                        return Err(Error::OperationFailed {
                            resource: resource.to_string(),
                            status: status.status,
                            message: format!("{}: {}", detail.code, detail.message),
                        });
                    }
                }
            },
            PollTarget::Location(url) => loop {
                tokio::time::sleep(delay).await;
                let response = self.execute(self.http.get(url)).await?;
                if response.status() != StatusCode::ACCEPTED {
                    return Ok(());
                }
                log::debug!("{resource}: operation still running");
                delay = retry_after(response.headers(), self.poll_interval);
            },
        }
    }

    /// Start a mutation that returns no resource (`POST` action or `DELETE`).
    async fn start(
        &self,
        resource: &str,
        request: RequestBuilder,
        wait: WaitUntil,
    ) -> Result<Operation> {
        let response = self.execute(request).await?;
        let delay = retry_after(response.headers(), self.poll_interval);
        let operation = Operation {
            resource: resource.to_string(),
            status: response.status().as_u16(),
            poll: PollTarget::from_headers(response.headers()),
        };
        if wait == WaitUntil::Completed && !operation.is_done() {
            self.wait(resource, &operation.poll, delay).await?;
        }
        Ok(operation)
    }

    /// `GET` every page of a list, following `nextLink`.
    ///
    /// A `nextLink` that points back to any page already fetched is an error.
    async fn list<R: DeserializeOwned>(&self, path: &str, api_version: &str) -> Result<Vec<R>> {
        let mut items = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(self.url(path, api_version));
        while let Some(url) = next {
            if !seen.insert(url.clone()) {
                return Err(Error::Api {
                    status: 200,
                    code: "NextLinkLoop".to_string(),
                    message: format!("nextLink returns to a page already read: {url}"),
                });
            }
            let response = self.execute(self.http.get(&url)).await?;
            let text = response.text().await?;
            let page: Page<R> = parse(&url, &text)?;
            items.extend(page.value);
            next = page.next_link;
        }
        Ok(items)
    }

    pub async fn delete_resource_group_with(
        &self,
        name: &str,
        wait: WaitUntil,
    ) -> Result<Operation> {
        let url = self.url(&self.resource_group_path(name), RESOURCES_API_VERSION);
        log::debug!("DELETE {url}");
        self.start(name, self.http.delete(&url), wait).await
    }

    pub async fn reset_vpn_gateway_with(
        &self,
        resource_group: &str,
        name: &str,
        wait: WaitUntil,
    ) -> Result<Operation> {
        let path = format!(
            "{}/reset",
            self.network_path(resource_group, "virtualNetworkGateways", name)
        );
        let url = self.url(&path, NETWORK_API_VERSION);
        log::debug!("POST {url}");
        self.start(name, self.http.post(&url), wait).await
    }
}

#[async_trait]
impl ResourceManager for ArmClient {
    async fn create_resource_group(
        &self,
        name: &str,
        group: &ResourceGroup,
    ) -> Result<ResourceGroup> {
        self.put_resource(
            name,
            &self.resource_group_path(name),
            RESOURCES_API_VERSION,
            group,
        )
        .await
    }

    async fn create_virtual_network(
        &self,
        resource_group: &str,
        name: &str,
        network: &VirtualNetwork,
    ) -> Result<VirtualNetwork> {
        let path = self.network_path(resource_group, "virtualNetworks", name);
        self.put_resource(name, &path, NETWORK_API_VERSION, network).await
    }

    async fn create_public_ip(
        &self,
        resource_group: &str,
        name: &str,
        public_ip: &PublicIpAddress,
    ) -> Result<PublicIpAddress> {
        let path = self.network_path(resource_group, "publicIPAddresses", name);
        self.put_resource(name, &path, NETWORK_API_VERSION, public_ip).await
    }

    async fn create_vpn_gateway(
        &self,
        resource_group: &str,
        name: &str,
        gateway: &VirtualNetworkGateway,
    ) -> Result<VirtualNetworkGateway> {
        let path = self.network_path(resource_group, "virtualNetworkGateways", name);
        self.put_resource(name, &path, NETWORK_API_VERSION, gateway).await
    }

    async fn create_local_network_gateway(
        &self,
        resource_group: &str,
        name: &str,
        gateway: &LocalNetworkGateway,
    ) -> Result<LocalNetworkGateway> {
        let path = self.network_path(resource_group, "localNetworkGateways", name);
        self.put_resource(name, &path, NETWORK_API_VERSION, gateway).await
    }

    async fn create_connection(
        &self,
        resource_group: &str,
        name: &str,
        connection: &Connection,
    ) -> Result<Connection> {
        let path = self.network_path(resource_group, "connections", name);
        self.put_resource(name, &path, NETWORK_API_VERSION, connection).await
    }

    async fn list_connections(&self, resource_group: &str) -> Result<Vec<Connection>> {
        let path = format!(
            "/subscriptions/{}/resourceGroups/{resource_group}/providers/Microsoft.Network/connections",
            self.subscription_id
        );
        self.list(&path, NETWORK_API_VERSION).await
    }

    async fn begin_reset_vpn_gateway(&self, resource_group: &str, name: &str) -> Result<Operation> {
        self.reset_vpn_gateway_with(resource_group, name, WaitUntil::Started).await
    }

    async fn delete_resource_group(&self, name: &str) -> Result<()> {
        self.delete_resource_group_with(name, WaitUntil::Completed)
            .await
            .map(|_| ())
    }
}

fn provisioning_state(value: &Value) -> Option<ProvisioningState> {
    value
        .pointer("/properties/provisioningState")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

/// Decode a body, reporting the JSON path that failed.
fn parse<R: DeserializeOwned>(url: &str, text: &str) -> Result<R> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        log::error!("OUTPUT START:\n\n{text}\n\nOUTPUT END\n");
        Error::Parse {
            url: url.to_string(),
            path: e.path().to_string(),
            message: e.inner().to_string(),
        }
    })
}

fn parse_value<R: DeserializeOwned>(url: &str, value: Value) -> Result<R> {
    serde_path_to_error::deserialize(value).map_err(|e| Error::Parse {
        url: url.to_string(),
        path: e.path().to_string(),
        message: e.inner().to_string(),
    })
}
