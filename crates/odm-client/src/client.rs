use std::{path::Path, time::Duration};

use async_trait::async_trait;
use reqwest::{
    Response,
    multipart::{Form, Part},
};
use serde::Deserialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace};

use odm_core::{NodeError, RemoteNode};
use odm_model::{NodeAddress, NodeInfo, ProcessingOptions, TaskId};

use crate::{archive, config::ClientConfig, errors::ClientError, reply::parse_reply};

const ARCHIVE_NAME: &str = ".all.zip.partial";

#[derive(Debug, Deserialize)]
struct TaskRef {
    uuid: Option<String>,
}

/// One NodeODM node reached over HTTP.
#[derive(Debug, Clone)]
pub struct NodeClient {
    address: NodeAddress,
    base_url: String,
    http: reqwest::Client,
    request_timeout: Duration,
}

impl NodeClient {
    pub fn new(address: NodeAddress, config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Self::with_http(address, http, config.request_timeout)
    }

    /// Reuse an existing connection pool.
    pub fn with_http(
        address: NodeAddress,
        http: reqwest::Client,
        request_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let base_url = address.base_url()?;
        Ok(Self {
            address,
            base_url,
            http,
            request_timeout,
        })
    }

    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        trace!(target: "odm.client", url = %self.url(path), "GET");
        let response = self
            .http
            .get(self.url(path))
            .timeout(self.request_timeout)
            .send()
            .await?;
        read_reply(response).await
    }

    async fn post_form(
        &self,
        path: &str,
        form: Form,
        timeout: Option<Duration>,
    ) -> Result<Value, ClientError> {
        trace!(target: "odm.client", url = %self.url(path), "POST");
        let mut request = self.http.post(self.url(path)).multipart(form);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        read_reply(request.send().await?).await
    }

    async fn fetch_task_list(&self) -> Result<Vec<TaskId>, ClientError> {
        let value = self.get_json("/task/list").await?;
        let items: Vec<TaskRef> = serde_json::from_value(value)
            .map_err(|e| ClientError::InvalidResponse(format!("task list: {e}")))?;
        Ok(items
            .into_iter()
            .filter_map(|t| t.uuid)
            .filter(|uuid| !uuid.is_empty())
            .map(TaskId::from)
            .collect())
    }

    async fn create_task(
        &self,
        name: &str,
        options: &ProcessingOptions,
    ) -> Result<TaskId, ClientError> {
        let form = Form::new()
            .text("name", name.to_string())
            .text("options", options.to_node_json().to_string());
        let value = self
            .post_form("/task/new/init", form, Some(self.request_timeout))
            .await?;
        let created: TaskRef = serde_json::from_value(value)
            .map_err(|e| ClientError::InvalidResponse(format!("task init: {e}")))?;
        created
            .uuid
            .filter(|uuid| !uuid.is_empty())
            .map(TaskId::from)
            .ok_or_else(|| ClientError::InvalidResponse("task init returned no uuid".into()))
    }

    async fn upload_file(&self, id: &TaskId, file: &Path) -> Result<(), ClientError> {
        let data = tokio::fs::read(file).await?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.jpg".to_string());
        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str("image/jpeg")?;
        let form = Form::new().part("images", part);

        self.post_form(&format!("/task/new/upload/{id}"), form, None)
            .await?;
        Ok(())
    }

    async fn commit_task(&self, id: &TaskId) -> Result<(), ClientError> {
        trace!(target: "odm.client", task = %id, "commit");
        let response = self
            .http
            .post(self.url(&format!("/task/new/commit/{id}")))
            .timeout(self.request_timeout)
            .send()
            .await?;
        read_reply(response).await?;
        Ok(())
    }

    async fn fetch_assets(&self, id: &TaskId, dest: &Path) -> Result<(), ClientError> {
        let mut response = self
            .http
            .get(self.url(&format!("/task/{id}/download/all.zip")))
            .send()
            .await?;
        if !response.status().is_success() || is_json(&response) {
            // NodeODM answers failed downloads with a JSON error body
            read_reply(response).await?;
            return Err(ClientError::InvalidResponse(format!(
                "task {id}: asset download returned no archive"
            )));
        }

        let archive_path = dest.join(ARCHIVE_NAME);
        let unpacked = self.unpack(id, &mut response, &archive_path, dest).await;
        if unpacked.is_err() {
            // drop the partial archive on any failure
            let _ = tokio::fs::remove_file(&archive_path).await;
        }
        unpacked
    }

    async fn unpack(
        &self,
        id: &TaskId,
        response: &mut Response,
        archive_path: &Path,
        dest: &Path,
    ) -> Result<(), ClientError> {
        let mut file = tokio::fs::File::create(archive_path).await?;
        let mut bytes: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            bytes += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);
        debug!(target: "odm.client", task = %id, bytes, "asset archive downloaded");

        let entries = archive::extract(archive_path.to_path_buf(), dest.to_path_buf()).await?;
        debug!(target: "odm.client", task = %id, entries, dest = %dest.display(), "asset archive extracted");
        Ok(())
    }
}

async fn read_reply(response: Response) -> Result<Value, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    parse_reply(status, &body)
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

#[async_trait]
impl RemoteNode for NodeClient {
    fn address(&self) -> &NodeAddress {
        &self.address
    }

    async fn info(&self) -> Result<NodeInfo, NodeError> {
        let value = self.get_json("/info").await?;
        serde_json::from_value(value)
            .map_err(|e| NodeError::InvalidResponse(format!("node info: {e}")))
    }

    async fn task_list(&self) -> Result<Vec<TaskId>, NodeError> {
        Ok(self.fetch_task_list().await?)
    }

    async fn task_info(&self, id: &TaskId) -> Result<Value, NodeError> {
        Ok(self.get_json(&format!("/task/{id}/info")).await?)
    }

    async fn init_task(
        &self,
        name: &str,
        options: &ProcessingOptions,
    ) -> Result<TaskId, NodeError> {
        Ok(self.create_task(name, options).await?)
    }

    async fn upload(&self, id: &TaskId, file: &Path) -> Result<(), NodeError> {
        Ok(self.upload_file(id, file).await?)
    }

    async fn commit(&self, id: &TaskId) -> Result<(), NodeError> {
        Ok(self.commit_task(id).await?)
    }

    async fn download_assets(&self, id: &TaskId, dest: &Path) -> Result<(), NodeError> {
        Ok(self.fetch_assets(id, dest).await?)
    }
}
