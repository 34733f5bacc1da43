use async_trait::async_trait;
use serde::Serialize;

use iasc_slo::{errors, Result};

use crate::{
    group::{Content, Group},
    Interface,
};

use super::{ensure_success, Collection};

#[derive(Clone, Debug)]
pub struct GroupImpl {
    client: reqwest::Client,
    endpoint: String,
}

impl GroupImpl {
    pub fn new(client: reqwest::Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
        }
    }
}

/// Update payload. The name is immutable in the schema, so a PATCH
/// never carries it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Patch<'a> {
    display_name: &'a str,
    description: &'a str,
}

#[async_trait]
impl Interface for GroupImpl {
    type T = Group;
    type C = Content;

    async fn list(&self, output: &mut Vec<Self::T>) -> Result<()> {
        let url = format!("{}/Groups", self.endpoint);
        let resp =
            self.client.get(&url).send().await.map_err(errors::any)?;
        let resp = ensure_success(&url, resp).await?;
        let data: Collection<Group> =
            resp.json().await.map_err(errors::any)?;
        *output = data.value;
        Ok(())
    }

    async fn get(&self, id: &str, output: &mut Self::T) -> Result<()> {
        let url = format!("{}/Groups({})", self.endpoint, id);
        let resp =
            self.client.get(&url).send().await.map_err(errors::any)?;
        let resp = ensure_success(&url, resp).await?;
        *output = resp.json().await.map_err(errors::any)?;
        Ok(())
    }

    async fn create(
        &self,
        input: &Self::C,
        output: &mut Self::T,
    ) -> Result<()> {
        let url = format!("{}/Groups", self.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(input)
            .send()
            .await
            .map_err(errors::any)?;
        let resp = ensure_success(&url, resp).await?;
        *output = resp.json().await.map_err(errors::any)?;
        Ok(())
    }

    async fn put(&self, input: &Self::T) -> Result<()> {
        let url = format!("{}/Groups({})", self.endpoint, input.id);
        let resp = self
            .client
            .patch(&url)
            .json(&Patch {
                display_name: &input.display_name,
                description: &input.description,
            })
            .send()
            .await
            .map_err(errors::any)?;
        ensure_success(&url, resp).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let url = format!("{}/Groups({})", self.endpoint, id);
        let resp =
            self.client.delete(&url).send().await.map_err(errors::any)?;
        ensure_success(&url, resp).await?;
        Ok(())
    }
}
