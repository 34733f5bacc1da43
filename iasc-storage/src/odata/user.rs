use async_trait::async_trait;
use serde::Serialize;

use iasc_slo::{errors, Result};

use crate::{
    user::{Content, Status, User},
    Interface,
};

use super::{ensure_success, normalize_date, Collection};

#[derive(Clone, Debug)]
pub struct UserImpl {
    client: reqwest::Client,
    endpoint: String,
}

impl UserImpl {
    pub fn new(client: reqwest::Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
        }
    }
}

/// Outbound record shape. Never carries the identifier; creation gets
/// it from the response and updates key it through the URL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Payload<'a> {
    last_name: &'a str,
    email: &'a str,
    user_type: &'a str,
    login_name: &'a str,
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    valid_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    valid_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    company: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<&'a str>,
}

impl<'a> From<&'a Content> for Payload<'a> {
    fn from(input: &'a Content) -> Self {
        Self {
            last_name: &input.last_name,
            email: &input.email,
            user_type: &input.user_type,
            login_name: &input.login_name,
            status: input.status,
            first_name: input.first_name.as_deref(),
            valid_from: normalize_date(input.valid_from.as_deref()),
            valid_to: normalize_date(input.valid_to.as_deref()),
            company: input.company.as_deref(),
            country: input.country.as_deref(),
            city: input.city.as_deref(),
        }
    }
}

impl<'a> From<&'a User> for Payload<'a> {
    fn from(input: &'a User) -> Self {
        Self {
            last_name: &input.last_name,
            email: &input.email,
            user_type: &input.user_type,
            login_name: &input.login_name,
            status: input.status,
            first_name: input.first_name.as_deref(),
            valid_from: normalize_date(input.valid_from.as_deref()),
            valid_to: normalize_date(input.valid_to.as_deref()),
            company: input.company.as_deref(),
            country: input.country.as_deref(),
            city: input.city.as_deref(),
        }
    }
}

#[async_trait]
impl Interface for UserImpl {
    type T = User;
    type C = Content;

    #[tracing::instrument(skip(output))]
    async fn list(&self, output: &mut Vec<Self::T>) -> Result<()> {
        let url = format!("{}/Users", self.endpoint);
        let resp =
            self.client.get(&url).send().await.map_err(errors::any)?;
        let resp = ensure_success(&url, resp).await?;
        let data: Collection<User> =
            resp.json().await.map_err(errors::any)?;
        *output = data.value;
        for user in output.iter_mut() {
            user.normalize();
        }
        Ok(())
    }

    #[tracing::instrument(skip(output))]
    async fn get(&self, id: &str, output: &mut Self::T) -> Result<()> {
        let url = read_url(&self.endpoint, id);
        let resp =
            self.client.get(&url).send().await.map_err(errors::any)?;
        let resp = ensure_success(&url, resp).await?;
        *output = resp.json().await.map_err(errors::any)?;
        output.normalize();
        Ok(())
    }

    #[tracing::instrument(skip(input, output))]
    async fn create(
        &self,
        input: &Self::C,
        output: &mut Self::T,
    ) -> Result<()> {
        let url = format!("{}/Users", self.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&Payload::from(input))
            .send()
            .await
            .map_err(errors::any)?;
        let resp = ensure_success(&url, resp).await?;
        *output = resp.json().await.map_err(errors::any)?;
        output.normalize();
        Ok(())
    }

    #[tracing::instrument(skip(input))]
    async fn put(&self, input: &Self::T) -> Result<()> {
        let url = key_url(&self.endpoint, &input.id);
        let resp = self
            .client
            .patch(&url)
            .json(&Payload::from(input))
            .send()
            .await
            .map_err(errors::any)?;
        ensure_success(&url, resp).await?;
        Ok(())
    }

    #[tracing::instrument]
    async fn delete(&self, id: &str) -> Result<()> {
        let url = key_url(&self.endpoint, id);
        let resp =
            self.client.delete(&url).send().await.map_err(errors::any)?;
        ensure_success(&url, resp).await?;
        Ok(())
    }
}

/// Reads address the record through the plain path segment, writes
/// through the OData key form.
fn read_url(endpoint: &str, id: &str) -> String {
    format!("{endpoint}/Users/{id}")
}

fn key_url(endpoint: &str, id: &str) -> String {
    format!("{endpoint}/Users({id})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_use_plain_path_writes_use_key_form() {
        assert_eq!(
            read_url("/odata/v4/svc", "u-1"),
            "/odata/v4/svc/Users/u-1"
        );
        assert_eq!(
            key_url("/odata/v4/svc", "u-1"),
            "/odata/v4/svc/Users(u-1)"
        );
    }
}
