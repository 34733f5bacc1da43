use async_trait::async_trait;

use iasc_slo::{errors, Result};

use crate::{
    group_member::{Content, GroupMember},
    MemberInterface,
};

use super::{ensure_success, Collection};

#[derive(Clone, Debug)]
pub struct GroupMemberImpl {
    client: reqwest::Client,
    endpoint: String,
}

impl GroupMemberImpl {
    pub fn new(client: reqwest::Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl MemberInterface for GroupMemberImpl {
    async fn list(
        &self,
        group_id: &str,
        output: &mut Vec<GroupMember>,
    ) -> Result<()> {
        let url = members_url(&self.endpoint, group_id);
        let resp =
            self.client.get(&url).send().await.map_err(errors::any)?;
        let resp = ensure_success(&url, resp).await?;
        let data: Collection<GroupMember> =
            resp.json().await.map_err(errors::any)?;
        *output = data.value;
        Ok(())
    }

    async fn create(&self, input: &Content) -> Result<()> {
        let url = format!("{}/GroupMembers", self.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(input)
            .send()
            .await
            .map_err(errors::any)?;
        ensure_success(&url, resp).await?;
        Ok(())
    }

    async fn delete(&self, user_id: &str, group_id: &str) -> Result<()> {
        let url = format!(
            "{}/GroupMembers/{}/{}",
            self.endpoint, user_id, group_id
        );
        let resp =
            self.client.delete(&url).send().await.map_err(errors::any)?;
        ensure_success(&url, resp).await?;
        Ok(())
    }
}

/// The edge listing hangs off the group as a plain navigation path.
fn members_url(endpoint: &str, group_id: &str) -> String {
    format!("{endpoint}/Groups/{group_id}/members")
}
