pub mod group;
pub mod group_member;
pub mod member;
mod odata;
mod store;
pub mod user;

pub use member::MemberStore;
pub use odata::{GroupImpl, GroupMemberImpl, UserImpl};
pub use store::EntityStore;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use iasc_slo::Result;

/// A record cached by an [`EntityStore`].
pub trait Record {
    /// Entity kind used in error context ("user", "group").
    const KIND: &'static str;

    fn id(&self) -> &str;
}

impl Record for user::User {
    const KIND: &'static str = "user";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for group::Group {
    const KIND: &'static str = "group";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Remote collection endpoint for one entity type.
#[async_trait]
pub trait Interface: Sync {
    type T: DeserializeOwned + Serialize + Send + Sync + PartialEq;
    type C: Sync;

    async fn list(&self, output: &mut Vec<Self::T>) -> Result<()>;
    async fn get(&self, id: &str, output: &mut Self::T) -> Result<()>;
    /// The identifier is assigned server side; the created record is
    /// written back through `output`.
    async fn create(
        &self,
        input: &Self::C,
        output: &mut Self::T,
    ) -> Result<()>;
    async fn put(&self, input: &Self::T) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Remote membership-edge endpoint.
#[async_trait]
pub trait MemberInterface: Sync {
    async fn list(
        &self,
        group_id: &str,
        output: &mut Vec<group_member::GroupMember>,
    ) -> Result<()>;
    async fn create(&self, input: &group_member::Content) -> Result<()>;
    async fn delete(&self, user_id: &str, group_id: &str) -> Result<()>;
}
