use serde::{Deserialize, Serialize};
use validator::Validate;

/// One membership edge. Uniqueness is the (user, group) pair; the
/// backing service keys the edges by the two foreign key fields.
#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct GroupMember {
    #[serde(rename = "group_ID")]
    pub group_id: String,
    #[serde(rename = "user_ID")]
    pub user_id: String,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct Content {
    #[validate(length(min = 1, max = 255))]
    #[serde(rename = "group_ID")]
    pub group_id: String,
    #[validate(length(min = 1, max = 255))]
    #[serde(rename = "user_ID")]
    pub user_id: String,
}
