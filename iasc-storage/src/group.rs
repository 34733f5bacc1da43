use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Server-assigned identifier; arrives as the `ID` primary key field.
    #[serde(alias = "ID", default)]
    pub id: String,
    /// Unique, immutable after creation. Updates never send this field.
    #[serde(default)]
    pub name: String,
    #[serde(alias = "display_name", default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[validate(length(min = 3, max = 255))]
    pub name: String,
    #[validate(length(min = 3, max = 255))]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}
