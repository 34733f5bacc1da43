use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(
    Debug, Default, Deserialize, Serialize, PartialEq, Eq, Clone, Copy,
)]
pub enum Status {
    #[default]
    #[serde(alias = "active", alias = "ACTIVE")]
    Active,
    #[serde(alias = "inactive", alias = "INACTIVE")]
    Inactive,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned identifier; arrives as the `ID` primary key field.
    #[serde(alias = "ID", default)]
    pub id: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_type: String,
    #[serde(default)]
    pub login_name: String,
    #[serde(default)]
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl User {
    /// The backend may report a lowercase user type ("employee");
    /// the console always shows it in title case.
    pub fn normalize(&mut self) {
        self.user_type = title_case(&self.user_type);
    }
}

fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => {
            first.to_uppercase().collect::<String>()
                + &chars.as_str().to_lowercase()
        }
        None => String::new(),
    }
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[validate(length(min = 2, max = 65))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[validate(length(min = 2, max = 65))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub user_type: String,
    #[validate(length(min = 1))]
    pub login_name: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_type_title_cased() {
        assert_eq!(title_case("employee"), "Employee");
        assert_eq!(title_case("PUBLIC"), "Public");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn id_aliased_from_primary_key_field() {
        let user: User = serde_json::from_str(
            r#"{"ID":"u-1","lastName":"Doe","email":"doe@corp.io","userType":"employee","loginName":"doe","status":"Active"}"#,
        )
        .unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.last_name, "Doe");
        assert_eq!(user.status, Status::Active);
    }

    #[test]
    fn lowercase_status_accepted() {
        let user: User =
            serde_json::from_str(r#"{"ID":"u-1","status":"inactive"}"#)
                .unwrap();
        assert_eq!(user.status, Status::Inactive);
    }
}
