use validator::Validate;

use iasc_slo::{errors, Result};
use iasc_storage::{group, user};

/// Form-level checks for a new user; runs before any network call.
pub fn user(content: &user::Content, existing: &[user::User]) -> Result<()> {
    content.validate().map_err(errors::validates)?;
    if existing
        .iter()
        .any(|u| u.email.eq_ignore_ascii_case(&content.email))
    {
        return Err(errors::bad_request(
            "email: A user with this email already exists",
        ));
    }
    Ok(())
}

/// Form-level checks for a new group; runs before any network call.
pub fn group(
    content: &group::Content,
    existing: &[group::Group],
) -> Result<()> {
    content.validate().map_err(errors::validates)?;
    if existing
        .iter()
        .any(|g| g.name.eq_ignore_ascii_case(&content.name))
    {
        return Err(errors::bad_request(
            "name: A group with this name already exists",
        ));
    }
    Ok(())
}
