use iasc_storage::{group::Group, user::User};

/// Case-insensitive substring filter across the fields the extractor
/// yields; a blank term matches everything.
pub fn filter<'a, T, F>(items: &'a [T], term: &str, fields: F) -> Vec<&'a T>
where
    F: Fn(&'a T) -> Vec<Option<&'a str>>,
{
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| {
            fields(item).into_iter().flatten().any(|field| {
                field.to_lowercase().contains(&term)
            })
        })
        .collect()
}

pub fn users<'a>(items: &'a [User], term: &str) -> Vec<&'a User> {
    filter(items, term, |user| {
        vec![
            Some(user.last_name.as_str()),
            Some(user.email.as_str()),
            Some(user.login_name.as_str()),
            Some(user.user_type.as_str()),
            Some(user.status.as_str()),
            user.first_name.as_deref(),
        ]
    })
}

pub fn groups<'a>(items: &'a [Group], term: &str) -> Vec<&'a Group> {
    filter(items, term, |group| {
        vec![
            Some(group.id.as_str()),
            Some(group.name.as_str()),
            Some(group.display_name.as_str()),
            Some(group.description.as_str()),
        ]
    })
}
