use std::collections::HashMap;

use iasc_storage::{group::Group, user::User};

/// Inverts the group-to-members map into a user-to-groups view.
///
/// Iteration follows group-store order, so the groups of every user
/// come out in a stable order. The previous output takes part in the
/// computation: a group projected for a user last time is re-added if
/// the fresh inversion does not contain it yet AND the group still
/// exists in the store. That keeps assignments that were applied
/// optimistically visible until their membership refetch lands, while
/// deleted groups drop out everywhere at once.
pub fn project(
    groups: &[Group],
    members: &HashMap<String, Vec<User>>,
    previous: &HashMap<String, Vec<Group>>,
) -> HashMap<String, Vec<Group>> {
    let mut next: HashMap<String, Vec<Group>> = HashMap::new();

    for group in groups {
        let Some(list) = members.get(&group.id) else {
            continue;
        };
        for user in list {
            let entry = next.entry(user.id.clone()).or_default();
            if !entry.iter().any(|g| g.id == group.id) {
                entry.push(group.clone());
            }
        }
    }

    for (user_id, prev_groups) in previous {
        let entry = next.entry(user_id.clone()).or_default();
        for prev in prev_groups {
            let still_exists = groups.iter().any(|g| g.id == prev.id);
            if still_exists && !entry.iter().any(|g| g.id == prev.id) {
                entry.push(prev.clone());
            }
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str) -> Group {
        Group {
            id: id.to_owned(),
            name: id.to_owned(),
            display_name: id.to_uppercase(),
            description: String::new(),
        }
    }

    fn user(id: &str) -> User {
        User {
            id: id.to_owned(),
            ..Default::default()
        }
    }

    fn ids(groups: &[Group]) -> Vec<&str> {
        groups.iter().map(|g| g.id.as_str()).collect()
    }

    #[test]
    fn inverts_members_in_group_order() {
        let groups = vec![group("g1"), group("g2")];
        let members = HashMap::from([
            ("g1".to_owned(), vec![user("u1"), user("u2")]),
            ("g2".to_owned(), vec![user("u2")]),
        ]);

        let projected = project(&groups, &members, &HashMap::new());

        assert_eq!(ids(&projected["u1"]), ["g1"]);
        assert_eq!(ids(&projected["u2"]), ["g1", "g2"]);
    }

    #[test]
    fn pending_assignment_survives_unrelated_refetch() {
        let groups = vec![group("g1"), group("g3")];
        // g3 was assigned optimistically; its membership list has not
        // reported u1 yet
        let previous =
            HashMap::from([("u1".to_owned(), vec![group("g3")])]);
        let members =
            HashMap::from([("g1".to_owned(), vec![user("u1")])]);

        let projected = project(&groups, &members, &previous);

        assert_eq!(ids(&projected["u1"]), ["g1", "g3"]);
    }

    #[test]
    fn deleted_group_pruned_despite_stale_members_entry() {
        let groups = vec![group("g1")];
        let members = HashMap::from([
            ("g1".to_owned(), vec![user("u1")]),
            // g2 lingers in the membership cache after deletion
            ("g2".to_owned(), vec![user("u1")]),
        ]);
        let previous = HashMap::from([(
            "u1".to_owned(),
            vec![group("g1"), group("g2")],
        )]);

        let projected = project(&groups, &members, &previous);

        assert_eq!(ids(&projected["u1"]), ["g1"]);
    }

    #[test]
    fn duplicate_membership_projected_once() {
        let groups = vec![group("g1")];
        let members = HashMap::from([(
            "g1".to_owned(),
            vec![user("u1"), user("u1")],
        )]);

        let projected = project(&groups, &members, &HashMap::new());

        assert_eq!(ids(&projected["u1"]), ["g1"]);
    }
}
