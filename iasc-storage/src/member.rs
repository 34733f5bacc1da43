use std::{collections::HashMap, sync::RwLock};

use futures::future::join_all;
use tracing::{debug, error};

use iasc_slo::{errors, errors::Code, Result};

use crate::{group_member, user::User, Interface, MemberInterface};

/// Cache of group id to member list. The membership endpoint returns
/// foreign-key edges, so resolving a group's members is a two-step
/// protocol: list the edges, then fetch each referenced user.
///
/// Mutations prefer optimistic apply plus an authoritative refetch
/// over rollback; the server is the source of truth and a refetch is
/// cheap.
pub struct MemberStore<M, U> {
    api: M,
    users: U,
    cache: RwLock<HashMap<String, Vec<User>>>,
}

impl<M, U> MemberStore<M, U>
where
    M: MemberInterface,
    U: Interface<T = User>,
{
    pub fn new(api: M, users: U) -> Self {
        Self {
            api,
            users,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Replaces the cache entry for `group_id` with the freshly
    /// resolved member list. A member whose individual fetch fails is
    /// dropped rather than failing the whole call.
    pub async fn fetch_members(&self, group_id: &str) -> Result<Vec<User>> {
        let mut edges = Vec::new();
        if let Err(err) = self.api.list(group_id, &mut edges).await {
            match Code::from(err) {
                // a missing membership endpoint reads as an empty group
                Code::NotFound(_) => {}
                code => {
                    return Err(errors::fetch("group member", &code))
                }
            }
        }

        if edges.is_empty() {
            let mut cache = self.cache.write().map_err(errors::any)?;
            cache.insert(group_id.to_owned(), Vec::new());
            return Ok(Vec::new());
        }

        let resolved = join_all(edges.iter().map(|edge| async move {
            let mut user = User::default();
            match self.users.get(&edge.user_id, &mut user).await {
                Ok(()) => Some(user),
                Err(err) => {
                    // referential integrity gap, drop the member
                    debug!(
                        "member {} of group {} unresolved: {}",
                        edge.user_id, edge.group_id, err
                    );
                    None
                }
            }
        }))
        .await;
        let members: Vec<User> = resolved.into_iter().flatten().collect();

        let mut cache = self.cache.write().map_err(errors::any)?;
        cache.insert(group_id.to_owned(), members.clone());
        Ok(members)
    }

    /// One concurrent edge creation per user. The requested users are
    /// merged into the cached list before the requests settle, then an
    /// authoritative refetch overwrites the entry with ground truth;
    /// any edge failure is reported after the refetch has run.
    pub async fn add_users(
        &self,
        group_id: &str,
        users: &[User],
    ) -> Result<()> {
        {
            let mut cache = self.cache.write().map_err(errors::any)?;
            let entry = cache.entry(group_id.to_owned()).or_default();
            for user in users {
                if !entry.iter().any(|u| u.id == user.id) {
                    entry.push(user.clone());
                }
            }
        }

        let results = join_all(users.iter().map(|user| async move {
            let content = group_member::Content {
                group_id: group_id.to_owned(),
                user_id: user.id.clone(),
            };
            self.api.create(&content).await
        }))
        .await;

        let mut failed = Vec::new();
        let mut details = Vec::new();
        for (user, result) in users.iter().zip(results) {
            if let Err(err) = result {
                failed.push(user.id.clone());
                details.push(err.to_string());
            }
        }

        if let Err(err) = self.fetch_members(group_id).await {
            error!(
                "member refetch for group {} failed: {}",
                group_id, err
            );
        }

        if !failed.is_empty() {
            return Err(errors::add_membership(
                group_id,
                failed,
                &details.join("; "),
            ));
        }
        Ok(())
    }

    /// Deletes a single membership edge. The cache is only touched on
    /// success.
    pub async fn remove_user(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<()> {
        self.api.delete(user_id, group_id).await.map_err(|err| {
            errors::remove_membership(group_id, user_id, &err)
        })?;
        let mut cache = self.cache.write().map_err(errors::any)?;
        if let Some(members) = cache.get_mut(group_id) {
            members.retain(|user| user.id != user_id);
        }
        Ok(())
    }

    /// Local-only cascade after user deletion: the server cascades the
    /// edge removal itself, so no confirmation fetch is issued.
    pub fn purge_users(&self, user_ids: &[String]) -> Result<()> {
        let mut cache = self.cache.write().map_err(errors::any)?;
        for members in cache.values_mut() {
            members.retain(|user| !user_ids.contains(&user.id));
        }
        Ok(())
    }

    /// Drops the cache entries of deleted groups.
    pub fn purge_groups(&self, group_ids: &[String]) -> Result<()> {
        let mut cache = self.cache.write().map_err(errors::any)?;
        for group_id in group_ids {
            cache.remove(group_id);
        }
        Ok(())
    }

    /// Refreshes a user's snapshot in every cached member list, e.g.
    /// after the user record was edited.
    pub fn replace_user(&self, user: &User) -> Result<()> {
        let mut cache = self.cache.write().map_err(errors::any)?;
        for members in cache.values_mut() {
            for member in members.iter_mut() {
                if member.id == user.id {
                    *member = user.clone();
                }
            }
        }
        Ok(())
    }

    pub fn members(&self, group_id: &str) -> Result<Option<Vec<User>>> {
        let cache = self.cache.read().map_err(errors::any)?;
        Ok(cache.get(group_id).cloned())
    }

    pub fn snapshot(&self) -> Result<HashMap<String, Vec<User>>> {
        let cache = self.cache.read().map_err(errors::any)?;
        Ok(cache.clone())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use mockall::mock;

    use super::*;
    use crate::group_member::{Content, GroupMember};
    use crate::user::{self, Status};

    mock! {
        pub MemberApi {
            fn list(&self, group_id: &str, output: &mut Vec<GroupMember>) -> Result<()>;
            fn create(&self, input: &Content) -> Result<()>;
            fn delete(&self, user_id: &str, group_id: &str) -> Result<()>;
        }
    }

    #[async_trait]
    impl MemberInterface for MockMemberApi {
        async fn list(
            &self,
            group_id: &str,
            output: &mut Vec<GroupMember>,
        ) -> Result<()> {
            self.list(group_id, output)
        }
        async fn create(&self, input: &Content) -> Result<()> {
            self.create(input)
        }
        async fn delete(&self, user_id: &str, group_id: &str) -> Result<()> {
            self.delete(user_id, group_id)
        }
    }

    mock! {
        pub UserApi {
            fn get(&self, id: &str, output: &mut User) -> Result<()>;
        }
    }

    #[async_trait]
    impl Interface for MockUserApi {
        type T = User;
        type C = user::Content;

        async fn list(&self, _output: &mut Vec<User>) -> Result<()> {
            unimplemented!()
        }
        async fn get(&self, id: &str, output: &mut User) -> Result<()> {
            self.get(id, output)
        }
        async fn create(
            &self,
            _input: &user::Content,
            _output: &mut User,
        ) -> Result<()> {
            unimplemented!()
        }
        async fn put(&self, _input: &User) -> Result<()> {
            unimplemented!()
        }
        async fn delete(&self, _id: &str) -> Result<()> {
            unimplemented!()
        }
    }

    fn edge(group_id: &str, user_id: &str) -> GroupMember {
        GroupMember {
            group_id: group_id.to_owned(),
            user_id: user_id.to_owned(),
        }
    }

    fn user(id: &str) -> User {
        User {
            id: id.to_owned(),
            last_name: "Doe".to_owned(),
            email: format!("{id}@x.io"),
            user_type: "Employee".to_owned(),
            login_name: id.to_owned(),
            status: Status::Active,
            ..Default::default()
        }
    }

    fn resolving(ids: &[&str]) -> MockUserApi {
        let known: Vec<String> =
            ids.iter().map(|id| (*id).to_owned()).collect();
        let mut users = MockUserApi::new();
        users.expect_get().returning(move |id, output| {
            if known.iter().any(|k| k == id) {
                *output = user(id);
                Ok(())
            } else {
                Err(errors::not_found(id))
            }
        });
        users
    }

    #[tokio::test]
    async fn fetch_resolves_users_and_drops_failures() {
        let mut api = MockMemberApi::new();
        api.expect_list().returning(|group_id, output| {
            *output = vec![edge(group_id, "u1"), edge(group_id, "u2")];
            Ok(())
        });
        let store = MemberStore::new(api, resolving(&["u1"]));

        let members = store.fetch_members("g1").await.unwrap();
        assert_eq!(members, vec![user("u1")]);
        assert_eq!(store.members("g1").unwrap(), Some(vec![user("u1")]));
    }

    #[tokio::test]
    async fn fetch_empty_edges_skips_user_resolution() {
        let mut api = MockMemberApi::new();
        api.expect_list().returning(|_, _| Ok(()));
        // no get expectation: a user fetch would fail the test
        let store = MemberStore::new(api, MockUserApi::new());

        let members = store.fetch_members("g1").await.unwrap();
        assert!(members.is_empty());
        assert_eq!(store.members("g1").unwrap(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn fetch_missing_endpoint_reads_as_empty() {
        let mut api = MockMemberApi::new();
        api.expect_list()
            .returning(|_, _| Err(errors::not_found("/Groups(g1)/members")));
        let store = MemberStore::new(api, MockUserApi::new());

        let members = store.fetch_members("g1").await.unwrap();
        assert!(members.is_empty());
    }

    #[tokio::test]
    async fn refetch_drops_stale_members() {
        let mut api = MockMemberApi::new();
        let mut second = false;
        api.expect_list().returning(move |group_id, output| {
            if second {
                *output = vec![edge(group_id, "u1")];
            } else {
                *output =
                    vec![edge(group_id, "u1"), edge(group_id, "u2")];
                second = true;
            }
            Ok(())
        });
        let store = MemberStore::new(api, resolving(&["u1", "u2"]));

        assert_eq!(store.fetch_members("g1").await.unwrap().len(), 2);
        assert_eq!(
            store.fetch_members("g1").await.unwrap(),
            vec![user("u1")]
        );
    }

    #[tokio::test]
    async fn add_users_partial_failure_reconciles_to_server_truth() {
        let mut api = MockMemberApi::new();
        api.expect_create()
            .withf(|input| input.user_id == "u1")
            .returning(|_| Ok(()));
        api.expect_create()
            .withf(|input| input.user_id == "u2")
            .returning(|_| Err(errors::bad_request("status: 400")));
        api.expect_list().returning(|group_id, output| {
            *output = vec![edge(group_id, "u1")];
            Ok(())
        });
        let store = MemberStore::new(api, resolving(&["u1"]));

        let err = store
            .add_users("g1", &[user("u1"), user("u2")])
            .await
            .unwrap_err();
        match Code::from(err) {
            Code::AddMembership {
                group_id, user_ids, ..
            } => {
                assert_eq!(group_id, "g1");
                assert_eq!(user_ids, vec!["u2".to_owned()]);
            }
            code => panic!("unexpected error: {code}"),
        }
        // the refetch settled on what the server accepted
        assert_eq!(store.members("g1").unwrap(), Some(vec![user("u1")]));
    }

    #[tokio::test]
    async fn add_users_optimistic_state_survives_failed_refetch() {
        let mut api = MockMemberApi::new();
        api.expect_create().returning(|_| Ok(()));
        api.expect_list()
            .returning(|_, _| Err(errors::bad_request("status: 502")));
        let store = MemberStore::new(api, MockUserApi::new());

        store
            .add_users("g1", &[user("u1"), user("u1"), user("u2")])
            .await
            .unwrap();
        // deduplicated by identifier, kept until a refetch lands
        assert_eq!(
            store.members("g1").unwrap(),
            Some(vec![user("u1"), user("u2")])
        );
    }

    #[tokio::test]
    async fn remove_user_only_touches_cache_on_success() {
        let mut api = MockMemberApi::new();
        api.expect_create().returning(|_| Ok(()));
        api.expect_list().returning(|group_id, output| {
            *output = vec![edge(group_id, "u1"), edge(group_id, "u2")];
            Ok(())
        });
        let mut removed = false;
        api.expect_delete().returning(move |_, _| {
            if removed {
                return Err(errors::bad_request("status: 500"));
            }
            removed = true;
            Ok(())
        });
        let store = MemberStore::new(api, resolving(&["u1", "u2"]));
        store.fetch_members("g1").await.unwrap();

        store.remove_user("g1", "u1").await.unwrap();
        assert_eq!(store.members("g1").unwrap(), Some(vec![user("u2")]));

        let err = store.remove_user("g1", "u2").await.unwrap_err();
        assert!(matches!(
            Code::from(err),
            Code::RemoveMembership { .. }
        ));
        assert_eq!(store.members("g1").unwrap(), Some(vec![user("u2")]));
    }

    #[tokio::test]
    async fn purge_users_cascades_without_refetch() {
        let mut api = MockMemberApi::new();
        let mut calls = 0;
        api.expect_list().returning(move |group_id, output| {
            calls += 1;
            *output = match group_id {
                "g1" => vec![edge(group_id, "u1"), edge(group_id, "u2")],
                _ => vec![edge(group_id, "u2")],
            };
            // two priming fetches, nothing after the purge
            assert!(calls <= 2);
            Ok(())
        });
        let store = MemberStore::new(api, resolving(&["u1", "u2"]));
        store.fetch_members("g1").await.unwrap();
        store.fetch_members("g2").await.unwrap();

        store.purge_users(&["u2".to_owned()]).unwrap();
        assert_eq!(store.members("g1").unwrap(), Some(vec![user("u1")]));
        assert_eq!(store.members("g2").unwrap(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn purge_groups_drops_entries() {
        let mut api = MockMemberApi::new();
        api.expect_list().returning(|group_id, output| {
            *output = vec![edge(group_id, "u1")];
            Ok(())
        });
        let store = MemberStore::new(api, resolving(&["u1"]));
        store.fetch_members("g1").await.unwrap();

        store.purge_groups(&["g1".to_owned()]).unwrap();
        assert_eq!(store.members("g1").unwrap(), None);
    }

    #[tokio::test]
    async fn replace_user_refreshes_every_snapshot() {
        let mut api = MockMemberApi::new();
        api.expect_list().returning(|group_id, output| {
            *output = vec![edge(group_id, "u1")];
            Ok(())
        });
        let store = MemberStore::new(api, resolving(&["u1"]));
        store.fetch_members("g1").await.unwrap();
        store.fetch_members("g2").await.unwrap();

        let mut edited = user("u1");
        edited.last_name = "Smith".to_owned();
        store.replace_user(&edited).unwrap();

        for group_id in ["g1", "g2"] {
            let members = store.members(group_id).unwrap().unwrap();
            assert_eq!(members[0].last_name, "Smith");
        }
    }
}
