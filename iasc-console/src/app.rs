use std::{collections::HashMap, sync::RwLock, time::Duration};

use futures::future::join_all;
use tracing::error;

use iasc_slo::{errors, Result};
use iasc_storage::{
    group::{self, Group},
    user::{self, User},
    EntityStore, GroupImpl, GroupMemberImpl, Interface, MemberInterface,
    MemberStore, UserImpl,
};

use crate::{config::AppConfig, services};

/// One console session: the entity stores, the membership cache and
/// the user-to-groups projection derived from them. All state lives
/// here; nothing is global.
pub struct App<U, G, M, R>
where
    U: Interface<T = User, C = user::Content>,
    G: Interface<T = Group, C = group::Content>,
{
    users: EntityStore<U>,
    groups: EntityStore<G>,
    members: MemberStore<M, R>,
    projection: RwLock<HashMap<String, Vec<Group>>>,
}

/// The session wired against the live OData backend.
pub type Session = App<UserImpl, GroupImpl, GroupMemberImpl, UserImpl>;

impl Session {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(errors::any)?;
        Ok(App::wire(
            EntityStore::new(UserImpl::new(client.clone(), &config.api_url)),
            EntityStore::new(GroupImpl::new(
                client.clone(),
                &config.api_url,
            )),
            MemberStore::new(
                GroupMemberImpl::new(client.clone(), &config.api_url),
                UserImpl::new(client, &config.api_url),
            ),
        ))
    }
}

impl<U, G, M, R> App<U, G, M, R>
where
    U: Interface<T = User, C = user::Content>,
    G: Interface<T = Group, C = group::Content>,
    M: MemberInterface,
    R: Interface<T = User>,
{
    pub fn wire(
        users: EntityStore<U>,
        groups: EntityStore<G>,
        members: MemberStore<M, R>,
    ) -> Self {
        Self {
            users,
            groups,
            members,
            projection: RwLock::new(HashMap::new()),
        }
    }

    pub fn users(&self) -> &EntityStore<U> {
        &self.users
    }

    pub fn groups(&self) -> &EntityStore<G> {
        &self.groups
    }

    pub fn members(&self) -> &MemberStore<M, R> {
        &self.members
    }

    /// Reloads both collections and every group's member list, then
    /// rebuilds the projection. A group whose members cannot be
    /// resolved keeps its last cached list.
    pub async fn refresh(&self) -> Result<()> {
        self.users.list().await?;
        let groups = self.groups.list().await?;
        let results = join_all(
            groups
                .iter()
                .map(|group| self.members.fetch_members(&group.id)),
        )
        .await;
        for (group, result) in groups.iter().zip(results) {
            if let Err(err) = result {
                error!("members of group {} unavailable: {}", group.id, err);
            }
        }
        self.refresh_projection()
    }

    /// Recomputes the user-to-groups projection from the current group
    /// store and membership cache, feeding the previous output back in
    /// so optimistic assignments survive until their refetch lands.
    pub fn refresh_projection(&self) -> Result<()> {
        let groups = self.groups.all()?;
        let members = self.members.snapshot()?;
        let mut projection = self.projection.write().map_err(errors::any)?;
        let next =
            services::projection::project(&groups, &members, &projection);
        *projection = next;
        Ok(())
    }

    pub fn projection(&self) -> Result<HashMap<String, Vec<Group>>> {
        let projection = self.projection.read().map_err(errors::any)?;
        Ok(projection.clone())
    }

    pub fn user_groups(&self, user_id: &str) -> Result<Vec<Group>> {
        let projection = self.projection.read().map_err(errors::any)?;
        Ok(projection.get(user_id).cloned().unwrap_or_default())
    }

    pub async fn create_user(&self, content: &user::Content) -> Result<User> {
        services::valid::user(content, &self.users.all()?)?;
        self.users.create(content).await
    }

    pub async fn create_group(
        &self,
        content: &group::Content,
    ) -> Result<Group> {
        services::valid::group(content, &self.groups.all()?)?;
        self.groups.create(content).await
    }

    /// Full-record user update; cached member snapshots and the
    /// projection follow along.
    pub async fn update_user(&self, input: &User) -> Result<()> {
        self.users.update(input).await?;
        self.members.replace_user(input)?;
        self.refresh_projection()
    }

    pub async fn update_group(&self, input: &Group) -> Result<()> {
        self.groups.update(input).await?;
        self.refresh_projection()
    }

    /// Deletes users and cascades locally: their member entries and
    /// projection rows go away without a confirmation fetch.
    pub async fn delete_users(&self, ids: &[String]) -> Result<()> {
        self.users.delete_many(ids).await?;
        self.members.purge_users(ids)?;
        {
            let mut projection =
                self.projection.write().map_err(errors::any)?;
            for id in ids {
                projection.remove(id);
            }
        }
        self.refresh_projection()
    }

    pub async fn delete_groups(&self, ids: &[String]) -> Result<()> {
        self.groups.delete_many(ids).await?;
        self.members.purge_groups(ids)?;
        self.refresh_projection()
    }

    /// Adds the selected users to one group. The projection shows the
    /// assignment immediately; the membership refetch inside
    /// [`MemberStore::add_users`] reconciles it afterwards.
    pub async fn add_users_to_group(
        &self,
        group_id: &str,
        user_ids: &[String],
    ) -> Result<()> {
        let group = self.groups.get(group_id)?.ok_or_else(|| {
            errors::not_found(&format!("group {group_id}"))
        })?;
        let mut selected = Vec::new();
        for id in user_ids {
            if let Some(user) = self.users.get(id)? {
                selected.push(user);
            }
        }
        self.project_assignments(&selected, &group)?;
        let result = self.members.add_users(group_id, &selected).await;
        self.refresh_projection()?;
        result
    }

    /// Adds one user to the selected groups, one membership request
    /// per group. The first failure is surfaced after every request
    /// has settled and the projection was reconciled.
    pub async fn assign_groups(
        &self,
        user_id: &str,
        group_ids: &[String],
    ) -> Result<()> {
        let user = self.users.get(user_id)?.ok_or_else(|| {
            errors::not_found(&format!("user {user_id}"))
        })?;
        let mut targets = Vec::new();
        for id in group_ids {
            if let Some(group) = self.groups.get(id)? {
                targets.push(group);
            }
        }
        let selected = [user];
        for group in &targets {
            self.project_assignments(&selected, group)?;
        }
        let results = join_all(
            targets
                .iter()
                .map(|group| self.members.add_users(&group.id, &selected)),
        )
        .await;
        self.refresh_projection()?;
        for result in results {
            result?;
        }
        Ok(())
    }

    /// Removes one membership. The projection row shrinks immediately;
    /// on failure the next refresh restores it from the still intact
    /// membership cache.
    pub async fn unassign_group(
        &self,
        user_id: &str,
        group_id: &str,
    ) -> Result<()> {
        {
            let mut projection =
                self.projection.write().map_err(errors::any)?;
            if let Some(groups) = projection.get_mut(user_id) {
                groups.retain(|group| group.id != group_id);
            }
        }
        self.members.remove_user(group_id, user_id).await?;
        self.refresh_projection()
    }

    fn project_assignments(
        &self,
        users: &[User],
        group: &Group,
    ) -> Result<()> {
        let mut projection = self.projection.write().map_err(errors::any)?;
        for user in users {
            let entry = projection.entry(user.id.clone()).or_default();
            if !entry.iter().any(|g| g.id == group.id) {
                entry.push(group.clone());
            }
        }
        Ok(())
    }
}
