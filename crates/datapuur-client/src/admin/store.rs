//! In-memory user and role lists kept in step with the admin API.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use super::api::AdminApi;
use super::error::{AdminError, AdminResult};
use super::model::{NewRole, NewUser, Role, RoleUpdate, User, UserUpdate};
use super::validate::{validate_email, validate_password, validate_role_name, validate_username};
use crate::notice::{Notice, Notifier};

/// Users and roles as shown by the admin console.
///
/// Lists only change after the backend confirmed a mutation; a failed call
/// leaves them exactly as they were.
pub struct AdminStore {
    api: Arc<dyn AdminApi>,
    notifier: Arc<dyn Notifier>,
    users: RwLock<Vec<User>>,
    roles: RwLock<Vec<Role>>,
}

impl AdminStore {
    pub fn new(api: Arc<dyn AdminApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            users: RwLock::new(Vec::new()),
            roles: RwLock::new(Vec::new()),
        }
    }

    pub async fn users(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    pub async fn roles(&self) -> Vec<Role> {
        self.roles.read().await.clone()
    }

    // ─── Users ──────────────────────────────────────────────────────

    pub async fn load_users(&self) -> AdminResult<usize> {
        match self.api.list_users().await {
            Ok(users) => {
                let count = users.len();
                *self.users.write().await = users;
                Ok(count)
            }
            Err(e) => self.fail("Failed to load users", e.into()),
        }
    }

    pub async fn create_user(&self, user: NewUser) -> AdminResult<User> {
        let checked = validate_username(&user.username)
            .and_then(|_| validate_email(&user.email))
            .and_then(|_| validate_password(&user.password));
        if let Err(e) = checked {
            return self.fail("Invalid user", e);
        }

        match self.api.create_user(&user).await {
            Ok(created) => {
                info!("Created user {} ({})", created.username, created.id);
                self.users.write().await.push(created.clone());
                self.notifier.notify(Notice::success(
                    "User created",
                    format!("{} was added", created.username),
                ));
                Ok(created)
            }
            Err(e) => self.fail("Failed to create user", e.into()),
        }
    }

    pub async fn update_user(&self, id: i64, update: UserUpdate) -> AdminResult<User> {
        let checked = update
            .email
            .as_deref()
            .map_or(Ok(()), validate_email)
            .and_then(|_| update.password.as_deref().map_or(Ok(()), validate_password));
        if let Err(e) = checked {
            return self.fail("Invalid user", e);
        }

        match self.api.update_user(id, &update).await {
            Ok(updated) => {
                replace_by_id(&mut *self.users.write().await, updated.clone(), |u| u.id);
                self.notifier.notify(Notice::success(
                    "User updated",
                    format!("{} was updated", updated.username),
                ));
                Ok(updated)
            }
            Err(e) => self.fail("Failed to update user", e.into()),
        }
    }

    pub async fn delete_user(&self, id: i64) -> AdminResult<()> {
        match self.api.delete_user(id).await {
            Ok(()) => {
                self.users.write().await.retain(|u| u.id != id);
                self.notifier
                    .notify(Notice::success("User deleted", "The user was removed"));
                Ok(())
            }
            Err(e) => self.fail("Failed to delete user", e.into()),
        }
    }

    // ─── Roles ──────────────────────────────────────────────────────

    pub async fn load_roles(&self) -> AdminResult<usize> {
        match self.api.list_roles().await {
            Ok(roles) => {
                let count = roles.len();
                *self.roles.write().await = roles;
                Ok(count)
            }
            Err(e) => self.fail("Failed to load roles", e.into()),
        }
    }

    pub async fn create_role(&self, mut role: NewRole) -> AdminResult<Role> {
        role.name = role.name.trim().to_string();
        let checked = validate_role_name(&role.name, &self.roles.read().await, None);
        if let Err(e) = checked {
            return self.fail("Invalid role", e);
        }

        match self.api.create_role(&role).await {
            Ok(created) => {
                info!("Created role {} ({})", created.name, created.id);
                self.roles.write().await.push(created.clone());
                self.notifier.notify(Notice::success(
                    "Role created",
                    format!("{} was added", created.name),
                ));
                Ok(created)
            }
            Err(e) => self.fail("Failed to create role", e.into()),
        }
    }

    pub async fn update_role(&self, id: i64, mut update: RoleUpdate) -> AdminResult<Role> {
        if let Some(name) = update.name.as_mut() {
            *name = name.trim().to_string();
        }
        let checked = {
            let roles = self.roles.read().await;
            self.check_mutable(&roles, id).and_then(|_| match &update.name {
                Some(name) => validate_role_name(name, &roles, Some(id)),
                None => Ok(()),
            })
        };
        if let Err(e) = checked {
            return self.fail("Cannot update role", e);
        }

        match self.api.update_role(id, &update).await {
            Ok(updated) => {
                replace_by_id(&mut *self.roles.write().await, updated.clone(), |r| r.id);
                self.notifier.notify(Notice::success(
                    "Role updated",
                    format!("{} was updated", updated.name),
                ));
                Ok(updated)
            }
            Err(e) => self.fail("Failed to update role", e.into()),
        }
    }

    pub async fn delete_role(&self, id: i64) -> AdminResult<()> {
        let checked = self.check_mutable(&self.roles.read().await, id);
        if let Err(e) = checked {
            return self.fail("Cannot delete role", e);
        }

        match self.api.delete_role(id).await {
            Ok(()) => {
                self.roles.write().await.retain(|r| r.id != id);
                self.notifier
                    .notify(Notice::success("Role deleted", "The role was removed"));
                Ok(())
            }
            Err(e) => self.fail("Failed to delete role", e.into()),
        }
    }

    fn check_mutable(&self, roles: &[Role], id: i64) -> AdminResult<()> {
        match roles.iter().find(|r| r.id == id) {
            Some(role) if role.is_system_role => Err(AdminError::SystemRole(role.name.clone())),
            _ => Ok(()),
        }
    }

    fn fail<T>(&self, title: &str, err: AdminError) -> AdminResult<T> {
        warn!("{}: {}", title, err);
        self.notifier.notify(Notice::error(title, err.user_message()));
        Err(err)
    }
}

fn replace_by_id<T>(items: &mut Vec<T>, item: T, id: impl Fn(&T) -> i64) {
    let key = id(&item);
    match items.iter_mut().find(|existing| id(existing) == key) {
        Some(slot) => *slot = item,
        None => items.push(item),
    }
}
