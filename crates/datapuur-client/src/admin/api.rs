//! Remote admin API for users and roles.

use async_trait::async_trait;
use tracing::instrument;

use super::model::{NewRole, NewUser, Role, RoleUpdate, User, UserUpdate};
use crate::error::ClientResult;
use crate::rest::RestClient;

const USERS_PATH: &str = "/api/admin/users";
const ROLES_PATH: &str = "/api/admin/roles";

/// Admin CRUD operations.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_users(&self) -> ClientResult<Vec<User>>;
    async fn create_user(&self, user: &NewUser) -> ClientResult<User>;
    async fn update_user(&self, id: i64, update: &UserUpdate) -> ClientResult<User>;
    async fn delete_user(&self, id: i64) -> ClientResult<()>;

    async fn list_roles(&self) -> ClientResult<Vec<Role>>;
    async fn create_role(&self, role: &NewRole) -> ClientResult<Role>;
    async fn update_role(&self, id: i64, update: &RoleUpdate) -> ClientResult<Role>;
    async fn delete_role(&self, id: i64) -> ClientResult<()>;
}

/// [`AdminApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAdminApi {
    rest: RestClient,
}

impl HttpAdminApi {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    #[instrument(skip(self))]
    async fn list_users(&self) -> ClientResult<Vec<User>> {
        let request = self.rest.get(USERS_PATH).await?;
        self.rest.send_json(request).await
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn create_user(&self, user: &NewUser) -> ClientResult<User> {
        let request = self.rest.post(USERS_PATH).await?.json(user);
        self.rest.send_json(request).await
    }

    #[instrument(skip(self, update))]
    async fn update_user(&self, id: i64, update: &UserUpdate) -> ClientResult<User> {
        let request = self
            .rest
            .put(&format!("{USERS_PATH}/{id}"))
            .await?
            .json(update);
        self.rest.send_json(request).await
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: i64) -> ClientResult<()> {
        let request = self.rest.delete(&format!("{USERS_PATH}/{id}")).await?;
        self.rest.send_empty(request).await
    }

    #[instrument(skip(self))]
    async fn list_roles(&self) -> ClientResult<Vec<Role>> {
        let request = self.rest.get(ROLES_PATH).await?;
        self.rest.send_json(request).await
    }

    #[instrument(skip(self, role), fields(name = %role.name))]
    async fn create_role(&self, role: &NewRole) -> ClientResult<Role> {
        let request = self.rest.post(ROLES_PATH).await?.json(role);
        self.rest.send_json(request).await
    }

    #[instrument(skip(self, update))]
    async fn update_role(&self, id: i64, update: &RoleUpdate) -> ClientResult<Role> {
        let request = self
            .rest
            .put(&format!("{ROLES_PATH}/{id}"))
            .await?
            .json(update);
        self.rest.send_json(request).await
    }

    #[instrument(skip(self))]
    async fn delete_role(&self, id: i64) -> ClientResult<()> {
        let request = self.rest.delete(&format!("{ROLES_PATH}/{id}")).await?;
        self.rest.send_empty(request).await
    }
}
