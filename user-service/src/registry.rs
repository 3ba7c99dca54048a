use crate::UserRegistry;
use crate::pb::{AddUserRequest, AddUserResponse, GetUserRequest, GetUserResponse, User};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tonic::{Request, Response, Status};

/// A `UserRegistry` keeping every user in memory, keyed by name.
///
/// Nothing is persisted: restarting the process empties the registry.
#[derive(Debug, Default)]
pub struct InMemoryUserRegistry {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[tonic::async_trait]
impl UserRegistry for InMemoryUserRegistry {
    async fn add_user(
        &self,
        request: Request<AddUserRequest>,
    ) -> Result<Response<AddUserResponse>, Status> {
        let user = request
            .into_inner()
            .user
            .ok_or_else(|| Status::invalid_argument("Missing 'user' in AddUser request"))?;

        if user.name.trim().is_empty() {
            tracing::warn!("Rejected user without a name");
            return Err(Status::invalid_argument("User name cannot be empty"));
        }

        let mut users = self.users.write().await;

        if users.contains_key(&user.name) {
            tracing::warn!(name = %user.name, "Rejected duplicated user");
            return Err(Status::already_exists(format!(
                "User '{}' is already registered",
                user.name
            )));
        }

        tracing::info!(name = %user.name, pets = user.pets.len(), "Registered user");
        users.insert(user.name.clone(), user);

        let total_users = u32::try_from(users.len()).unwrap_or(u32::MAX);
        Ok(Response::new(AddUserResponse { total_users }))
    }

    async fn get_user(
        &self,
        request: Request<GetUserRequest>,
    ) -> Result<Response<GetUserResponse>, Status> {
        let name = request.into_inner().name;
        let users = self.users.read().await;

        match users.get(&name) {
            Some(user) => {
                tracing::debug!(name = %name, "Found user");
                Ok(Response::new(GetUserResponse {
                    user: Some(user.clone()),
                }))
            }
            None => {
                tracing::debug!(name = %name, "User not found");
                Err(Status::not_found(format!("User '{name}' not found")))
            }
        }
    }
}
