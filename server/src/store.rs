// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use common::{
    Client, CreateClientPayload, CreateProjectPayload, CreateUserPayload, Project, Role, Task,
    UpdateClientPayload, UpdateProjectPayload, UpdateUserPayload, User,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// On-disk shape of the database file: one JSON object with one array per
/// collection, the same layout json-server keeps in its db.json.
#[derive(Serialize, Deserialize, Default)]
struct DbFile {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    clients: Vec<Client>,
    #[serde(default)]
    projects: Vec<Project>,
}

/// What a cascade delete removed, for logging and for the response-side
/// decision between 204 and 404.
#[derive(Debug, PartialEq, Eq)]
pub struct CascadeOutcome {
    pub clients_removed: usize,
    pub projects_removed: usize,
}

/// The record store. The whole database lives in memory behind one RwLock
/// and every mutation rewrites the backing file, so a cascade delete is a
/// single atomic step from the store's perspective.
#[derive(Clone)]
pub struct Store {
    inner: Arc<RwLock<DbFile>>,
    path: PathBuf,
}

impl Store {
    /// Opens the database file, creating it (and its parent directory) when
    /// it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Store> {
        let path = path.as_ref().to_path_buf();

        let data = if path.exists() {
            info!("Database file already exists.");
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read database file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse database file {}", path.display()))?
        } else {
            info!("Creating database file {}", path.display());
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).context("Failed to create database directory")?;
                }
            }
            let empty = DbFile::default();
            let raw = serde_json::to_string_pretty(&empty)
                .context("Failed to serialize empty database")?;
            fs::write(&path, raw).context("Failed to create database file")?;
            empty
        };

        info!(
            "Store ready: {} users, {} clients, {} projects.",
            data.users.len(),
            data.clients.len(),
            data.projects.len()
        );

        Ok(Store {
            inner: Arc::new(RwLock::new(data)),
            path,
        })
    }

    /// Writes the current in-memory image back to disk. Callers must hold
    /// the write lock across the mutation and this call.
    fn persist(&self, data: &DbFile) -> Result<()> {
        let raw = serde_json::to_string_pretty(data).context("Failed to serialize database")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write database file {}", self.path.display()))
    }

    // --- users ---

    /// Lists users, optionally filtered by exact email match.
    pub fn list_users(&self, email: Option<&str>) -> Vec<User> {
        let data = self.inner.read();
        data.users
            .iter()
            .filter(|u| email.is_none_or(|e| u.email == e))
            .cloned()
            .collect()
    }

    pub fn get_user(&self, id: i64) -> Option<User> {
        self.inner.read().users.iter().find(|u| u.id == id).cloned()
    }

    pub fn create_user(&self, payload: CreateUserPayload) -> Result<User> {
        let mut data = self.inner.write();
        let user = User {
            id: next_id(data.users.iter().map(|u| u.id)),
            name: payload.name,
            email: payload.email,
            password: payload.password,
            role: payload.role.unwrap_or(Role::User),
        };
        debug!("Insert user: id={}, email={}", user.id, user.email);
        data.users.push(user.clone());
        self.persist(&data)?;
        Ok(user)
    }

    /// Applies a partial update. Returns None when no user has the given id.
    pub fn update_user(&self, id: i64, payload: UpdateUserPayload) -> Result<Option<User>> {
        let mut data = self.inner.write();
        let Some(user) = data.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = payload.name {
            user.name = name;
        }
        if let Some(email) = payload.email {
            user.email = email;
        }
        if let Some(password) = payload.password {
            user.password = password;
        }
        if let Some(role) = payload.role {
            user.role = role;
        }
        let updated = user.clone();
        self.persist(&data)?;
        Ok(Some(updated))
    }

    /// Deletes a user and every client and project row owned by it.
    ///
    /// The user row is checked first: when it is absent nothing is touched
    /// and None comes back. Dependents are removed clients first, then
    /// projects, then the user itself; the whole sequence happens under one
    /// write lock with a single file write, so a partial cascade can never
    /// reach disk.
    pub fn delete_user_cascade(&self, id: i64) -> Result<Option<CascadeOutcome>> {
        let mut data = self.inner.write();
        if !data.users.iter().any(|u| u.id == id) {
            debug!("Cascade delete: user {} not found, nothing removed.", id);
            return Ok(None);
        }

        // Owner references may predate the typed store, so match them the
        // way json-server did: by string comparison.
        let owner = id.to_string();

        let before = data.clients.len();
        data.clients.retain(|c| c.user_id.to_string() != owner);
        let clients_removed = before - data.clients.len();

        let before = data.projects.len();
        data.projects.retain(|p| p.user_id.to_string() != owner);
        let projects_removed = before - data.projects.len();

        data.users.retain(|u| u.id != id);

        self.persist(&data)?;

        info!(
            "Cascade delete for user {}: removed {} clients, {} projects.",
            id, clients_removed, projects_removed
        );

        Ok(Some(CascadeOutcome {
            clients_removed,
            projects_removed,
        }))
    }

    // --- clients ---

    /// Lists clients, optionally filtered by owner. The filter value is
    /// compared as a string so `?userId=7` matches owner id 7.
    pub fn list_clients(&self, user_id: Option<&str>) -> Vec<Client> {
        let data = self.inner.read();
        data.clients
            .iter()
            .filter(|c| user_id.is_none_or(|q| c.user_id.to_string() == q))
            .cloned()
            .collect()
    }

    pub fn get_client(&self, id: i64) -> Option<Client> {
        self.inner
            .read()
            .clients
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    pub fn create_client(&self, payload: CreateClientPayload) -> Result<Client> {
        let mut data = self.inner.write();
        let client = Client {
            id: next_id(data.clients.iter().map(|c| c.id)),
            user_id: payload.user_id,
            name: payload.name,
            email: payload.email,
        };
        debug!("Insert client: id={}, userId={}", client.id, client.user_id);
        data.clients.push(client.clone());
        self.persist(&data)?;
        Ok(client)
    }

    pub fn update_client(&self, id: i64, payload: UpdateClientPayload) -> Result<Option<Client>> {
        let mut data = self.inner.write();
        let Some(client) = data.clients.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = payload.name {
            client.name = name;
        }
        if let Some(email) = payload.email {
            // An empty string clears the address.
            let email = email.trim().to_string();
            client.email = (!email.is_empty()).then_some(email);
        }
        let updated = client.clone();
        self.persist(&data)?;
        Ok(Some(updated))
    }

    /// Returns true if a client row was removed.
    pub fn delete_client(&self, id: i64) -> Result<bool> {
        let mut data = self.inner.write();
        let before = data.clients.len();
        data.clients.retain(|c| c.id != id);
        let removed = data.clients.len() < before;
        if removed {
            self.persist(&data)?;
        }
        Ok(removed)
    }

    // --- projects ---

    pub fn list_projects(&self, user_id: Option<&str>) -> Vec<Project> {
        let data = self.inner.read();
        data.projects
            .iter()
            .filter(|p| user_id.is_none_or(|q| p.user_id.to_string() == q))
            .cloned()
            .collect()
    }

    pub fn get_project(&self, id: i64) -> Option<Project> {
        self.inner
            .read()
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn create_project(&self, payload: CreateProjectPayload, tasks: Vec<Task>) -> Result<Project> {
        let mut data = self.inner.write();
        let project = Project {
            id: next_id(data.projects.iter().map(|p| p.id)),
            user_id: payload.user_id,
            name: payload.name,
            description: payload.description.unwrap_or_default(),
            due: payload.due,
            folder: payload.folder.unwrap_or_default(),
            done: payload.done.unwrap_or(false),
            client_id: payload.client_id,
            client_name: payload.client_name,
            tasks,
        };
        debug!(
            "Insert project: id={}, userId={}, folder={}",
            project.id, project.user_id, project.folder
        );
        data.projects.push(project.clone());
        self.persist(&data)?;
        Ok(project)
    }

    pub fn update_project(
        &self,
        id: i64,
        payload: UpdateProjectPayload,
    ) -> Result<Option<Project>> {
        let mut data = self.inner.write();
        let Some(project) = data.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(name) = payload.name {
            project.name = name;
        }
        if let Some(description) = payload.description {
            project.description = description;
        }
        if let Some(due) = payload.due {
            project.due = due;
        }
        if let Some(folder) = payload.folder {
            project.folder = folder;
        }
        if let Some(done) = payload.done {
            project.done = done;
        }
        if let Some(tasks) = payload.tasks {
            // Full replacement; tasks are never addressable individually.
            project.tasks = tasks;
        }
        let updated = project.clone();
        self.persist(&data)?;
        Ok(Some(updated))
    }

    pub fn delete_project(&self, id: i64) -> Result<bool> {
        let mut data = self.inner.write();
        let before = data.projects.len();
        data.projects.retain(|p| p.id != id);
        let removed = data.projects.len() < before;
        if removed {
            self.persist(&data)?;
        }
        Ok(removed)
    }
}

/// Next identifier for a collection: one past the highest id in use, so ids
/// survive a reload without storing a counter.
fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}
