//! Application state management for userhub.
//!
//! This module contains the core `App` struct that manages all application
//! state: UI state, the in-memory user list, the local mirror, and background
//! task coordination.
//!
//! The App is the single writer for this process: every network result
//! crosses one mpsc channel and is applied here, on the main loop, in arrival
//! order, which serializes all mutations of the list and the mirror. The one
//! exception is the initial read-through load, which seeds the mirror from
//! inside its own task before anything else is in flight. A stale refresh can
//! still overwrite a newer edit if it lands later; that matches the source
//! system's behavior and is surfaced in the docs rather than masked.

use anyhow::Result;
use rand::Rng;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::api::ApiClient;
use crate::bus::{CreationBus, Subscription};
use crate::config::Config;
use crate::mirror::{ops, MirrorStore};
use crate::models::{Field, User, UserDraft, UserSortColumn, ValidationError};
use crate::utils::{cmp_ignore_case, contains_ignore_case};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// 32 is plenty for the handful of in-flight operations this app can have.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Lower bound for client-generated identifiers, well above the demo
/// service's seed data range.
const CLIENT_ID_MIN: i64 = 1_000_000;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Users,
    Create,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Users => "Users",
            Tab::Create => "Create",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Users => Tab::Create,
            Tab::Create => Tab::Users,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    EditingUser,
    ConfirmingDelete,
    ConfirmingQuit,
    Quitting,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from background network tasks.
///
/// These variants are sent through an MPSC channel from spawned tasks back to
/// the main application, which applies them in arrival order.
enum TaskResult {
    /// First load completed (read-through: mirror or remote)
    Loaded(Vec<User>),
    /// Manual refresh fetched a fresh list from the remote service
    Refreshed(Vec<User>),
    /// A read of the user list failed; blocks the page until retried
    LoadFailed(String),
    /// A user was created remotely (identifier already substituted)
    Created(User),
    CreateFailed(String),
    /// A user was updated remotely (record composed from the edit form)
    Updated(User),
    UpdateFailed(String),
    /// A user was deleted remotely
    Deleted(i64),
    DeleteFailed(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub api: ApiClient,
    pub mirror: MirrorStore,
    pub bus: CreationBus,
    /// Keeps the status-bar toast listener registered for the app's lifetime
    creation_sub: Option<Subscription>,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub search_query: String,
    pub sort_column: UserSortColumn,
    pub sort_ascending: bool,
    pub selection: usize,

    // Data
    pub users: Vec<User>,
    pub loading: bool,
    pub load_error: Option<String>,
    /// A mutation is in flight; submits are disabled until it resolves
    pub saving: bool,

    // Create form state
    pub create_form: UserDraft,
    pub create_errors: Option<ValidationError>,
    pub create_focus: Field,

    // Edit modal state
    pub edit_form: UserDraft,
    pub edit_errors: Option<ValidationError>,
    pub edit_focus: Field,
    pub editing_id: Option<i64>,

    // Delete confirmation state
    pub pending_delete: Option<User>,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,

    // Creation notifications forwarded by the bus listener
    created_rx: mpsc::UnboundedReceiver<User>,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let api = ApiClient::new(config.api_url())?;
        let mirror = MirrorStore::new(config.mirror_dir()?)?;

        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let (created_tx, created_rx) = mpsc::unbounded_channel();

        // The users view observes creations through the bus, same as any
        // other interested component would.
        let bus = CreationBus::new();
        let creation_sub = bus.subscribe(move |user: &User| {
            let _ = created_tx.send(user.clone());
        });

        Ok(Self {
            config,
            api,
            mirror,
            bus,
            creation_sub: Some(creation_sub),

            state: AppState::Normal,
            current_tab: Tab::Users,
            search_query: String::new(),
            sort_column: UserSortColumn::Id,
            sort_ascending: true,
            selection: 0,

            users: Vec::new(),
            loading: false,
            load_error: None,
            saving: false,

            create_form: UserDraft::default(),
            create_errors: None,
            create_focus: Field::Name,

            edit_form: UserDraft::default(),
            edit_errors: None,
            edit_focus: Field::Name,
            editing_id: None,

            pending_delete: None,

            task_rx,
            task_tx,
            created_rx,

            status_message: None,
        })
    }

    // =========================================================================
    // Loading and refresh
    // =========================================================================

    /// Start the initial read-through load: mirror if present, remote
    /// otherwise. Runs in the background so the UI stays responsive.
    pub fn start_load(&mut self) {
        self.loading = true;
        self.load_error = None;

        let mirror = self.mirror.clone();
        let api = self.api.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            match mirror.load(&api).await {
                Ok(users) => Self::send_result(&tx, TaskResult::Loaded(users)).await,
                Err(e) => Self::send_result(&tx, TaskResult::LoadFailed(e.to_string())).await,
            }
        });
    }

    /// Re-fetch the user list from the remote service, overwriting the
    /// in-memory list and the mirror when the result arrives. An in-flight
    /// refresh is not cancelled by a newer trigger; whichever result lands
    /// last wins.
    pub fn refresh(&mut self) {
        info!("Starting background refresh of the user list");

        let api = self.api.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            match api.fetch_users().await {
                Ok(users) => Self::send_result(&tx, TaskResult::Refreshed(users)).await,
                Err(e) => Self::send_result(&tx, TaskResult::LoadFailed(e.to_string())).await,
            }
        });

        self.status_message = Some("Refreshing users...".to_string());
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Validate and submit the create form. On validation failure the
    /// per-field messages are stored for the form to display and no request
    /// is issued.
    pub fn submit_create(&mut self) {
        if self.saving {
            return;
        }

        if let Err(errors) = self.create_form.validate() {
            self.create_errors = Some(errors);
            return;
        }
        self.create_errors = None;
        self.saving = true;

        let draft = self.create_form.clone();
        let existing_ids: Vec<i64> = self.users.iter().map(|u| u.id).collect();
        let api = self.api.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            match api.create_user(&draft).await {
                Ok(created) => {
                    // The demo service answers every create with the same
                    // server-assigned identifier; substitute a client-generated
                    // one so list keys stay unique.
                    let user = User {
                        id: generate_client_id(&existing_ids),
                        ..created
                    };
                    Self::send_result(&tx, TaskResult::Created(user)).await;
                }
                Err(e) => Self::send_result(&tx, TaskResult::CreateFailed(e.to_string())).await,
            }
        });

        self.status_message = Some("Creating user...".to_string());
    }

    /// Open the edit modal seeded from the selected row.
    pub fn open_edit(&mut self) {
        let Some(user) = self.selected_user().cloned() else {
            return;
        };
        self.edit_form = UserDraft::from_user(&user);
        self.editing_id = Some(user.id);
        self.edit_errors = None;
        self.edit_focus = Field::Name;
        self.state = AppState::EditingUser;
    }

    pub fn close_edit(&mut self) {
        self.state = AppState::Normal;
        self.editing_id = None;
        self.edit_errors = None;
    }

    /// Validate and submit the edit form for the record being edited.
    pub fn submit_edit(&mut self) {
        if self.saving {
            return;
        }
        let Some(id) = self.editing_id else {
            return;
        };

        if let Err(errors) = self.edit_form.validate() {
            self.edit_errors = Some(errors);
            return;
        }
        self.edit_errors = None;

        let Some(existing) = self.users.iter().find(|u| u.id == id) else {
            self.status_message = Some("User no longer exists".to_string());
            self.close_edit();
            return;
        };

        // Compose the updated record up front; the server echo is ignored so
        // nested detail the form cannot edit survives the update.
        let updated = self.edit_form.apply_to(existing);
        self.saving = true;

        let draft = self.edit_form.clone();
        let api = self.api.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            match api.update_user(id, &draft).await {
                Ok(_) => Self::send_result(&tx, TaskResult::Updated(updated)).await,
                Err(e) => Self::send_result(&tx, TaskResult::UpdateFailed(e.to_string())).await,
            }
        });

        self.status_message = Some("Saving...".to_string());
    }

    /// Ask for confirmation before deleting the selected row.
    pub fn request_delete(&mut self) {
        let Some(user) = self.selected_user().cloned() else {
            return;
        };
        self.pending_delete = Some(user);
        self.state = AppState::ConfirmingDelete;
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.state = AppState::Normal;
    }

    /// Confirmed: issue the remote delete. The list and mirror change only
    /// when the result arrives.
    pub fn confirm_delete(&mut self) {
        self.state = AppState::Normal;
        let Some(user) = self.pending_delete.take() else {
            return;
        };
        self.saving = true;

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let id = user.id;

        tokio::spawn(async move {
            match api.delete_user(id).await {
                Ok(()) => Self::send_result(&tx, TaskResult::Deleted(id)).await,
                Err(e) => Self::send_result(&tx, TaskResult::DeleteFailed(e.to_string())).await,
            }
        });

        self.status_message = Some(format!("Deleting {}...", user.name));
    }

    // =========================================================================
    // Background task processing
    // =========================================================================

    /// Helper to send task results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send task result - channel closed");
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        // Collect all pending results first to avoid borrow conflicts
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }

        for result in results {
            self.process_task_result(result);
        }

        // Creation notifications delivered through the bus become toasts
        while let Ok(user) = self.created_rx.try_recv() {
            self.status_message = Some(format!("New user created: {}", user.name));
        }
    }

    /// Apply a single task result. Every mutation of the in-memory list and
    /// every mirror write after the initial read-through seed happens here.
    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Loaded(users) => {
                self.loading = false;
                self.load_error = None;
                info!(count = users.len(), "User list loaded");
                self.users = users;
                self.clamp_selection();
            }
            TaskResult::Refreshed(users) => {
                self.loading = false;
                self.load_error = None;
                self.users = users;
                if let Err(e) = self.mirror.save(&self.users) {
                    warn!(error = %e, "Failed to mirror refreshed list");
                }
                self.clamp_selection();
                self.status_message = Some(format!("Refreshed {} users", self.users.len()));
            }
            TaskResult::LoadFailed(msg) => {
                self.loading = false;
                error!(error = %msg, "User list fetch failed");
                self.load_error = Some("Failed to fetch users. Please try again later.".to_string());
            }
            TaskResult::Created(user) => {
                self.saving = false;
                ops::append(&mut self.users, user.clone());
                if let Err(e) = self.mirror.save(&self.users) {
                    warn!(error = %e, "Failed to mirror created user");
                }
                info!(id = user.id, "User created");
                self.bus.publish(&user);
                self.create_form = UserDraft::default();
                self.create_focus = Field::Name;
            }
            TaskResult::CreateFailed(msg) => {
                self.saving = false;
                error!(error = %msg, "Create failed");
                self.status_message = Some("Failed to create user. Please try again.".to_string());
            }
            TaskResult::Updated(user) => {
                self.saving = false;
                ops::replace_by_id(&mut self.users, user.clone());
                if let Err(e) = self.mirror.save(&self.users) {
                    warn!(error = %e, "Failed to mirror updated user");
                }
                info!(id = user.id, "User updated");
                self.close_edit();
                self.status_message = Some(format!("User {} updated", user.name));
            }
            TaskResult::UpdateFailed(msg) => {
                // Keep the modal open so the edits are not lost
                self.saving = false;
                error!(error = %msg, "Update failed");
                self.status_message = Some("Failed to update user. Please try again.".to_string());
            }
            TaskResult::Deleted(id) => {
                self.saving = false;
                // Removing an id that is already gone is a no-op
                ops::remove_by_id(&mut self.users, id);
                if let Err(e) = self.mirror.save(&self.users) {
                    warn!(error = %e, "Failed to mirror deletion");
                }
                info!(id, "User deleted");
                self.clamp_selection();
                self.status_message = Some(format!("User {} deleted", id));
            }
            TaskResult::DeleteFailed(msg) => {
                self.saving = false;
                error!(error = %msg, "Delete failed");
                self.status_message = Some("Failed to delete user. Please try again.".to_string());
            }
        }
    }

    // =========================================================================
    // List view
    // =========================================================================

    /// The user list as the table shows it: filtered by the search query,
    /// sorted by the active column.
    pub fn visible_users(&self) -> Vec<&User> {
        let query = self.search_query.trim();
        let mut users: Vec<&User> = self
            .users
            .iter()
            .filter(|u| {
                query.is_empty()
                    || contains_ignore_case(&u.name, query)
                    || contains_ignore_case(&u.username, query)
                    || contains_ignore_case(&u.email, query)
            })
            .collect();

        users.sort_by(|a, b| {
            let ord = match self.sort_column {
                UserSortColumn::Id => a.id.cmp(&b.id),
                UserSortColumn::Name => cmp_ignore_case(&a.name, &b.name),
                UserSortColumn::Username => cmp_ignore_case(&a.username, &b.username),
                UserSortColumn::Email => cmp_ignore_case(&a.email, &b.email),
            };
            if self.sort_ascending {
                ord
            } else {
                ord.reverse()
            }
        });

        users
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.visible_users().get(self.selection).copied()
    }

    pub fn cycle_sort_column(&mut self) {
        self.sort_column = self.sort_column.next();
    }

    pub fn toggle_sort_direction(&mut self) {
        self.sort_ascending = !self.sort_ascending;
    }

    pub fn move_selection_up(&mut self, amount: usize) {
        self.selection = self.selection.saturating_sub(amount);
    }

    pub fn move_selection_down(&mut self, amount: usize) {
        let len = self.visible_users().len();
        self.selection = (self.selection + amount).min(len.saturating_sub(1));
    }

    pub fn select_first(&mut self) {
        self.selection = 0;
    }

    pub fn select_last(&mut self) {
        self.selection = self.visible_users().len().saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_users().len();
        self.selection = self.selection.min(len.saturating_sub(1));
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    pub fn quit(&mut self) {
        if let Some(sub) = self.creation_sub.take() {
            sub.unsubscribe();
        }
        self.state = AppState::Quitting;
    }
}

/// Pick an identifier the current list does not use.
///
/// The demo service does not persist creations and echoes a constant id, so
/// identifier authority sits with the client for created records.
fn generate_client_id(existing: &[i64]) -> i64 {
    let mut rng = rand::thread_rng();
    loop {
        let id = rng.gen_range(CLIENT_ID_MIN..i64::MAX);
        if !existing.contains(&id) {
            return id;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_client_id_avoids_existing() {
        let existing = vec![1, 2, 3];
        let id = generate_client_id(&existing);
        assert!(id >= CLIENT_ID_MIN);
        assert!(!existing.contains(&id));
    }

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Users.next(), Tab::Create);
        assert_eq!(Tab::Create.next(), Tab::Users);
    }
}
