use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::api::ApiClient;
use crate::models::User;

/// Mirror file name in the mirror directory
const MIRROR_FILE: &str = "users.json";

/// Persisted local copy of the full remote user list.
///
/// Clone is cheap - the store is just a path; the file itself is the shared
/// state, and the last writer wins.
#[derive(Clone)]
pub struct MirrorStore {
    path: PathBuf,
}

impl MirrorStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create mirror directory {}", dir.display()))?;
        Ok(Self {
            path: dir.join(MIRROR_FILE),
        })
    }

    /// Read the mirrored list if the mirror file exists.
    pub fn read(&self) -> Result<Option<Vec<User>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read mirror file {}", self.path.display()))?;

        let users: Vec<User> =
            serde_json::from_str(&contents).context("Failed to parse mirror file")?;

        Ok(Some(users))
    }

    /// Read-through load: return the mirrored list if one exists, otherwise
    /// fetch the full list from the remote service, mirror it, and return it.
    /// A remote failure surfaces to the caller; nothing is retried here.
    pub async fn load(&self, api: &ApiClient) -> Result<Vec<User>> {
        if let Some(users) = self.read()? {
            debug!(count = users.len(), "Loaded users from mirror");
            return Ok(users);
        }

        let users = api.fetch_users().await?;
        self.save(&users)?;
        debug!(count = users.len(), "Mirror seeded from remote");
        Ok(users)
    }

    /// Serialize the given list and overwrite the mirror file unconditionally.
    /// A write failure is fatal to the calling operation.
    pub fn save(&self, users: &[User]) -> Result<()> {
        let contents = serde_json::to_string_pretty(users)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write mirror file {}", self.path.display()))?;
        Ok(())
    }

    /// Age of the mirror for the status bar, derived from the file's
    /// modification time. "never" when no mirror exists yet.
    pub fn age_display(&self) -> String {
        let Ok(meta) = std::fs::metadata(&self.path) else {
            return "never".to_string();
        };
        let Ok(modified) = meta.modified() else {
            return "unknown".to_string();
        };
        format_age(age_minutes(modified))
    }
}

fn age_minutes(modified: SystemTime) -> i64 {
    let modified: DateTime<Utc> = modified.into();
    (Utc::now() - modified).num_minutes()
}

/// Bucket an age in minutes into a short human-readable form.
fn format_age(minutes: i64) -> String {
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::ops;
    use crate::models::UserDraft;

    fn user(id: i64, name: &str) -> User {
        UserDraft {
            name: name.to_string(),
            username: name.to_lowercase(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "555-0100".to_string(),
            website: "example.com".to_string(),
        }
        .into_user(id)
    }

    #[test]
    fn test_read_empty_mirror_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = MirrorStore::new(dir.path().to_path_buf()).unwrap();
        assert!(store.read().unwrap().is_none());
        assert_eq!(store.age_display(), "never");
    }

    #[test]
    fn test_save_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = MirrorStore::new(dir.path().to_path_buf()).unwrap();

        let users = vec![user(1, "Ann"), user(2, "Bob")];
        store.save(&users).unwrap();

        let loaded = store.read().unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "Ann");
        assert_eq!(loaded[1].id, 2);

        // save(read()) is a no-op on content
        store.save(&loaded).unwrap();
        let again = store.read().unwrap().unwrap();
        assert_eq!(serde_json::to_string(&again).unwrap(), serde_json::to_string(&loaded).unwrap());
    }

    #[test]
    fn test_mirror_is_faithful_log_of_operations() {
        let dir = tempfile::tempdir().unwrap();
        let store = MirrorStore::new(dir.path().to_path_buf()).unwrap();

        // Apply a sequence of mutations, saving after each, the way the app does
        let mut users: Vec<User> = Vec::new();
        ops::append(&mut users, user(1, "Ann"));
        store.save(&users).unwrap();
        ops::append(&mut users, user(2, "Bob"));
        store.save(&users).unwrap();
        ops::replace_by_id(&mut users, user(1, "Annie"));
        store.save(&users).unwrap();
        ops::remove_by_id(&mut users, 2);
        store.save(&users).unwrap();
        ops::remove_by_id(&mut users, 99); // non-existent id, no-op
        store.save(&users).unwrap();

        // The same sequence applied to an empty list matches the mirror
        let mut expected: Vec<User> = Vec::new();
        ops::append(&mut expected, user(1, "Ann"));
        ops::append(&mut expected, user(2, "Bob"));
        ops::replace_by_id(&mut expected, user(1, "Annie"));
        ops::remove_by_id(&mut expected, 2);
        ops::remove_by_id(&mut expected, 99);

        let mirrored = store.read().unwrap().unwrap();
        assert_eq!(
            serde_json::to_string(&mirrored).unwrap(),
            serde_json::to_string(&expected).unwrap()
        );
        assert_eq!(mirrored.len(), 1);
        assert_eq!(mirrored[0].name, "Annie");
    }

    #[test]
    fn test_save_overwrites_unconditionally() {
        let dir = tempfile::tempdir().unwrap();
        let store = MirrorStore::new(dir.path().to_path_buf()).unwrap();

        store.save(&[user(1, "Ann")]).unwrap();
        store.save(&[]).unwrap();
        assert_eq!(store.read().unwrap().unwrap().len(), 0);
    }

    #[test]
    fn test_format_age_buckets() {
        assert_eq!(format_age(0), "just now");
        assert_eq!(format_age(-3), "just now");
        assert_eq!(format_age(5), "5m ago");
        assert_eq!(format_age(61), "1h ago");
        assert_eq!(format_age(95), "2h ago");
        assert_eq!(format_age(1500), "1d ago");
    }
}
