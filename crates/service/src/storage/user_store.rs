use std::{
    collections::HashSet,
    io,
    ops::{Deref, DerefMut},
    path::{Path, PathBuf},
    sync::Arc,
};

use models::{Ticket, User};
use tokio::{
    fs,
    io::AsyncWriteExt,
    sync::{Mutex, OwnedMutexGuard},
};
use tracing::{debug, info, instrument, warn};

use crate::auth::password;
use crate::errors::ServiceError;

/// JSON file-backed user collection.
///
/// The document is a pretty-printed array of users. The in-memory copy is a
/// snapshot taken at [`JsonUserStore::load`]; every mutation rewrites the whole
/// file. Two processes writing the same file concurrently can still lose each
/// other's updates: the last rename wins.
#[derive(Debug)]
pub struct JsonUserStore {
    users: Vec<User>,
    file_path: PathBuf,
}

impl JsonUserStore {
    /// Read the document at `path`, creating it as `[]` when missing.
    ///
    /// A file that exists but does not parse is a storage error, never an
    /// empty collection.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, ServiceError> {
        let file_path = path.as_ref().to_path_buf();

        let bytes = match fs::read(&file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if create_empty_document(&file_path).await? {
                    info!("created empty users document");
                    return Ok(Self { users: Vec::new(), file_path });
                }
                // another task created it first; read what it wrote
                fs::read(&file_path)
                    .await
                    .map_err(|e| ServiceError::Storage(format!("cannot read {}: {e}", file_path.display())))?
            }
            Err(e) => {
                return Err(ServiceError::Storage(format!("cannot read {}: {e}", file_path.display())));
            }
        };

        // a zero-length file carries no users but also no damage
        let mut users: Vec<User> = if bytes.iter().all(u8::is_ascii_whitespace) {
            Vec::new()
        } else {
            serde_json::from_slice(&bytes).map_err(|e| {
                warn!(err = %e, "users document is not valid JSON");
                ServiceError::Storage(format!("{} is not a valid users document: {e}", file_path.display()))
            })?
        };
        users.iter_mut().for_each(User::sync_ticket_seq);

        debug!(users = users.len(), "users document loaded");
        Ok(Self { users, file_path })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// All users, in file order.
    pub fn all_users(&self) -> &[User] {
        &self.users
    }

    /// First user whose email matches exactly (case-sensitive).
    pub fn user_by_email(&self, email: &str) -> Result<&User, ServiceError> {
        self.users
            .iter()
            .find(|u| u.email == email)
            .ok_or_else(|| ServiceError::not_found("user"))
    }

    /// Register a user with a freshly salted password hash and persist.
    #[instrument(skip(self, name, password), fields(path = %self.file_path.display()))]
    pub async fn add_user(&mut self, name: &str, email: &str, password: &str) -> Result<&User, ServiceError> {
        if self.user_by_email(email).is_ok() {
            debug!("email already registered");
            return Err(ServiceError::DuplicateEmail(email.to_string()));
        }

        let hash = password::hash_password(password)?;
        self.users.push(User::new(name, email, hash));
        if let Err(e) = self.persist().await {
            self.users.pop();
            return Err(e);
        }

        info!(users = self.users.len(), "user_added");
        let idx = self.users.len() - 1;
        Ok(&self.users[idx])
    }

    /// The matching user when `password` verifies against the stored hash.
    ///
    /// The returned record still carries the hash; callers must not expose it.
    #[instrument(skip(self, password))]
    pub fn validate_login(&self, email: &str, password: &str) -> Result<&User, ServiceError> {
        let user = self.user_by_email(email)?;
        if !password::verify_password(password, &user.password) {
            debug!("password mismatch");
            return Err(ServiceError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Replace one user's ticket list wholesale and persist.
    #[instrument(skip(self, tickets), fields(count = tickets.len()))]
    pub async fn set_user_tickets(&mut self, email: &str, tickets: Vec<Ticket>) -> Result<&User, ServiceError> {
        let mut seen = HashSet::with_capacity(tickets.len());
        if let Some(dup) = tickets.iter().find(|t| !seen.insert(t.id.as_str())) {
            return Err(ServiceError::Validation(format!("duplicate ticket id {}", dup.id)));
        }

        let idx = self
            .users
            .iter()
            .position(|u| u.email == email)
            .ok_or_else(|| ServiceError::not_found("user"))?;

        let user = &mut self.users[idx];
        let previous = (std::mem::replace(&mut user.tickets, tickets), user.ticket_seq);
        user.sync_ticket_seq();

        if let Err(e) = self.persist().await {
            let user = &mut self.users[idx];
            (user.tickets, user.ticket_seq) = previous;
            return Err(e);
        }
        Ok(&self.users[idx])
    }

    /// Overwrite the whole document with `users`.
    ///
    /// Rejects collections that would break email uniqueness.
    #[instrument(skip_all, fields(users = users.len()))]
    pub async fn save_all_users(&mut self, mut users: Vec<User>) -> Result<(), ServiceError> {
        let mut seen = HashSet::with_capacity(users.len());
        if let Some(dup) = users.iter().find(|u| !seen.insert(u.email.as_str())) {
            return Err(ServiceError::DuplicateEmail(dup.email.clone()));
        }
        users.iter_mut().for_each(User::sync_ticket_seq);

        let previous = std::mem::replace(&mut self.users, users);
        if let Err(e) = self.persist().await {
            self.users = previous;
            return Err(e);
        }
        Ok(())
    }

    async fn persist(&self) -> Result<(), ServiceError> {
        write_document(&self.file_path, &self.users).await
    }
}

/// Create `path` holding `[]` unless something already exists there.
///
/// Returns `false` when the file was already present. Never replaces an
/// existing document, so it is safe without the writer lock.
async fn create_empty_document(path: &Path) -> Result<bool, ServiceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(ServiceError::storage)?;
    }
    let mut file = match fs::OpenOptions::new().write(true).create_new(true).open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(ServiceError::Storage(format!("cannot create {}: {e}", path.display()))),
    };
    file.write_all(b"[]\n")
        .await
        .map_err(|e| ServiceError::Storage(format!("cannot write {}: {e}", path.display())))?;
    Ok(true)
}

/// Write `users` to a sibling temp file, then rename it over `path`.
async fn write_document(path: &Path, users: &[User]) -> Result<(), ServiceError> {
    let data = serde_json::to_vec_pretty(users).map_err(ServiceError::storage)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| ServiceError::Storage(format!("{} is not a file path", path.display())))?;
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name.to_string_lossy(), uuid::Uuid::new_v4()));

    fs::write(&tmp, data)
        .await
        .map_err(|e| ServiceError::Storage(format!("cannot write {}: {e}", tmp.display())))?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(ServiceError::Storage(format!("cannot replace {}: {e}", path.display())));
    }
    debug!(path = %path.display(), users = users.len(), "users document written");
    Ok(())
}

/// Shared entry point to the users document for a long-lived process.
///
/// Every `open*` call re-reads the file, so each request sees what is on disk.
/// Writers are serialized inside this process by a mutex held for the whole
/// read-modify-write.
#[derive(Clone, Debug)]
pub struct UserStoreHandle {
    file_path: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

impl UserStoreHandle {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: Arc::new(path.into()), write_lock: Arc::new(Mutex::new(())) }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Fresh snapshot for reads. Mutations through it are not serialized.
    pub async fn open(&self) -> Result<JsonUserStore, ServiceError> {
        JsonUserStore::load(self.file_path.as_path()).await
    }

    /// Take the writer lock, then load a fresh snapshot under it.
    pub async fn open_for_write(&self) -> Result<StoreWriteGuard, ServiceError> {
        let lock = Arc::clone(&self.write_lock).lock_owned().await;
        let store = JsonUserStore::load(self.file_path.as_path()).await?;
        Ok(StoreWriteGuard { store, _lock: lock })
    }
}

/// A store snapshot that keeps the handle's writer lock until dropped.
pub struct StoreWriteGuard {
    store: JsonUserStore,
    _lock: OwnedMutexGuard<()>,
}

impl Deref for StoreWriteGuard {
    type Target = JsonUserStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl DerefMut for StoreWriteGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_ticket, temp_users_path};
    use models::{TicketPriority, TicketStatus};

    #[tokio::test]
    async fn missing_file_is_created_empty() -> Result<(), anyhow::Error> {
        let path = temp_users_path("missing");
        let store = JsonUserStore::load(&path).await?;
        assert!(store.all_users().is_empty());
        let on_disk = tokio::fs::read_to_string(&path).await?;
        assert_eq!(on_disk.trim(), "[]");
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn creating_the_document_never_clobbers_an_existing_one() -> Result<(), anyhow::Error> {
        let path = temp_users_path("create_once");
        assert!(create_empty_document(&path).await?);

        let mut store = JsonUserStore::load(&path).await?;
        store.add_user("Ann", "ann@x.com", "pw1").await?;
        // a reader that saw the file missing loses the creation race
        assert!(!create_empty_document(&path).await?);
        assert_eq!(JsonUserStore::load(&path).await?.all_users().len(), 1);
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn readers_racing_first_signup_keep_the_account() -> Result<(), anyhow::Error> {
        for _ in 0..5 {
            let path = temp_users_path("first_signup");
            let handle = UserStoreHandle::new(&path);

            let mut readers = Vec::new();
            for _ in 0..16 {
                let h = handle.clone();
                readers.push(tokio::spawn(async move { h.open().await.map(|_| ()) }));
            }
            let mut w = handle.open_for_write().await?;
            w.add_user("Ann", "ann@x.com", "pw1").await?;
            drop(w);
            for r in readers {
                r.await??;
            }
            assert!(handle.open().await?.user_by_email("ann@x.com").is_ok());
            let _ = tokio::fs::remove_file(&path).await;
        }
        Ok(())
    }

    #[tokio::test]
    async fn invalid_json_is_a_storage_error() -> Result<(), anyhow::Error> {
        let path = temp_users_path("corrupt");
        tokio::fs::write(&path, b"{ not json").await?;
        let err = JsonUserStore::load(&path).await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
        // the damaged file is left for inspection
        assert_eq!(tokio::fs::read(&path).await?, b"{ not json");
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn signup_login_scenario() -> Result<(), anyhow::Error> {
        let path = temp_users_path("scenario");
        let mut store = JsonUserStore::load(&path).await?;

        store.add_user("Ann", "ann@x.com", "pw1").await?;
        let dup = store.add_user("Bob", "ann@x.com", "pw2").await.unwrap_err();
        assert!(matches!(dup, ServiceError::DuplicateEmail(_)));
        assert_eq!(store.all_users().len(), 1);
        assert_eq!(store.all_users()[0].name, "Ann");

        let ann = store.validate_login("ann@x.com", "pw1")?;
        assert_eq!(ann.name, "Ann");
        assert_ne!(ann.password, "pw1");
        assert!(ann.password.starts_with("$argon2"));

        assert!(matches!(store.validate_login("ann@x.com", "wrong"), Err(ServiceError::InvalidCredentials)));
        assert!(matches!(store.validate_login("nobody@x.com", "pw1"), Err(ServiceError::NotFound(_))));

        // duplicate attempt did not touch the file either
        let reloaded = JsonUserStore::load(&path).await?;
        assert_eq!(reloaded.all_users().len(), 1);
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn lookup_is_exact_and_case_sensitive() -> Result<(), anyhow::Error> {
        let path = temp_users_path("lookup");
        let mut store = JsonUserStore::load(&path).await?;
        for (name, email) in [("Ann", "ann@x.com"), ("Bob", "bob@x.com"), ("Cy", "cy@x.com")] {
            store.add_user(name, email, "pw").await?;
        }
        assert_eq!(store.user_by_email("bob@x.com")?.name, "Bob");
        assert_eq!(store.user_by_email("cy@x.com")?.name, "Cy");
        assert!(store.user_by_email("BOB@x.com").is_err());
        assert!(store.user_by_email("bob@x.co").is_err());
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn set_tickets_touches_one_user_and_survives_reload() -> Result<(), anyhow::Error> {
        let path = temp_users_path("tickets");
        let mut store = JsonUserStore::load(&path).await?;
        store.add_user("Ann", "ann@x.com", "pw1").await?;
        store.add_user("Bob", "bob@x.com", "pw2").await?;
        store.set_user_tickets("bob@x.com", vec![sample_ticket("t1", TicketStatus::Closed)]).await?;

        let t1 = sample_ticket("t1", TicketStatus::Open);
        store.set_user_tickets("ann@x.com", vec![t1.clone()]).await?;

        let reloaded = JsonUserStore::load(&path).await?;
        assert_eq!(reloaded.user_by_email("ann@x.com")?.tickets, vec![t1]);
        let bob = reloaded.user_by_email("bob@x.com")?;
        assert_eq!(bob.tickets.len(), 1);
        assert_eq!(bob.tickets[0].status, TicketStatus::Closed);

        let missing = store.set_user_tickets("nobody@x.com", Vec::new()).await.unwrap_err();
        assert!(matches!(missing, ServiceError::NotFound(_)));
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn set_tickets_rejects_duplicate_ids() -> Result<(), anyhow::Error> {
        let path = temp_users_path("dup_ids");
        let mut store = JsonUserStore::load(&path).await?;
        store.add_user("Ann", "ann@x.com", "pw1").await?;
        let res = store
            .set_user_tickets(
                "ann@x.com",
                vec![sample_ticket("t1", TicketStatus::Open), sample_ticket("t1", TicketStatus::Closed)],
            )
            .await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        assert!(store.user_by_email("ann@x.com")?.tickets.is_empty());
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn save_all_round_trips_and_guards_uniqueness() -> Result<(), anyhow::Error> {
        let path = temp_users_path("roundtrip");
        let mut store = JsonUserStore::load(&path).await?;

        let mut ann = User::new("Ann", "ann@x.com", password::hash_password("pw1")?);
        ann.tickets = vec![sample_ticket("t1", TicketStatus::InProgress), sample_ticket("t4", TicketStatus::Open)];
        ann.tickets[1].priority = TicketPriority::Medium;
        let bob = User::new("Bob", "bob@x.com", password::hash_password("pw2")?);
        store.save_all_users(vec![ann.clone(), bob.clone()]).await?;

        let reloaded = JsonUserStore::load(&path).await?;
        assert_eq!(reloaded.all_users(), store.all_users());
        assert_eq!(reloaded.all_users()[0].ticket_seq, 4);

        let clash = store.save_all_users(vec![ann.clone(), ann]).await.unwrap_err();
        assert!(matches!(clash, ServiceError::DuplicateEmail(_)));
        assert_eq!(store.all_users().len(), 2);
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn reads_documents_without_ticket_seq() -> Result<(), anyhow::Error> {
        let path = temp_users_path("legacy");
        let hash = password::hash_password("pw1")?;
        let doc = serde_json::json!([{
            "name": "Ann",
            "email": "ann@x.com",
            "password": hash,
            "tickets": [
                {"id": "t2", "title": "a", "description": "", "status": "open", "priority": "low", "date": "2024-02-02"}
            ]
        }]);
        tokio::fs::write(&path, serde_json::to_vec_pretty(&doc)?).await?;

        let store = JsonUserStore::load(&path).await?;
        let ann = store.user_by_email("ann@x.com")?;
        assert_eq!(ann.ticket_seq, 2);
        assert_eq!(ann.next_ticket_id()?, "t3");
        assert!(store.validate_login("ann@x.com", "pw1").is_ok());
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn handle_rereads_file_per_open() -> Result<(), anyhow::Error> {
        let path = temp_users_path("handle");
        let handle = UserStoreHandle::new(&path);

        let before = handle.open().await?;
        {
            let mut w = handle.open_for_write().await?;
            w.add_user("Ann", "ann@x.com", "pw1").await?;
        }
        // the older snapshot is not refreshed; a new open sees the write
        assert!(before.all_users().is_empty());
        assert_eq!(handle.open().await?.all_users().len(), 1);
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_writers_in_one_process_do_not_lose_updates() -> Result<(), anyhow::Error> {
        let path = temp_users_path("concurrent");
        let handle = UserStoreHandle::new(&path);

        let mut tasks = Vec::new();
        for i in 0..8 {
            let h = handle.clone();
            tasks.push(tokio::spawn(async move {
                let mut w = h.open_for_write().await?;
                w.add_user("User", &format!("u{i}@x.com"), "pw").await?;
                Ok::<(), ServiceError>(())
            }));
        }
        for t in tasks {
            t.await??;
        }
        assert_eq!(handle.open().await?.all_users().len(), 8);
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }
}
