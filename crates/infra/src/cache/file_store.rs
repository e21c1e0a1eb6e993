//! Durable token cache on the local filesystem
//!
//! One JSON file per credential identity, named `{key}.json` inside the cache
//! directory. Writes take an exclusive advisory lock so concurrent processes
//! never interleave bytes; reads take a shared lock. Files are created with
//! owner-only permissions because they hold bearer secrets.
//!
//! Every failure is logged and swallowed: a broken cache only costs an extra
//! token grant.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tourist_esim_core::TokenStore;
use tourist_esim_domain::constants::{TOKEN_CACHE_EXTENSION, TOKEN_CACHE_PREFIX};
use tourist_esim_domain::Token;
use tracing::{debug, warn};

/// [`TokenStore`] backed by one file per key
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    /// Store rooted at `dir` (created on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in the OS temp directory
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir())
    }

    /// Directory holding the cache files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{TOKEN_CACHE_EXTENSION}"))
    }

    fn read_entry(path: &Path) -> io::Result<String> {
        let mut file = File::open(path)?;
        file.lock_shared()?;
        let mut contents = String::new();
        let result = file.read_to_string(&mut contents);
        let _ = file.unlock();
        result.map(|_| contents)
    }

    fn write_entry(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let mut file = open_private(path)?;
        file.lock_exclusive()?;
        let result = (|| {
            file.set_len(0)?;
            file.write_all(contents.as_bytes())?;
            file.sync_data()
        })();
        let _ = file.unlock();
        result?;

        restrict_permissions(path)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<Token> {
        let path = self.path_for(key);

        let contents = match Self::read_entry(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read token cache");
                return None;
            }
        };

        match Token::from_json(&contents) {
            Ok(token) => Some(token),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "ignoring unreadable token cache entry");
                None
            }
        }
    }

    fn store(&self, key: &str, token: &Token) {
        let path = self.path_for(key);

        let contents = match token.to_json() {
            Ok(contents) => contents,
            Err(err) => {
                warn!(error = %err, "failed to encode token for cache");
                return;
            }
        };

        if let Err(err) = self.write_entry(&path, &contents) {
            warn!(path = %path.display(), error = %err, "failed to write token cache");
        }
    }

    fn forget(&self, key: &str) {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed token cache entry"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %path.display(), error = %err, "failed to remove token cache"),
        }
    }

    fn flush(&self) {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(dir = %self.dir.display(), error = %err, "token cache directory unreadable");
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !is_cache_file(&path) {
                continue;
            }
            if let Err(err) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %err, "failed to remove token cache");
            }
        }
    }
}

/// `tourist_esim_token_*.json`
fn is_cache_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.starts_with(TOKEN_CACHE_PREFIX)
        && path.extension().and_then(|e| e.to_str()) == Some(TOKEN_CACHE_EXTENSION)
}

fn open_private(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(false);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}

/// Force 0600 on files that existed before with wider permissions
fn restrict_permissions(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use tempfile::TempDir;
    use tourist_esim_domain::Credentials;

    use super::*;

    fn key() -> String {
        Credentials::new("client-a", "secret").cache_key()
    }

    #[test]
    fn stores_and_reads_back_token() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path());
        let token = Token::new("abc", 3600, "Bearer", Utc::now() - Duration::seconds(100));

        store.store(&key(), &token);
        let loaded = store.get(&key()).unwrap();

        assert_eq!(loaded.issued_at().timestamp(), token.issued_at().timestamp());
        assert_eq!(loaded.access_token().expose(), "abc");
        assert_eq!(loaded.lifetime_secs(), 3600);
        assert!(store.path_for(&key()).exists());
    }

    #[test]
    fn overwrite_shrinks_file() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path());

        store.store(&key(), &Token::bearer("a-very-long-token-value-that-takes-space", 3600));
        store.store(&key(), &Token::bearer("short", 3600));

        assert_eq!(store.get(&key()).unwrap().access_token().expose(), "short");
    }

    #[cfg(unix)]
    #[test]
    fn cache_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path());
        store.store(&key(), &Token::bearer("abc", 3600));

        let mode = fs::metadata(store.path_for(&key())).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn missing_or_corrupt_entry_is_absent() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path());
        assert!(store.get(&key()).is_none());

        fs::write(store.path_for(&key()), "{not json").unwrap();
        assert!(store.get(&key()).is_none());
    }

    #[test]
    fn entry_with_blank_token_is_absent() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path());
        let entry = format!(
            r#"{{"access_token":"","token_type":"Bearer","expires_in":3600,"created_at":{}}}"#,
            Utc::now().timestamp()
        );
        fs::write(store.path_for(&key()), entry).unwrap();

        assert!(store.get(&key()).is_none());
    }

    #[test]
    fn unwritable_directory_is_ignored() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        // a regular file where the directory should be
        let store = FileTokenStore::new(blocker.join("nested"));
        store.store(&key(), &Token::bearer("abc", 3600));
        assert!(store.get(&key()).is_none());
    }

    #[test]
    fn forget_removes_only_that_entry() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path());
        let other = Credentials::new("client-b", "secret").cache_key();

        store.store(&key(), &Token::bearer("a", 3600));
        store.store(&other, &Token::bearer("b", 3600));
        store.forget(&key());
        store.forget(&key());

        assert!(store.get(&key()).is_none());
        assert!(store.get(&other).is_some());
    }

    #[test]
    fn flush_keeps_foreign_files() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path());
        let foreign = dir.path().join("notes.json");
        fs::write(&foreign, "{}").unwrap();

        store.store(&key(), &Token::bearer("a", 3600));
        store.flush();

        assert!(store.get(&key()).is_none());
        assert!(foreign.exists());
    }
}
