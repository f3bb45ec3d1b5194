//! Resume persistence: one pretty-printed JSON file per resume,
//! `<resumes dir>/<id>.resume`.

use std::path::{Path, PathBuf};

use super::ResumeData;
use crate::error::{Error, Result};

const EXTENSION: &str = "resume";

pub struct ResumeStore {
    dir: PathBuf,
}

impl ResumeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ids become file names, so anything that could leave the directory is refused.
    fn path_for(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\'])
            && !id.contains('\0');
        if !valid {
            return Err(Error::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", id, EXTENSION)))
    }

    pub fn save(&self, resume: &ResumeData) -> Result<()> {
        let path = self.path_for(&resume.id)?;
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(resume)?;
        std::fs::write(&path, json)?;
        log::info!("[STORE] Saved resume {} ({})", resume.id, resume.title);
        Ok(())
    }

    /// `None` when the file is missing or unreadable.
    pub fn load(&self, id: &str) -> Option<ResumeData> {
        let path = self.path_for(id).ok()?;
        let raw = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(resume) => Some(resume),
            Err(e) => {
                log::warn!("[STORE] Corrupt resume {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let path = self.path_for(id)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                log::info!("[STORE] Deleted resume {}", id);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::NotFound(path)),
            Err(e) => Err(e.into()),
        }
    }

    /// Every readable resume, most recently updated first. Corrupt files are skipped.
    pub fn list(&self) -> Result<Vec<ResumeData>> {
        std::fs::create_dir_all(&self.dir)?;

        let mut resumes = Vec::new();
        for entry in std::fs::read_dir(&self.dir)?.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let parsed = std::fs::read_to_string(&path)
                .ok()
                .and_then(|raw| serde_json::from_str::<ResumeData>(&raw).ok());
            match parsed {
                Some(resume) => resumes.push(resume),
                None => log::warn!("[STORE] Skipping unreadable {}", path.display()),
            }
        }

        resumes.sort_by(|a, b| b.updated.cmp(&a.updated));
        Ok(resumes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::tests::sample_content;

    fn store() -> (tempfile::TempDir, ResumeStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ResumeStore::new(dir.path().join("resumes"));
        (dir, store)
    }

    #[test]
    fn save_then_load() {
        let (_dir, store) = store();
        let mut resume = ResumeData::new("Platform");
        resume.content = Some(sample_content());
        store.save(&resume).unwrap();

        assert!(store.dir().join(format!("{}.resume", resume.id)).exists());
        assert_eq!(store.load(&resume.id), Some(resume));
    }

    #[test]
    fn load_missing_or_corrupt_is_none() {
        let (_dir, store) = store();
        assert!(store.load("nope").is_none());

        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.dir().join("bad.resume"), "{ not json").unwrap();
        assert!(store.load("bad").is_none());
    }

    #[test]
    fn delete_removes_file() {
        let (_dir, store) = store();
        let resume = ResumeData::new("Temp");
        store.save(&resume).unwrap();
        store.delete(&resume.id).unwrap();
        assert!(store.load(&resume.id).is_none());
        assert!(matches!(store.delete(&resume.id), Err(Error::NotFound(_))));
    }

    #[test]
    fn list_skips_foreign_and_corrupt_files() {
        let (_dir, store) = store();
        let mut older = ResumeData::new("Older");
        older.updated = "2024-01-01T00:00:00+00:00".into();
        let mut newer = ResumeData::new("Newer");
        newer.updated = "2025-06-01T00:00:00+00:00".into();
        store.save(&older).unwrap();
        store.save(&newer).unwrap();
        std::fs::write(store.dir().join("broken.resume"), "[]").unwrap();
        std::fs::write(store.dir().join("notes.txt"), "hello").unwrap();

        let titles: Vec<_> = store.list().unwrap().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, ["Newer", "Older"]);
    }

    #[test]
    fn list_creates_missing_directory() {
        let (_dir, store) = store();
        assert!(store.list().unwrap().is_empty());
        assert!(store.dir().is_dir());
    }

    #[test]
    fn path_traversal_ids_are_rejected() {
        let (_dir, store) = store();
        for id in ["", "..", "../escape", "a/b", "a\\b"] {
            let mut resume = ResumeData::new("x");
            resume.id = id.to_string();
            assert!(matches!(store.save(&resume), Err(Error::InvalidId(_))), "{:?}", id);
            assert!(store.load(id).is_none());
        }
    }
}
