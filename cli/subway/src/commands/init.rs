//! `subway init`: project scaffolding.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use subway_store::FileStore;

use crate::manifest::{SubwayManifest, DEFAULT_STORE_PATH, MANIFEST_FILE};

/// Create a new subway project in the directory `name`, relative to cwd.
pub fn run(name: &str) -> Result<()> {
    let project_dir = Path::new(name);
    create_project(project_dir, name)
}

pub(crate) fn create_project(project_dir: &Path, name: &str) -> Result<()> {
    if project_dir.exists() {
        bail!("directory '{}' already exists", project_dir.display());
    }

    fs::create_dir_all(project_dir)
        .with_context(|| format!("creating {}", project_dir.display()))?;

    fs::write(
        project_dir.join(MANIFEST_FILE),
        SubwayManifest::template(name),
    )
    .context("writing subway.toml")?;

    FileStore::new(project_dir.join(DEFAULT_STORE_PATH))
        .init()
        .context("creating empty network store")?;

    fs::write(project_dir.join(".gitignore"), "*.lock\n").context("writing .gitignore")?;

    println!("Created network '{name}'");
    println!("  {name}/{MANIFEST_FILE}");
    println!("  {name}/{DEFAULT_STORE_PATH}");
    println!("  {name}/.gitignore");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_project_structure() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = dir.path().join("metro");

        create_project(&project_path, "metro").unwrap();

        assert!(project_path.join(MANIFEST_FILE).is_file());
        assert!(project_path.join(DEFAULT_STORE_PATH).is_file());
        assert!(project_path.join(".gitignore").is_file());
    }

    #[test]
    fn init_generates_valid_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = dir.path().join("valid-manifest");

        create_project(&project_path, "valid-manifest").unwrap();

        let content = fs::read_to_string(project_path.join(MANIFEST_FILE)).unwrap();
        let manifest = SubwayManifest::from_str(&content).unwrap();
        assert_eq!(manifest.network.name, "valid-manifest");
    }

    #[test]
    fn init_generates_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = dir.path().join("empty-store");

        create_project(&project_path, "empty-store").unwrap();

        let repo = FileStore::new(project_path.join(DEFAULT_STORE_PATH))
            .load()
            .unwrap();
        assert_eq!(repo.station_count(), 0);
        assert_eq!(repo.line_count(), 0);
    }

    #[test]
    fn init_refuses_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = dir.path().join("existing");
        fs::create_dir(&project_path).unwrap();

        let result = create_project(&project_path, "existing");
        assert!(result.unwrap_err().to_string().contains("already exists"));
    }
}
