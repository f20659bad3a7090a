use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const LISTING_FILE_NAME: &str = "jira_project_keys.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub name: String,
    pub key: String,
}

impl ProjectSummary {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

/// Writes `name: key` lines sorted by project name, replacing any earlier listing.
pub fn write_project_listing(dir: &Path, mut projects: Vec<ProjectSummary>) -> io::Result<PathBuf> {
    projects.sort_by(|a, b| a.name.cmp(&b.name));

    let mut contents = String::from("Jira Project Keys:\n\n");
    for project in &projects {
        contents.push_str(&format!("{}: {}\n", project.name, project.key));
    }

    let path = dir.join(LISTING_FILE_NAME);
    fs::write(&path, contents)?;
    Ok(path)
}

/// OSC 8 hyperlink to a local file; terminals without support show the bare path.
pub fn clickable_path(path: &Path) -> String {
    let display = path.display();
    format!("\x1b]8;;file://{display}\x1b\\{display}\x1b]8;;\x1b\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_is_sorted_and_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_project_listing(
            dir.path(),
            vec![
                ProjectSummary::new("Profiler", "PROFILER"),
                ProjectSummary::new("Imaging on Cloud", "IMAGLITE"),
            ],
        )
        .unwrap();

        let contents = fs::read_to_string(&first).unwrap();
        assert_eq!(
            contents,
            "Jira Project Keys:\n\nImaging on Cloud: IMAGLITE\nProfiler: PROFILER\n"
        );

        let second =
            write_project_listing(dir.path(), vec![ProjectSummary::new("Atlas", "ATL")]).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            fs::read_to_string(&second).unwrap(),
            "Jira Project Keys:\n\nAtlas: ATL\n"
        );
    }

    #[test]
    fn clickable_path_wraps_in_osc8() {
        let link = clickable_path(Path::new("/tmp/jira_project_keys.txt"));
        assert!(link.starts_with("\x1b]8;;file:///tmp/jira_project_keys.txt\x1b\\"));
        assert!(link.ends_with("\x1b]8;;\x1b\\"));
    }
}
