//! The workspace/project/document model.
//!
//! A workspace is loaded once from disk; from then on every pass takes the
//! current project values and produces new ones (documents are replaced
//! wholesale on each fix, never mutated). The original on-disk text is kept
//! as a baseline so the final commit can detect concurrent modification and
//! stay all-or-nothing.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::config::Config;
use crate::syntax::SourceTree;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no C# sources found under {0}")]
    NoSources(PathBuf),
    #[error("file changed on disk since load: {0}")]
    Conflict(PathBuf),
}

/// One source unit: stable identity plus the current tree snapshot.
#[derive(Clone)]
pub struct Document {
    /// Path relative to the workspace root, used in diagnostics.
    pub rel: String,
    pub path: PathBuf,
    pub tree: SourceTree,
}

impl Document {
    pub fn text(&self) -> &str {
        self.tree.text()
    }

    /// The same document with a replacement snapshot.
    pub fn with_tree(&self, tree: SourceTree) -> Document {
        Document {
            rel: self.rel.clone(),
            path: self.path.clone(),
            tree,
        }
    }
}

/// An ordered set of documents; insertion order drives deterministic
/// progress reporting.
#[derive(Clone)]
pub struct Project {
    pub name: String,
    pub documents: Vec<Document>,
}

/// The loaded workspace plus the load-time text baselines.
pub struct Workspace {
    pub root: PathBuf,
    pub projects: Vec<Project>,
    baselines: HashMap<PathBuf, String>,
}

/// Directories never scanned for sources.
const SKIPPED_DIRS: &[&str] = &["bin", "obj", "node_modules", "packages"];

impl Workspace {
    /// Load a workspace from a directory tree or a single `.cs` file.
    ///
    /// Every directory containing a `.csproj` becomes a project (named after
    /// the project file); sources under no project directory are grouped
    /// into a project named after the root.
    pub fn load(root: &Path, config: &Config) -> Result<Workspace, WorkspaceError> {
        let root = root.to_path_buf();

        if root.is_file() {
            let document = load_document(&root, &root)?;
            let baseline = [(root.clone(), document.text().to_string())].into();
            let name = root
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "workspace".to_string());
            return Ok(Workspace {
                root: root.clone(),
                projects: vec![Project {
                    name,
                    documents: vec![document],
                }],
                baselines: baseline,
            });
        }

        let mut project_dirs: Vec<(PathBuf, String)> = Vec::new();
        let mut sources: Vec<PathBuf> = Vec::new();

        for entry in WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_string_lossy();
                if e.file_type().is_dir()
                    && (name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref()))
                {
                    return false;
                }
                true
            })
        {
            let entry = entry.map_err(|e| WorkspaceError::Io {
                path: root.clone(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            match path.extension().and_then(|e| e.to_str()) {
                Some("csproj") => {
                    let name = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().to_string())
                        .unwrap_or_else(|| "project".to_string());
                    let dir = path.parent().unwrap_or(&root).to_path_buf();
                    project_dirs.push((dir, name));
                }
                Some("cs") => {
                    if !config.is_path_excluded(path) {
                        sources.push(path.to_path_buf());
                    }
                }
                _ => {}
            }
        }

        if sources.is_empty() {
            return Err(WorkspaceError::NoSources(root));
        }

        // Deepest project directory wins when projects nest.
        project_dirs.sort_by_key(|(dir, _)| dir.components().count());
        let fallback_name = root
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "workspace".to_string());

        let mut grouped: Vec<(String, Vec<PathBuf>)> = project_dirs
            .iter()
            .map(|(_, name)| (name.clone(), Vec::new()))
            .collect();
        let mut ungrouped: Vec<PathBuf> = Vec::new();

        for source in sources {
            let owner = project_dirs
                .iter()
                .rposition(|(dir, _)| source.starts_with(dir));
            match owner {
                Some(index) => grouped[index].1.push(source),
                None => ungrouped.push(source),
            }
        }
        if !ungrouped.is_empty() {
            grouped.push((fallback_name, ungrouped));
        }

        let mut projects = Vec::new();
        let mut baselines = HashMap::new();
        for (name, paths) in grouped {
            if paths.is_empty() {
                continue;
            }
            let mut documents = Vec::new();
            for path in paths {
                match load_document(&path, &root) {
                    Ok(document) => {
                        baselines.insert(path.clone(), document.text().to_string());
                        documents.push(document);
                    }
                    Err(e) => {
                        // Unreadable files are skipped, not fatal.
                        eprintln!("Warning: {}", e);
                    }
                }
            }
            if !documents.is_empty() {
                projects.push(Project { name, documents });
            }
        }

        if projects.is_empty() {
            return Err(WorkspaceError::NoSources(root));
        }

        Ok(Workspace {
            root,
            projects,
            baselines,
        })
    }

    /// Documents whose current text differs from the load-time baseline.
    pub fn changed_documents(&self, projects: &[Project]) -> Vec<(PathBuf, String)> {
        let mut changed = Vec::new();
        for project in projects {
            for document in &project.documents {
                match self.baselines.get(&document.path) {
                    Some(baseline) if baseline != document.text() => {
                        changed.push((document.path.clone(), document.text().to_string()));
                    }
                    _ => {}
                }
            }
        }
        changed
    }

    /// All-or-nothing commit of the pending changes.
    ///
    /// Every target file is first verified against its baseline; any drift
    /// aborts the whole batch before a single byte is written. Writes then
    /// go through a sibling temp file and an atomic rename.
    pub fn commit(&self, changed: &[(PathBuf, String)]) -> Result<(), WorkspaceError> {
        for (path, _) in changed {
            let on_disk = fs::read_to_string(path).map_err(|source| WorkspaceError::Io {
                path: path.clone(),
                source,
            })?;
            match self.baselines.get(path) {
                Some(baseline) if *baseline == on_disk => {}
                _ => return Err(WorkspaceError::Conflict(path.clone())),
            }
        }

        for (path, text) in changed {
            let tmp = path.with_extension("cs.structfix-tmp");
            fs::write(&tmp, text).map_err(|source| WorkspaceError::Io {
                path: tmp.clone(),
                source,
            })?;
            fs::rename(&tmp, path).map_err(|source| WorkspaceError::Io {
                path: path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

fn load_document(path: &Path, root: &Path) -> Result<Document, WorkspaceError> {
    let text = fs::read_to_string(path).map_err(|source| WorkspaceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tree = SourceTree::parse(text).map_err(|e| WorkspaceError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::other(e.to_string()),
    })?;
    let rel = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");
    Ok(Document {
        rel,
        path: path.to_path_buf(),
        tree,
    })
}
