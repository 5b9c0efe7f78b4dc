//! Symbolic link reconciliation.
//!
//! Every entry directly under a source folder should be reachable through
//! a symbolic link of the same name in a link folder. Reconciling checks
//! each desired link in turn and only ever creates missing links: existing
//! links that point elsewhere and real files in the way are reported and
//! stop the pass, so user data is never replaced.
//!
//! Running a reconciliation twice is a no-op the second time.

use crate::error::{BecauseError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// One desired link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpec {
    /// Entry name, shared by the source entry and the link
    pub name: String,

    /// Where the link lives
    pub link_path: PathBuf,

    /// Link target, relative to the link's directory
    pub points_to: PathBuf,

    /// The source entry the link should resolve to
    pub source_path: PathBuf,
}

/// What reconciling a single [`LinkSpec`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The right link was already there; nothing was touched
    AlreadyCorrect,

    /// A link to somewhere else occupies the location
    ConflictingLink,

    /// A regular file or directory occupies the location
    ConflictingNonLink,

    /// The link was created
    Created,

    /// Creating the link failed
    CreationFailed { reason: String },
}

impl LinkOutcome {
    /// True if this outcome stops the reconciliation pass.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            LinkOutcome::ConflictingLink
                | LinkOutcome::ConflictingNonLink
                | LinkOutcome::CreationFailed { .. }
        )
    }
}

impl fmt::Display for LinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkOutcome::AlreadyCorrect => {
                write!(f, "The required symbolic link already exists there")
            }
            LinkOutcome::ConflictingLink => {
                write!(f, "Error: A different symbolic link already exists there")
            }
            LinkOutcome::ConflictingNonLink => {
                write!(f, "Error: A file/directory already exists there")
            }
            LinkOutcome::Created => write!(f, "Created a new symbolic link"),
            LinkOutcome::CreationFailed { .. } => {
                write!(f, "Error: Unable to create the symbolic link there")
            }
        }
    }
}

/// Outcomes of one pass, in processing order.
///
/// If the pass halted, the last entry holds the failing outcome and later
/// entries were never looked at.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub entries: Vec<(LinkSpec, LinkOutcome)>,
}

impl Reconciliation {
    /// The entry that stopped the pass, if any.
    pub fn halted_at(&self) -> Option<&(LinkSpec, LinkOutcome)> {
        self.entries.last().filter(|(_, outcome)| outcome.is_failure())
    }

    /// The error describing why the pass halted, if it did.
    pub fn failure(&self) -> Option<BecauseError> {
        let (spec, outcome) = self.halted_at()?;
        let path = spec.link_path.clone();
        match outcome {
            LinkOutcome::ConflictingLink => Some(BecauseError::ConflictingLink { path }),
            LinkOutcome::ConflictingNonLink => Some(BecauseError::ConflictingNonLink { path }),
            LinkOutcome::CreationFailed { reason } => Some(BecauseError::LinkCreationFailed {
                path,
                reason: reason.clone(),
            }),
            LinkOutcome::AlreadyCorrect | LinkOutcome::Created => None,
        }
    }

    /// Convert a halted pass into the matching error.
    pub fn into_result(self) -> Result<Self> {
        match self.failure() {
            Some(error) => Err(error),
            None => Ok(self),
        }
    }

    pub fn created(&self) -> usize {
        self.count(|o| *o == LinkOutcome::Created)
    }

    pub fn already_correct(&self) -> usize {
        self.count(|o| *o == LinkOutcome::AlreadyCorrect)
    }

    fn count(&self, pred: impl Fn(&LinkOutcome) -> bool) -> usize {
        self.entries.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Compute the desired links for every entry directly under `source_dir`.
///
/// Entries are returned in case-insensitive name order. A missing source
/// folder has no entries.
pub fn plan(source_dir: &Path, link_dir: &Path) -> Result<Vec<LinkSpec>> {
    let read_dir = match fs::read_dir(source_dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %source_dir.display(), "Source folder not found, nothing to link");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let source_abs = absolute(source_dir)?;
    let link_abs = absolute(link_dir)?;
    let back_to_source = relative_to(&link_abs, &source_abs);

    let mut names = Vec::new();
    for entry in read_dir {
        let entry = entry?;
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => warn!(entry = ?name, "Skipping entry with non UTF-8 name"),
        }
    }
    names.sort_by(|a, b| compare_names(a, b));

    Ok(names
        .into_iter()
        .map(|name| LinkSpec {
            link_path: link_dir.join(&name),
            points_to: back_to_source.join(&name),
            source_path: source_dir.join(&name),
            name,
        })
        .collect())
}

/// Reconcile every entry under `source_dir` against `link_dir`.
///
/// With `allowed` false nothing is inspected or mutated and the result is
/// empty. Otherwise entries are processed in order until one fails.
pub fn reconcile(source_dir: &Path, link_dir: &Path, allowed: bool) -> Result<Reconciliation> {
    if !allowed {
        info!("Linking is not permitted in this install context, skipping setup");
        return Ok(Reconciliation::default());
    }

    let mut reconciliation = Reconciliation::default();
    for spec in plan(source_dir, link_dir)? {
        let outcome = reconcile_one(&spec);
        debug!(
            link = %spec.link_path.display(),
            points_to = %spec.points_to.display(),
            outcome = ?outcome,
            "Reconciled link"
        );

        let stop = outcome.is_failure();
        reconciliation.entries.push((spec, outcome));
        if stop {
            warn!("Stopping setup at the first conflicting entry");
            break;
        }
    }

    info!(
        created = reconciliation.created(),
        already_correct = reconciliation.already_correct(),
        "Setup pass finished"
    );
    Ok(reconciliation)
}

/// Decide and, when the location is free, act for a single link.
pub fn reconcile_one(spec: &LinkSpec) -> LinkOutcome {
    match fs::symlink_metadata(&spec.link_path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            match create_symlink(&spec.points_to, &spec.link_path, &spec.source_path) {
                Ok(()) => LinkOutcome::Created,
                Err(e) => LinkOutcome::CreationFailed {
                    reason: e.to_string(),
                },
            }
        }
        Err(e) => LinkOutcome::CreationFailed {
            reason: e.to_string(),
        },
        Ok(meta) if meta.file_type().is_symlink() => {
            if points_to_source(spec) {
                LinkOutcome::AlreadyCorrect
            } else {
                LinkOutcome::ConflictingLink
            }
        }
        Ok(_) => LinkOutcome::ConflictingNonLink,
    }
}

/// Compare where the existing link resolves with where it should resolve.
fn points_to_source(spec: &LinkSpec) -> bool {
    let existing = fs::canonicalize(&spec.link_path);
    let intended = spec
        .link_path
        .parent()
        .map(|dir| fs::canonicalize(dir.join(&spec.points_to)));

    match (existing, intended) {
        (Ok(existing), Some(Ok(intended))) => existing == intended,
        _ => false,
    }
}

#[cfg(unix)]
fn create_symlink(points_to: &Path, link: &Path, _source: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(points_to, link)
}

#[cfg(windows)]
fn create_symlink(points_to: &Path, link: &Path, source: &Path) -> io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(points_to, link)
    } else {
        std::os::windows::fs::symlink_file(points_to, link)
    }
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_points_to: &Path, _link: &Path, _source: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Lexically absolute form of `path` with `.` and `..` resolved.
fn absolute(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}

/// Relative path leading from directory `from` to `to`. Both absolute.
fn relative_to(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<_> = from.components().collect();
    let to: Vec<_> = to.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for component in &to[common..] {
        rel.push(component.as_os_str());
    }
    rel
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Project {
        _temp_dir: TempDir,
        source: PathBuf,
        links: PathBuf,
    }

    fn project(entries: &[&str]) -> Project {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        let source = root.join("because");
        let links = root.join("node_modules").join("because");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&links).unwrap();
        for entry in entries {
            if let Some(dir) = entry.strip_suffix('/') {
                fs::create_dir(source.join(dir)).unwrap();
            } else {
                fs::write(source.join(entry), "docs").unwrap();
            }
        }
        Project {
            _temp_dir: temp_dir,
            source,
            links,
        }
    }

    fn outcomes(r: &Reconciliation) -> Vec<(&str, &LinkOutcome)> {
        r.entries
            .iter()
            .map(|(spec, outcome)| (spec.name.as_str(), outcome))
            .collect()
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(
            relative_to(Path::new("/p/node_modules/because"), Path::new("/p/because")),
            PathBuf::from("../../because")
        );
        assert_eq!(
            relative_to(Path::new("/p/a"), Path::new("/p/a/b")),
            PathBuf::from("b")
        );
    }

    #[test]
    fn test_absolute_resolves_dots() {
        let path = absolute(Path::new("/p/./x/../because")).unwrap();
        assert_eq!(path, PathBuf::from("/p/because"));
    }

    #[test]
    fn test_plan() {
        let p = project(&["b.md", "A.md", "guides/"]);
        let specs = plan(&p.source, &p.links).unwrap();

        let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A.md", "b.md", "guides"]);
        assert_eq!(specs[0].points_to, PathBuf::from("../../because/A.md"));
        assert_eq!(specs[2].link_path, p.links.join("guides"));
    }

    #[test]
    fn test_missing_source_folder() {
        let p = project(&[]);
        fs::remove_dir(&p.source).unwrap();

        let r = reconcile(&p.source, &p.links, true).unwrap();
        assert!(r.entries.is_empty());
        assert!(r.into_result().is_ok());
    }

    #[test]
    fn test_not_allowed_touches_nothing() {
        let p = project(&["a.md"]);

        let r = reconcile(&p.source, &p.links, false).unwrap();
        assert!(r.entries.is_empty());
        assert!(fs::symlink_metadata(p.links.join("a.md")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_create_then_already_correct() {
        let p = project(&["a.md", "guides/"]);

        let first = reconcile(&p.source, &p.links, true).unwrap();
        assert_eq!(
            outcomes(&first),
            vec![("a.md", &LinkOutcome::Created), ("guides", &LinkOutcome::Created)]
        );
        assert_eq!(
            fs::read_link(p.links.join("a.md")).unwrap(),
            PathBuf::from("../../because/a.md")
        );
        assert_eq!(fs::read_to_string(p.links.join("a.md")).unwrap(), "docs");

        let before = fs::symlink_metadata(p.links.join("a.md")).unwrap().modified().unwrap();
        let second = reconcile(&p.source, &p.links, true).unwrap();
        assert_eq!(
            outcomes(&second),
            vec![
                ("a.md", &LinkOutcome::AlreadyCorrect),
                ("guides", &LinkOutcome::AlreadyCorrect)
            ]
        );
        let after = fs::symlink_metadata(p.links.join("a.md")).unwrap().modified().unwrap();
        assert_eq!(before, after);
        assert!(second.into_result().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_conflicting_non_link_halts() {
        let p = project(&["a.md", "b.md", "c.md"]);
        fs::write(p.links.join("b.md"), "user data").unwrap();

        let r = reconcile(&p.source, &p.links, true).unwrap();
        assert_eq!(
            outcomes(&r),
            vec![("a.md", &LinkOutcome::Created), ("b.md", &LinkOutcome::ConflictingNonLink)]
        );
        assert_eq!(fs::read_to_string(p.links.join("b.md")).unwrap(), "user data");
        assert!(fs::symlink_metadata(p.links.join("c.md")).is_err());

        let err = r.into_result().unwrap_err();
        assert!(matches!(err, BecauseError::ConflictingNonLink { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_conflicting_link_halts() {
        let p = project(&["a.md", "b.md"]);
        fs::write(p.source.parent().unwrap().join("elsewhere.md"), "x").unwrap();
        std::os::unix::fs::symlink("../../elsewhere.md", p.links.join("a.md")).unwrap();

        let r = reconcile(&p.source, &p.links, true).unwrap();
        assert_eq!(outcomes(&r), vec![("a.md", &LinkOutcome::ConflictingLink)]);
        assert_eq!(
            fs::read_link(p.links.join("a.md")).unwrap(),
            PathBuf::from("../../elsewhere.md")
        );
        assert!(fs::symlink_metadata(p.links.join("b.md")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_conflicts() {
        let p = project(&["a.md"]);
        std::os::unix::fs::symlink("missing.md", p.links.join("a.md")).unwrap();

        let r = reconcile(&p.source, &p.links, true).unwrap();
        assert_eq!(outcomes(&r), vec![("a.md", &LinkOutcome::ConflictingLink)]);
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_link_to_source_is_correct() {
        let p = project(&["a.md"]);
        std::os::unix::fs::symlink(p.source.join("a.md"), p.links.join("a.md")).unwrap();

        let r = reconcile(&p.source, &p.links, true).unwrap();
        assert_eq!(outcomes(&r), vec![("a.md", &LinkOutcome::AlreadyCorrect)]);
    }

    #[cfg(unix)]
    #[test]
    fn test_creation_failure_halts() {
        let p = project(&["a.md", "b.md"]);
        fs::remove_dir(&p.links).unwrap();

        let r = reconcile(&p.source, &p.links, true).unwrap();
        assert_eq!(r.entries.len(), 1);
        assert!(matches!(r.entries[0].1, LinkOutcome::CreationFailed { .. }));
        assert!(matches!(
            r.into_result(),
            Err(BecauseError::LinkCreationFailed { .. })
        ));
    }
}
