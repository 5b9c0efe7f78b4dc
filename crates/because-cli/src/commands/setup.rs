//! Setup command - link the documentation folder into node_modules.

use crate::app::App;
use crate::context::InstallContext;
use because_core::link;
use std::io::Write;
use tracing::info;

/// Run the setup command.
///
/// Prints one status line per processed entry. A conflicting entry stops
/// the pass and is returned as an error after its remediation hint.
pub fn run(app: &App, context: InstallContext, out: &mut dyn Write) -> anyhow::Result<()> {
    if let Some(note) = context.note() {
        info!("Note: {}", note);
    }

    let source_dir = app.config.source_dir(&app.project);
    let link_dir = app.config.link_dir(&app.project);
    let reconciliation = link::reconcile(&source_dir, &link_dir, context.allows_linking())?;

    for (spec, outcome) in &reconciliation.entries {
        let mark = if outcome.is_failure() { '✗' } else { '✓' };
        let shown = spec
            .link_path
            .strip_prefix(&app.project)
            .unwrap_or(&spec.link_path);
        writeln!(out, " {} {} ({})", mark, shown.display(), outcome)?;
    }

    if let Err(err) = reconciliation.into_result() {
        if let Some(hint) = err.remediation() {
            writeln!(out, "   {}", hint)?;
        }
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use because_core::{BecauseError, Config};
    use std::fs;
    use tempfile::TempDir;

    fn project() -> (TempDir, App) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        fs::create_dir_all(root.join("because")).unwrap();
        fs::create_dir_all(root.join("node_modules/because")).unwrap();
        fs::write(root.join("because/deployment.md"), "deploy").unwrap();
        let app = App::new(Config::default(), root.clone(), root);
        (temp_dir, app)
    }

    fn output(app: &App, context: InstallContext) -> (anyhow::Result<()>, String) {
        let mut out = Vec::new();
        let result = run(app, context, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_skipped_outside_local_install() {
        let (_temp_dir, app) = project();

        let (result, text) = output(&app, InstallContext::Global);
        assert!(result.is_ok());
        assert!(text.is_empty());
        assert!(fs::symlink_metadata(app.project.join("node_modules/because/deployment.md")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_links_then_reports_existing() {
        let (_temp_dir, app) = project();

        let (result, text) = output(&app, InstallContext::Local);
        assert!(result.is_ok());
        assert!(text.contains("✓ node_modules/because/deployment.md (Created a new symbolic link)"));

        let (result, text) = output(&app, InstallContext::Local);
        assert!(result.is_ok());
        assert!(text.contains("(The required symbolic link already exists there)"));
    }

    #[cfg(unix)]
    #[test]
    fn test_conflict_fails_with_hint() {
        let (_temp_dir, app) = project();
        fs::write(app.project.join("node_modules/because/deployment.md"), "mine").unwrap();

        let (result, text) = output(&app, InstallContext::Local);
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BecauseError>(),
            Some(BecauseError::ConflictingNonLink { .. })
        ));
        assert!(text.contains("✗ node_modules/because/deployment.md"));
        assert!(text.contains("Rename or delete"));
    }
}
