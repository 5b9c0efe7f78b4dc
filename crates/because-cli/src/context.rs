//! Install context detection.
//!
//! `because --setup` normally runs as an npm postinstall step. Links only
//! make sense when the package is installed locally into a project, so the
//! context is read from the environment npm provides.

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

/// How the package is being installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallContext {
    /// `npm install --global`
    Global,

    /// `npm install` run inside the package's own checkout
    PackageItself,

    /// Installed as a dependency of a project
    Local,
}

impl InstallContext {
    /// Detect the context from the current process environment.
    pub fn detect() -> Self {
        Self::from_vars(
            env::var_os("npm_config_global"),
            env::var_os("INIT_CWD"),
            env::var_os("PWD"),
        )
    }

    /// Detect the context from explicit variable values.
    pub fn from_vars(
        npm_config_global: Option<OsString>,
        init_cwd: Option<OsString>,
        pwd: Option<OsString>,
    ) -> Self {
        if npm_config_global.is_some_and(|v| !v.is_empty()) {
            InstallContext::Global
        } else if init_cwd == pwd {
            InstallContext::PackageItself
        } else {
            InstallContext::Local
        }
    }

    pub fn allows_linking(&self) -> bool {
        matches!(self, InstallContext::Local)
    }

    /// Why linking is skipped, for contexts that skip it.
    pub fn note(&self) -> Option<&'static str> {
        match self {
            InstallContext::Global => Some(
                "Since this package is being installed globally, the \"because/\" paths are not linked. \
                 Install the package locally to make use of symbolic links.",
            ),
            InstallContext::PackageItself => Some(
                "It appears that you are working on the package code since npm install is running inside \
                 the package itself. The \"because/\" paths are not linked. Install the package locally \
                 to make use of symbolic links.",
            ),
            InstallContext::Local => None,
        }
    }
}

/// The project being set up: where npm was invoked, else the shell's cwd.
pub fn project_dir() -> io::Result<PathBuf> {
    match env::var_os("INIT_CWD").or_else(|| env::var_os("PWD")) {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => env::current_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(s: &str) -> Option<OsString> {
        Some(OsString::from(s))
    }

    #[test]
    fn test_global_install() {
        let ctx = InstallContext::from_vars(os("true"), os("/p"), os("/p/node_modules/because"));
        assert_eq!(ctx, InstallContext::Global);
        assert!(!ctx.allows_linking());
        assert!(ctx.note().is_some());
    }

    #[test]
    fn test_empty_global_flag_is_ignored() {
        let ctx = InstallContext::from_vars(os(""), os("/p"), os("/p/node_modules/because"));
        assert_eq!(ctx, InstallContext::Local);
    }

    #[test]
    fn test_package_itself() {
        let ctx = InstallContext::from_vars(None, os("/pkg"), os("/pkg"));
        assert_eq!(ctx, InstallContext::PackageItself);
        assert!(!ctx.allows_linking());
    }

    #[test]
    fn test_local_install() {
        let ctx = InstallContext::from_vars(None, os("/p"), os("/p/node_modules/because"));
        assert_eq!(ctx, InstallContext::Local);
        assert!(ctx.allows_linking());
        assert!(ctx.note().is_none());

        let ctx = InstallContext::from_vars(None, None, os("/p"));
        assert_eq!(ctx, InstallContext::Local);
    }
}
