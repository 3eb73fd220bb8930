//! Configuration resolution from the environment and the filesystem.
//!
//! # Responsibilities
//! - Find an optional env file by probing candidate paths
//! - Read typed settings with logged fallbacks to defaults
//! - Locate the images directory relative to the executable

use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use crate::config::env::{EnvSource, ProcessEnv};
use crate::config::schema::{
    ServerConfig, TimeoutConfig, DEFAULT_ORIGIN_URL_BASE, DEFAULT_START_PORT,
    DEFAULT_WORKER_THREADS,
};

pub const ORIGIN_URL_BASE: &str = "ORIGIN_URL_BASE";
pub const SERVER_START_PORT: &str = "SERVER_START_PORT";
pub const SERVER_WORKER_THREADS: &str = "SERVER_WORKER_THREADS";

/// Directory levels between a built binary and the project root
/// (`servers/<lang>/<variant>/` in the benchmark layout).
const PROJECT_ROOT_DEPTH: &str = "../../..";

/// `KEY=VALUE` pairs read from an env file.
#[derive(Debug, Clone)]
pub struct EnvFile {
    pub path: PathBuf,
    vars: HashMap<String, String>,
}

impl EnvFile {
    /// Parse an env file. Any unreadable or malformed file is rejected whole.
    pub fn load(path: &Path) -> Result<Self, dotenvy::Error> {
        let vars = dotenvy::from_path_iter(path)?.collect::<Result<HashMap<_, _>, _>>()?;
        Ok(Self {
            path: path.to_path_buf(),
            vars,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

/// Resolves a [`ServerConfig`] once at startup.
pub struct ConfigResolver<E = ProcessEnv> {
    exec_dir: PathBuf,
    working_dir: PathBuf,
    env: E,
}

impl ConfigResolver<ProcessEnv> {
    /// Resolver for the running process.
    pub fn from_process() -> Self {
        let exec_path = std::env::current_exe().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not determine executable path");
            PathBuf::from(std::env::args().next().unwrap_or_default())
        });
        let exec_dir = exec_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let working_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        Self::new(exec_dir, working_dir, ProcessEnv)
    }
}

impl<E: EnvSource> ConfigResolver<E> {
    pub fn new(exec_dir: impl Into<PathBuf>, working_dir: impl Into<PathBuf>, env: E) -> Self {
        let working_dir = working_dir.into();
        let exec_dir = exec_dir.into();
        let exec_dir = if exec_dir.is_absolute() {
            exec_dir
        } else {
            working_dir.join(exec_dir)
        };
        Self {
            exec_dir,
            working_dir,
            env,
        }
    }

    /// Project root: the executable directory walked up three levels.
    pub fn project_root(&self) -> PathBuf {
        self.absolutize(&self.exec_dir.join(PROJECT_ROOT_DEPTH))
    }

    /// Env file candidates in probing order.
    pub fn env_file_candidates(&self) -> Vec<PathBuf> {
        vec![
            self.project_root().join(".env"),
            self.exec_dir.join(PROJECT_ROOT_DEPTH).join(".env"),
            self.working_dir.join(".env"),
        ]
    }

    /// Load the first env file candidate that parses.
    pub fn load_env_file(&self) -> Option<EnvFile> {
        self.env_file_candidates()
            .into_iter()
            .find_map(|path| match EnvFile::load(&path) {
                Ok(file) => {
                    tracing::info!(path = %path.display(), "Loaded env file");
                    Some(file)
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Env file candidate skipped");
                    None
                }
            })
    }

    /// Fallback image directories, probed only when the primary is missing.
    pub fn images_fallbacks(&self) -> Vec<PathBuf> {
        [
            self.exec_dir.join(PROJECT_ROOT_DEPTH).join("images"),
            self.exec_dir.join("../..").join("images"),
            PathBuf::from("images"),
        ]
        .iter()
        .map(|p| self.absolutize(p))
        .collect()
    }

    /// `<projectRoot>/images`, or the first existing fallback.
    ///
    /// A missing directory is kept as-is so requests report "not found".
    pub fn resolve_images_path(&self) -> PathBuf {
        let primary = self.project_root().join("images");
        if primary.exists() {
            return primary;
        }

        match self.images_fallbacks().into_iter().find(|p| p.exists()) {
            Some(found) => found,
            None => {
                tracing::warn!(path = %primary.display(), "Images directory not found");
                primary
            }
        }
    }

    /// Build the full configuration. Never fails.
    pub fn resolve(&self) -> ServerConfig {
        let env_file = self.load_env_file();
        let lookup = |key: &str| self.lookup(env_file.as_ref(), key);

        let origin_url_base =
            lookup(ORIGIN_URL_BASE).unwrap_or_else(|| DEFAULT_ORIGIN_URL_BASE.to_string());
        let start_port =
            parse_or_default(SERVER_START_PORT, lookup(SERVER_START_PORT), DEFAULT_START_PORT);
        let worker_threads = parse_or_default(
            SERVER_WORKER_THREADS,
            lookup(SERVER_WORKER_THREADS),
            DEFAULT_WORKER_THREADS,
        );

        let config = ServerConfig {
            origin_url_base,
            start_port,
            worker_threads,
            images_path: self.resolve_images_path(),
            env_file: env_file.map(|f| f.path),
            timeouts: TimeoutConfig::default(),
        };

        tracing::info!(
            images_path = %config.images_path.display(),
            origin_url_base = %config.origin_url_base,
            start_port = config.start_port,
            worker_threads = config.worker_threads,
            "Configuration resolved"
        );

        config
    }

    /// Process environment first, then the env file.
    ///
    /// A variable present in the process environment shadows the file even
    /// when empty. An empty result means unset.
    fn lookup(&self, env_file: Option<&EnvFile>, key: &str) -> Option<String> {
        let value = match self.env.var(key) {
            Some(value) => value,
            None => env_file.and_then(|f| f.get(key))?.to_string(),
        };
        (!value.is_empty()).then_some(value)
    }

    fn absolutize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.working_dir.join(path))
        }
    }
}

/// Parse `raw`, logging and falling back to `default` when it does not parse.
fn parse_or_default<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Display,
{
    match raw {
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %value, default = %default, "Invalid integer value, using default");
            default
        }),
        None => default,
    }
}

/// Lexically remove `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// `<root>/servers/rust/axum` as the executable directory plus a separate working dir.
    struct Layout {
        root: TempDir,
        work: TempDir,
    }

    impl Layout {
        fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            fs::create_dir_all(root.path().join("servers/rust/axum")).unwrap();
            Self {
                root,
                work: tempfile::tempdir().unwrap(),
            }
        }

        fn exec_dir(&self) -> PathBuf {
            self.root.path().join("servers/rust/axum")
        }

        fn resolver(&self, vars: &[(&str, &str)]) -> ConfigResolver<HashMap<String, String>> {
            let env = vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            ConfigResolver::new(self.exec_dir(), self.work.path(), env)
        }
    }

    #[test]
    fn defaults_without_env_or_files() {
        let layout = Layout::new();
        let config = layout.resolver(&[]).resolve();

        assert_eq!(config.origin_url_base, "http://localhost:8080/");
        assert_eq!(config.start_port, 3001);
        assert_eq!(config.worker_threads, 0);
        assert_eq!(config.images_path, layout.root.path().join("images"));
        assert!(config.env_file.is_none());
    }

    #[test]
    fn reads_settings_from_env() {
        let layout = Layout::new();
        let config = layout
            .resolver(&[
                ("ORIGIN_URL_BASE", "http://origin:9000/img/"),
                ("SERVER_START_PORT", "4000"),
                ("SERVER_WORKER_THREADS", "8"),
            ])
            .resolve();

        assert_eq!(config.origin_url_base, "http://origin:9000/img/");
        assert_eq!(config.start_port, 4000);
        assert_eq!(config.worker_threads, 8);
    }

    #[test]
    fn invalid_integers_fall_back_to_defaults() {
        let layout = Layout::new();
        let config = layout
            .resolver(&[
                ("SERVER_START_PORT", "70000"),
                ("SERVER_WORKER_THREADS", "notanumber"),
            ])
            .resolve();

        assert_eq!(config.start_port, 3001);
        assert_eq!(config.worker_threads, 0);
    }

    #[test]
    fn empty_value_is_unset() {
        let layout = Layout::new();
        let config = layout.resolver(&[("ORIGIN_URL_BASE", "")]).resolve();
        assert_eq!(config.origin_url_base, "http://localhost:8080/");
    }

    #[test]
    fn empty_process_value_shadows_env_file() {
        let layout = Layout::new();
        fs::write(
            layout.root.path().join(".env"),
            "ORIGIN_URL_BASE=http://from-file/\nSERVER_START_PORT=5000\n",
        )
        .unwrap();

        let config = layout
            .resolver(&[("ORIGIN_URL_BASE", ""), ("SERVER_START_PORT", "")])
            .resolve();

        assert_eq!(config.origin_url_base, "http://localhost:8080/");
        assert_eq!(config.start_port, 3001);
    }

    #[test]
    fn empty_env_file_value_is_unset() {
        let layout = Layout::new();
        fs::write(layout.root.path().join(".env"), "ORIGIN_URL_BASE=\n").unwrap();

        let config = layout.resolver(&[]).resolve();
        assert_eq!(config.origin_url_base, "http://localhost:8080/");
    }

    #[test]
    fn project_root_env_file_is_loaded() {
        let layout = Layout::new();
        fs::write(
            layout.root.path().join(".env"),
            "ORIGIN_URL_BASE=http://from-file/\nSERVER_START_PORT=5000\n",
        )
        .unwrap();

        let config = layout.resolver(&[("SERVER_START_PORT", "6000")]).resolve();

        assert_eq!(config.origin_url_base, "http://from-file/");
        // process environment wins over the file
        assert_eq!(config.start_port, 6000);
        assert_eq!(config.env_file, Some(layout.root.path().join(".env")));
    }

    #[test]
    fn working_dir_env_file_is_last_resort() {
        let layout = Layout::new();
        fs::write(layout.work.path().join(".env"), "SERVER_WORKER_THREADS=3\n").unwrap();

        let config = layout.resolver(&[]).resolve();

        assert_eq!(config.worker_threads, 3);
        assert_eq!(config.env_file, Some(layout.work.path().join(".env")));
    }

    #[test]
    fn project_root_env_file_takes_precedence() {
        let layout = Layout::new();
        fs::write(layout.root.path().join(".env"), "SERVER_WORKER_THREADS=2\n").unwrap();
        fs::write(layout.work.path().join(".env"), "SERVER_WORKER_THREADS=3\n").unwrap();

        let config = layout.resolver(&[]).resolve();
        assert_eq!(config.worker_threads, 2);
    }

    #[test]
    fn primary_images_dir_wins() {
        let layout = Layout::new();
        fs::create_dir(layout.root.path().join("images")).unwrap();
        fs::create_dir(layout.work.path().join("images")).unwrap();

        let resolver = layout.resolver(&[]);
        assert_eq!(
            resolver.resolve_images_path(),
            layout.root.path().join("images")
        );
    }

    #[test]
    fn images_fallback_two_levels_up() {
        let layout = Layout::new();
        let servers_images = layout.root.path().join("servers/images");
        fs::create_dir(&servers_images).unwrap();
        fs::create_dir(layout.work.path().join("images")).unwrap();

        let resolver = layout.resolver(&[]);
        assert_eq!(resolver.resolve_images_path(), servers_images);
    }

    #[test]
    fn images_fallback_working_dir() {
        let layout = Layout::new();
        fs::create_dir(layout.work.path().join("images")).unwrap();

        let resolver = layout.resolver(&[]);
        assert_eq!(
            resolver.resolve_images_path(),
            layout.work.path().join("images")
        );
    }

    #[test]
    fn normalize_strips_dot_segments() {
        assert_eq!(
            normalize(Path::new("/a/b/c/./../../d")),
            PathBuf::from("/a/d")
        );
        assert_eq!(normalize(Path::new("/../x")), PathBuf::from("/x"));
    }
}
