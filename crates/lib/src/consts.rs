//! Project-wide constants.

/// Name used for env var prefixes and the user agent.
pub const APP_NAME: &str = "binshim";

/// Program launched and installed when `BINSHIM_BINARY` is not set.
pub const DEFAULT_BINARY: &str = "spec-kit-mcp";

/// Release repository (`owner/name`) used when neither the environment nor
/// `package.json` names one.
pub const DEFAULT_REPO: &str = "lsendel/spec-kit-mcp";

/// Host that serves release artifacts.
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://github.com";

/// Upper bound on HTTP redirect hops followed for a single download.
pub const MAX_REDIRECTS: usize = 5;

/// Total timeout for one download, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Connect timeout for the download client, in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Directory under the package root that receives the installed binary.
pub const BIN_DIR: &str = "bin";

/// Manifest read from the package root for version and repository.
pub const PACKAGE_MANIFEST: &str = "package.json";

/// Prefix of the per-platform companion package directory (`mcp-linux-x64`).
pub const COMPANION_PREFIX: &str = "mcp";
