//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "mkrelease.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "mkrelease.yaml";

/// GitHub REST API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub asset upload endpoint
pub const DEFAULT_UPLOADS_URL: &str = "https://uploads.github.com";

/// Repository the release is published to
pub const DEFAULT_TARGET_OWNER: &str = "pagerguild";
/// Repository the release is published to
pub const DEFAULT_TARGET_REPO: &str = "guilde-cli-releases";

/// Repository the build artifacts are downloaded from
pub const DEFAULT_SOURCE_OWNER: &str = "pagerguild";
/// Repository the build artifacts are downloaded from
pub const DEFAULT_SOURCE_REPO: &str = "pagerguild";

/// Binary shipped in every archive
pub const DEFAULT_BINARY: &str = "guilde-cli";

/// Formula location inside the repository working copy
pub const DEFAULT_FORMULA_PATH: &str = "Formula/guilde-cli.rb";

/// Formula description
pub const DEFAULT_FORMULA_DESCRIPTION: &str = "Guilde CLI tool";

/// Commit author for formula updates
pub const DEFAULT_AUTHOR_NAME: &str = "Guilde CLI Release Bot";
/// Commit author for formula updates
pub const DEFAULT_AUTHOR_EMAIL: &str = "bot@pagerguild.com";

/// Command run by the deploy step
pub const DEFAULT_DEPLOY_COMMAND: &str = "vercel deploy --prod --yes";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".mkrelease.toml",
        ".mkrelease.yaml",
    ]
}
