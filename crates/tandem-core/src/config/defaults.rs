//! Default configuration values

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "tandem.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "tandem.toml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".tandem.yaml";

/// Script run to build a workspace
pub const DEFAULT_BUILD_SCRIPT: &str = "build";

/// Revision used by affected detection when none is given
pub const DEFAULT_AFFECTED_BASE: &str = "master";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_YAML,
        DEFAULT_CONFIG_TOML,
        ALT_CONFIG_FILE,
        ".tandem.toml",
    ]
}

/// Default job count: one per available CPU
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
