//! Environment-variable driven configuration, following the teacher's
//! `webserver.rs` habit of reading `std::env::var` with a default rather
//! than pulling in a config-file crate.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub static_dir: PathBuf,
    pub artifacts_dir: PathBuf,
    pub feeds_dir: PathBuf,
    pub manifest_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Config {
        Config {
            port: env_or("PORT", "8080").parse().unwrap_or(8080),
            static_dir: env_or("STATIC_DIR", "frontend/build").into(),
            artifacts_dir: env_or("ARTIFACTS_DIR", "artifacts").into(),
            feeds_dir: env_or("FEEDS_DIR", "feeds").into(),
            manifest_dir: env_or("MANIFEST_DIR", "manifest").into(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_sensible_when_unset() {
        let config = Config {
            port: 8080,
            static_dir: "frontend/build".into(),
            artifacts_dir: "artifacts".into(),
            feeds_dir: "feeds".into(),
            manifest_dir: "manifest".into(),
        };
        assert_eq!(config.port, 8080);
    }
}
