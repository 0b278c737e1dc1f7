use std::{fs::File, io::Read, path::PathBuf};

use tracing::debug;

use super::error::{ConfigError, ConfigResult};

/// Environment variable that points straight at a config file and wins over
/// every other lookup location.
pub static CONFIG_ENV: &str = "LEARNSITE_CONFIG";

pub fn find_config_file(use_local: bool) -> PathBuf {
    let app_name = crate::APPLICATION_NAME;

    if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(explicit);
    }

    if use_local {
        return PathBuf::from("./config.toml");
    }

    #[cfg(unix)]
    let path = std::env::var_os("HOME");
    #[cfg(windows)]
    let path = std::env::var_os("APPDATA");

    #[cfg(any(unix, windows))]
    if let Some(app_path) = path {
        let mut path = PathBuf::from(app_path);

        if cfg!(unix) {
            path = path.join(".config");
        }

        path = path.join(app_name).join("config.toml");

        if path.exists() {
            return path;
        }
    }

    PathBuf::from("./config.toml")
}

pub fn read_config(use_local: bool) -> ConfigResult<Vec<u8>> {
    let filename = find_config_file(use_local);

    tracing::trace!("looking for config at: {}", filename.display());
    if !filename.exists() {
        return Err(ConfigError::ConfigNotFound);
    }

    let filename = filename.canonicalize()?;
    debug!("using {} as configuration file", filename.display());

    let mut fd = File::open(filename)?;
    let mut buf = Vec::new();
    fd.read_to_end(&mut buf)?;

    Ok(buf)
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;

    #[test]
    fn test_find_config_file_local() {
        if std::env::var_os(CONFIG_ENV).is_some() {
            return;
        }
        let path = find_config_file(true);
        assert_eq!(path, PathBuf::from("./config.toml"));
    }

    #[test]
    fn test_read_config_from_local_file() {
        let bytes = read_config(true);
        if std::env::var_os(CONFIG_ENV).is_some() {
            return;
        }

        // the repository ships a local config.toml used by debug builds
        let bytes = bytes.unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("[host]"));
        assert!(text.contains("database_uri"));
    }

    #[test]
    fn test_config_file_roundtrips_through_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("config.toml");
        fs::write(
            &file_path,
            b"[host]\nbindto = '0.0.0.0:8080'\n[app]\njwt = 'k'\ndatabase_uri = 'postgres://x'\n",
        )
        .unwrap();

        let raw = fs::read(&file_path).unwrap();
        let parsed: crate::config::Config = toml::from_slice(&raw).unwrap();
        assert_eq!(parsed.host().bindto(), "0.0.0.0:8080");
        assert!(!parsed.app().docs());
    }
}
