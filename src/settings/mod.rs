use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_DB_PATH: &str = "DB_PATH";
pub const ENV_BACKUP_DIR: &str = "BACKUP_DIR";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_PATH: &str = "/data/app.db";
const DEFAULT_BACKUP_DIR: &str = "/backup";

/// Setup contains tally setup parameters.
///
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Setup {
    ip: IpAddr,
    port: u16,
    db_path: PathBuf,
    backup_dir: PathBuf,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: DEFAULT_PORT,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
        }
    }
}

impl Setup {
    /// Creates Setup pointing at the given store file and backup directory,
    /// everything else default.
    ///
    pub fn new(db_path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            backup_dir: backup_dir.into(),
            ..Self::default()
        }
    }

    /// Deserializes Setup from file under given path.
    /// Keys absent from the file keep their default values.
    ///
    pub fn from_file(path: &str) -> std::io::Result<Setup> {
        let f = std::fs::File::open(path)?;
        let Ok(s) = serde_yaml::from_reader(f) else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("cannot read the file: {}", path),
            ));
        };

        Ok(s)
    }

    /// Applies overrides from the process environment.
    ///
    pub fn with_process_env(self) -> Self {
        self.with_env(|key| std::env::var(key).ok())
    }

    /// Applies `HOST`, `PORT`, `DB_PATH` and `BACKUP_DIR` overrides taken from `lookup`.
    /// Values that do not parse are skipped.
    ///
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            match host.parse::<IpAddr>() {
                Ok(ip) => self.ip = ip,
                Err(_) => tracing::warn!(%host, "ignoring unparseable {}", ENV_HOST),
            }
        }
        if let Some(port) = lookup(ENV_PORT) {
            match port.parse::<u16>() {
                Ok(p) => self.port = p,
                Err(_) => tracing::warn!(%port, "ignoring unparseable {}", ENV_PORT),
            }
        }
        if let Some(path) = lookup(ENV_DB_PATH).filter(|p| !p.is_empty()) {
            self.db_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup(ENV_BACKUP_DIR).filter(|d| !d.is_empty()) {
            self.backup_dir = PathBuf::from(dir);
        }
        self
    }

    /// Returns address in form of ip and port like: `0.0.0.0:8080`.
    ///
    pub fn get_addr(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }

    pub fn get_ip(&self) -> String {
        self.ip.to_string()
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn get_backup_dir(&self) -> &Path {
        &self.backup_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let s = Setup::default();
        assert_eq!(s.get_addr(), "0.0.0.0:8080");
        assert_eq!(s.get_db_path(), Path::new("/data/app.db"));
        assert_eq!(s.get_backup_dir(), Path::new("/backup"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("HOST", "127.0.0.1"),
            ("PORT", "9090"),
            ("DB_PATH", "/tmp/events.db"),
            ("BACKUP_DIR", "/tmp/backups"),
        ]);
        let s = Setup::default().with_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(s.get_addr(), "127.0.0.1:9090");
        assert_eq!(s.get_db_path(), Path::new("/tmp/events.db"));
        assert_eq!(s.get_backup_dir(), Path::new("/tmp/backups"));
    }

    #[test]
    fn test_bad_env_values_are_skipped() {
        let env: HashMap<&str, &str> =
            HashMap::from([("HOST", "not-an-ip"), ("PORT", "99999"), ("DB_PATH", "")]);
        let s = Setup::default().with_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(s, Setup::default());
    }

    #[test]
    fn test_from_file_keeps_missing_defaults() {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(f, "port: 8001\nbackup_dir: /srv/backup").expect("write");

        let s = Setup::from_file(f.path().to_str().expect("utf8 path")).expect("parse");

        assert_eq!(s.get_port(), 8001);
        assert_eq!(s.get_backup_dir(), Path::new("/srv/backup"));
        assert_eq!(s.get_db_path(), Path::new("/data/app.db"));
        assert_eq!(s.get_ip(), "0.0.0.0");
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(f, "port: [not, a, port]").expect("write");

        let Err(e) = Setup::from_file(f.path().to_str().expect("utf8 path")) else {
            panic!("garbage settings were accepted");
        };
        assert_eq!(e.kind(), std::io::ErrorKind::InvalidData);
    }
}
