use crate::backup;
use crate::repository::interface::RepositoryProvider;
use actix_web::web;
use serde::{Deserialize, Serialize};
use std::io::Result;
use std::path::PathBuf;
use std::time::SystemTime;

/// StatusReport is a point-in-time health snapshot of the service.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub count: i64,
    pub last_backup_file: Option<String>,
    pub backup_age_seconds: Option<u64>,
}

/// Builds a StatusReport. Only a failing event count is an error; backup
/// discovery problems leave both backup fields empty.
///
pub async fn report<T>(repo: &T, db_path: PathBuf, backup_dir: PathBuf) -> Result<StatusReport>
where
    T: RepositoryProvider,
{
    let count = repo.count_events().await?;

    let latest = match web::block(move || backup::locate_or_bootstrap(&db_path, &backup_dir)).await
    {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(error = %e, "backup scan did not complete");
            None
        }
    };

    let now = SystemTime::now();
    Ok(StatusReport {
        count,
        last_backup_file: latest.as_ref().map(|b| b.name()),
        backup_age_seconds: latest.as_ref().map(|b| b.age_seconds(now)),
    })
}
