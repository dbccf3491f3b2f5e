//! Per-role credential cache under `<home>/.aws-role/<account-id>/<role-name>`.

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry {
    role_arn: String,
    #[serde(flatten)]
    credentials: crate::client::Credentials,
}

pub struct Cache {
    root: std::path::PathBuf,
}

impl Cache {
    pub fn new(config: &crate::config::Config) -> Self {
        Self {
            root: config.cache_root(),
        }
    }

    pub fn directory(&self, role_arn: &crate::arn::RoleArn) -> std::path::PathBuf {
        self.root.join(role_arn.account_id())
    }

    pub fn file_path(&self, role_arn: &crate::arn::RoleArn) -> std::path::PathBuf {
        self.directory(role_arn).join(role_arn.role_name())
    }

    pub async fn ensure_directory(
        &self,
        role_arn: &crate::arn::RoleArn,
    ) -> Result<(), crate::error::Error> {
        use std::os::unix::fs::PermissionsExt;

        let path = self.directory(role_arn);
        tokio::fs::create_dir_all(&path).await?;
        let mut perm = tokio::fs::metadata(&path).await?.permissions();
        perm.set_mode(0o700);
        tokio::fs::set_permissions(&path, perm).await?;
        Ok(())
    }

    /// Replace the cached credentials for a role.
    ///
    /// Content is written to a private work file first and renamed over the cache file, so
    /// concurrent readers see either the previous or the new credentials in full.
    pub async fn store(
        &self,
        role_arn: &crate::arn::RoleArn,
        credentials: &crate::client::Credentials,
    ) -> Result<std::path::PathBuf, crate::error::Error> {
        let path = self.file_path(role_arn);
        match self.store_inner(role_arn, credentials, &path).await {
            Ok(()) => Ok(path),
            Err(e) => Err(crate::error::Error::CacheWriteError {
                path,
                source: Box::new(e),
            }),
        }
    }

    async fn store_inner(
        &self,
        role_arn: &crate::arn::RoleArn,
        credentials: &crate::client::Credentials,
        path: &std::path::Path,
    ) -> Result<(), crate::error::Error> {
        use tokio::io::AsyncWriteExt;

        let entry = CacheEntry {
            role_arn: role_arn.to_string(),
            credentials: credentials.clone(),
        };
        let json = serde_json::to_vec_pretty(&entry)?;

        self.ensure_directory(role_arn).await?;

        let wip_path = self.directory(role_arn).join(format!(
            ".wip.{}.{}",
            role_arn.role_name(),
            uuid::Uuid::new_v4()
        ));
        let written = async {
            let mut file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .mode(0o600)
                .open(&wip_path)
                .await?;
            file.write_all(&json).await?;
            file.write_all("\n".as_bytes()).await?;
            file.sync_all().await?;
            Ok::<(), std::io::Error>(())
        }
        .await;
        if let Err(e) = written {
            remove_file_ignoring_enoent(&wip_path).await.ok();
            return Err(e.into());
        }

        if let Err(e) = tokio::fs::rename(&wip_path, path).await {
            remove_file_ignoring_enoent(&wip_path).await.ok();
            return Err(e.into());
        }

        tracing::debug!(message = "Cached credentials", path = ?path, role_arn = %role_arn, expiration = %credentials.expiration);
        Ok(())
    }

    pub async fn load(
        &self,
        role_arn: &crate::arn::RoleArn,
    ) -> Result<crate::client::Credentials, crate::error::Error> {
        let path = self.file_path(role_arn);
        let json = match tokio::fs::read(&path).await {
            Ok(v) => v,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(crate::error::Error::CacheNotFound(path))
            }
            Err(e) => return Err(e.into()),
        };
        let entry: CacheEntry = serde_json::from_slice(&json)?;
        if entry.role_arn != role_arn.as_str() {
            return Err(crate::error::Error::Unknown(format!(
                "cache file {} belongs to {}",
                path.display(),
                entry.role_arn
            )));
        }
        Ok(entry.credentials)
    }
}

async fn remove_file_ignoring_enoent(path: &std::path::Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(v) => Ok(v),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
