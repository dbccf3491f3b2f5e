#[derive(Debug, Clone)]
pub struct Config {
    home_dir: std::path::PathBuf,
}

const CACHE_DIR_NAME: &str = ".aws-role";

impl Config {
    pub fn new(home_dir: Option<std::path::PathBuf>) -> Result<Self, crate::error::Error> {
        let home_dir_ = match home_dir {
            Some(v) => v,
            None => std::env::var_os("HOME")
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    crate::error::Error::ConfigError(
                        "$HOME is not set; cannot locate the credential cache".to_string(),
                    )
                })?
                .into(),
        };

        Ok(Self {
            home_dir: home_dir_,
        })
    }

    /// `<home>/.aws-role`
    pub fn cache_root(&self) -> std::path::PathBuf {
        self.home_dir.join(CACHE_DIR_NAME)
    }
}

/// How credentials are printed when no command is given.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `export NAME='value'` lines for `eval`
    #[default]
    Shell,
    /// JSON document for the `credential_process` setting of AWS SDKs
    CredentialProcess,
}

/// Immutable settings of a single invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub role_arn: crate::arn::RoleArn,
    pub duration_seconds: i64,
    pub region: Option<String>,
    pub cache: bool,
    pub output: OutputFormat,
}

impl Settings {
    pub fn new(role_arn: crate::arn::RoleArn, duration_seconds: i64) -> Self {
        Self {
            role_arn,
            duration_seconds,
            region: None,
            cache: true,
            output: OutputFormat::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cache_root() {
        let config = Config::new(Some("/home/someone".into())).unwrap();
        assert_eq!(
            config.cache_root(),
            std::path::PathBuf::from("/home/someone/.aws-role")
        );
    }

    #[test]
    fn test_settings_defaults() {
        let role =
            crate::arn::RoleArn::parse("arn:aws:iam::111111111111:role/demo").unwrap();
        let settings = Settings::new(role, crate::session::DEFAULT_DURATION_SECONDS);
        assert_eq!(settings.duration_seconds, 3600);
        assert!(settings.cache);
        assert_eq!(settings.output, OutputFormat::Shell);
    }
}
