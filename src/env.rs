//! Environment variables carrying temporary credentials.

pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

type EnvironmentListInner = Vec<(&'static str, String)>;

pub struct EnvironmentList {
    inner: EnvironmentListInner,
}

impl EnvironmentList {
    pub fn from_credentials(credentials: &crate::client::Credentials) -> Self {
        vec![
            (AWS_ACCESS_KEY_ID, credentials.access_key_id.clone()),
            (
                AWS_SECRET_ACCESS_KEY,
                credentials.secret_access_key.expose().to_owned(),
            ),
            (AWS_SESSION_TOKEN, credentials.session_token.clone()),
        ]
        .into()
    }

    pub fn into_inner(self) -> EnvironmentListInner {
        self.inner
    }

    /// Render as `export NAME='value'` lines that a POSIX shell can `eval`.
    pub fn to_shell_exports(&self) -> String {
        let mut buf = String::new();
        for (k, v) in self.inner.iter() {
            buf.push_str(&format!("export {k}={}\n", shell_quote(v)));
        }
        buf
    }
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

impl From<EnvironmentListInner> for EnvironmentList {
    fn from(mut inner: Vec<(&'static str, String)>) -> Self {
        inner.sort_by_key(|k| k.0);
        Self { inner }
    }
}

/// https://docs.aws.amazon.com/sdkref/latest/guide/feature-process-credentials.html
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CredentialProcessResponse<'a> {
    pub version: i64,
    pub access_key_id: &'a str,
    pub secret_access_key: &'a crate::client::AwsSecretAccessKey,
    pub session_token: &'a str,
    pub expiration: chrono::DateTime<chrono::Utc>,
}

impl<'a> From<&'a crate::client::Credentials> for CredentialProcessResponse<'a> {
    fn from(credentials: &'a crate::client::Credentials) -> Self {
        Self {
            version: 1,
            access_key_id: &credentials.access_key_id,
            secret_access_key: &credentials.secret_access_key,
            session_token: &credentials.session_token,
            expiration: credentials.expiration,
        }
    }
}
