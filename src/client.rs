//! sts:AssumeRole API client

/// Region used when neither --region nor the SDK's region chain yields one. STS is global.
const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone)]
pub struct AssumeRoleRequest {
    role_arn: crate::arn::RoleArn,
    session_name: String,
    duration_seconds: i64,
}

impl AssumeRoleRequest {
    /// Validates the requested duration and generates a unique session name.
    pub fn new(
        role_arn: crate::arn::RoleArn,
        duration_seconds: i64,
    ) -> Result<Self, crate::error::Error> {
        crate::session::validate_duration(duration_seconds)?;
        Ok(Self {
            role_arn,
            session_name: uuid::Uuid::new_v4().to_string(),
            duration_seconds,
        })
    }

    pub fn role_arn(&self) -> &crate::arn::RoleArn {
        &self.role_arn
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn duration_seconds(&self) -> i64 {
        self.duration_seconds
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: AwsSecretAccessKey,
    pub session_token: String,
    pub expiration: chrono::DateTime<chrono::Utc>,
}

impl Credentials {
    /// Whole seconds left until expiration, as seen at `now`.
    pub fn remaining_seconds(&self, now: chrono::DateTime<chrono::Utc>) -> i64 {
        (self.expiration - now).num_seconds()
    }
}

/// Secret access key; redacted from Debug output.
#[derive(Clone)]
pub struct AwsSecretAccessKey(secrecy::SecretString);

impl AwsSecretAccessKey {
    pub fn new(value: String) -> Self {
        Self(secrecy::SecretString::new(value))
    }

    pub fn expose(&self) -> &str {
        use secrecy::ExposeSecret;
        self.0.expose_secret()
    }
}

impl From<&str> for AwsSecretAccessKey {
    fn from(value: &str) -> Self {
        Self::new(value.to_owned())
    }
}

impl std::fmt::Debug for AwsSecretAccessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AwsSecretAccessKey([REDACTED])")
    }
}

impl serde::Serialize for AwsSecretAccessKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> serde::Deserialize<'de> for AwsSecretAccessKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::new(String::deserialize(deserializer)?))
    }
}

/// Error codes returned by sts:AssumeRole that are reported on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    MalformedPolicyDocument,
    PackedPolicyTooLarge,
    RegionDisabled,
    ExpiredToken,
    AccessDenied,
    InvalidClientTokenId,
}

impl ProviderErrorKind {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "MalformedPolicyDocument" | "MalformedPolicyDocumentException" => {
                Some(Self::MalformedPolicyDocument)
            }
            "PackedPolicyTooLarge" | "PackedPolicyTooLargeException" => {
                Some(Self::PackedPolicyTooLarge)
            }
            "RegionDisabledException" => Some(Self::RegionDisabled),
            "ExpiredTokenException" => Some(Self::ExpiredToken),
            "AccessDenied" => Some(Self::AccessDenied),
            "InvalidClientTokenId" => Some(Self::InvalidClientTokenId),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedPolicyDocument => "MalformedPolicyDocument",
            Self::PackedPolicyTooLarge => "PackedPolicyTooLarge",
            Self::RegionDisabled => "RegionDisabledException",
            Self::ExpiredToken => "ExpiredTokenException",
            Self::AccessDenied => "AccessDenied",
            Self::InvalidClientTokenId => "InvalidClientTokenId",
        }
    }
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Maps a service error code and message into the crate error taxonomy.
pub(crate) fn classify_provider_error(
    code: Option<&str>,
    message: Option<&str>,
    context: impl FnOnce() -> String,
) -> crate::error::Error {
    match code.and_then(ProviderErrorKind::from_code) {
        Some(kind) => crate::error::Error::ProviderError {
            kind,
            message: message.unwrap_or_default().to_owned(),
        },
        None => crate::error::Error::TransportError(context()),
    }
}

/// Something that exchanges a role for temporary credentials.
#[async_trait::async_trait]
pub trait AssumeRoleProvider {
    async fn assume_role(
        &self,
        request: &AssumeRoleRequest,
    ) -> Result<Credentials, crate::error::Error>;
}

pub struct Client {
    sts: aws_sdk_sts::Client,
}

impl Client {
    pub async fn new(region: Option<&str>) -> Self {
        let loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        let loader = match region {
            Some(r) => loader.region(aws_config::Region::new(r.to_owned())),
            None => loader,
        };
        let mut sdk_config = loader.load().await;

        if sdk_config.region().is_none() {
            tracing::debug!(
                message = "No region configured, using default for STS",
                region = DEFAULT_REGION
            );
            sdk_config = sdk_config
                .into_builder()
                .region(aws_config::Region::new(DEFAULT_REGION))
                .build();
        }

        Self {
            sts: aws_sdk_sts::Client::new(&sdk_config),
        }
    }
}

#[async_trait::async_trait]
impl AssumeRoleProvider for Client {
    async fn assume_role(
        &self,
        request: &AssumeRoleRequest,
    ) -> Result<Credentials, crate::error::Error> {
        use aws_sdk_sts::error::ProvideErrorMetadata;

        let duration_seconds = i32::try_from(request.duration_seconds()).map_err(|_| {
            crate::error::Error::ValidationError(format!(
                "--duration {} is out of range",
                request.duration_seconds()
            ))
        })?;

        tracing::debug!(message = "Calling sts:AssumeRole", role_arn = %request.role_arn(), session_name = %request.session_name(), duration_seconds);

        let resp = self
            .sts
            .assume_role()
            .role_arn(request.role_arn().as_str())
            .role_session_name(request.session_name())
            .duration_seconds(duration_seconds)
            .send()
            .await
            .map_err(|e| {
                let (code, message) = match e.as_service_error() {
                    Some(se) => (se.code().map(str::to_owned), se.message().map(str::to_owned)),
                    None => (None, None),
                };
                classify_provider_error(code.as_deref(), message.as_deref(), || {
                    aws_sdk_sts::error::DisplayErrorContext(&e).to_string()
                })
            })?;

        let creds = resp.credentials().ok_or_else(|| {
            crate::error::Error::Unknown("AssumeRole response is missing Credentials".to_string())
        })?;

        let expiration = creds.expiration();
        let expiration =
            chrono::DateTime::<chrono::Utc>::from_timestamp(expiration.secs(), expiration.subsec_nanos())
                .ok_or_else(|| {
                    crate::error::Error::Unknown(format!(
                        "AssumeRole returned an out-of-range expiration: {expiration}"
                    ))
                })?;

        Ok(Credentials {
            access_key_id: creds.access_key_id().to_owned(),
            secret_access_key: AwsSecretAccessKey::from(creds.secret_access_key()),
            session_token: creds.session_token().to_owned(),
            expiration,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn role() -> crate::arn::RoleArn {
        crate::arn::RoleArn::parse("arn:aws:iam::123456789012:role/deploy").unwrap()
    }

    #[test]
    fn test_request_new() {
        let a = AssumeRoleRequest::new(role(), 1800).unwrap();
        let b = AssumeRoleRequest::new(role(), 1800).unwrap();
        assert_eq!(a.duration_seconds(), 1800);
        assert_eq!(a.role_arn().role_name(), "deploy");
        uuid::Uuid::parse_str(a.session_name()).unwrap();
        assert_ne!(a.session_name(), b.session_name());
    }

    #[test]
    fn test_request_new_invalid_duration() {
        assert!(matches!(
            AssumeRoleRequest::new(role(), 50000),
            Err(crate::error::Error::ValidationError(_))
        ));
    }

    #[test]
    fn test_classify_known_codes() {
        for (code, kind) in [
            ("MalformedPolicyDocument", ProviderErrorKind::MalformedPolicyDocument),
            ("PackedPolicyTooLarge", ProviderErrorKind::PackedPolicyTooLarge),
            ("RegionDisabledException", ProviderErrorKind::RegionDisabled),
            ("ExpiredTokenException", ProviderErrorKind::ExpiredToken),
            ("AccessDenied", ProviderErrorKind::AccessDenied),
            ("InvalidClientTokenId", ProviderErrorKind::InvalidClientTokenId),
        ] {
            match classify_provider_error(Some(code), Some("boom"), || unreachable!()) {
                crate::error::Error::ProviderError { kind: k, message } => {
                    assert_eq!(k, kind);
                    assert_eq!(message, "boom");
                }
                e => panic!("unexpected {e:?}"),
            }
        }
    }

    #[test]
    fn test_classify_unknown_code() {
        let e = classify_provider_error(Some("Throttling"), Some("slow down"), || {
            "Throttling: slow down".to_string()
        });
        assert!(
            matches!(e, crate::error::Error::TransportError(ref m) if m == "Throttling: slow down")
        );
    }

    #[test]
    fn test_classify_no_code() {
        let e = classify_provider_error(None, None, || "dispatch failure".to_string());
        assert!(matches!(e, crate::error::Error::TransportError(_)));
    }

    #[test]
    fn test_secret_is_redacted() {
        let creds = Credentials {
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: AwsSecretAccessKey::from("himitsu"),
            session_token: "token".to_string(),
            expiration: chrono::Utc::now(),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("himitsu"));
        assert!(debug.contains("AKIAEXAMPLE"));
        assert_eq!(creds.secret_access_key.expose(), "himitsu");
    }
}
