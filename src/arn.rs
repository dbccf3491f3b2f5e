//! IAM role ARN parsing

static ROLE_ARN_RE: once_cell::sync::Lazy<regex::Regex> = once_cell::sync::Lazy::new(|| {
    regex::Regex::new(r"^arn:aws:iam::(?P<account_id>\d+):role/(?P<role_name>[a-zA-Z0-9-]+)$")
        .unwrap()
});

/// `arn:aws:iam::<account-id>:role/<role-name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleArn {
    arn: String,
    account_id: String,
    role_name: String,
}

impl RoleArn {
    pub fn parse(value: &str) -> Result<Self, crate::error::Error> {
        let captures = ROLE_ARN_RE
            .captures(value)
            .ok_or_else(|| crate::error::Error::InvalidRoleIdentifier(value.to_owned()))?;

        let account_id = captures
            .name("account_id")
            .ok_or_else(|| crate::error::Error::InvalidRoleIdentifier(value.to_owned()))?;
        let role_name = captures
            .name("role_name")
            .ok_or_else(|| crate::error::Error::InvalidRoleIdentifier(value.to_owned()))?;

        Ok(Self {
            arn: value.to_owned(),
            account_id: account_id.as_str().to_owned(),
            role_name: role_name.as_str().to_owned(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.arn
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn role_name(&self) -> &str {
        &self.role_name
    }
}

impl std::fmt::Display for RoleArn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.arn)
    }
}
