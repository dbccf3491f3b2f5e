#[derive(clap::Args, Debug)]
pub struct AssumeArgs {
    /// The ARN of the role to assume in AWS
    #[clap(long, short = 'r', env = "AWS_ROLE_ARN", value_parser)]
    role_arn: String,

    /// The duration, in seconds, for the role to be assumed
    ///
    /// Between 1 and 43200 seconds (12 hours); cannot exceed the maximum session duration
    /// configured on the role.
    #[clap(
        long,
        short = 'd',
        env = "AWS_ROLE_DURATION",
        default_value_t = crate::session::DEFAULT_DURATION_SECONDS,
        allow_hyphen_values = true,
        value_parser
    )]
    duration: i64,

    /// AWS region to use for STS; optional
    #[clap(long, value_parser)]
    region: Option<String>,

    /// Do not write the credentials to ~/.aws-role/<account-id>/<role-name>
    #[clap(long, action = clap::ArgAction::SetTrue)]
    no_cache: bool,

    /// How to print credentials when no command is given; default to shell
    #[clap(value_enum, long)]
    output: Option<crate::config::OutputFormat>,

    /// Command to run with the temporary credentials, followed by its arguments
    ///
    /// Everything from the first non-flag argument onward is passed through verbatim.
    #[clap(value_parser, multiple_values = true)]
    command: Vec<String>,
}

impl AssumeArgs {
    pub fn settings(&self) -> Result<crate::config::Settings, crate::error::Error> {
        let role_arn = crate::arn::RoleArn::parse(&self.role_arn)?;
        crate::session::validate_duration(self.duration)?;

        let mut settings = crate::config::Settings::new(role_arn, self.duration);
        settings.region = self.region.clone();
        settings.cache = !self.no_cache;
        settings.output = self.output.unwrap_or_default();
        Ok(settings)
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }
}

#[tokio::main]
pub async fn run(args: &AssumeArgs) -> Result<i32, anyhow::Error> {
    use tracing::Instrument;

    let settings = args.settings()?;
    let span = tracing::info_span!("assume", role_arn = %settings.role_arn);

    async move {
        let cache = if settings.cache {
            match crate::config::Config::new(None) {
                Ok(config) => Some(crate::cache::Cache::new(&config)),
                Err(e) => {
                    tracing::warn!(message = "Credential cache disabled", error = %e);
                    None
                }
            }
        } else {
            None
        };

        let client = crate::client::Client::new(settings.region.as_deref()).await;
        let mut stdout = std::io::stdout().lock();
        let code = execute(
            &settings,
            &client,
            cache.as_ref(),
            args.command(),
            &mut stdout,
        )
        .await?;
        Ok::<i32, anyhow::Error>(code)
    }
    .instrument(span)
    .await
}

/// Assume the role, cache the credentials, then run `command` or print the credentials to `out`.
///
/// Returns the exit status for the invocation.
pub async fn execute<P>(
    settings: &crate::config::Settings,
    provider: &P,
    cache: Option<&crate::cache::Cache>,
    command: &[String],
    out: &mut dyn std::io::Write,
) -> Result<i32, crate::error::Error>
where
    P: crate::client::AssumeRoleProvider + Sync + ?Sized,
{
    let request =
        crate::client::AssumeRoleRequest::new(settings.role_arn.clone(), settings.duration_seconds)?;

    let credentials = match provider.assume_role(&request).await {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(message = "Failed to assume role", session_name = %request.session_name(), error = %e);
            return Err(e);
        }
    };
    tracing::info!(message = "Assumed role", account_id = %settings.role_arn.account_id(), access_key_id = %credentials.access_key_id, expiration = %credentials.expiration);

    crate::session::verify_granted(
        request.duration_seconds(),
        &credentials,
        chrono::Utc::now(),
    )?;

    if let Some(cache) = cache {
        match cache.store(&settings.role_arn, &credentials).await {
            Ok(path) => tracing::debug!(message = "Saved credentials to cache", path = ?path),
            Err(e) => tracing::warn!(message = "Failed to cache credentials; continuing", error = ?e),
        }
    }

    if command.is_empty() {
        print_credentials(settings.output, &credentials, out)?;
        return Ok(0);
    }

    let spec = crate::launch::ChildProcessSpec::new(command, std::env::vars_os(), &credentials)?;
    tracing::debug!(message = "Running command", program = %spec.program, args = ?spec.args);
    spec.run().await
}

fn print_credentials(
    format: crate::config::OutputFormat,
    credentials: &crate::client::Credentials,
    out: &mut dyn std::io::Write,
) -> Result<(), crate::error::Error> {
    match format {
        crate::config::OutputFormat::Shell => {
            let envlist = crate::env::EnvironmentList::from_credentials(credentials);
            out.write_all(envlist.to_shell_exports().as_bytes())?;
        }
        crate::config::OutputFormat::CredentialProcess => {
            serde_json::to_writer(
                &mut *out,
                &crate::env::CredentialProcessResponse::from(credentials),
            )?;
            out.write_all("\n".as_bytes())?;
        }
    }
    out.flush()?;
    Ok(())
}
