pub mod assume;

/// Assume a role in AWS and optionally run a command
///
/// Run a command within the context of assuming a role. This is not persistent, and will only
/// affect the command that is passed in. Without a command, credentials are printed instead.
///
/// e.g. aws-role --role-arn=arn:aws:iam::123456789012:role/my-role aws s3 ls
#[derive(clap::Parser)]
#[clap(author, version)]
#[clap(trailing_var_arg = true)]
pub struct Cli {
    #[clap(flatten)]
    pub assume: assume::AssumeArgs,
}
