//! Run a command with temporary credentials in its environment.

#[derive(Debug)]
pub struct ChildProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: std::collections::BTreeMap<std::ffi::OsString, std::ffi::OsString>,
}

impl ChildProcessSpec {
    /// `command[0]` is the executable; credential variables take precedence over `inherited`.
    pub fn new<I>(
        command: &[String],
        inherited: I,
        credentials: &crate::client::Credentials,
    ) -> Result<Self, crate::error::Error>
    where
        I: IntoIterator<Item = (std::ffi::OsString, std::ffi::OsString)>,
    {
        let (program, args) = command.split_first().ok_or_else(|| {
            crate::error::Error::ValidationError("no command given to run".to_string())
        })?;

        let mut env: std::collections::BTreeMap<_, _> = inherited.into_iter().collect();
        for (k, v) in crate::env::EnvironmentList::from_credentials(credentials).into_inner() {
            env.insert(k.into(), v.into());
        }

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            env,
        })
    }

    /// Spawn the child with inherited stdio and wait for it. Returns the exit status to
    /// propagate; a child killed by a signal yields `128 + signal`.
    pub async fn run(&self) -> Result<i32, crate::error::Error> {
        let status = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .env_clear()
            .envs(&self.env)
            .stdin(std::process::Stdio::inherit())
            .stdout(std::process::Stdio::inherit())
            .stderr(std::process::Stdio::inherit())
            .status()
            .await
            .map_err(|source| crate::error::Error::LaunchError {
                program: self.program.clone(),
                source,
            })?;

        tracing::debug!(message = "Command exited", program = %self.program, status = ?status);
        Ok(exit_code(status))
    }
}

fn exit_code(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cmd(args: &[&str]) -> Vec<String> {
        args.iter().map(|v| v.to_string()).collect()
    }

    fn inherited() -> Vec<(std::ffi::OsString, std::ffi::OsString)> {
        vec![
            ("PATH".into(), std::env::var_os("PATH").unwrap_or_default()),
            ("AWS_ACCESS_KEY_ID".into(), "AKIAPARENT".into()),
            ("AWS_REGION".into(), "ap-northeast-1".into()),
        ]
    }

    fn creds() -> crate::client::Credentials {
        crate::client::Credentials {
            access_key_id: "AKIACHILD".to_string(),
            ..crate::dev::test_credentials(3600)
        }
    }

    #[test]
    fn test_spec_env_overrides() {
        let spec = ChildProcessSpec::new(&cmd(&["echo", "hi"]), inherited(), &creds()).unwrap();
        assert_eq!(spec.program, "echo");
        assert_eq!(spec.args, vec!["hi".to_string()]);
        assert_eq!(
            spec.env.get(std::ffi::OsStr::new("AWS_ACCESS_KEY_ID")),
            Some(&std::ffi::OsString::from("AKIACHILD"))
        );
        assert_eq!(
            spec.env.get(std::ffi::OsStr::new("AWS_SECRET_ACCESS_KEY")),
            Some(&std::ffi::OsString::from("secret"))
        );
        assert_eq!(
            spec.env.get(std::ffi::OsStr::new("AWS_SESSION_TOKEN")),
            Some(&std::ffi::OsString::from("token"))
        );
        assert_eq!(
            spec.env.get(std::ffi::OsStr::new("AWS_REGION")),
            Some(&std::ffi::OsString::from("ap-northeast-1"))
        );
    }

    #[test]
    fn test_spec_empty_command() {
        assert!(matches!(
            ChildProcessSpec::new(&[], inherited(), &creds()),
            Err(crate::error::Error::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_run_sees_credentials() {
        let spec = ChildProcessSpec::new(
            &cmd(&[
                "sh",
                "-c",
                r#"test "$AWS_ACCESS_KEY_ID" = AKIACHILD && test "$AWS_SESSION_TOKEN" = token && test "$AWS_REGION" = ap-northeast-1"#,
            ]),
            inherited(),
            &creds(),
        )
        .unwrap();
        assert_eq!(spec.run().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_run_propagates_exit_code() {
        let spec =
            ChildProcessSpec::new(&cmd(&["sh", "-c", "exit 3"]), inherited(), &creds()).unwrap();
        assert_eq!(spec.run().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_run_signal() {
        let spec = ChildProcessSpec::new(&cmd(&["sh", "-c", "kill -TERM $$"]), inherited(), &creds())
            .unwrap();
        assert_eq!(spec.run().await.unwrap(), 128 + 15);
    }

    #[tokio::test]
    async fn test_run_not_found() {
        let spec = ChildProcessSpec::new(
            &cmd(&["/nonexistent/aws-role-test-command"]),
            inherited(),
            &creds(),
        )
        .unwrap();
        match spec.run().await {
            Err(e @ crate::error::Error::LaunchError { .. }) => assert_eq!(e.exit_code(), 127),
            other => panic!("unexpected {other:?}"),
        }
    }
}
