fn main() {
    use clap::Parser;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = aws_role::cmd::Cli::parse();

    let code = match aws_role::cmd::assume::run(&cli.assume) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            e.downcast_ref::<aws_role::error::Error>()
                .map(aws_role::error::Error::exit_code)
                .unwrap_or(1)
        }
    };
    std::process::exit(code);
}
