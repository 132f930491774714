use std::process::ExitCode;

use clap::Parser;

use jobgate::config::{
    Config, RawConfig, DEFAULT_JOB_POLL_INTERVAL, DEFAULT_QUEUE_POLL_INTERVAL, DEFAULT_TIMEOUT,
};
use jobgate::jenkins::TriggerError;

#[derive(Parser)]
#[command(
    name = "jobgate",
    about = "Trigger a Jenkins job and block until it finishes",
    version,
    long_about = None
)]
struct Cli {
    /// Jenkins base URI, e.g. https://ci.example.com
    #[arg(long, env = "JENKINS_URI")]
    uri: Option<String>,

    /// Name of the job to trigger
    #[arg(long, env = "JENKINS_JOB")]
    job: Option<String>,

    /// Jenkins user
    #[arg(long, env = "JENKINS_USER")]
    user: Option<String>,

    /// Jenkins API token
    #[arg(long, env = "JENKINS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Seconds between queue polls
    #[arg(long, env = "QUEUE_POLL_INTERVAL", default_value_t = DEFAULT_QUEUE_POLL_INTERVAL)]
    queue_poll_interval: u64,

    /// Seconds between build polls
    #[arg(long, env = "JOB_POLL_INTERVAL", default_value_t = DEFAULT_JOB_POLL_INTERVAL)]
    job_poll_interval: u64,

    /// Per-phase timeout in seconds, shared by both phases unless overridden
    #[arg(long, env = "TIMEOUT", default_value_t = DEFAULT_TIMEOUT)]
    timeout: u64,

    /// Queue-wait timeout in seconds (overrides --timeout for that phase)
    #[arg(long, env = "QUEUE_TIMEOUT")]
    queue_timeout: Option<u64>,

    /// Build-wait timeout in seconds (overrides --timeout for that phase)
    #[arg(long, env = "JOB_TIMEOUT")]
    build_timeout: Option<u64>,

    /// Build parameter as KEY=VALUE; may be repeated. PARAMETER_* environment
    /// variables are collected too; flags win on collision
    #[arg(long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let raw = RawConfig {
        uri: cli.uri,
        job: cli.job,
        user: cli.user,
        token: cli.token,
        queue_poll_interval: cli.queue_poll_interval,
        job_poll_interval: cli.job_poll_interval,
        timeout: cli.timeout,
        queue_timeout: cli.queue_timeout,
        build_timeout: cli.build_timeout,
        params: cli.params,
    };

    let config = match Config::resolve(raw, std::env::vars()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("jobgate: {err}");
            return ExitCode::from(2);
        }
    };

    match jobgate::run(&config).await {
        Ok(report) => {
            println!(
                "Job: {} Id: {} Completed Successfully",
                report.build.job, report.build.number
            );
            println!("Console output: {}", report.console_url);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("jobgate: {err}");
            ExitCode::from(exit_code(&err))
        }
    }
}

/// One exit code per terminal error kind, so callers can branch on the
/// outcome without parsing stderr. Config errors exit 2 (see above).
fn exit_code(err: &TriggerError) -> u8 {
    match err {
        TriggerError::Rejected { .. }
        | TriggerError::MissingLocation
        | TriggerError::NotAQueueLocation { .. } => 3,
        TriggerError::MissingBuildNumber => 4,
        TriggerError::Timeout { .. } => 5,
        TriggerError::JobFailed { .. } => 6,
        TriggerError::Http(_) => 1,
    }
}
