use std::io::IsTerminal;
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use miette::Result;

use kestrel_core::{BotConfig, LlmProvider};
use kestrel_review::github::{parse_repo_name, GitHubClient};
use kestrel_review::llm::LlmClient;
use kestrel_review::pipeline::{ReviewPipeline, ReviewStats};
use kestrel_review::report;

#[derive(Parser)]
#[command(
    name = "kestrel",
    version,
    about = "LLM code review bot for GitHub pull requests",
    long_about = "Kestrel reviews a GitHub pull request with an LLM and posts the result back\n\
                   as a comment: change analysis, code quality review, and a final summary.\n\n\
                   Every flag falls back to an environment variable, so the bot runs unmodified\n\
                   inside CI:\n\n\
                   Examples:\n  \
                     kestrel --repo-name owner/repo --pr-number 42     Review and comment on PR 42\n  \
                     kestrel --pr-number 42 --dry-run                  Print the review instead of posting\n  \
                     kestrel --llm-provider google --model gemini-1.5-pro --pr-number 42"
)]
struct Cli {
    /// Pull request number to review
    #[arg(long, env = "PR_NUMBER")]
    pr_number: Option<u64>,

    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Repository to review (format: owner/repo)
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repo_name: Option<String>,

    /// LLM provider to use (openai or google)
    #[arg(long, env = "LLM_PROVIDER")]
    llm_provider: Option<LlmProvider>,

    /// API key for the OpenAI provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// API key for the Google provider
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    google_api_key: Option<String>,

    /// Model identifier (default depends on the provider)
    #[arg(long, env = "MODEL_NAME")]
    model: Option<String>,

    /// Sampling temperature
    #[arg(long, env = "TEMPERATURE")]
    temperature: Option<f64>,

    /// Path to configuration file (default: .kestrel.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print run statistics to stderr
    #[arg(long, short, env = "VERBOSE")]
    verbose: bool,

    /// Print the rendered review to stdout instead of posting it
    #[arg(long)]
    dry_run: bool,
}

fn resolve_config(cli: &Cli) -> Result<BotConfig> {
    let mut config = match &cli.config {
        Some(path) => BotConfig::from_file(path)?,
        None => {
            let default_path = std::path::Path::new(".kestrel.toml");
            if default_path.exists() {
                BotConfig::from_file(default_path)?
            } else {
                BotConfig::default()
            }
        }
    };

    // CLI flags (and their env fallbacks) win over the config file.
    if let Some(provider) = cli.llm_provider {
        config.llm.provider = provider;
    }
    if let Some(model) = &cli.model {
        config.llm.model = Some(model.clone());
    }
    if let Some(temperature) = cli.temperature {
        config.llm.temperature = temperature;
    }
    if let Some(key) = &cli.openai_api_key {
        config.llm.openai_api_key = Some(key.clone());
    }
    if let Some(key) = &cli.google_api_key {
        config.llm.google_api_key = Some(key.clone());
    }
    if cli.verbose {
        config.verbose = true;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let Some(github_token) = cli.github_token.as_deref() else {
        miette::bail!(miette::miette!(
            help = "export GITHUB_TOKEN=... or pass --github-token",
            "GitHub token is required"
        ));
    };
    let Some(pr_number) = cli.pr_number else {
        miette::bail!(miette::miette!(
            help = "export PR_NUMBER=... or pass --pr-number",
            "PR number is required"
        ));
    };
    let Some(repo_name) = cli.repo_name.as_deref() else {
        miette::bail!(miette::miette!(
            help = "export GITHUB_REPOSITORY=owner/repo or pass --repo-name",
            "repository name is required"
        ));
    };

    let (owner, repo) = parse_repo_name(repo_name)?;

    // Check the provider key up front so the error arrives before any network call.
    let (key_present, env_var, flag) = match config.llm.provider {
        LlmProvider::OpenAi => (
            config.llm.openai_api_key.is_some(),
            "OPENAI_API_KEY",
            "--openai-api-key",
        ),
        LlmProvider::Google => (
            config.llm.google_api_key.is_some(),
            "GOOGLE_API_KEY",
            "--google-api-key",
        ),
    };
    if !key_present {
        miette::bail!(miette::miette!(
            help = format!("export {env_var}=... or pass {flag}"),
            "No API key configured for LLM provider '{}'",
            config.llm.provider
        ));
    }

    let llm_client = LlmClient::new(&config.llm)?;
    let github = GitHubClient::new(Some(github_token))?;

    eprintln!("Fetching PR #{pr_number} from {repo_name} ...");
    let ctx = github.fetch_pr_context(&owner, &repo, pr_number).await?;

    let stats = ReviewStats::for_run(&ctx, llm_client.model());
    if config.verbose {
        eprintln!("--- Review Stats ---");
        eprintln!(
            "Provider: {} | Model: {}",
            config.llm.provider, stats.model_used
        );
        eprintln!(
            "Files to review: {} of {} changed (+{} / -{})",
            stats.files_reviewed, ctx.changed_files, stats.additions, stats.deletions
        );
        eprintln!("--------------------");
    }

    let is_tty = std::io::stderr().is_terminal();
    let spinner = if is_tty {
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_style(
            indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})").unwrap(),
        );
        pb.set_message(format!("Reviewing PR #{pr_number} with {} ...", stats.model_used));
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let pipeline = ReviewPipeline::new(llm_client);
    let state = pipeline.run(&ctx).await.inspect_err(|_e| {
        if let Some(pb) = &spinner {
            pb.finish_with_message("Failed");
        }
    })?;

    if let Some(pb) = spinner {
        pb.finish_with_message("Done");
    }

    let markdown = report::render(&state, Utc::now());

    if cli.dry_run {
        print!("{markdown}");
        eprintln!("Dry run: skipped posting to {repo_name}#{pr_number}");
    } else {
        github.post_comment(&owner, &repo, pr_number, &markdown).await?;
        eprintln!("Posted review comment to {repo_name}#{pr_number}");
    }

    Ok(())
}
