use anyhow::Result;
use clap::Parser;
use feaudit_core::{AuditCategory, AuditConfig, AuditOutcome, AuditRunner};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Front-end code quality audit aggregator.
#[derive(Parser, Debug)]
#[command(name = "fe-audit", version, about)]
struct Cli {
    /// Project root to audit
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Config file (defaults to <path>/feaudit.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Categories to run (repeatable); all when omitted
    #[arg(long = "category", short = 'c')]
    categories: Vec<String>,

    /// Files scanned concurrently per batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Project type: react, node, vanilla, typescript, typescript-react
    #[arg(long)]
    project_type: Option<String>,

    /// Report output directory (defaults to <path>/reports)
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Directory with custom YAML rule packs
    #[arg(long)]
    rules_dir: Option<PathBuf>,

    /// Live URL for browser-based testing (repeatable, consumed by external tooling)
    #[arg(long = "url")]
    urls: Vec<String>,

    /// CI mode: exit 1 when severity thresholds are exceeded
    #[arg(long)]
    ci: bool,

    /// Suppress the per-file progress line
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feaudit_cli=info,feaudit_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // 交互模式下打印错误即可，不输出堆栈
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let mut config = AuditConfig::load(&cli.path, cli.config.as_deref())?;
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size.max(1);
    }
    if let Some(project_type) = &cli.project_type {
        config.project_type = project_type.parse()?;
    }
    if let Some(report_dir) = &cli.report_dir {
        config.report_dir = report_dir.clone();
    }
    if let Some(rules_dir) = &cli.rules_dir {
        config.rules_dir = Some(rules_dir.clone());
    }
    if !cli.urls.is_empty() {
        config.urls = cli.urls.clone();
        tracing::warn!(
            "URL targets are handled by the browser-based tooling, not by the static scan"
        );
    }

    let categories: Vec<AuditCategory> = if cli.categories.is_empty() {
        AuditCategory::ALL.to_vec()
    } else {
        cli.categories
            .iter()
            .map(|s| s.parse())
            .collect::<Result<_, _>>()?
    };

    let runner = AuditRunner::new(config).with_progress(!cli.quiet);
    let mut outcomes = Vec::new();
    for category in &categories {
        outcomes.push(runner.run_category(*category).await?);
    }

    let summary = runner.write_ci_artifacts(&outcomes);
    print_summary(&outcomes);

    if cli.ci {
        if !summary.passed {
            eprintln!("quality gate failed; see ci-summary.json");
        }
        Ok(summary.exit_code())
    } else {
        Ok(0)
    }
}

fn print_summary(outcomes: &[AuditOutcome]) {
    println!();
    println!("  {:<15} {:>6} {:>6} {:>6} {:>6}", "category", "high", "med", "low", "total");
    for outcome in outcomes {
        let summary = &outcome.result.summary;
        println!(
            "  {:<15} {:>6} {:>6} {:>6} {:>6}",
            outcome.result.category,
            summary.high,
            summary.medium,
            summary.low,
            outcome.result.total_issues
        );
    }
    let total: usize = outcomes.iter().map(|o| o.result.total_issues).sum();
    println!("\n  {} issues total", total);
}
