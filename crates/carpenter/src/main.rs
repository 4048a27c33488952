use anyhow::Context;
use carpenter::{Carpentry, CarpentryError, CarpentryOutcome};
use carpenter_build::{
    ContainerEngineService, EngineError, EngineKind, NoopEngine, connect_engine,
};
use carpenter_core::{
    BuildConfig, find_config_file, list_file_names, load_config, resolve_project_path,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// 要件を満たさなかった場合の終了コード
const EXIT_REQUIREMENTS_NOT_MET: u8 = 2;

#[derive(Parser)]
#[command(name = "carpenter")]
#[command(about = "要件を確かめてから、イメージを組み立てる。", long_about = None)]
struct Cli {
    /// デバッグログを表示
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 要件をチェックし、満たしていればイメージをビルド
    Build {
        /// ビルド後に設定された全レジストリへプッシュ
        #[arg(long)]
        push: bool,
        /// コンテナエンジン (docker, podman)
        #[arg(short, long, env = "CARPENTER_ENGINE", default_value = "docker")]
        engine: String,
        /// 設定ファイルのパス（省略時は自動検出）
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// 要件チェックのみ実行（ビルドしない）
    Validate {
        /// 設定ファイルのパス（省略時は自動検出）
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// バージョン情報を表示
    Version,
}

/// 設定ファイルから読み込んだ実行対象
struct Project {
    config: BuildConfig,
    path: PathBuf,
    file_names: Vec<String>,
}

impl Project {
    fn load(config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let config_path = match config_path {
            Some(path) => path,
            None => find_config_file()?,
        };
        tracing::debug!("Using config file: {}", config_path.display());

        let config = load_config(&config_path)?;
        let path = resolve_project_path(&config)?;
        let file_names = list_file_names(&path)
            .with_context(|| format!("プロジェクトを読み込めません: {}", path.display()))?;

        Ok(Self {
            config,
            path,
            file_names,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ログは stderr、結果表示は stdout
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Version => {
            println!("carpenter {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate { config } => {
            let project = Project::load(config)?;
            println!("{}", "要件をチェック中...".blue());
            print_project(&project);

            let outcome = execute(&project, false, false, &NoopEngine).await?;
            Ok(report(&outcome))
        }
        Commands::Build {
            push,
            engine,
            config,
        } => {
            let project = Project::load(config)?;
            let kind: EngineKind = engine.parse()?;
            let engine = connect_engine(kind)
                .await
                .with_context(|| format!("コンテナエンジン {} に接続できません", kind))?;

            println!("{}", "イメージをビルド中...".green());
            print_project(&project);
            println!("エンジン: {}", engine.name().cyan());

            let outcome = execute(&project, true, push, engine.as_ref()).await?;
            Ok(report(&outcome))
        }
    }
}

async fn execute(
    project: &Project,
    want_build: bool,
    want_push: bool,
    engine: &dyn ContainerEngineService,
) -> Result<CarpentryOutcome, CarpentryError> {
    Carpentry::default()
        .run(
            want_build,
            want_push,
            engine,
            &project.config,
            &project.path,
            &project.file_names,
        )
        .await
}

fn print_project(project: &Project) {
    println!("プロジェクト: {}", project.path.display().to_string().cyan());
    println!("イメージ: {}", project.config.image().to_string().cyan());
}

/// 結果を表示し、終了コードを決める
fn report(outcome: &CarpentryOutcome) -> ExitCode {
    let requirements = outcome.requirements();
    println!();
    for (name, passed) in [
        ("basic", requirements.basic),
        ("container-definition", requirements.container_definition),
        ("language", requirements.language),
    ] {
        print_check(name, passed);
    }
    println!();

    match outcome {
        CarpentryOutcome::RequirementsNotMet { .. } => {
            println!(
                "{}",
                "✗ 要件を満たしていないため、ビルドしませんでした".red().bold()
            );
            ExitCode::from(EXIT_REQUIREMENTS_NOT_MET)
        }
        CarpentryOutcome::Passed { push_failures, .. } => {
            println!("{}", "✓ すべての要件を満たしています".green().bold());
            if !push_failures.is_empty() {
                println!();
                println!(
                    "{}",
                    format!("⚠ {}件のプッシュに失敗しました:", push_failures.len()).yellow()
                );
                for failure in push_failures {
                    println!("  - {}", failure.reference.yellow());
                    println!("    {}", failure.error.user_message());
                }
            }
            ExitCode::SUCCESS
        }
    }
}

fn print_check(name: &str, passed: bool) {
    if passed {
        println!("  {} {}", "✓".green(), name);
    } else {
        println!("  {} {}", "✗".red(), name);
    }
}

fn print_error(e: &anyhow::Error) {
    // エンジンのエラーはヒント付きで表示
    let message = match e.downcast_ref::<CarpentryError>() {
        Some(CarpentryError::Build(engine_error)) => engine_error.user_message(),
        _ => match e.downcast_ref::<EngineError>() {
            Some(engine_error @ EngineError::UnknownEngine(_)) => engine_error.user_message(),
            _ => format!("{:#}", e),
        },
    };
    eprintln!("{} {}", "Error:".red().bold(), message);
}
