//! NetDL CLI - evaluate network description configurations.
//! NetDL CLI - 网络描述配置求值工具。

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Main CLI structure.
/// 主 CLI 结构体。
#[derive(Parser)]
#[command(name = "netdl")]
#[command(author, version, about = "NetDL - lazy evaluator for network description configurations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output. / 启用详细输出。
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress output. / 抑制输出。
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Available CLI commands.
/// 可用的 CLI 命令。
#[derive(Subcommand)]
enum Commands {
    /// Run the action a configuration designates. / 运行配置指定的动作。
    Run {
        /// Expression tree to evaluate, as JSON. / 要求值的表达式树（JSON）。
        file: PathBuf,

        /// Top-level member holding the action. / 保存动作的顶层成员。
        #[arg(short, long, default_value = "do")]
        member: String,

        /// Source text the tree was parsed from, for error reports. / 用于错误报告的源文本。
        #[arg(short, long)]
        source: Option<PathBuf>,
    },

    /// Evaluate a configuration and print the result. / 求值配置并打印结果。
    Eval {
        /// Expression tree to evaluate, as JSON. / 要求值的表达式树（JSON）。
        file: PathBuf,

        /// Print only this top-level member. / 仅打印此顶层成员。
        #[arg(short, long)]
        member: Option<String>,

        /// Source text the tree was parsed from, for error reports. / 用于错误报告的源文本。
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// printf-style format for numbers and strings, without '%'. / 数字和字符串的格式（不含 '%'）。
        #[arg(short, long, default_value = "")]
        format: String,
    },

    /// List the runtime types available to `new`. / 列出 `new` 可用的运行时类型。
    Types,
}

fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "debug"
        } else if quiet {
            "error"
        } else {
            "warn"
        })
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Main entry point.
/// 主入口点。
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Run { file, member, source } => commands::run::run(&file, &member, source.as_deref(), cli.verbose),
        Commands::Eval {
            file,
            member,
            source,
            format,
        } => commands::eval::run(&file, member.as_deref(), source.as_deref(), &format),
        Commands::Types => commands::types::run(),
    };

    if let Err(e) = result {
        if !cli.quiet {
            output::error(&e);
        }
        std::process::exit(1);
    }
}
