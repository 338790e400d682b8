use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use phast::exec::ExternalBinary;
use phast::php::{
    DumpType, PhpParser, OPT_PRETTY_PRINT, OPT_RESOLVE_NAMES, OPT_WITH_COLUMN_INFO,
    OPT_WITH_POSITIONS, OPT_WITH_RECOVERY,
};

#[derive(Parser, Debug)]
#[command(
    name = "phast",
    version,
    about = "Dump PHP abstract syntax trees via the php-parse toolchain"
)]
struct Cli {
    /// PHP source file to parse
    file: PathBuf,

    /// Dump format: sexpr, var, or json
    #[arg(long, default_value = "sexpr")]
    format: DumpType,

    /// Pretty-print the dump
    #[arg(long)]
    pretty_print: bool,

    /// Resolve names in the AST
    #[arg(long)]
    resolve_names: bool,

    /// Include column information
    #[arg(long)]
    with_column_info: bool,

    /// Include position information
    #[arg(long)]
    with_positions: bool,

    /// Attempt to recover from parse errors
    #[arg(long)]
    with_recovery: bool,

    /// Explicit PHP interpreter (must satisfy the minimum version)
    #[arg(long)]
    php: Option<PathBuf>,

    /// Explicit php-parser phar
    #[arg(long)]
    parser: Option<PathBuf>,

    /// Working directory for runs and output caches
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Reuse cached output for identical command lines
    #[arg(long)]
    cache: bool,

    /// Print a JSON outcome summary instead of the dump
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut tool =
        PhpParser::new(cli.php.clone(), cli.parser.clone()).context("resolve PHP toolchain")?;

    if let Some(work_dir) = &cli.work_dir {
        tool.config_mut().set_work_dir(work_dir.clone());
    }
    tool.config_mut().set_timeout(Duration::from_secs(cli.timeout));
    tool.config_mut().set_cache_output(cli.cache);

    tool.set_dump_type(cli.format);
    tool.set_flag(OPT_PRETTY_PRINT, cli.pretty_print);
    tool.set_flag(OPT_RESOLVE_NAMES, cli.resolve_names);
    tool.set_flag(OPT_WITH_COLUMN_INFO, cli.with_column_info);
    tool.set_flag(OPT_WITH_POSITIONS, cli.with_positions);
    tool.set_flag(OPT_WITH_RECOVERY, cli.with_recovery);
    tool.set_target(cli.file.clone());

    let outcome = tool.execute().context("run php-parse")?;

    if cli.json {
        let summary = serde_json::json!({
            "exit_code": outcome.code,
            "output": outcome.output,
            "php": tool.php(),
            "parser": tool.parser(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let dump = std::fs::read_to_string(&outcome.output)
            .with_context(|| format!("read {}", outcome.output.display()))?;
        print!("{dump}");
    }

    if outcome.timed_out() {
        bail!("php-parse timed out after {} seconds", cli.timeout);
    }
    if !outcome.success() {
        std::process::exit(outcome.code);
    }
    Ok(())
}
