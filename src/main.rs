use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use nzbcheck::args::Args;
use nzbcheck::tls::TlsManager;
use nzbcheck::{checker, logging, nzb, CheckReport};

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.debug, args.quiet);

    match run(args) {
        // The exit code carries the missing count; 0 means nothing missing
        Ok(report) => ExitCode::from(report.missing.min(u64::from(u8::MAX)) as u8),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<CheckReport> {
    // Configuration and index problems abort before any network activity
    let profiles = args.build_profiles()?;
    let contents = nzb::parse_nzb(&args.input, args.quiet)?;

    if !args.quiet {
        let name = args
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| args.input.display().to_string());
        println!("{} has {} articles", name, contents.articles.len());
    }

    let tls = TlsManager::new(&args.tls_config())?;
    let options = args.checker_options();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(checker::run_check(
        &profiles,
        contents.articles,
        contents.missing_in_index,
        tls,
        &options,
    ))
}
