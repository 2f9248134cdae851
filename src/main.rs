use std::path::PathBuf;

use log::{error, info};

use ecovision_api::config::Config;
use ecovision_api::services::sample;

/// Recognized flags: `--generate-sample <path>` (or `--generate-sample=path`)
/// writes a synthetic seed payload and exits instead of serving.
fn parse_cli() -> Result<Option<PathBuf>, String> {
    let mut args = std::env::args_os();
    args.next(); // skip program name

    let mut sample_path: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.to_str() {
            Some("--generate-sample") => {
                if sample_path.is_some() {
                    return Err("`--generate-sample` provided more than once".to_string());
                }
                let value = args
                    .next()
                    .ok_or_else(|| "`--generate-sample` requires a path argument".to_string())?;
                sample_path = Some(PathBuf::from(value));
            }
            Some(s) if s.starts_with("--generate-sample=") => {
                if sample_path.is_some() {
                    return Err("`--generate-sample` provided more than once".to_string());
                }
                let path_str = &s["--generate-sample=".len()..];
                if path_str.is_empty() {
                    return Err("`--generate-sample` requires a path argument".to_string());
                }
                sample_path = Some(PathBuf::from(path_str));
            }
            Some(other) => return Err(format!("unrecognised argument: {}", other)),
            None => return Err("argument contains invalid UTF-8".to_string()),
        }
    }

    Ok(sample_path)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    let sample_path = match parse_cli() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("fatal: {}", e);
            std::process::exit(2);
        }
    };

    info!(
        "ecovision-api {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );

    if let Some(path) = sample_path {
        if let Err(e) = sample::write_sample(&path) {
            error!("fatal: {}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("fatal: {}", e);
            std::process::exit(1);
        }
    };

    ecovision_api::run_server(cfg).await
}
