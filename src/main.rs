use clap::Parser;
use coursera_free_filter::results::{CourseLink, ScanResponse};
use coursera_free_filter::utils::{collect_html_files, open_in_browser};
use coursera_free_filter::{BadgeFlags, Scanner, classify_text};
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;

mod args;
use args::{Args, Command};

fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            ::log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<ExitCode, Box<dyn Error>> {
    let scanner = match &args.config {
        Some(path) => {
            ::log::info!("Loading configuration from {}", path.display());
            Scanner::new().with_config_file(path)?
        }
        None => Scanner::new(),
    };

    match args.command {
        Command::Scan {
            path,
            base_url,
            pretty,
        } => {
            let mut failures = 0;
            for file in html_files(&path)? {
                let response = scanner.respond_file(&file, base_url.as_deref());
                if !response.ok {
                    failures += 1;
                }
                let json = if pretty {
                    serde_json::to_string_pretty(&response)?
                } else {
                    serde_json::to_string(&response)?
                };
                println!("{}", json);
            }
            Ok(if failures == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Free {
            path,
            base_url,
            open,
            limit,
        } => {
            let files = html_files(&path)?;
            let mut free: BTreeMap<String, CourseLink> = BTreeMap::new();
            for file in &files {
                let ScanResponse { result, .. } = scanner.respond_file(file, base_url.as_deref());
                let Some(result) = result else {
                    continue;
                };
                ::log::info!(
                    "{}: {} truly free, {} paid/preview, {} unknown",
                    file.display(),
                    result.counts.truly_free,
                    result.counts.paid_or_preview,
                    result.counts.unknown
                );
                for link in result.truly_free {
                    free.entry(link.url.clone()).or_insert(link);
                }
            }

            println!("Scanned HTML files={} truly_free={}", files.len(), free.len());
            if free.is_empty() {
                println!("No TRULY_FREE courses found.");
                println!("Tip: save course pages after clicking 'Enroll for free' so the enroll options are visible.");
                return Ok(ExitCode::SUCCESS);
            }
            for link in free.values() {
                println!("{} | {}", link.url, link.label);
            }

            if open {
                for link in free.values().take(limit) {
                    match open_in_browser(&link.url) {
                        Ok(()) => ::log::info!("Opened {}", link.url),
                        Err(e) => ::log::warn!("Could not open {}: {}", link.url, e),
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Classify {
            text,
            free_badge,
            preview_badge,
        } => {
            let verdict = classify_text(
                &text,
                BadgeFlags {
                    free: free_badge,
                    preview: preview_badge,
                },
            );
            println!("{}\t{}", verdict.classification, verdict.reason);
            Ok(ExitCode::SUCCESS)
        }
        Command::Normalize { url, base_url } => {
            let base = base_url.as_deref().map(url::Url::parse).transpose()?;
            let filter = scanner.filter();
            match filter.normalize(&url, base.as_ref()) {
                Some(normalized) => {
                    let course = filter.is_course_url(&normalized);
                    println!("{}\tcourse={}", normalized, course);
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    println!("rejected: {}", url);
                    Ok(ExitCode::from(2))
                }
            }
        }
    }
}

fn html_files(path: &Path) -> Result<Vec<std::path::PathBuf>, Box<dyn Error>> {
    let files = collect_html_files(path)?;
    if files.is_empty() {
        return Err(format!("no .html/.htm files found at {}", path.display()).into());
    }
    ::log::debug!("Found {} HTML files under {}", files.len(), path.display());
    Ok(files)
}
