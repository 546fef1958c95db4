use clap::{Arg, Command};
use linkshield::config::Config;
use linkshield::pipeline::{transport_check, Link, Pipeline};
use linkshield::remote::RemoteClassifier;
use linkshield::storage::{Storage, KEY_BLOCKLIST, KEY_ENABLED, KEY_SCAN_STATS};
use linkshield::verdict::{Label, Verdict};
use linkshield::ScanStats;
use log::LevelFilter;
use std::process;
use url::Url;

#[tokio::main]
async fn main() {
    let matches = Command::new("linkshield")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Phishing link checker: heuristic scoring, durable blocklisting, navigation guarding")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/linkshield.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("scan")
                .long("scan")
                .value_name("FILE")
                .help("Scan a file of links (one URL per line; prefix navigation links with 'nav ')")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("base")
                .long("base")
                .value_name("URL")
                .help("Page base URL for resolving relative links during --scan")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .value_name("URL")
                .help("Classify a single URL through the full pipeline")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("transport-check")
                .long("transport-check")
                .value_name("URL")
                .help("Presence-only HTTPS transport check for a URL")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Show the last scan's counters")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("blocklist")
                .long("blocklist")
                .help("Show the durable block set")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("clear-blocklist")
                .long("clear-blocklist")
                .help("Clear the durable block set")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("enable")
                .long("enable")
                .help("Enable scanning")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("disable")
                .long("disable")
                .help("Disable scanning")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        match Config::generate(generate_path) {
            Ok(()) => println!("Default configuration written to {generate_path}"),
            Err(e) => {
                eprintln!("Error generating configuration: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = if std::path::Path::new(config_path).exists() {
        match Config::load(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading configuration: {e}");
                process::exit(1);
            }
        }
    } else {
        log::debug!("Config file {config_path} not found, using defaults");
        Config::default()
    };

    if let Some(url) = matches.get_one::<String>("transport-check") {
        print_verdict(url, &transport_check(url));
        return;
    }

    let storage = match Storage::open(&config.storage.state_path).await {
        Ok(storage) => storage,
        Err(e) => {
            eprintln!("Error opening state file {}: {e}", config.storage.state_path);
            process::exit(1);
        }
    };

    if matches.get_flag("enable") {
        set_enabled(&storage, true).await;
        return;
    }
    if matches.get_flag("disable") {
        set_enabled(&storage, false).await;
        return;
    }

    if matches.get_flag("stats") {
        match storage.get::<ScanStats>(KEY_SCAN_STATS).await {
            Ok(Some(stats)) => {
                println!("Last scan: {} links", stats.total);
                println!("  safe:       {}", stats.safe);
                println!("  suspicious: {}", stats.suspicious);
            }
            Ok(None) => println!("No scan recorded yet."),
            Err(e) => {
                eprintln!("Error reading scan stats: {e}");
                process::exit(1);
            }
        }
        return;
    }

    if matches.get_flag("blocklist") {
        match storage.get::<Vec<String>>(KEY_BLOCKLIST).await {
            Ok(Some(mut urls)) => {
                urls.sort();
                println!("{} blocklisted URLs:", urls.len());
                for url in urls {
                    println!("  {url}");
                }
            }
            Ok(None) => println!("Block set is empty."),
            Err(e) => {
                eprintln!("Error reading block set: {e}");
                process::exit(1);
            }
        }
        return;
    }

    if matches.get_flag("clear-blocklist") {
        if let Err(e) = storage.remove(KEY_BLOCKLIST).await {
            eprintln!("Error clearing block set: {e}");
            process::exit(1);
        }
        println!("Block set cleared.");
        return;
    }

    let remote = match RemoteClassifier::new(
        &config.remote.endpoint,
        config.remote.timeout_seconds.unwrap_or(10),
    ) {
        Ok(remote) => remote,
        Err(e) => {
            eprintln!("Error building HTTP client: {e}");
            process::exit(1);
        }
    };
    let mut pipeline = Pipeline::new(storage, remote);

    if let Some(url) = matches.get_one::<String>("check") {
        // Manual checks bypass the enabled flag, like the popup's check box
        pipeline.load_state().await;
        let verdict = pipeline.classify(url).await;
        print_verdict(url, &verdict);
        return;
    }

    if let Some(file) = matches.get_one::<String>("scan") {
        let links = match read_links(file) {
            Ok(links) => links,
            Err(e) => {
                eprintln!("Error reading link file {file}: {e}");
                process::exit(1);
            }
        };

        let base = match matches.get_one::<String>("base") {
            Some(raw) => match Url::parse(raw) {
                Ok(base) => Some(base),
                Err(e) => {
                    eprintln!("Error parsing base URL {raw}: {e}");
                    process::exit(1);
                }
            },
            None => None,
        };

        match pipeline.scan(&links, base.as_ref()).await {
            Some(stats) => {
                for link in &links {
                    if pipeline.options().flag_navigation_links && link.navigational {
                        continue;
                    }
                    // Session cache hit from the scan pass; no fresh work
                    let verdict = pipeline.classify_with_base(&link.href, base.as_ref()).await;
                    print_verdict(&link.href, &verdict);
                }
                println!(
                    "\n{} links scanned: {} safe, {} suspicious",
                    stats.total, stats.safe, stats.suspicious
                );
            }
            None => println!("Scanning is disabled. Enable it with --enable."),
        }
        return;
    }

    eprintln!("No action requested. See --help.");
    process::exit(1);
}

fn read_links(path: &str) -> std::io::Result<Vec<Link>> {
    let content = std::fs::read_to_string(path)?;
    let links = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| match line.strip_prefix("nav ") {
            Some(href) => Link {
                href: href.trim().to_string(),
                navigational: true,
            },
            None => Link::new(line),
        })
        .collect();
    Ok(links)
}

async fn set_enabled(storage: &Storage, enabled: bool) {
    if let Err(e) = storage.set(KEY_ENABLED, &enabled).await {
        eprintln!("Error updating enabled flag: {e}");
        process::exit(1);
    }
    println!(
        "Scanning {}.",
        if enabled { "enabled" } else { "disabled" }
    );
}

fn print_verdict(url: &str, verdict: &Verdict) {
    let marker = match verdict.label {
        Label::Phishing => "🚨",
        Label::Suspicious => "⚠️ ",
        Label::Legitimate => "✅",
        Label::Unknown => "❓",
    };
    println!(
        "{marker} {url} -> {} (score {:.2})",
        verdict.label, verdict.score
    );
}
