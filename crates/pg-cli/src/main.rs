//! PopGuard CLI
//!
//! Offline tooling for rule feeds: validate a feed, evaluate URLs against
//! it, and replay recorded event streams to see what the engine would have
//! decided and counted.

use std::fs;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use pg_core::{
    Event, FilterEngine, HostActions, HostError, RequestDescriptor, ResourceTypes, TabCreated,
};
use pg_feed::{builtin_rules, decode_rules};

#[derive(Parser)]
#[command(name = "pg-cli")]
#[command(about = "PopGuard rule feed tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a rule feed file and report what would load
    Check {
        /// Rule feed JSON file
        #[arg(short, long)]
        input: String,
    },

    /// Evaluate URLs against a rule feed
    Eval {
        /// Rule feed JSON file; omit to use only the built-in rules
        #[arg(short, long)]
        rules: Option<String>,

        /// Also load the built-in domain/pattern rules
        #[arg(short, long)]
        builtin: bool,

        /// Resource type of the evaluated requests
        #[arg(short = 't', long, default_value = "main_frame")]
        resource_type: String,

        /// URLs to evaluate
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Replay a JSON-lines event file and print the final statistics
    Simulate {
        /// Rule feed JSON file; omit to use only the built-in rules
        #[arg(short, long)]
        rules: Option<String>,

        /// Also load the built-in domain/pattern rules
        #[arg(short, long)]
        builtin: bool,

        /// Event file, one JSON object per line
        #[arg(short, long)]
        events: String,
    },
}

/// Host that reports close commands on stdout. Nothing real to close in
/// an offline replay.
struct ReplayHost;

impl HostActions for ReplayHost {
    fn close_tab(&self, tab_id: i64) -> Result<(), HostError> {
        println!("close-tab {tab_id}");
        Ok(())
    }
}

/// One line of a replay event file.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
enum ReplayEvent {
    #[serde(rename_all = "camelCase")]
    Request {
        url: String,
        #[serde(default = "default_resource_type")]
        resource_type: String,
    },
    #[serde(rename_all = "camelCase")]
    TabCreated {
        tab_id: i64,
        url: String,
        #[serde(default)]
        opener_tab_id: Option<i64>,
    },
}

fn default_resource_type() -> String {
    "other".to_string()
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { input } => cmd_check(&input),
        Commands::Eval {
            rules,
            builtin,
            resource_type,
            urls,
        } => cmd_eval(rules.as_deref(), builtin, &resource_type, &urls),
        Commands::Simulate {
            rules,
            builtin,
            events,
        } => cmd_simulate(rules.as_deref(), builtin, &events),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_check(input: &str) -> Result<(), String> {
    let json = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read '{input}': {e}"))?;
    let batch = decode_rules(&json).map_err(|e| e.to_string())?;

    let mut engine = FilterEngine::new(ReplayHost);
    let decoded = batch.rules.len();
    let report = engine.reload_rules(batch.rules);

    println!("{input}:");
    println!("  decoded:  {decoded} ({} entries skipped in decoding)", batch.skipped);
    println!("  loaded:   {} (version {})", report.loaded, report.version);
    println!("  skipped:  {} in validation", report.skipped);

    Ok(())
}

fn cmd_eval(
    rules: Option<&str>,
    builtin: bool,
    resource_type: &str,
    urls: &[String],
) -> Result<(), String> {
    let engine = build_engine(rules, builtin)?;
    let resource_type = ResourceTypes::from_name(resource_type);

    for url in urls {
        let decision = engine.evaluate_url(url, resource_type);
        match decision.matched_rule_id {
            Some(id) if decision.is_block() => println!("BLOCK {url} (rule {id})"),
            Some(id) => println!("allow {url} (rule {id})"),
            None => println!("allow {url}"),
        }
    }

    Ok(())
}

fn cmd_simulate(rules: Option<&str>, builtin: bool, events: &str) -> Result<(), String> {
    let mut engine = build_engine(rules, builtin)?;

    let content = fs::read_to_string(events)
        .map_err(|e| format!("Failed to read '{events}': {e}"))?;

    let mut replayed = 0usize;
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: ReplayEvent = serde_json::from_str(line)
            .map_err(|e| format!("{events}:{}: {e}", line_no + 1))?;

        match event {
            ReplayEvent::Request { url, resource_type } => {
                let resource_type = ResourceTypes::from_name(&resource_type);
                match RequestDescriptor::parse(&url, resource_type, None, None) {
                    Ok(request) => engine.handle_event(Event::RequestObserved(request)),
                    Err(err) => log::warn!("{events}:{}: {err}", line_no + 1),
                }
            }
            ReplayEvent::TabCreated {
                tab_id,
                url,
                opener_tab_id,
            } => {
                engine.handle_event(Event::TabCreated(TabCreated {
                    tab_id,
                    url,
                    opener_tab_id,
                }));
            }
        }
        replayed += 1;
    }

    let snap = engine.stats();
    let mut domains: Vec<(&String, &u64)> = snap.domain_stats.iter().collect();
    domains.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let output = serde_json::json!({
        "replayedEvents": replayed,
        "totalBlockedRequests": snap.total_blocked_requests,
        "totalTrackers": snap.total_trackers,
        "totalPopups": snap.total_popups,
        "domainStats": domains
            .into_iter()
            .map(|(domain, count)| serde_json::json!({"domain": domain, "blocked": count}))
            .collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?);

    Ok(())
}

fn build_engine(rules: Option<&str>, builtin: bool) -> Result<FilterEngine<ReplayHost>, String> {
    let mut definitions = if builtin || rules.is_none() {
        builtin_rules()
    } else {
        Vec::new()
    };

    if let Some(path) = rules {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{path}': {e}"))?;
        let batch = decode_rules(&json).map_err(|e| e.to_string())?;
        if batch.skipped > 0 {
            eprintln!("warning: {} feed entries skipped", batch.skipped);
        }
        definitions.extend(batch.rules);
    }

    let mut engine = FilterEngine::new(ReplayHost);
    let report = engine.reload_rules(definitions);
    if report.skipped > 0 {
        eprintln!("warning: {} rules skipped in validation", report.skipped);
    }

    Ok(engine)
}
