//! mqcheck - evaluate IBM MQ services from agent output.

use mqcheck::config::{read_agent_output, CheckerConfig, Rules};
use mqcheck::plugins::{registry, run_checks, validate_rules};
use mqcheck::section::AgentSections;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging; stdout carries the check results
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("mqcheck=info".parse()?))
        .init();

    // Load configuration
    let cfg = CheckerConfig::load();
    tracing::info!("Reading agent output from {}", cfg.agent_output);
    let text = read_agent_output(&cfg.agent_output).await?;

    let rules = match &cfg.rules_path {
        Some(path) => {
            tracing::info!("Using rules from {}", path.display());
            Rules::load(path).await?
        }
        None => Rules::default(),
    };

    let plugins = registry();
    validate_rules(&plugins, &rules)?;

    let sections = AgentSections::from_agent_output(&text);
    if cfg.dump_sections {
        println!("{}", serde_json::to_string_pretty(&sections)?);
    }

    let reports = run_checks(&plugins, &sections, &rules);
    let mut vanished = 0;
    for report in &reports {
        if report.outcome.is_vanished() {
            vanished += 1;
            continue;
        }
        println!("{}", report);
    }
    tracing::info!("Checked {} services, {} vanished", reports.len(), vanished);

    Ok(())
}
