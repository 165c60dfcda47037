//! One reconciliation run.
//!
//! Coordinates the full flow: feed fetch → annotation → catalog fetch →
//! index build → tiered matching → console summary → report files. A feed
//! source that fails to fetch is reported and skipped (an absent input,
//! not a fatal error); a catalog failure aborts the run.

use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::catalog::CatalogClient;
use crate::config::{Config, FeedSourceConfig};
use crate::feed;
use crate::index::ReferenceIndex;
use crate::kingdom::KingdomClassifier;
use crate::matching::MatchingEngine;
use crate::models::{MatchOutcome, MatchStrategy, MissingResource};
use crate::report;

/// Options for `iptcheck check`.
#[derive(Debug, Default)]
pub struct CheckOptions {
    /// Restrict the run to one configured source.
    pub source: Option<String>,
    /// Truncate the harvested set after fetching.
    pub limit: Option<usize>,
    /// Report to the console only; write no files.
    pub dry_run: bool,
    /// Override the configured report directory.
    pub output_dir: Option<PathBuf>,
}

struct SourceStat {
    id: String,
    items: usize,
    failed: bool,
}

pub async fn run_check(config: &Config, opts: CheckOptions) -> Result<()> {
    // Resolve catalog credentials before any network work.
    let catalog = CatalogClient::new(&config.catalog)?;

    let sources: Vec<&FeedSourceConfig> = match &opts.source {
        Some(id) => {
            let source = config
                .sources
                .iter()
                .find(|s| &s.id == id)
                .ok_or_else(|| anyhow::anyhow!("Unknown source: '{}'", id))?;
            vec![source]
        }
        None => config.sources.iter().collect(),
    };

    if sources.is_empty() {
        bail!("No feed sources configured");
    }

    let http = feed::feed_client()?;
    let classifier = KingdomClassifier::default();

    let mut harvested = Vec::new();
    let mut stats = Vec::new();

    for (i, source) in sources.iter().enumerate() {
        println!(
            "[{}/{}] fetching {} ({})",
            i + 1,
            sources.len(),
            source.id,
            source.rss_url
        );

        let items = match feed::fetch_feed(&http, source).await {
            Ok(xml) => match feed::parse_feed_items(&xml) {
                Ok(items) => items,
                Err(e) => {
                    eprintln!("  error: {:#}", e);
                    stats.push(SourceStat {
                        id: source.id.clone(),
                        items: 0,
                        failed: true,
                    });
                    continue;
                }
            },
            Err(e) => {
                eprintln!("  error: {:#}", e);
                stats.push(SourceStat {
                    id: source.id.clone(),
                    items: 0,
                    failed: true,
                });
                continue;
            }
        };

        println!("  {} items", items.len());
        stats.push(SourceStat {
            id: source.id.clone(),
            items: items.len(),
            failed: false,
        });

        for item in items {
            harvested.push(feed::annotate(item, source, &classifier));
        }
    }

    if let Some(limit) = opts.limit {
        harvested.truncate(limit);
    }

    println!("fetching catalog records...");
    let records = catalog.fetch_records().await?;
    let columns = catalog.fetch_columns().await?;
    println!("  {} records", records.len());
    let labels: Vec<&str> = columns.iter().map(|c| c.label.as_str()).collect();
    println!("  columns: {}", labels.join(", "));

    let index = ReferenceIndex::build(&records);
    println!(
        "  indexed {} tags, {} titles",
        index.tag_count(),
        index.title_count()
    );

    // Match each harvested resource in input order, tallying strategies.
    let engine = MatchingEngine::default();
    let mut missing: Vec<MissingResource> = Vec::new();
    let mut tag_exact = 0usize;
    let mut title_exact = 0usize;
    let mut title_similar = 0usize;

    for resource in &harvested {
        match engine.match_resource(resource, &index) {
            MatchOutcome::Matched { strategy, .. } => match strategy {
                MatchStrategy::TagExact => tag_exact += 1,
                MatchStrategy::TitleNormalizedExact => title_exact += 1,
                MatchStrategy::TitleSimilarity => title_similar += 1,
            },
            MatchOutcome::Unmatched => missing.push(MissingResource {
                resource: resource.clone(),
                attempted_strategies: MatchStrategy::ALL.to_vec(),
            }),
        }
    }

    let total = harvested.len();
    let found = total - missing.len();

    println!();
    println!("reconciliation summary");
    println!("  feed resources: {}", total);
    println!(
        "  matched: {} (tag_exact: {}, title_normalized_exact: {}, title_similarity: {})",
        found, tag_exact, title_exact, title_similar
    );
    println!("  missing: {}", missing.len());
    if total > 0 {
        println!("  coverage: {:.1}%", found as f64 / total as f64 * 100.0);
    }
    println!("  per source:");
    for stat in &stats {
        if stat.failed {
            println!("    {:<16} ERROR", stat.id);
        } else {
            println!("    {:<16} {} items", stat.id, stat.items);
        }
    }

    let sample_tags: Vec<&str> = harvested
        .iter()
        .filter(|r| !r.tag.is_empty())
        .take(10)
        .map(|r| r.tag.as_str())
        .collect();
    if !sample_tags.is_empty() {
        println!("  sample tags: {}", sample_tags.join(", "));
    }

    if missing.is_empty() {
        println!();
        println!("All feed resources are present in the catalog.");
        return Ok(());
    }

    println!();
    println!("missing resources");
    for (i, entry) in missing.iter().enumerate() {
        let resource = &entry.resource;
        println!("{}. {} (tag: '{}')", i + 1, resource.title, resource.tag);
        println!("   source: {}", resource.source_id);
        println!("   link: {}", resource.link);
        if !resource.published_at.is_empty() {
            println!("   published: {}", resource.published_at);
        }
    }

    if opts.dry_run {
        println!();
        println!("dry-run: no report files written");
        return Ok(());
    }

    let output_dir = opts
        .output_dir
        .unwrap_or_else(|| config.report.output_dir.clone());
    let (csv_path, tsv_path) =
        report::write_reports(&missing, &output_dir, &config.report.basename)?;
    println!();
    println!("wrote {}", csv_path.display());
    println!("wrote {}", tsv_path.display());

    Ok(())
}
