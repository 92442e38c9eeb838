use std::io::Write;

use anyhow::Context;

use crate::{
    configuration::{ScraperSettings, Settings},
    dal::{load_queries, AdCsvWriter},
    services::{DirectClient, DirectScraper, PageFetcher},
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub queries: usize,
    pub ads_seen: usize,
    pub rows_written: usize,
    pub duplicates: usize,
    pub detail_failures: usize,
    pub pages_skipped: u32,
}

pub fn collect_queries(settings: &ScraperSettings) -> anyhow::Result<Vec<String>> {
    let mut queries: Vec<String> = settings
        .queries
        .iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();

    if let Some(path) = &settings.queries_file {
        queries.extend(load_queries(path)?);
    }

    match queries.is_empty() {
        true => anyhow::bail!("No queries configured. Set `scraper.queries` or `scraper.queries_file`."),
        false => Ok(queries),
    }
}

pub async fn run(settings: Settings) -> anyhow::Result<RunReport> {
    let queries = collect_queries(&settings.scraper)?;
    let client = DirectClient::new(&settings.scraper).context("Failed to build HTTP client")?;
    let scraper = DirectScraper::new(client, &settings.scraper)?;
    let writer = AdCsvWriter::create(&settings.output.path, settings.output.dedupe_empty_phones)?;

    log::info!(
        "Scraping {} queries into {}",
        queries.len(),
        settings.output.path.display()
    );

    scrape_queries(&scraper, &queries, writer).await
}

/// Drains every query's ads into `writer`, in query order. The writer is flushed
/// on success and dropped (flushing what it can) on error.
pub async fn scrape_queries<F, W>(
    scraper: &DirectScraper<F>,
    queries: &[String],
    mut writer: AdCsvWriter<W>,
) -> anyhow::Result<RunReport>
where
    F: PageFetcher,
    W: Write,
{
    let mut report = RunReport {
        queries: queries.len(),
        ..Default::default()
    };

    for (i, query) in queries.iter().enumerate() {
        log::info!("Query {}/{}: {}", i + 1, queries.len(), query);

        let mut ads = scraper.ads(query);
        while let Some(ad) = ads
            .next()
            .await
            .with_context(|| format!("Scraping query `{}` failed", query))?
        {
            writer.write_unique(&ad)?;
        }

        let stats = ads.stats();
        report.ads_seen += stats.ads;
        report.detail_failures += stats.detail_failures;
        report.pages_skipped += stats.pages_skipped;
    }

    report.rows_written = writer.written();
    report.duplicates = writer.duplicates();
    writer.finish()?;

    log::info!(
        "Done: {} ads seen, {} written, {} duplicates, {} detail failures",
        report.ads_seen,
        report.rows_written,
        report.duplicates,
        report.detail_failures
    );

    Ok(report)
}
