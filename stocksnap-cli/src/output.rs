//! Plain-text, CSV and JSON rendering for CLI results.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use stocksnap_core::geo::GeoLocation;
use stocksnap_core::insights::{DailyChange, SectorPerformance};
use stocksnap_core::news::NewsArticle;
use stocksnap_core::MarketSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown format '{other}' (expected table, csv or json)")),
        }
    }
}

#[derive(Serialize)]
struct SeriesRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

pub fn write_snapshot<W: Write>(out: &mut W, snapshot: &MarketSnapshot, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => write_snapshot_table(out, snapshot),
        OutputFormat::Csv => write_snapshot_csv(out, snapshot),
        OutputFormat::Json => write_json(out, snapshot),
    }
}

fn write_snapshot_table<W: Write>(out: &mut W, snapshot: &MarketSnapshot) -> Result<()> {
    writeln!(out, "{}", snapshot.chart.title)?;
    writeln!(
        out,
        "{} window, {} data from {} ({} of {} records)",
        snapshot.selector,
        snapshot.granularity,
        snapshot.source.label(),
        snapshot.series.len(),
        snapshot.fetched_records
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<19}  {:>10}  {:>10}  {:>10}  {:>10}  {:>12}",
        "Timestamp", "Open", "High", "Low", "Close", "Volume"
    )?;
    writeln!(out, "{}", "-".repeat(79))?;
    for r in &snapshot.series {
        writeln!(
            out,
            "{:<19}  {:>10.2}  {:>10.2}  {:>10.2}  {:>10.2}  {:>12.0}",
            r.timestamp.format("%Y-%m-%d %H:%M:%S"),
            r.open,
            r.high,
            r.low,
            r.close,
            r.volume
        )?;
    }
    Ok(())
}

fn write_snapshot_csv<W: Write>(out: &mut W, snapshot: &MarketSnapshot) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for r in &snapshot.series {
        writer.serialize(SeriesRow {
            timestamp: r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_news<W: Write>(out: &mut W, articles: &[NewsArticle]) -> Result<()> {
    if articles.is_empty() {
        writeln!(out, "No headlines available.")?;
        return Ok(());
    }
    for (i, article) in articles.iter().enumerate() {
        match &article.source_name {
            Some(source) => writeln!(out, "{}. {} ({source})", i + 1, article.title)?,
            None => writeln!(out, "{}. {}", i + 1, article.title)?,
        }
        writeln!(out, "   {}", article.description)?;
        if let Some(image) = &article.image_url {
            writeln!(out, "   Image: {image}")?;
        }
        writeln!(out, "   {}", article.article_url)?;
    }
    Ok(())
}

pub fn write_location<W: Write>(out: &mut W, location: &GeoLocation) -> Result<()> {
    writeln!(
        out,
        "Latitude {:.4}, longitude {:.4}",
        location.latitude, location.longitude
    )?;
    if let Some(place) = &location.place {
        writeln!(out, "{place}")?;
    }
    Ok(())
}

pub fn write_sectors<W: Write>(out: &mut W, sectors: &[SectorPerformance]) -> Result<()> {
    for s in sectors {
        writeln!(out, "{:<24} {:>+7.2}%", s.sector, s.change_pct)?;
    }
    Ok(())
}

pub fn write_gainers<W: Write>(out: &mut W, gainers: &[DailyChange]) -> Result<()> {
    if gainers.is_empty() {
        writeln!(out, "No symbols in the selected change range.")?;
        return Ok(());
    }
    writeln!(
        out,
        "{:<8} {:>10} {:>10} {:>9}  {}",
        "Symbol", "Close", "Prev", "Change", "As of"
    )?;
    for g in gainers {
        writeln!(
            out,
            "{:<8} {:>10.2} {:>10.2} {:>+8.2}%  {}",
            g.symbol.as_str(),
            g.close,
            g.previous_close,
            g.change_pct,
            g.as_of.format("%Y-%m-%d")
        )?;
    }
    Ok(())
}
