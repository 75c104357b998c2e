// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! *Part of the wider ChronoSlice project*
//!
//! A terminal harness for the selection engine: generates a synthetic
//! order-date column, runs an update cycle plus any requested gestures and
//! prints what a renderer would see
//!

use chrono::{Days, NaiveDate, NaiveTime};
use chronoslice_core::Granularity;
use chronoslice_engine::{
    CategoryColumn, ColumnSource, ColumnValues, FilterSink, FilterUpdate, PropertyStore, RowId,
    SlicerSettings, TimeSlicer,
};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, TermLogger, TerminalMode,
};
use std::str::FromStr;

#[macro_use]
extern crate log;
extern crate simplelog;

/// Demo entry point
fn main() {
    let args = Cli::parse();

    // Setup logging
    let config_log = ConfigBuilder::new()
        .add_filter_allow_str("chronoslice")
        .build();

    CombinedLogger::init(vec![TermLogger::new(
        if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        config_log,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])
    .unwrap();

    let granularity = match Granularity::from_str(&args.granularity) {
        Ok(granularity) => granularity,
        Err(error) => {
            eprintln!("CLI Error: {error}");
            std::process::exit(1);
        }
    };

    let column = synthetic_column(args.start, args.days, args.rows, args.seed);
    info!(
        "Generated {} rows across {} days from {}",
        args.rows, args.days, args.start
    );

    let mut settings = SlicerSettings::default();
    settings.granularity.granularity = granularity;
    settings.force_selection.current_period = args.force_current_period;
    settings.force_selection.latest_available_date = args.force_latest_date;

    let mut slicer = TimeSlicer::new();
    let mut sink = PrintSink;
    let mut store = PrintStore;

    if let Err(error) = slicer.update(&column, settings, &mut sink) {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }

    if let (Some(from), Some(to)) = (args.from, args.to) {
        slicer.set_boundary_dates(from, to, &mut sink, &mut store);
    }

    let (selection_start, selection_end) = slicer.selection();
    println!("Granularity: {}", slicer.granularity());
    println!(
        "Selection:   periods {selection_start}-{selection_end} of {}",
        slicer.periods().len()
    );
    println!("Range:       {}", slicer.range_header_text());

    if let Some(labels) = slicer.labels() {
        for level in Granularity::ALL {
            let row = labels.level(level);
            if row.is_empty() {
                continue;
            }
            let texts: Vec<&str> = row.iter().map(|label| label.text.as_str()).collect();
            println!("{:>9}: {}", level.to_string(), texts.join(" | "));
        }
    }

    if args.list {
        for (position, period) in slicer.periods().iter().enumerate() {
            let marker = if slicer.is_period_selected(position) {
                "*"
            } else {
                " "
            };
            println!(
                "{marker} [{position:>4}] {} .. {}  index {:.3}  fraction {:.3}",
                period.start_date, period.end_date, period.index, period.fraction
            );
        }
    }
}

/// Generate a reproducible column of random order dates
fn synthetic_column(start: NaiveDate, days: u64, rows: usize, seed: u64) -> CategoryColumn {
    let mut rng = StdRng::seed_from_u64(seed);
    let dates = (0..rows)
        .map(|_| {
            let offset = rng.gen_range(0..days);
            (start + Days::new(offset)).and_time(NaiveTime::MIN)
        })
        .collect();

    CategoryColumn {
        source: ColumnSource {
            table: String::from("Sales"),
            column: String::from("OrderDate"),
        },
        values: ColumnValues::Dates(dates),
        identities: (0..rows).map(|_| RowId::new()).collect(),
    }
}

/// Prints filter updates as the JSON a host would receive
struct PrintSink;

impl FilterSink for PrintSink {
    fn push_filter(&mut self, update: FilterUpdate) {
        match update {
            FilterUpdate::Apply(filter) => match serde_json::to_string_pretty(&filter) {
                Ok(json) => println!("Filter update:\n{json}"),
                Err(error) => eprintln!("Error serializing filter: {error}"),
            },
            FilterUpdate::Remove => println!("Filter update: remove"),
        }
    }
}

/// Logs property writes instead of persisting them
struct PrintStore;

impl PropertyStore for PrintStore {
    fn persist_granularity(&mut self, granularity: Granularity) {
        info!("Persisting granularity {granularity}");
    }

    fn persist_force_selection_disabled(&mut self) {
        info!("Persisting force selection off");
    }
}

/// ChronoSlice demo CLI args using [clap]
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Drive the ChronoSlice selection engine from the terminal",
    after_help = "Output is reproducible for a given --seed"
)]
pub struct Cli {
    /// First possible order date
    #[arg(long, default_value = "2023-01-01")]
    pub start: NaiveDate,

    /// Number of days order dates are spread across
    #[arg(long, default_value_t = 365)]
    pub days: u64,

    /// Number of rows to generate
    #[arg(long, default_value_t = 500)]
    pub rows: usize,

    /// Random seed for the generated column
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Granularity: year, quarter, month, week or day
    #[arg(long, default_value = "month")]
    pub granularity: String,

    /// Force the selection to the period containing today
    #[arg(long)]
    pub force_current_period: bool,

    /// Force the selection to the period of the latest available date
    #[arg(long)]
    pub force_latest_date: bool,

    /// Select from this date (requires --to)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Select up to this date inclusive (requires --from)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// List every period with its index and fraction
    #[arg(long)]
    pub list: bool,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,
}
