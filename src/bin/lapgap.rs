// Copyright 2021 bmc::labs Gmbh. All rights reserved.
//
// Authors:
//   Florian Eich <florian@bmc-labs.com>
//   Jonas Reitemeyer <alumni@bmc-labs.com>

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use eyre::Result;
use lapgap::{Analyzer,
             ChartType,
             Color,
             Event,
             FileStore,
             MemoryStore,
             PreferenceStore,
             Selection,
             ViewPreferences};
use serde::Serialize;
use std::{io, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;


#[derive(Parser, Debug)]
#[command(author, version, about = "Race gap and lap analysis for event files")]
struct Cli {
  /// View preferences file (kept in memory only if omitted)
  #[arg(long, global = true, value_hint = ValueHint::FilePath)]
  prefs: Option<PathBuf>,

  /// Print JSON instead of tables
  #[arg(long, global = true)]
  json: bool,

  /// Log debug output to stderr
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Gap to leader per lap
  Gaps(SelectArgs),
  /// Best and mean lap per driver from the session results
  Drivers(SelectArgs),
  /// Classes entered in the event
  Classes(EventArgs),
  /// Lap times of one driver across sessions
  Trend {
    #[command(flatten)]
    select: SelectArgs,
    /// Driver id
    #[arg(long = "of")]
    driver: String,
  },
  /// Weather summary of the event
  Weather(EventArgs),
  /// Show or change the stored view preferences
  Prefs(PrefsArgs),
}

#[derive(Args, Debug)]
struct EventArgs {
  /// Event JSON file
  #[arg(value_hint = ValueHint::FilePath)]
  event: PathBuf,
}

#[derive(Args, Debug)]
struct SelectArgs {
  #[command(flatten)]
  event: EventArgs,

  /// Restrict to drivers (repeatable)
  #[arg(long = "driver")]
  drivers: Vec<String>,

  /// Restrict to sessions (repeatable)
  #[arg(long = "session")]
  sessions: Vec<String>,

  /// Restrict to one class
  #[arg(long = "class")]
  class_name: Option<String>,

  /// Keep only the N fastest drivers (defaults to the stored preference)
  #[arg(long)]
  top: Option<usize>,

  /// Show every driver regardless of the stored top N
  #[arg(long, conflicts_with = "top")]
  all: bool,
}

#[derive(Args, Debug)]
struct PrefsArgs {
  #[arg(long, value_enum)]
  chart: Option<ChartArg>,

  #[arg(long)]
  top: Option<usize>,

  #[arg(long)]
  sidebar_collapsed: Option<bool>,

  /// Series color override as DRIVER=#rrggbb (repeatable)
  #[arg(long = "color", value_parser = parse_color)]
  colors: Vec<(String, Color)>,

  /// Drop the color override of a driver (repeatable)
  #[arg(long = "reset-color")]
  reset_colors: Vec<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ChartArg {
  Bar,
  Line,
  Scatter,
}

impl From<ChartArg> for ChartType {
  fn from(arg: ChartArg) -> Self {
    match arg {
      ChartArg::Bar => ChartType::Bar,
      ChartArg::Line => ChartType::Line,
      ChartArg::Scatter => ChartType::Scatter,
    }
  }
}

fn parse_color(s: &str) -> std::result::Result<(String, Color), String> {
  match s.split_once('=') {
    Some((driver, hex)) if !driver.is_empty() => {
      let color = hex.parse().map_err(|err: eyre::Report| err.to_string())?;
      Ok((driver.to_string(), color))
    }
    _ => Err(format!("expected DRIVER=#rrggbb, got '{}'", s)),
  }
}


fn main() -> Result<()> {
  color_eyre::install()?;
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt().with_env_filter(filter)
                           .with_writer(io::stderr)
                           .init();

  let mut store: Box<dyn PreferenceStore> = match &cli.prefs {
    Some(path) => Box::new(FileStore::new(path)),
    None => Box::new(MemoryStore::default()),
  };
  let preferences = ViewPreferences::load(&*store);

  match cli.command {
    Command::Gaps(args) => gaps(&args, &preferences, cli.json),
    Command::Drivers(args) => drivers(&args, &preferences, cli.json),
    Command::Classes(args) => {
      let analyzer = load(&args)?;
      emit(&analyzer.classes(), cli.json, |classes| {
        for class_name in classes {
          println!("{}", class_name);
        }
      })
    }
    Command::Trend { select, driver } => trend(&select, &driver, cli.json),
    Command::Weather(args) => weather(&args, cli.json),
    Command::Prefs(args) => prefs(&args, preferences, &mut *store, cli.json),
  }
}

fn load(args: &EventArgs) -> Result<Analyzer> {
  let event = Event::load(&args.event)?;
  info!(event = %event.name(), "analyzing");
  Ok(Analyzer::new(event))
}

fn selection(args: &SelectArgs, preferences: &ViewPreferences) -> Selection {
  let top_n = match (args.all, args.top) {
    (true, _) => None,
    (false, Some(n)) => Some(n),
    (false, None) => Some(preferences.top_n),
  };

  Selection { drivers: args.drivers.clone(),
              sessions: args.sessions.clone(),
              class_name: args.class_name.clone(),
              top_n }
}

fn emit<T, F>(value: &T, json: bool, table: F) -> Result<()>
  where T: Serialize + ?Sized,
        F: FnOnce(&T)
{
  if json {
    println!("{}", serde_json::to_string_pretty(value)?);
  } else {
    table(value);
  }
  Ok(())
}

fn seconds(value: Option<f64>) -> String {
  value.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v))
}

fn gaps(args: &SelectArgs, preferences: &ViewPreferences, json: bool) -> Result<()> {
  let mut analyzer = load(&args.event)?;
  let groups = analyzer.gaps(&selection(args, preferences));

  let mut driver_ids: Vec<&str> = Vec::new();
  for series in groups.iter().flat_map(|group| group.gaps()) {
    if !driver_ids.contains(&series.driver_id().as_str()) {
      driver_ids.push(series.driver_id());
    }
  }
  let colors = analyzer.colors(driver_ids, preferences);

  emit(&groups, json, |groups| {
    for group in groups {
      println!("{} ({})", group.session_name(), group.session_id());
      for series in group.gaps() {
        let color = colors.get(series.driver_id())
                          .map(|c| c.to_string())
                          .unwrap_or_default();
        println!("  {} ({}) {} best {}",
                 series.driver_name(),
                 series.driver_id(),
                 color,
                 seconds(series.best_lap_time()));
        for point in series.gaps() {
          println!("    lap {:>3}  elapsed {:>10.3}  gap {:>8.3}",
                   point.lap_number(),
                   point.elapsed(),
                   point.gap_to_leader());
        }
      }
    }
  })
}

fn drivers(args: &SelectArgs, preferences: &ViewPreferences, json: bool) -> Result<()> {
  let analyzer = load(&args.event)?;
  let aggregates = analyzer.aggregates(&selection(args, preferences));

  emit(&aggregates, json, |aggregates| {
    println!("{:<8} {:<24} {:>10} {:>10} {:>6}", "id", "driver", "best", "mean", "races");
    for a in aggregates {
      println!("{:<8} {:<24} {:>10} {:>10} {:>6}",
               a.driver_id(),
               a.driver_name(),
               seconds(a.best_lap_time()),
               seconds(a.mean_lap_time()),
               a.races());
    }
  })
}

fn trend(args: &SelectArgs, driver: &str, json: bool) -> Result<()> {
  let analyzer = load(&args.event)?;
  let trend = analyzer.trend(driver, &selection(args, &ViewPreferences::default()));

  emit(&trend, json, |trend| {
    for band in trend.bands() {
      println!("{}",
               band.session_name()
                   .as_deref()
                   .or_else(|| band.session_id().as_deref())
                   .unwrap_or("(unknown session)"));
      for point in &trend.points()[band.first()..=band.last()] {
        println!("  #{:<4} lap {:>3}  {:>8.3}",
                 point.index(),
                 point.lap_number(),
                 point.lap_time());
      }
    }
  })
}

fn weather(args: &EventArgs, json: bool) -> Result<()> {
  let summary = load(args)?.weather();

  emit(&summary, json, |summary| {
    println!("samples: {}", summary.samples());
    let readings = [("air temp", summary.air_temp()),
                    ("track temp", summary.track_temp()),
                    ("humidity", summary.humidity()),
                    ("wind speed", summary.wind_speed())];
    for (name, range) in readings.iter() {
      match range {
        Some(r) => println!("{:<11} min {:>6.1}  max {:>6.1}  mean {:>6.1}",
                            name,
                            r.min(),
                            r.max(),
                            r.mean()),
        None => println!("{:<11} -", name),
      }
    }
    println!("wet: {}", summary.wet());
  })
}

fn prefs(args: &PrefsArgs,
         mut preferences: ViewPreferences,
         store: &mut dyn PreferenceStore,
         json: bool)
         -> Result<()> {
  let before = preferences.clone();

  if let Some(chart) = args.chart {
    preferences.chart_type = chart.into();
  }
  if let Some(top) = args.top {
    preferences.top_n = top;
  }
  if let Some(collapsed) = args.sidebar_collapsed {
    preferences.sidebar_collapsed = collapsed;
  }
  for (driver, color) in &args.colors {
    preferences.set_series_color(driver, *color);
  }
  for driver in &args.reset_colors {
    preferences.reset_series_color(driver);
  }

  if preferences != before {
    preferences.save(store)?;
    info!("view preferences saved");
  }

  emit(&preferences, json, |p| {
    println!("chart type:        {:?}", p.chart_type);
    println!("sidebar collapsed: {}", p.sidebar_collapsed);
    println!("top n:             {}", p.top_n);
    for (driver, color) in &p.series_colors {
      println!("color {:<12} {}", driver, color);
    }
  })
}


#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;


  fn select_args(args: &[&str]) -> SelectArgs {
    let argv = ["lapgap", "gaps", "event.json"].iter().chain(args);
    match Cli::try_parse_from(argv).unwrap().command {
      Command::Gaps(args) => args,
      command => panic!("unexpected command {:?}", command),
    }
  }

  #[test]
  fn selection_top_n_test() {
    let mut preferences = ViewPreferences::default();
    preferences.top_n = 3;

    assert_eq!(Some(3), selection(&select_args(&[]), &preferences).top_n);
    assert_eq!(Some(5),
               selection(&select_args(&["--top", "5"]), &preferences).top_n);
    assert_eq!(None, selection(&select_args(&["--all"]), &preferences).top_n);

    let argv = ["lapgap", "gaps", "event.json", "--all", "--top", "5"];
    assert!(Cli::try_parse_from(&argv).is_err());
  }

  #[test]
  fn selection_filters_test() {
    let args = select_args(&["--driver", "D1", "--driver", "D2", "--session", "R1",
                             "--class", "GT3"]);
    let selection = selection(&args, &ViewPreferences::default());

    assert_eq!(Selection::all().with_drivers(&["D1", "D2"])
                               .with_sessions(&["R1"])
                               .with_class("GT3")
                               .with_top_n(ViewPreferences::default().top_n),
               selection);
  }

  #[test]
  fn parse_color_test() {
    assert_eq!(Ok(("D1".to_string(), Color::rgb(0xd6, 0x27, 0x28))),
               parse_color("D1=#d62728"));
    assert_eq!(Ok(("D1".to_string(), Color::rgb(0xff, 0x00, 0xcc))),
               parse_color("D1=#f0c"));

    assert!(parse_color("D1#d62728").is_err());
    assert!(parse_color("=#d62728").is_err());
    assert!(parse_color("D1=#zzzzzz").is_err());
    assert!(parse_color("D1=").is_err());
  }

  #[test]
  fn prefs_color_args_test() {
    let cli = Cli::try_parse_from(&["lapgap",
                                    "prefs",
                                    "--color",
                                    "D1=#000000",
                                    "--color",
                                    "D2=#ffffff"]).unwrap();
    match cli.command {
      Command::Prefs(args) => {
        assert_eq!(vec![("D1".to_string(), Color::rgb(0, 0, 0)),
                        ("D2".to_string(), Color::rgb(255, 255, 255))],
                   args.colors)
      }
      command => panic!("unexpected command {:?}", command),
    }

    assert!(Cli::try_parse_from(&["lapgap", "prefs", "--color", "D1=red"]).is_err());
  }

  #[test]
  fn prefs_test() {
    let mut store = MemoryStore::default();
    let args = PrefsArgs { chart:             Some(ChartArg::Bar),
                           top:               Some(4),
                           sidebar_collapsed: None,
                           colors:            vec![("D1".to_string(), Color::rgb(0, 0, 0))],
                           reset_colors:      vec![] };

    prefs(&args, ViewPreferences::default(), &mut store, true).unwrap();

    let stored = ViewPreferences::load(&store);
    assert_eq!(ChartType::Bar, stored.chart_type);
    assert_eq!(4, stored.top_n);
    assert_eq!(Some(&"#000000".to_string()), stored.series_colors.get("D1"));
  }
}
