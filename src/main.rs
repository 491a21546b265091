use rand::Rng;
use std::env;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vitals_gauge::{
    Color, GaugeLayout, MetricKey, MetricRange, Reading, ReferenceTable, REFERENCE_TABLE,
};

/// Path to a JSON reference table overriding the builtin one.
const TABLE_ENV: &str = "VITALS_GAUGE_TABLE";

const USAGE: &str = "usage: vitals-gauge [--table PATH] [--random] [metric=value ...]
metrics: glucose hba1c ldl hdl triglycerides vitamin_d";

#[derive(Debug, Default, PartialEq)]
struct Args {
    help: bool,
    table: Option<PathBuf>,
    random: bool,
    readings: Vec<(MetricKey, f64)>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--random" => parsed.random = true,
            "--table" => {
                let path = args.next().ok_or("--table needs a path")?;
                parsed.table = Some(PathBuf::from(path));
            }
            "-h" | "--help" => parsed.help = true,
            _ => {
                let (name, text) = arg
                    .split_once('=')
                    .ok_or_else(|| format!("expected metric=value, got {arg:?}"))?;
                let metric = name.parse::<MetricKey>().map_err(|e| e.to_string())?;
                parsed.readings.push((metric, parse_value(text)));
            }
        }
    }

    Ok(parsed)
}

/// Text that does not parse as a number reads as 0, the same as an empty field.
fn parse_value(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(0.0)
}

/// Samples a value a little beyond either end of the range so the clamped
/// ends of the dial get exercised too.
fn random_value(rng: &mut impl Rng, range: &MetricRange) -> f64 {
    let span = range.max - range.min;
    if !span.is_finite() || span <= 0.0 {
        return range.min;
    }
    let (low, high) = (range.min - span * 0.1, range.max + span * 0.1);
    if low.is_finite() && high.is_finite() {
        rng.random_range(low..high)
    } else {
        rng.random_range(range.min..=range.max)
    }
}

fn hex_color(color: Color) -> String {
    let (r, g, b) = color.as_tuple();
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn load_table(args: &Args) -> Result<ReferenceTable, Box<dyn std::error::Error>> {
    let path = args
        .table
        .clone()
        .or_else(|| env::var_os(TABLE_ENV).map(PathBuf::from));

    let table = match path {
        Some(path) => ReferenceTable::from_path(path)?,
        None => {
            REFERENCE_TABLE.validate()?;
            REFERENCE_TABLE.clone()
        }
    };
    Ok(table)
}

fn print_reading(reading: &Reading, unit: &str) {
    let gauge = &reading.gauge;
    println!(
        "{:<14} {:>7} {:<6} {:<11} {} angle={:>6.1} needle=({:.1}, {:.1})",
        reading.metric,
        reading.display_value,
        unit,
        reading.category,
        hex_color(reading.category.color()),
        gauge.angle_degrees,
        gauge.needle_tip.x,
        gauge.needle_tip.y,
    );
    println!("  arc   {}", gauge.arc_path);
    for zone in &gauge.zone_arcs {
        println!(
            "  zone  {:<11} {} {:>6.1} -> {:>6.1}",
            zone.category,
            hex_color(zone.category.color()),
            zone.start_angle,
            zone.end_angle
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            process::exit(2);
        }
    };

    if args.help {
        println!("{USAGE}");
        return Ok(());
    }

    let table = load_table(&args)?;
    let layout = GaugeLayout::default();

    let mut readings = args.readings.clone();
    if args.random || readings.is_empty() {
        let mut rng = rand::rng();
        readings.extend(
            table
                .iter()
                .map(|(metric, range)| (metric, random_value(&mut rng, range))),
        );
    }

    for (metric, value) in readings {
        let Some(reading) = Reading::new(metric, value, &table, &layout) else {
            tracing::warn!(%metric, "metric missing from reference table");
            continue;
        };
        let unit = table.get(metric).map_or("", |range| range.unit.as_str());
        tracing::debug!(%metric, value, category = %reading.category, "computed gauge");
        print_reading(&reading, unit);
    }

    Ok(())
}
