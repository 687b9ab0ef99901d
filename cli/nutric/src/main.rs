use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use nutri_core::{Classification, Measurement, Validatable};
use nutri_data::summary::{
    district_overview, unit_summary, AgeGroup, AreaFilter, DistrictOverview, RecordFilter,
    UnitSummary,
};
use nutri_data::testdata::{sample_records, sample_schools};
use nutri_data::{
    load_records, load_schools, ChildRecord, EntryForm, RecordBook, School, UnknownSchoolPolicy,
};
use serde::Serialize;

mod config;

use config::{Config, OutputFormat, CONFIG_FILE};

#[derive(Debug, Parser)]
#[command(
    name = "nutric",
    version,
    about = "Child-nutrition screening and surveillance reports",
    long_about = "nutric classifies children as Normal, MAM (moderate) or SAM (severe acute\n\
        malnutrition) from height, weight and MUAC, and summarises records per unit\n\
        and per district.\n\n\
        EXAMPLES:\n\
        \n  nutric classify --height 92 --weight 9.2 --muac 11.2   Screen one child\n\
        \n  nutric unit S1                                          Unit dashboard\n\
        \n  nutric district --area rural --age 0-24 --format json   Filtered district report\n\
        \n  nutric init                                             Write nutric.toml"
)]
struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file
    #[arg(long, value_name = "FILE", default_value = CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Output format (overrides the config file)
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify a single set of measurements
    Classify(ClassifyArgs),

    /// Summary for one school or Anganwadi unit
    Unit(UnitArgs),

    /// Prevalence across all units, with optional filters
    District(DistrictArgs),

    /// Validate a data-entry submission and print the resulting record
    Entry(EntryArgs),

    /// Write a starter nutric.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args, Clone)]
struct ClassifyArgs {
    /// Height in centimetres
    #[arg(long, value_name = "CM")]
    height: String,

    /// Weight in kilograms
    #[arg(long, value_name = "KG")]
    weight: String,

    /// Mid-upper-arm circumference in centimetres
    #[arg(long, value_name = "CM")]
    muac: String,

    /// Refuse heights at or below 50 cm instead of reporting inf/NaN scores
    #[arg(long)]
    checked: bool,
}

#[derive(Debug, Args, Clone, Default)]
struct DataArgs {
    /// Child records (JSON array or NDJSON); sample data when omitted
    #[arg(long, value_name = "FILE")]
    records: Option<PathBuf>,

    /// Units (JSON array or NDJSON); sample units when omitted
    #[arg(long, value_name = "FILE")]
    schools: Option<PathBuf>,

    /// Recompute stored statuses before reporting
    #[arg(long)]
    reclassify: bool,
}

#[derive(Debug, Args, Clone)]
struct UnitArgs {
    /// Unit id, e.g. S1
    #[arg(value_name = "UNIT_ID")]
    school_id: String,

    #[command(flatten)]
    data: DataArgs,
}

#[derive(Debug, Args, Clone)]
struct DistrictArgs {
    /// Area type filter: all, rural, urban
    #[arg(long, default_value = "all")]
    area: AreaFilter,

    /// Age group filter: all, 0-24, 25-60
    #[arg(long, default_value = "all")]
    age: AgeGroup,

    #[command(flatten)]
    data: DataArgs,
}

#[derive(Debug, Args, Clone)]
struct EntryArgs {
    #[arg(long)]
    name: String,
    /// Age in months
    #[arg(long, value_name = "MONTHS")]
    age: String,
    /// male or female
    #[arg(long, default_value = "male")]
    gender: String,
    #[arg(long, value_name = "CM")]
    height: String,
    #[arg(long, value_name = "KG")]
    weight: String,
    #[arg(long, value_name = "CM")]
    muac: String,
    /// Unit id the child belongs to
    #[arg(long, value_name = "UNIT_ID")]
    school: String,
    /// Measurement date (YYYY-MM-DD); today when omitted
    #[arg(long, value_name = "DATE")]
    date: Option<NaiveDate>,
    /// Accept a unit id that is not in the unit list
    #[arg(long)]
    allow_unknown_school: bool,

    #[command(flatten)]
    data: DataArgs,
}

/// Failure of a command, mapped to the process exit code.
#[derive(Debug, thiserror::Error)]
enum CliError {
    /// Bad input from the user: exit 1.
    #[error("{0}")]
    Invalid(String),
    /// Files, config or serialization: exit 2.
    #[error("{0}")]
    Environment(String),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Invalid(_) => 1,
            CliError::Environment(_) => 2,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    // RUST_LOG, when set, wins over -v.
    builder.parse_default_env();
    let _ = builder.try_init();
}

/// Loads units and records, falling back to the bundled samples.
fn load_book(data: &DataArgs, cfg: &Config) -> Result<RecordBook, CliError> {
    let env_err = |e: nutri_data::LoadError| CliError::Environment(e.to_string());

    let schools: Vec<School> = match data.schools.as_ref().or(cfg.schools.as_ref()) {
        Some(p) => load_schools(p).map_err(env_err)?,
        None => {
            log::info!("no unit list given; using sample units");
            sample_schools()
        }
    };
    let records: Vec<ChildRecord> = match data.records.as_ref().or(cfg.records.as_ref()) {
        Some(p) => load_records(p).map_err(env_err)?,
        None => {
            log::info!("no records given; using sample records");
            sample_records()
        }
    };

    let mut book = RecordBook::new(schools, records);
    if data.reclassify || cfg.reclassify {
        book.reclassify_all();
    }
    Ok(book)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Environment(format!("failed to serialize JSON: {e}")))
}

fn render_classification(m: &Measurement, c: &Classification) -> String {
    format!(
        "height {} cm, weight {} kg, MUAC {} cm\nstatus: {}\nz-score: {:.2}\n",
        m.height_cm,
        m.weight_kg,
        m.muac_cm,
        c.status.badge_label(),
        c.z_score
    )
}

fn render_unit(s: &UnitSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} ({} district, {} area)\n",
        s.school.name, s.school.district, s.school.area_type
    ));
    out.push_str(&format!(
        "children: {}  normal: {}  MAM: {}  SAM: {}\n",
        s.total, s.counts.normal, s.counts.mam, s.counts.sam
    ));
    if s.sam_cases.is_empty() {
        out.push_str("no SAM cases\n");
    } else {
        out.push_str("SAM cases:\n");
        for c in &s.sam_cases {
            out.push_str(&format!(
                "  {:<6} {:<20} {:>3} mo  MUAC {:>5.1}  z {:>6.2}\n",
                c.id, c.name, c.age_months, c.muac_cm, c.z_score
            ));
        }
    }
    out.push_str("children:\n");
    for c in &s.children {
        out.push_str(&format!(
            "  {:<6} {:<20} {:>3} mo  {}\n",
            c.id,
            c.name,
            c.age_months,
            c.status.badge_label()
        ));
    }
    out
}

fn render_district(d: &DistrictOverview) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "children: {}  normal: {}  MAM: {}  SAM: {}  prevalence: {:.1}%\n",
        d.counts.total(),
        d.counts.normal,
        d.counts.mam,
        d.counts.sam,
        d.prevalence
    ));
    for u in &d.units {
        out.push_str(&format!(
            "  {:<6} {:<22} {:<6} {:>4} children  {:>5.1}%  {}\n",
            u.school_id, u.name, u.area.to_string(), u.total, u.prevalence, u.risk
        ));
    }
    out
}

fn render_record(r: &ChildRecord) -> String {
    format!(
        "record {} for {} ({} months, {}) at {} on {}\nstatus: {}\nz-score: {:.2}\n",
        r.id,
        r.name,
        r.age_months,
        r.gender,
        r.school_id,
        r.timestamp,
        r.status.badge_label(),
        r.z_score
    )
}

fn run_classify(
    args: &ClassifyArgs,
    cfg: &Config,
    format: OutputFormat,
) -> Result<String, CliError> {
    let m = Measurement::parse(&args.height, &args.weight, &args.muac)
        .map_err(|e| CliError::Invalid(e.to_string()))?;
    if let Err(e) = m.validate() {
        log::warn!("{e}");
    }
    let c = if args.checked || cfg.checked {
        m.classify_checked()
            .map_err(|e| CliError::Invalid(e.to_string()))?
    } else {
        m.classify()
    };
    match format {
        OutputFormat::Text => Ok(render_classification(&m, &c)),
        OutputFormat::Json => to_json(&serde_json::json!({
            "measurement": m,
            "status": c.status,
            "zScore": c.z_score,
            "label": c.status.badge_label(),
        })),
    }
}

fn run_unit(args: &UnitArgs, cfg: &Config, format: OutputFormat) -> Result<String, CliError> {
    let book = load_book(&args.data, cfg)?;
    let school = book
        .school(&args.school_id)
        .ok_or_else(|| CliError::Invalid(format!("unknown unit '{}'", args.school_id)))?;
    let summary = unit_summary(book.records(), school);
    match format {
        OutputFormat::Text => Ok(render_unit(&summary)),
        OutputFormat::Json => to_json(&summary),
    }
}

fn run_district(
    args: &DistrictArgs,
    cfg: &Config,
    format: OutputFormat,
) -> Result<String, CliError> {
    let book = load_book(&args.data, cfg)?;
    let filter = RecordFilter {
        area: args.area,
        age: args.age,
    };
    let overview = district_overview(book.records(), book.schools(), filter);
    match format {
        OutputFormat::Text => Ok(render_district(&overview)),
        OutputFormat::Json => to_json(&overview),
    }
}

fn run_entry(args: &EntryArgs, cfg: &Config, format: OutputFormat) -> Result<String, CliError> {
    let mut book = load_book(&args.data, cfg)?;
    let form = EntryForm {
        name: args.name.clone(),
        age_months: args.age.clone(),
        gender: args.gender.clone(),
        height_cm: args.height.clone(),
        weight_kg: args.weight.clone(),
        muac_cm: args.muac.clone(),
        school_id: args.school.clone(),
    };
    let policy = if args.allow_unknown_school {
        UnknownSchoolPolicy::AssumeRural
    } else {
        UnknownSchoolPolicy::Reject
    };
    let new = form
        .submit_with(book.schools(), policy)
        .map_err(|e| CliError::Invalid(e.to_string()))?;
    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let record = book.add(new, date);
    match format {
        OutputFormat::Text => Ok(render_record(record)),
        OutputFormat::Json => to_json(record),
    }
}

fn run_init(path: &Path, force: bool) -> Result<String, CliError> {
    Config::write_default(path, force).map_err(|e| CliError::Environment(e.to_string()))?;
    Ok(format!("wrote {}\n", path.display()))
}

/// Config file merged with the global `--format` flag.
fn settings(cli: &Cli) -> Result<(Config, OutputFormat), CliError> {
    let cfg =
        Config::load_or_default(&cli.config).map_err(|e| CliError::Environment(e.to_string()))?;
    let format = cli.format.unwrap_or(cfg.output);
    log::debug!("output format: {format}");
    Ok((cfg, format))
}

fn run(cli: &Cli) -> Result<String, CliError> {
    match &cli.command {
        Command::Init { force } => run_init(&cli.config, *force),
        Command::Classify(args) => {
            let (cfg, format) = settings(cli)?;
            run_classify(args, &cfg, format)
        }
        Command::Unit(args) => {
            let (cfg, format) = settings(cli)?;
            run_unit(args, &cfg, format)
        }
        Command::District(args) => {
            let (cfg, format) = settings(cli)?;
            run_district(args, &cfg, format)
        }
        Command::Entry(args) => {
            let (cfg, format) = settings(cli)?;
            run_entry(args, &cfg, format)
        }
    }
}

fn run_cli() -> i32 {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(&cli) {
        Ok(out) => {
            print!("{out}");
            if !out.ends_with('\n') {
                println!();
            }
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}

fn main() {
    std::process::exit(run_cli());
}
