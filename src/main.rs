use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use college_mail_analyzer::logging::init_logging;
use college_mail_analyzer::models::Config;
use college_mail_analyzer::pipeline::{Outcome, ScanSummary};
use college_mail_analyzer::{mailbox, report, Pipeline, ReferenceIndex};
use std::path::Path;

fn cli() -> Command {
    Command::new("college-mail-analyzer")
        .version("0.1")
        .about("Matches college admissions mail to published acceptance rates")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml")
                .global(true),
        )
        .subcommand(
            Command::new("scan").about("Resolve every message in the mail directory (default)"),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve a single From header")
                .arg(Arg::new("from").value_name("FROM").required(true)),
        )
        .subcommand(
            Command::new("average")
                .about("Average acceptance rate per day of the scan output")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_name("FILE")
                        .help("Scan output to read (defaults to output_file)"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Where to write daily averages (defaults to average_output_file)"),
                ),
        )
}

fn main() -> Result<()> {
    init_logging();

    let matches = cli().get_matches();
    let config_file = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("config.toml");

    match matches.subcommand() {
        Some(("resolve", sub)) => run_resolve(&load_or_default(config_file)?, sub),
        Some(("average", sub)) => run_average(&load_or_default(config_file)?, sub),
        _ => {
            let Some(config) = load_or_create(config_file)? else {
                return Ok(());
            };
            run_scan(&config)
        }
    }
}

/// Load the config, or write the default one and return `None`.
fn load_or_create(config_file: &str) -> Result<Option<Config>> {
    if Path::new(config_file).exists() {
        println!("📋 Loading configuration from: {}", config_file);
        let config = Config::load_from_file(config_file)
            .with_context(|| format!("Failed to load configuration from {}", config_file))?;
        return Ok(Some(config));
    }

    println!("📝 Creating default configuration file: {}", config_file);
    Config::default().save_to_file(config_file)?;
    println!(
        "⚠️  Please edit {} and point reference_file and messages_directory at your data,",
        config_file
    );
    println!("   then run the program again.");
    Ok(None)
}

fn load_or_default(config_file: &str) -> Result<Config> {
    if Path::new(config_file).exists() {
        Config::load_from_file(config_file)
            .with_context(|| format!("Failed to load configuration from {}", config_file))
    } else {
        Ok(Config::default())
    }
}

fn load_index(config: &Config) -> Result<ReferenceIndex> {
    let index = ReferenceIndex::from_path(&config.reference_file)
        .with_context(|| format!("Failed to load reference data from {}", config.reference_file))?;
    Ok(index.with_fuzzy_cutoff(config.fuzzy_cutoff))
}

fn run_scan(config: &Config) -> Result<()> {
    let index = load_index(config)?;
    println!("📚 Reference institutions: {}", index.len());

    let messages = mailbox::read_mail_directory(&config.messages_directory)
        .with_context(|| format!("Failed to read messages from {}", config.messages_directory))?;
    println!("📂 Total emails found: {}", messages.len());

    let pipeline = Pipeline::from_config(config, &index);
    let result = pipeline.run(&messages);

    report::write_records(&result.records, &config.output_file)
        .with_context(|| format!("Failed to write {}", config.output_file))?;

    print_summary(&result.summary);
    println!("\n✅ Results written to {}", config.output_file);
    Ok(())
}

fn run_resolve(config: &Config, matches: &ArgMatches) -> Result<()> {
    let from = matches
        .get_one::<String>("from")
        .context("missing FROM argument")?;
    let index = load_index(config)?;
    let pipeline = Pipeline::from_config(config, &index);

    match pipeline.process(from) {
        Outcome::Excluded => println!("⛔ Excluded sender or domain"),
        Outcome::NotInstitution => println!("❓ Not from a college"),
        Outcome::NoCollegeName => println!("❓ Could not extract college name"),
        Outcome::Unresolved { college_name } => {
            println!("❌ {}: acceptance rate not found in data", college_name)
        }
        Outcome::Resolved {
            college_name,
            reference,
        } => println!(
            "✅ {}: {}% ({:?} match on {}, similarity {:.2})",
            college_name,
            reference.acceptance_rate,
            reference.tier,
            reference.matched_key,
            reference.similarity
        ),
    }
    Ok(())
}

fn run_average(config: &Config, matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .unwrap_or(&config.output_file);
    let output = matches
        .get_one::<String>("output")
        .unwrap_or(&config.average_output_file);

    let records = report::read_records(input).with_context(|| format!("Failed to read {}", input))?;
    let averages = report::daily_averages(&records);
    for average in &averages {
        println!("{}: {}", average.date, average.acceptance_rate);
    }

    report::write_daily_averages(&averages, output)
        .with_context(|| format!("Failed to write {}", output))?;
    println!("\n✅ Daily averages written to {}", output);
    Ok(())
}

fn print_summary(summary: &ScanSummary) {
    println!("\n📊 SUMMARY");
    println!("==========");
    println!("   Messages scanned:        {}", summary.total);
    println!("   Resolved:                {}", summary.resolved);
    println!("   Rate not found:          {}", summary.unresolved);
    println!("   No college name:         {}", summary.no_college_name);
    println!("   Not from a college:      {}", summary.not_institution);
    println!("   Excluded senders:        {}", summary.excluded);
    println!("   Missing From header:     {}", summary.missing_sender);
}
