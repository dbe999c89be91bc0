use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use qr_inventory::{
    Category, Inventory, InventoryConfig, InventoryRecord, Lookup, NewRecord, Registration,
    ScanImage, ScanLookup,
};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "qrinv", version, about = "QR code inventory lookup")]
struct Cli {
    /// CSV file holding the records
    #[arg(long, global = true, env = "QRINV_DATA_FILE", default_value = qr_inventory::config::DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    /// Refuse to create a second record with an existing code
    #[arg(long, global = true, env = "QRINV_UNIQUE_CODES")]
    unique_codes: bool,

    /// Longest image side handed to the decoder (0 keeps full resolution)
    #[arg(long, global = true, env = "QRINV_MAX_SCAN_DIMENSION")]
    max_scan_dimension: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "QRINV_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a QR code photo and show the matching record
    Scan {
        #[arg(long)]
        image: PathBuf,
        /// Only print the decoded payload and the rotation that found it
        #[arg(long)]
        decode_only: bool,
    },
    /// Look up a code typed by hand
    Lookup { code: String },
    /// Register a record, taking the code from --code or from a photo
    Add {
        #[arg(long, required_unless_present = "image", conflicts_with = "image")]
        code: Option<String>,
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Panel, Relay, Tools, Amplifier or Other
        #[arg(long, default_value = "Other", value_parser = parse_category)]
        category: Category,
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    /// Print record totals
    Stats,
    /// Write all records as CSV
    Export {
        /// Destination file; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = InventoryConfig::new(&cli.data_file)
        .with_unique_codes(cli.unique_codes)
        .with_max_scan_dimension(match cli.max_scan_dimension {
            Some(0) => None,
            Some(max) => Some(max),
            None => InventoryConfig::default().max_scan_dimension,
        });
    let inventory = Inventory::new(&config);

    match cli.command {
        Command::Scan { image, decode_only } => scan_cmd(&inventory, &image, decode_only),
        Command::Lookup { code } => lookup_cmd(&inventory, &code),
        Command::Add {
            code,
            image,
            name,
            description,
            category,
            quantity,
        } => {
            let code = match (code, image) {
                (Some(code), _) => code,
                (None, Some(image)) => decode_image(&inventory, &image)?,
                (None, None) => bail!("either --code or --image is required"),
            };
            let new = NewRecord::new(code, name)
                .description(description)
                .category(category)
                .quantity(quantity);
            add_cmd(&inventory, new)
        }
        Command::Stats => stats_cmd(&inventory),
        Command::Export { output } => export_cmd(&inventory, output.as_deref()),
    }
}

fn init_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .init();
}

fn load_image(path: &Path) -> Result<ScanImage> {
    ScanImage::open(path).with_context(|| format!("failed to read image {}", path.display()))
}

fn decode_image(inventory: &Inventory, path: &Path) -> Result<String> {
    let image = load_image(path)?;
    match inventory.scanner().decode(&image) {
        Some(code) => Ok(code),
        None => bail!("no QR code found in {}", path.display()),
    }
}

fn scan_cmd(inventory: &Inventory, path: &Path, decode_only: bool) -> Result<()> {
    if decode_only {
        let image = load_image(path)?;
        match inventory.scanner().scan(&image) {
            Some(report) => println!(
                "{} (rotation {} degrees, {} attempt(s), exif orientation {})",
                report.payload,
                report.rotation.degrees(),
                report.attempts,
                image.orientation().tag()
            ),
            None => println!("No QR code found"),
        }
        return Ok(());
    }

    let lookup = inventory
        .resolve_image_file(path)
        .with_context(|| format!("failed to scan {}", path.display()))?;
    match lookup {
        ScanLookup::NoSymbol => println!("No QR code found in {}", path.display()),
        ScanLookup::Found(record) => print_record(&record),
        ScanLookup::Missing { code } => {
            println!("Code {code:?} is not registered");
            println!("Register it with: qrinv add --code {code:?} --name <NAME>");
        }
    }
    Ok(())
}

fn lookup_cmd(inventory: &Inventory, code: &str) -> Result<()> {
    match inventory.resolve_code(code)? {
        Lookup::Found(record) => print_record(&record),
        Lookup::Missing { code } => println!("Code {code:?} is not registered"),
    }
    Ok(())
}

fn add_cmd(inventory: &Inventory, new: NewRecord) -> Result<()> {
    if inventory.store().options().enforce_unique_codes {
        let record = inventory.store().insert(new)?;
        println!("Created:");
        print_record(&record);
        return Ok(());
    }

    match inventory.register(new)? {
        Registration::Created(record) => {
            println!("Created:");
            print_record(&record);
        }
        Registration::AlreadyExists(record) => {
            println!("Already registered:");
            print_record(&record);
        }
    }
    Ok(())
}

fn stats_cmd(inventory: &Inventory) -> Result<()> {
    let stats = inventory.store().statistics()?;
    println!("Total records:  {}", stats.total);
    println!("Created today:  {}", stats.created_today);
    if !stats.by_category.is_empty() {
        println!("By category:");
        for (category, count) in &stats.by_category {
            println!("  {category:<12} {count}");
        }
    }
    if !stats.by_month.is_empty() {
        println!("By month:");
        for (month, count) in &stats.by_month {
            println!("  {month:<12} {count}");
        }
    }
    Ok(())
}

fn export_cmd(inventory: &Inventory, output: Option<&Path>) -> Result<()> {
    let count = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            inventory.store().export(BufWriter::new(file))?
        }
        None => inventory.store().export(io::stdout().lock())?,
    };
    tracing::info!(records = count, "exported");
    Ok(())
}

fn print_record(record: &InventoryRecord) {
    println!("  Code:        {}", record.code);
    println!("  Name:        {}", record.name);
    if !record.description.is_empty() {
        println!("  Description: {}", record.description);
    }
    println!("  Category:    {}", record.category);
    println!("  Quantity:    {}", record.quantity);
    println!(
        "  Created:     {}",
        record.created_at.format(qr_inventory::inventory::TIMESTAMP_FORMAT)
    );
}

fn parse_category(value: &str) -> Result<Category, String> {
    value.parse::<Category>().map_err(|err| err.to_string())
}
