//! Propstar CLI - Real-estate listings to star schema
//!
//! # Main Commands
//!
//! ```bash
//! propstar crawl -o realestate.csv     # Scrape listings into a CSV
//! propstar transform realestate.csv    # Build the five star-schema tables
//! propstar serve                       # Start HTTP server (port 3000)
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! propstar parse realestate.csv        # Just parse the CSV to JSON
//! ```

use clap::{Parser, Subcommand};
use propstar::{
    crawl_to_csv, parse_bytes, run_file, CrawlConfig, ServerConfig, TransformOptions,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "propstar")]
#[command(about = "Turn real-estate listings into a dimensional star schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: listings CSV → Dim_* and Fact_* tables
    Transform {
        /// Input listings CSV
        input: PathBuf,

        /// Directory for the five tables
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Parse a listings CSV and output JSON
    Parse {
        /// Input listings CSV
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Scrape the listing site into a raw listings CSV
    Crawl {
        /// Output CSV, rewritten after every page
        #[arg(short, long, default_value = "realestate.csv")]
        output: PathBuf,

        /// Stop after this many listing pages
        #[arg(long)]
        max_pages: Option<u32>,

        /// First listing page
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: PROPSTAR_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Transform {
            input,
            output,
            delimiter,
        } => cmd_transform(&input, output, delimiter),

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::Crawl {
            output,
            max_pages,
            base_url,
        } => cmd_crawl(&output, max_pages, base_url).await,

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_transform(
    input: &Path,
    output: PathBuf,
    delimiter: Option<char>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = TransformOptions::default().with_output_dir(output);
    if let Some(d) = delimiter {
        options = options.with_delimiter(d);
    }

    let report = run_file(input, options)?;

    if report.unparseable_dates > 0 {
        eprintln!("   {} dates left null", report.unparseable_dates);
    }
    eprintln!("\n✨ Done! {}", report.schema.summary());
    Ok(())
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let bytes = fs::read(input)?;
    let result = parse_bytes(&bytes, delimiter)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        propstar::format_delimiter(result.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("✅ Parsed {} records", result.records.len());

    let json = serde_json::to_string_pretty(&result.records)?;
    write_output(&json, output)?;

    Ok(())
}

async fn cmd_crawl(
    output: &Path,
    max_pages: Option<u32>,
    base_url: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CrawlConfig::from_env()?;
    if max_pages.is_some() {
        config.max_pages = max_pages;
    }
    if let Some(url) = base_url {
        config.base_url = url;
    }

    let count = crawl_to_csv(config, output).await?;
    eprintln!("\n✨ Done! {} listings in {}", count, output.display());
    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let port = match port {
        Some(p) => p,
        None => ServerConfig::from_env()?.port,
    };
    propstar::server::start_server(port).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Saved to: {}", p.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
