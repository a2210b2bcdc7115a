//! redeck CLI - rebuild editable slide decks from flattened PDF pages

mod cleaner;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use cleaner::HttpCleaner;
use redeck::{Granularity, JsonFormat, LayoutDocument, Redeck};

#[derive(Parser)]
#[command(name = "redeck")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Rebuild editable slide decks from flattened PDF pages", long_about = None)]
struct Cli {
    /// Input layout JSON file
    #[arg(value_name = "LAYOUT")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a deck from a layout document
    Convert {
        /// Input layout JSON file
        #[arg(value_name = "LAYOUT")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Target slide width
        #[arg(long, default_value = "1280")]
        width: f64,

        /// Target slide height
        #[arg(long, default_value = "720")]
        height: f64,

        /// Template directory (title-slide.pptx / non-title-slide.pptx)
        #[arg(short, long, value_name = "DIR")]
        templates: Option<PathBuf>,

        /// Inpainting endpoint URL (raw backgrounds when omitted)
        #[arg(long, env = "REDECK_CLEANER_URL")]
        cleaner_url: Option<String>,

        /// Cleaning request timeout in seconds
        #[arg(long, default_value = "60")]
        timeout: u64,

        /// Mask padding around text regions, in pixels
        #[arg(long, default_value = "4")]
        padding: u32,

        /// Worker pool size for page processing
        #[arg(long, default_value = "4")]
        workers: usize,

        /// Process pages one at a time
        #[arg(long)]
        sequential: bool,

        /// Text box granularity
        #[arg(long, value_enum, default_value = "block")]
        granularity: BoxLevel,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show layout document information
    Info {
        /// Input layout JSON file
        #[arg(value_name = "LAYOUT")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum BoxLevel {
    /// One text box per block
    Block,
    /// One text box per line
    Line,
}

impl From<BoxLevel> for Granularity {
    fn from(level: BoxLevel) -> Self {
        match level {
            BoxLevel::Block => Granularity::Block,
            BoxLevel::Line => Granularity::Line,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            width,
            height,
            templates,
            cleaner_url,
            timeout,
            padding,
            workers,
            sequential,
            granularity,
            compact,
        }) => cmd_convert(ConvertArgs {
            input,
            output,
            width,
            height,
            templates,
            cleaner_url,
            timeout,
            padding,
            workers,
            sequential,
            granularity,
            compact,
        }),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if let Some(input) = cli.input {
                cmd_convert(ConvertArgs {
                    input,
                    output: cli.output,
                    ..ConvertArgs::default()
                })
            } else {
                println!("{}", "Usage: redeck <LAYOUT> [OUTPUT]".yellow());
                println!("       redeck --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

struct ConvertArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    width: f64,
    height: f64,
    templates: Option<PathBuf>,
    cleaner_url: Option<String>,
    timeout: u64,
    padding: u32,
    workers: usize,
    sequential: bool,
    granularity: BoxLevel,
    compact: bool,
}

impl Default for ConvertArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: None,
            width: 1280.0,
            height: 720.0,
            templates: None,
            cleaner_url: None,
            timeout: 60,
            padding: 4,
            workers: 4,
            sequential: false,
            granularity: BoxLevel::Block,
            compact: false,
        }
    }
}

fn cmd_convert(args: ConvertArgs) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = args.output.clone().unwrap_or_else(|| {
        let stem = args.input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_deck", stem))
    });

    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    pb.set_message("Loading layout...");
    let mut builder = Redeck::new()
        .with_target_size(args.width, args.height)
        .with_mask_padding(args.padding)
        .with_max_workers(args.workers)
        .with_granularity(args.granularity.into());

    if args.sequential {
        builder = builder.sequential();
    }
    if let Some(dir) = &args.templates {
        builder = builder.with_template_dir(dir);
    }
    if let Some(url) = &args.cleaner_url {
        let cleaner = HttpCleaner::new(url.clone(), Duration::from_secs(args.timeout))?;
        builder = builder.with_cleaner(Box::new(cleaner));
    }
    pb.inc(1);

    pb.set_message("Composing slides...");
    let mut conversion = builder.convert_file(&args.input)?;
    pb.inc(1);

    pb.set_message("Writing deck...");
    let backgrounds_dir = output_dir.join("backgrounds");
    conversion.deck.write_backgrounds(&backgrounds_dir)?;

    let format = if args.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    fs::write(output_dir.join("deck.json"), conversion.to_json(format)?)?;
    fs::write(
        output_dir.join("report.json"),
        conversion.report_to_json(format)?,
    )?;
    pb.inc(1);

    pb.finish_with_message("Done!");

    let report = &conversion.report;
    println!("\n{}", "Conversion summary:".green().bold());
    println!("  pages total:    {}", report.pages_total);
    println!("  pages composed: {}", report.pages_composed);
    if report.pages_degraded > 0 {
        println!(
            "  pages degraded: {} {}",
            report.pages_degraded,
            "(raw background)".yellow()
        );
    }
    if report.pages_skipped > 0 {
        println!(
            "  pages skipped:  {} {}",
            report.pages_skipped,
            "(see report.json)".yellow()
        );
        for skipped in &report.skipped {
            println!("    {} page {}: {}", "-".dimmed(), skipped.index, skipped.reason);
        }
    }

    println!("\n{}", "Output files:".green().bold());
    println!("  {} deck.json", "├─".dimmed());
    println!("  {} report.json", "├─".dimmed());
    println!("  {} backgrounds/", "└─".dimmed());

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let layout = LayoutDocument::from_file(input, Granularity::Block)?;

    println!("{}", "Layout document".green().bold());
    println!("  pages: {}", layout.page_count());

    for page in &layout.pages {
        println!(
            "  {} page {}: {}x{}, {} regions, image {}",
            "-".dimmed(),
            page.index,
            page.width,
            page.height,
            page.regions.len(),
            page.image.display()
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("redeck {}", env!("CARGO_PKG_VERSION"));
}
