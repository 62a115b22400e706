//! # serial-stamp CLI
//!
//! Command-line interface for generating ticket sheets.
//!
//! ## Usage
//!
//! ```bash
//! # Start a new project
//! serial-stamp init tickets/
//!
//! # Generate the PDF (the subcommand may be omitted)
//! serial-stamp generate tickets/ -o tickets.pdf
//! serial-stamp tickets/ -o tickets.pdf
//!
//! # Preview the first page
//! serial-stamp preview tickets/ -o preview.png
//!
//! # Show the stack plan and where every ticket lands
//! serial-stamp plan tickets/ --tickets
//!
//! # Bundle a project into a single file
//! serial-stamp pack tickets/ -o tickets.stamp
//!
//! # Run the preview server
//! serial-stamp serve --listen 0.0.0.0:8080
//! ```

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serial_stamp::{
    Engine, Project, StampError,
    output::{PdfFile, encode_png},
    project, worker,
};

/// serial-stamp - Ticket sheet generator
#[derive(Parser, Debug)]
#[command(name = "serial-stamp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render every page of a project into a PDF
    Generate {
        /// Project directory, spec file or .stamp archive
        input: PathBuf,

        /// Output PDF path
        #[arg(short, long, default_value = "output.pdf")]
        output: PathBuf,

        /// Extra directory to search for fonts (repeatable)
        #[arg(long = "font-dir", value_name = "DIR")]
        font_dirs: Vec<PathBuf>,
    },

    /// Render the first page as PNG
    Preview {
        /// Project directory, spec file or .stamp archive
        input: PathBuf,

        /// Output PNG path
        #[arg(short, long, default_value = "preview.png")]
        output: PathBuf,

        /// Extra directory to search for fonts (repeatable)
        #[arg(long = "font-dir", value_name = "DIR")]
        font_dirs: Vec<PathBuf>,
    },

    /// Print the stack plan
    Plan {
        /// Project directory, spec file or .stamp archive
        input: PathBuf,

        /// Also list the tickets on every page
        #[arg(long)]
        tickets: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Create a new project
    Init {
        /// Directory to create
        path: PathBuf,
    },

    /// Bundle a project directory into a .stamp archive
    Pack {
        /// Project directory
        source: PathBuf,

        /// Output archive path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the HTTP preview server
    #[cfg(feature = "server")]
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: String,

        /// Extra directory to search for fonts (repeatable)
        #[arg(long = "font-dir", value_name = "DIR")]
        font_dirs: Vec<PathBuf>,
    },
}

const SUBCOMMANDS: &[&str] = &[
    "generate", "preview", "plan", "init", "pack", "serve", "help",
];

/// Insert `generate` when the first argument is not a subcommand or flag.
fn with_default_command(mut args: Vec<OsString>) -> Vec<OsString> {
    let needs_default = args.get(1).and_then(|a| a.to_str()).is_some_and(|first| {
        !first.starts_with('-') && !SUBCOMMANDS.contains(&first)
    });
    if needs_default {
        args.insert(1, OsString::from("generate"));
    }
    args
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), StampError> {
    let cli = Cli::parse_from(with_default_command(std::env::args_os().collect()));

    match cli.command {
        Commands::Generate {
            input,
            output,
            font_dirs,
        } => {
            let engine = open_engine(&input, font_dirs)?;
            let plan = engine.plan();
            if plan.is_empty() {
                println!(
                    "Nothing to generate ({} tickets, {} per page)",
                    plan.ticket_count, plan.tickets_per_page
                );
                return Ok(());
            }

            let worker = worker::spawn(engine, Box::new(PdfFile::new(&output)))?;
            let summary = worker.wait(|p| println!("page {}/{}", p.page, p.total))?;
            println!(
                "Saved {} pages to {}",
                summary.pages_written,
                output.display()
            );
        }

        Commands::Preview {
            input,
            output,
            font_dirs,
        } => {
            let engine = open_engine(&input, font_dirs)?;
            match engine.generate_preview()? {
                Some(page) => {
                    std::fs::write(&output, encode_png(&page)?)?;
                    println!("Saved preview to {}", output.display());
                }
                None => println!("Grid area is zero; nothing to preview"),
            }
        }

        Commands::Plan {
            input,
            tickets,
            json,
        } => {
            let engine = Project::open(&input)?.engine()?;
            print_plan(&engine, tickets, json)?;
        }

        Commands::Init { path } => {
            project::init_project(&path)?;
            println!("Created project in {}", path.display());
        }

        Commands::Pack { source, output } => {
            let output = output.unwrap_or_else(|| default_archive_path(&source));
            project::pack_project(&source, &output)?;
            println!("Packed {} into {}", source.display(), output.display());
        }

        #[cfg(feature = "server")]
        Commands::Serve { listen, font_dirs } => {
            let config = serial_stamp::server::ServerConfig {
                listen_addr: listen,
                font_dirs,
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(serial_stamp::server::serve(config))?;
        }
    }

    Ok(())
}

fn open_engine(input: &Path, font_dirs: Vec<PathBuf>) -> Result<Engine, StampError> {
    let engine = Project::open(input)?.engine()?;
    if font_dirs.is_empty() {
        return Ok(engine);
    }
    let fonts = serial_stamp::render::FontConfig::default().with_dirs_first(font_dirs);
    Ok(engine.with_font_config(fonts))
}

fn print_plan(engine: &Engine, tickets: bool, json: bool) -> Result<(), StampError> {
    let plan = engine.plan();

    if json {
        let value = if tickets {
            serde_json::json!({ "plan": plan, "pages": engine.manifest() })
        } else {
            serde_json::json!(plan)
        };
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| StampError::Config(format!("Failed to encode plan: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    println!("Tickets:          {}", plan.ticket_count);
    println!("Tickets per page: {}", plan.tickets_per_page);
    println!("Stack size:       {}", plan.stack_size);
    println!("Pages needed:     {}", plan.pages_needed);
    println!("Stacks:           {}", plan.stack_count);
    println!("Pages printed:    {}", plan.total_pages);

    if tickets {
        for page in engine.manifest() {
            println!(
                "\npage {} (stack {}, offset {})",
                page.slot.page_number, page.slot.stack, page.slot.page_offset
            );
            for cell in &page.cells {
                println!(
                    "  cell {:>3}  ticket {:>5}  {}",
                    cell.cell,
                    cell.ticket,
                    cell.texts.join(" | ")
                );
            }
        }
    }
    Ok(())
}

fn default_archive_path(source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("project");
    PathBuf::from(format!("{}.stamp", name))
}
