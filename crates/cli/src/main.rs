//! CLI tool for creating, checking and compiling rehabilitation protocols.

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand, ValueEnum};
use mediproto_core::{library, persist, CompileMode, ProtocolDocument};
use mediproto_html::CompileOptions;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Build rehabilitation protocol slideshows and printouts.
#[derive(Parser, Debug)]
#[command(name = "mediproto")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the starter project
    New {
        /// Output project file
        output: PathBuf,
    },

    /// Check that a project file is valid
    Validate {
        /// Project file (.json)
        project: PathBuf,
    },

    /// Compile a project to HTML
    Compile {
        /// Project file (.json)
        project: PathBuf,

        /// Render target
        #[arg(short, long, value_enum, default_value = "presentation")]
        mode: ModeArg,

        /// Output file (default: next to the project, .html)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print output to stdout instead of writing to file
        #[arg(short, long)]
        print: bool,

        /// Year shown in the footer (default: current year)
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Export or import the exercise library
    Library {
        #[command(subcommand)]
        action: LibraryCommand,
    },
}

#[derive(Subcommand, Debug)]
enum LibraryCommand {
    /// Write a project's exercise library to its own file
    Export {
        /// Project file (.json)
        project: PathBuf,

        /// Output file (default: print to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace a project's exercise library with one from a file
    Import {
        /// Project file (.json)
        project: PathBuf,

        /// Library file (.json)
        library: PathBuf,

        /// Output project file (default: overwrite the project)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Presentation,
    Print,
}

impl From<ModeArg> for CompileMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Presentation => CompileMode::Presentation,
            ModeArg::Print => CompileMode::Print,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match args.command {
        Command::New { output } => {
            let json = persist::export_project(&ProtocolDocument::starter())?;
            write_output(&output, &json)?;
            eprintln!("Written to: {}", output.display());
        }
        Command::Validate { project } => {
            let doc = read_project(&project)?;
            let sections: usize = doc.slides.iter().map(|s| s.sections.len()).sum();
            println!(
                "{}: {} slides, {} sections, {} library exercises",
                project.display(),
                doc.slides.len(),
                sections,
                doc.exercise_library.len()
            );
        }
        Command::Compile {
            project,
            mode,
            output,
            print,
            year,
        } => {
            let doc = read_project(&project)?;
            let year = year.unwrap_or_else(|| chrono::Local::now().year());
            let html = mediproto_html::compile(&doc, mode.into(), &CompileOptions::new(year));

            if print {
                print!("{}", html);
            } else {
                let output_path = output.unwrap_or_else(|| default_html_path(&project, mode));
                write_output(&output_path, &html)?;
                if args.verbose {
                    eprintln!("Written to: {}", output_path.display());
                }
            }
        }
        Command::Library { action } => run_library(action)?,
    }

    Ok(())
}

fn run_library(action: LibraryCommand) -> Result<()> {
    match action {
        LibraryCommand::Export { project, output } => {
            let doc = read_project(&project)?;
            let json = persist::export_library(&doc.exercise_library)?;
            match output {
                Some(path) => write_output(&path, &json)?,
                None => println!("{}", json),
            }
        }
        LibraryCommand::Import {
            project,
            library: library_path,
            output,
        } => {
            let doc = read_project(&project)?;
            let content = std::fs::read_to_string(&library_path)
                .with_context(|| format!("Failed to read {}", library_path.display()))?;
            let items = persist::import_library(&content)
                .with_context(|| format!("Invalid library file {}", library_path.display()))?;
            log::debug!("Replacing {} exercises with {}", doc.exercise_library.len(), items.len());

            let doc = library::replace_library(&doc, items);
            let json = persist::export_project(&doc)?;
            write_output(output.as_deref().unwrap_or(project.as_path()), &json)?;
        }
    }
    Ok(())
}

/// Read and validate a project file.
fn read_project(path: &Path) -> Result<ProtocolDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let doc = persist::import_project(&content)
        .with_context(|| format!("Invalid project file {}", path.display()))?;
    Ok(doc)
}

/// `<project stem>.html`, or `<project stem>-print.html` for the print target.
fn default_html_path(project: &Path, mode: ModeArg) -> PathBuf {
    let stem = project
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("protocol");

    let filename = match mode {
        ModeArg::Presentation => format!("{}.html", stem),
        ModeArg::Print => format!("{}-print.html", stem),
    };

    match project.parent() {
        Some(parent) => parent.join(filename),
        None => PathBuf::from(filename),
    }
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
