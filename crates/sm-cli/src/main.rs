//! Spreadsheet Merger CLI
//!
//! Command-line front end for the merge-export pipeline: collects input
//! files, merges them into one table, shows a preview, and writes the
//! export artifact.

use clap::{Parser, Subcommand};
use sm_core::{
    concat_tables, concat_tables_strict, export, find_tabular_files, parse_file, Encoding,
    ExportOptions, Table,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sm-cli")]
#[command(about = "Merge spreadsheet files into one table", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge input files and write the result in the chosen format
    Merge {
        /// Input files, merged in the order given
        inputs: Vec<PathBuf>,

        /// Directories to scan for tabular files (appended after explicit inputs)
        #[arg(short, long)]
        root: Vec<PathBuf>,

        /// Output format (xlsx, csv, sqlite or json)
        #[arg(long, default_value = "xlsx")]
        format: String,

        /// Output file path (defaults to merged_data.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Table name for the sqlite artifact and xlsx sheet
        #[arg(long)]
        table_name: Option<String>,

        /// Reject inputs whose column sets differ instead of union-filling
        #[arg(long)]
        strict_schema: bool,
    },

    /// Merge input files and print a preview of the combined table
    Show {
        /// Input files, merged in the order given
        inputs: Vec<PathBuf>,

        /// Directories to scan for tabular files
        #[arg(short, long)]
        root: Vec<PathBuf>,

        /// Maximum number of rows to display
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },

    /// Parse and display a single input file
    Inspect {
        /// Path to the file
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> sm_core::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            inputs,
            root,
            format,
            output,
            table_name,
            strict_schema,
        } => cmd_merge(inputs, &root, &format, output, table_name, strict_schema),
        Commands::Show {
            inputs,
            root,
            limit,
        } => cmd_show(inputs, &root, limit),
        Commands::Inspect { file } => cmd_inspect(&file),
    }
}

/// Explicit inputs first, then discovered files in path order
fn collect_inputs(inputs: Vec<PathBuf>, roots: &[PathBuf]) -> sm_core::Result<Vec<PathBuf>> {
    let mut files = inputs;
    if !roots.is_empty() {
        files.extend(find_tabular_files(roots)?);
    }
    if files.is_empty() {
        return Err(sm_core::Error::NoInput);
    }
    Ok(files)
}

fn merge_inputs(files: &[PathBuf], strict_schema: bool) -> sm_core::Result<Table> {
    let mut tables = Vec::new();
    for file in files {
        tables.push(parse_file(file)?);
    }

    if strict_schema {
        concat_tables_strict(tables)
    } else {
        concat_tables(tables)
    }
}

fn cmd_merge(
    inputs: Vec<PathBuf>,
    roots: &[PathBuf],
    format: &str,
    output: Option<PathBuf>,
    table_name: Option<String>,
    strict_schema: bool,
) -> sm_core::Result<()> {
    let files = collect_inputs(inputs, roots)?;

    println!("Merging {} file(s)...", files.len());
    let merged = merge_inputs(&files, strict_schema)?;
    println!(
        "Merged {} rows, {} columns from {} file(s)",
        merged.row_count(),
        merged.column_count(),
        merged.sources.len()
    );

    let options = ExportOptions { table_name };

    let (bytes, extension) = if format.eq_ignore_ascii_case("json") {
        (serde_json::to_vec_pretty(&merged)?, "json")
    } else {
        let encoding: Encoding = format.parse()?;
        (export(&merged, encoding, &options)?, encoding.extension())
    };

    let output = output.unwrap_or_else(|| PathBuf::from(format!("merged_data.{extension}")));
    fs::write(&output, bytes)?;
    println!("Wrote {}", output.display());

    Ok(())
}

fn cmd_show(inputs: Vec<PathBuf>, roots: &[PathBuf], limit: usize) -> sm_core::Result<()> {
    let files = collect_inputs(inputs, roots)?;
    let merged = merge_inputs(&files, false)?;

    print_preview(&merged, limit);

    Ok(())
}

fn cmd_inspect(file: &PathBuf) -> sm_core::Result<()> {
    let table = parse_file(file)?;

    println!("File: {}", file.display());
    println!("Columns: {}", table.column_count());
    println!("Rows: {}", table.row_count());
    println!();

    print_preview(&table, 10);

    Ok(())
}

fn print_preview(table: &Table, limit: usize) {
    println!("{}", table.header().join("\t"));
    println!("{}", "-".repeat(table.column_count() * 12));

    for row in table.rows.iter().take(limit) {
        let values: Vec<String> = row.cells.iter().map(|c| c.to_display_string()).collect();
        println!("{}", values.join("\t"));
    }

    if table.row_count() > limit {
        println!("... ({} more rows)", table.row_count() - limit);
    }
}
