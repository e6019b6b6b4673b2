use anyhow::{Context, Result, anyhow, bail};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use formlens::batch::{self, FileSummary};
use formlens::expand_templates;
use formlens::model::{Document, Grid};
use formlens::parser::{FormParser, FsSource};

/// Passes of template expansion before giving up on self-referencing templates.
const MAX_TEMPLATE_DEPTH: usize = 16;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Extract form definitions from legacy form-builder XML",
    long_about = None
)]
struct Cli {
    /// Log debug diagnostics (otherwise controlled by RUST_LOG, default warn)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the extracted model as JSON
    Parse {
        /// Form definition XML file
        #[arg(value_name = "FORM_FILE")]
        form_file: String,
        /// Single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Print a grid's queries with its templates substituted
    Expand {
        #[arg(value_name = "FORM_FILE")]
        form_file: String,
        /// Grid name (first grid with that name)
        #[arg(long)]
        grid: String,
        /// Expand this code instead of the grid's own queries
        #[arg(long)]
        code: Option<String>,
    },
    /// Parse every form below a directory and print one JSON summary per file
    Batch {
        #[arg(value_name = "DIR")]
        dir: String,
        /// File extension to pick up
        #[arg(long, default_value = "xml")]
        ext: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Parse { form_file, compact } => {
            let doc = load(&form_file)?;
            let json = if compact {
                serde_json::to_string(&doc)?
            } else {
                serde_json::to_string_pretty(&doc)?
            };
            println!("{}", json);
        }
        Command::Expand {
            form_file,
            grid,
            code,
        } => {
            let doc = load(&form_file)?;
            let g = doc
                .grid(&grid)
                .ok_or_else(|| anyhow!("No grid named '{}' in {}", grid, form_file))?;
            match code {
                Some(code) => println!(
                    "{}",
                    expand_templates(&code, &g.templates, MAX_TEMPLATE_DEPTH)
                ),
                None => print_grid_queries(g),
            }
        }
        Command::Batch { dir, ext } => {
            let files = batch::collect_form_files(&dir, &ext)?;
            log::debug!("found {} .{} files below {}", files.len(), ext, dir);
            let results = batch::parse_many(&files);
            let mut failed = 0usize;
            for (path, res) in &results {
                let summary = FileSummary::new(path, res);
                if !summary.ok {
                    failed += 1;
                }
                println!("{}", serde_json::to_string(&summary)?);
            }
            if failed > 0 {
                bail!("{} of {} files failed to parse", failed, results.len());
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn load(form_file: &str) -> Result<Document> {
    let path = Utf8PathBuf::from(form_file);
    let mut parser = FormParser::new(FsSource);
    parser
        .parse_form_file(&path)
        .with_context(|| format!("Failed to extract {}", path))
}

fn print_grid_queries(grid: &Grid) {
    let expand = |code: &str| expand_templates(code, &grid.templates, MAX_TEMPLATE_DEPTH);

    if let Some(q) = &grid.expand_query {
        println!("-- expand\n{}\n", expand(q));
    }
    if let Some(q) = &grid.expand_init_query {
        println!("-- expand init\n{}\n", expand(q));
    }
    for lov in &grid.list_of_values {
        if let Some(q) = &lov.query {
            println!("-- list of values {}\n{}\n", lov.name.as_deref().unwrap_or("?"), expand(q));
        }
    }
    for combo in &grid.comboboxes {
        if let Some(q) = &combo.query {
            println!("-- combobox {}\n{}\n", combo.name.as_deref().unwrap_or("?"), expand(q));
        }
    }
    for bc in &grid.before_commit_validations {
        if !bc.sql.is_empty() {
            println!(
                "-- before commit {}\n{}\n",
                bc.name.as_deref().unwrap_or("?"),
                expand(&bc.sql)
            );
        }
    }
}
