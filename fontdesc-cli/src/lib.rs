//! fontdesc CLI (made by FontLab https://www.fontlab.com/)

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use fontdesc_core::config::IndexConfig;
use fontdesc_core::facade::{matching_font_descriptors, MatchRequest};
use fontdesc_core::output::{write_json_pretty, write_ndjson};
use fontdesc_core::{FontDescriptor, IndexManager, SystemFontType};

/// CLI entrypoint for fontdesc.
#[derive(Debug, Parser)]
#[command(
    name = "fontdesc",
    about = "Index a font directory and match partial font descriptors (made by FontLab https://www.fontlab.com/)"
)]
pub struct Cli {
    #[command(flatten)]
    index: IndexArgs,

    /// Raise log verbosity (-v info, -vv debug); RUST_LOG wins when set
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct IndexArgs {
    /// Font directory to index (top-level files only)
    #[arg(long = "font-dir", global = true, value_hint = ValueHint::DirPath)]
    font_dir: Option<PathBuf>,

    /// JSON config file with font_dir / workers / query_workers
    #[arg(long = "config", global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every indexed face matching all given attributes
    Match(MatchArgs),
    /// Print full names from the scanned, stylish and installed sources
    List(ListArgs),
    /// Look up one face by its exact full name
    Name(NameArgs),
    /// Print index counters
    Stats(StatsArgs),
}

#[derive(Debug, Args)]
struct MatchArgs {
    /// Family name (name ID 1)
    #[arg(long = "family", value_hint = ValueHint::Other)]
    family: Option<String>,

    /// Full name (name ID 4)
    #[arg(long = "full-name", value_hint = ValueHint::Other)]
    full_name: Option<String>,

    /// PostScript name (name ID 6)
    #[arg(long = "postscript-name", value_hint = ValueHint::Other)]
    postscript_name: Option<String>,

    /// Subfamily name (name ID 2)
    #[arg(long = "subfamily", value_hint = ValueHint::Other)]
    subfamily: Option<String>,

    /// OS/2 weight class, e.g. 400 or 700
    #[arg(short = 'w', long = "weight")]
    weight: Option<i32>,

    /// OS/2 width class, 1 through 9
    #[arg(long = "width")]
    width: Option<i32>,

    /// Italic flag value to require (1 for italic)
    #[arg(short = 'i', long = "italic")]
    italic: Option<i32>,

    /// Only monospaced faces
    #[arg(short = 'm', long = "mono", action = ArgAction::SetTrue)]
    mono: bool,

    /// Only faces with a symbol cmap
    #[arg(long = "symbolic", action = ArgAction::SetTrue)]
    symbolic: bool,

    /// Style bits: italic, bold, or both (comma separated)
    #[arg(short = 's', long = "style", value_delimiter = ',', value_enum)]
    style: Vec<StyleBit>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Sources to list, comma separated (default: all)
    #[arg(short = 'k', long = "kind", value_delimiter = ',', value_enum)]
    kind: Vec<FontListKind>,

    /// Emit a single JSON array
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Debug, Args)]
struct NameArgs {
    /// Exact full name to look up
    #[arg(value_hint = ValueHint::Other)]
    full_name: String,

    /// Emit the descriptor as JSON
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Debug, Args)]
struct StatsArgs {
    /// Emit counters as JSON
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Emit a single JSON array
    #[arg(long = "json", action = ArgAction::SetTrue, conflicts_with = "ndjson")]
    json: bool,

    /// Emit newline-delimited JSON
    #[arg(long = "ndjson", action = ArgAction::SetTrue)]
    ndjson: bool,

    /// Format output as padded columns
    #[arg(long = "columns", action = ArgAction::SetTrue)]
    columns: bool,

    /// Control colorized output (auto|always|never)
    #[arg(long = "color", default_value_t = ColorChoice::Auto, value_enum)]
    color: ColorChoice,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum StyleBit {
    Italic,
    Bold,
}

impl StyleBit {
    fn bits(self) -> i32 {
        match self {
            StyleBit::Italic => 1,
            StyleBit::Bold => 2,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum FontListKind {
    All,
    Generic,
    Stylish,
    Installed,
}

impl FontListKind {
    fn font_type(self) -> SystemFontType {
        match self {
            FontListKind::All => SystemFontType::ALL,
            FontListKind::Generic => SystemFontType::GENERIC,
            FontListKind::Stylish => SystemFontType::STYLISH,
            FontListKind::Installed => SystemFontType::INSTALLED,
        }
    }
}

fn list_type(kinds: &[FontListKind]) -> SystemFontType {
    if kinds.is_empty() {
        return SystemFontType::ALL;
    }
    kinds
        .iter()
        .fold(SystemFontType::NONE, |acc, kind| acc | kind.font_type())
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

/// Parse CLI args and execute the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli.index)?;
    let manager = IndexManager::with_opentype_parser(config)
        .context("starting the font index")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match cli.command {
        Command::Match(args) => run_match(&manager, &args, &mut handle),
        Command::List(args) => run_list(&manager, &args, &mut handle),
        Command::Name(args) => run_name(&manager, &args, &mut handle),
        Command::Stats(args) => run_stats(&manager, &args, &mut handle),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    // Logs go to stderr so JSON on stdout stays parseable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Defaults, then the config file, then environment, then flags.
fn load_config(args: &IndexArgs) -> Result<IndexConfig> {
    let base = match &args.config {
        Some(path) => IndexConfig::from_json_file(path)?,
        None => IndexConfig::default(),
    };
    let mut config = base.with_env_overrides()?;

    if let Some(dir) = &args.font_dir {
        config = config.with_font_dir(dir.clone());
    }
    if config.workers == 0 {
        return Err(anyhow!("workers must be at least 1"));
    }
    Ok(config)
}

fn build_request(args: &MatchArgs) -> MatchRequest {
    MatchRequest {
        post_script_name: args.postscript_name.clone().unwrap_or_default(),
        full_name: args.full_name.clone().unwrap_or_default(),
        font_family: args.family.clone().unwrap_or_default(),
        font_subfamily: args.subfamily.clone().unwrap_or_default(),
        weight: args.weight.unwrap_or(0),
        width: args.width.unwrap_or(0),
        italic: args.italic.unwrap_or(0),
        mono_space: args.mono,
        symbolic: args.symbolic,
        type_style: args.style.iter().fold(0, |bits, s| bits | s.bits()),
    }
}

fn run_match(manager: &IndexManager, args: &MatchArgs, mut w: impl Write) -> Result<()> {
    let request = build_request(args);
    let found = matching_font_descriptors(manager, Some(&request));

    let out = &args.output;
    let use_color = match out.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => io::stdout().is_terminal(),
    };

    if out.ndjson {
        write_ndjson(&found, &mut w)?;
    } else if out.json {
        write_json_pretty(&found, &mut w)?;
    } else if out.columns {
        write_columns(&found, &mut w, use_color)?;
    } else {
        write_plain(&found, &mut w, use_color)?;
    }

    Ok(())
}

fn run_list(manager: &IndexManager, args: &ListArgs, mut w: impl Write) -> Result<()> {
    let names = manager.system_font_list(list_type(&args.kind));
    if args.json {
        let json = serde_json::to_string_pretty(&names)?;
        writeln!(w, "{json}")?;
    } else {
        for name in names {
            writeln!(w, "{name}")?;
        }
    }
    Ok(())
}

fn run_name(manager: &IndexManager, args: &NameArgs, mut w: impl Write) -> Result<()> {
    let desc = manager
        .descriptor_by_name(&args.full_name)
        .ok_or_else(|| anyhow!("no indexed face is named {:?}", args.full_name))?;

    if args.json {
        let json = serde_json::to_string_pretty(&desc)?;
        writeln!(w, "{json}")?;
    } else {
        writeln!(w, "{desc}")?;
    }
    Ok(())
}

fn run_stats(manager: &IndexManager, args: &StatsArgs, mut w: impl Write) -> Result<()> {
    let stats = manager.stats();
    if args.json {
        let json = serde_json::to_string_pretty(&stats)?;
        writeln!(w, "{json}")?;
        return Ok(());
    }

    writeln!(w, "font dir          {}", manager.config().font_dir.display())?;
    writeln!(w, "descriptors       {}", stats.descriptors)?;
    writeln!(w, "families          {}", stats.families)?;
    writeln!(w, "full names        {}", stats.full_names)?;
    writeln!(w, "postscript names  {}", stats.post_script_names)?;
    writeln!(w, "subfamilies       {}", stats.subfamilies)?;
    writeln!(w, "bold              {}", stats.bold)?;
    writeln!(w, "italic            {}", stats.italic)?;
    writeln!(w, "monospace         {}", stats.mono_space)?;
    writeln!(w, "symbolic          {}", stats.symbolic)?;
    writeln!(w, "stylish names     {}", stats.stylish)?;
    writeln!(w, "installed names   {}", stats.installed)?;
    Ok(())
}

fn write_plain(found: &[FontDescriptor], mut w: impl Write, color: bool) -> Result<()> {
    for desc in found {
        let path = apply_color(&desc.path, color, AnsiColor::Cyan);
        writeln!(w, "{path}  {}", desc.full_name)?;
    }
    Ok(())
}

fn write_columns(found: &[FontDescriptor], mut w: impl Write, color: bool) -> Result<()> {
    let rows: Vec<(String, String, String)> = found
        .iter()
        .map(|d| {
            let traits = format!(
                "wght:{:<3} wdth:{} ital:{}{}{}",
                d.weight,
                d.width,
                d.italic,
                if d.mono_space { " mono" } else { "" },
                if d.symbolic { " sym" } else { "" },
            );
            (d.path.clone(), display_name(d), traits)
        })
        .collect();

    let path_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0).min(120);
    let name_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0).min(80);

    for (path, name, traits) in rows {
        let padded_path = format!("{:<path_width$}", path);
        let padded_name = format!("{:<name_width$}", name);
        let rendered_path = apply_color(&padded_path, color, AnsiColor::Cyan);
        let rendered_name = apply_color(&padded_name, color, AnsiColor::Yellow);
        let rendered_traits = apply_color(&traits, color, AnsiColor::Green);

        writeln!(w, "{rendered_path}  {rendered_name}  {rendered_traits}")?;
    }

    Ok(())
}

fn display_name(desc: &FontDescriptor) -> String {
    if desc.full_name.is_empty() {
        "(unnamed)".to_string()
    } else {
        desc.full_name.clone()
    }
}

#[derive(Copy, Clone)]
enum AnsiColor {
    Cyan,
    Yellow,
    Green,
}

fn apply_color(text: &str, color: bool, code: AnsiColor) -> String {
    if !color {
        return text.to_string();
    }

    let code_str = match code {
        AnsiColor::Cyan => "36",
        AnsiColor::Yellow => "33",
        AnsiColor::Green => "32",
    };

    format!("\u{1b}[{code_str}m{text}\u{1b}[0m")
}
