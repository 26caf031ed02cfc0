//! # Windcalc CLI Application
//!
//! Command-line front end for fence wind-load estimates.
//!
//! Settings resolve in order: JSON config file (`--config`), then
//! `WINDCALC_*` environment variables (a `.env` file is loaded first), then
//! flags. Logs go to stderr; `RUST_LOG` overrides `-v`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use windcalc_core::calculations::concrete::{self, ConcreteResult};
use windcalc_core::calculations::{
    EstimateEngine, EstimateInput, EstimateOutput, OverallStatus, PostBlock, SelectionMethod,
};
use windcalc_core::file_io::{load_concrete_input, load_estimate_input, load_project, load_settings};
use windcalc_core::loads::{lookup_wind_speed, Exposure, FenceType};
use windcalc_core::materials::{PostCatalog, PostGroup};
use windcalc_core::project::{calculate_project, ProjectOutput, RiskCategory};
use windcalc_core::settings::Settings;
use windcalc_core::tables::{self, SpacingTableStore};

#[derive(Parser)]
#[command(name = "windcalc")]
#[command(about = "Fence wind-load estimator and post selector")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (JSON)
    #[arg(short, long, global = true, env = "WINDCALC_CONFIG")]
    config: Option<PathBuf>,

    /// Directory of <speed>mph.csv spacing tables
    #[arg(long, global = true, env = "WINDCALC_TABLE_DIR")]
    table_dir: Option<PathBuf>,

    /// Fail instead of returning an inadequate post
    #[arg(
        long,
        global = true,
        env = "WINDCALC_STRICT_FOOTING",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    strict_footing: bool,

    /// Output as JSON (default: human-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate one fence run
    Estimate(EstimateArgs),

    /// Estimate every segment of a project file
    Project {
        /// Project file (JSON)
        file: PathBuf,
    },

    /// Concrete takeoff for post holes
    Concrete {
        /// Takeoff file (JSON)
        file: PathBuf,
    },

    /// Approximate basic wind speed for a ZIP code
    WindSpeed {
        zip: String,

        #[arg(short, long, default_value = "II")]
        risk_category: RiskCategory,
    },

    /// List the post catalog
    Posts {
        /// Only this group (pipe, c-shape)
        #[arg(short, long)]
        group: Option<PostGroup>,
    },

    /// Summarize loaded spacing tables
    Tables,
}

#[derive(Args)]
struct EstimateArgs {
    /// Read the request from a JSON file instead of flags
    #[arg(short, long, conflicts_with_all = ["wind_speed", "zip"])]
    input: Option<PathBuf>,

    /// Basic wind speed (mph)
    #[arg(short, long)]
    wind_speed: Option<f64>,

    /// Look up the wind speed from a ZIP code
    #[arg(long, conflicts_with = "wind_speed")]
    zip: Option<String>,

    /// Fence height (ft)
    #[arg(long, default_value_t = 6.0)]
    height: f64,

    /// Post spacing (ft)
    #[arg(short, long, default_value_t = 10.0)]
    spacing: f64,

    #[arg(short, long, default_value = "C")]
    exposure: Exposure,

    #[arg(short, long, default_value = "II")]
    risk_category: RiskCategory,

    #[arg(long, default_value_t = 1.0)]
    importance: f64,

    #[arg(long, default_value_t = 1.0)]
    kzt: f64,

    /// Soil class (rock_crystalline, rock_sedimentary, gravel, sand, clay)
    #[arg(long)]
    soil: Option<String>,

    #[arg(long, default_value = "chain_link_open")]
    fence_type: FenceType,

    #[arg(short, long, default_value = "pipe")]
    group: PostGroup,

    /// Pin the line post by catalog key
    #[arg(long)]
    line_post: Option<String>,

    /// Pin the terminal post by catalog key
    #[arg(long)]
    terminal_post: Option<String>,

    /// Run length (ft); enables quantities
    #[arg(short, long)]
    length: Option<f64>,

    #[arg(long, default_value_t = 0)]
    corners: u32,

    #[arg(long, default_value_t = 0)]
    gates: u32,

    /// Footing embedment override (in)
    #[arg(long)]
    embedment: Option<f64>,

    /// Footing diameter override (in)
    #[arg(long)]
    footing_diameter: Option<f64>,
}

impl EstimateArgs {
    fn to_input(&self) -> Result<EstimateInput> {
        if let Some(path) = &self.input {
            return load_estimate_input(path).with_context(|| format!("loading {}", path.display()));
        }

        let wind_speed_mph = match (self.wind_speed, &self.zip) {
            (Some(v), _) => v,
            (None, Some(zip)) => {
                let lookup = lookup_wind_speed(zip, self.risk_category);
                match lookup.wind_speed_mph {
                    Some(v) => {
                        info!(zip = %zip, region = %lookup.region, wind_speed_mph = v, "wind speed from ZIP");
                        f64::from(v)
                    }
                    None => bail!("ZIP {}: {}", zip, lookup.region),
                }
            }
            (None, None) => bail!("either --wind-speed, --zip or --input is required"),
        };

        Ok(EstimateInput {
            risk_category: self.risk_category,
            importance_factor: self.importance,
            soil_type: self.soil.clone(),
            fence_type: self.fence_type,
            kzt: self.kzt,
            post_group: self.group,
            line_post_key: self.line_post.clone(),
            terminal_post_key: self.terminal_post.clone(),
            fence_length_ft: self.length,
            num_corners: self.corners,
            num_gates: self.gates,
            embedment_depth_in: self.embedment,
            footing_diameter_in: self.footing_diameter,
            ..EstimateInput::new(wind_speed_mph, self.height, self.spacing, self.exposure)
        })
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "windcalc=debug,windcalc_core=debug" } else { "windcalc=warn,windcalc_core=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => load_settings(path).with_context(|| format!("loading settings {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(dir) = &cli.table_dir {
        settings.table_dir = Some(dir.clone());
    }
    if cli.strict_footing {
        settings.strict_footing = true;
    }
    debug!(?settings, "resolved settings");
    Ok(settings)
}

fn load_tables(settings: &Settings) -> Result<SpacingTableStore> {
    match &settings.table_dir {
        Some(dir) => tables::load_dir(dir).with_context(|| format!("loading spacing tables from {}", dir.display())),
        None => {
            info!("no table directory configured; all posts checked by bending formula");
            Ok(SpacingTableStore::empty())
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = resolve_settings(&cli)?;
    let catalog = PostCatalog::builtin();

    match &cli.command {
        Commands::Estimate(args) => {
            let tables = load_tables(&settings)?;
            let engine = EstimateEngine::new(&catalog, &tables).with_settings(&settings);
            let input = args.to_input()?;
            let output = engine.calculate(&input)?;
            if cli.json {
                print_json(&output)?;
            } else {
                print_estimate(&input, &output);
            }
        }
        Commands::Project { file } => {
            let tables = load_tables(&settings)?;
            let engine = EstimateEngine::new(&catalog, &tables).with_settings(&settings);
            let project = load_project(file).with_context(|| format!("loading project {}", file.display()))?;
            let output = calculate_project(&engine, &project)?;
            if cli.json {
                print_json(&output)?;
            } else {
                print_project(&output);
            }
        }
        Commands::Concrete { file } => {
            let input = load_concrete_input(file).with_context(|| format!("loading {}", file.display()))?;
            let output = concrete::calculate(&input)?;
            if cli.json {
                print_json(&output)?;
            } else {
                print_concrete(&output);
            }
        }
        Commands::WindSpeed { zip, risk_category } => {
            let lookup = lookup_wind_speed(zip, *risk_category);
            if cli.json {
                print_json(&lookup)?;
            } else {
                match lookup.wind_speed_mph {
                    Some(v) => println!("{}: {} mph (Risk Category {}, {})", zip, v, risk_category, lookup.region),
                    None => println!("{}: {}", zip, lookup.region),
                }
            }
        }
        Commands::Posts { group } => {
            let posts: Vec<_> = catalog.iter().filter(|p| group.map_or(true, |g| p.group() == g)).collect();
            if cli.json {
                print_json(&posts)?;
            } else {
                print_posts(&catalog, &posts);
            }
        }
        Commands::Tables => {
            let tables = load_tables(&settings)?;
            if cli.json {
                print_json(&TableSummary::new(settings.table_dir.as_deref(), &tables))?;
            } else {
                print_tables(settings.table_dir.as_deref(), &tables);
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn status_icon(pass: bool) -> &'static str {
    if pass { "[OK]" } else { "[FAIL]" }
}

fn status_banner(status: OverallStatus) -> &'static str {
    match status {
        OverallStatus::Green => "GREEN - within published limits",
        OverallStatus::Yellow => "YELLOW - review recommended",
        OverallStatus::Red => "RED - not a valid design",
    }
}

fn print_post_block(title: &str, block: &PostBlock) {
    let s = &block.selection;
    println!("{}:", title);
    println!("  Post:       {} ({})", s.recommended.display_name, s.recommended.post_key);
    println!("  Load:       {:.0} lb", block.load_lb);
    match (s.method, s.max_spacing_ft, s.required_moment_ft_lb) {
        (SelectionMethod::Table, Some(max), _) => println!("  Method:     table (max spacing {:.1} ft)", max),
        (SelectionMethod::Formula, max, Some(required)) => {
            println!(
                "  Method:     formula (M = {:.0} / {:.0} ft-lb)",
                required, s.allowable_moment_ft_lb
            );
            if let Some(max) = max {
                println!("  Advisory:   max spacing about {:.2} ft", max);
            }
        }
        (method, _, _) => println!("  Method:     {}", method),
    }
    println!("  Margin:     {:.2} {}", s.margin, status_icon(s.adequate && s.margin >= 1.0));
    println!(
        "  Footing:    SF {:.2}, {:.0}\" dia x {:.0}\" deep {}",
        block.footing.safety_factor,
        block.footing.footing_diameter_in,
        block.footing.actual_embedment_ft * 12.0,
        status_icon(block.footing.footing_ok)
    );
    println!(
        "  Deflection: {:.2}\" (limit {:.2}\") {}",
        block.deflection.deflection_in,
        block.deflection.allowable_in,
        status_icon(block.deflection.deflection_ok)
    );
}

fn print_estimate(input: &EstimateInput, output: &EstimateOutput) {
    println!("═══════════════════════════════════════");
    println!("  FENCE WIND-LOAD ESTIMATE");
    println!("═══════════════════════════════════════");
    println!();
    println!("Input:");
    println!("  Wind:     {} mph, Exposure {}, Risk Category {}", input.wind_speed_mph, input.exposure, input.risk_category);
    println!("  Fence:    {} ft high, {} ft spacing, {}", input.height_total_ft, input.post_spacing_ft, input.fence_type);
    println!();
    println!("Loads:");
    println!("  qz = {:.2} psf (Kz = {:.2})", output.shared.pressure.velocity_pressure_psf, output.shared.pressure.kz);
    println!("  p  = {:.2} psf (Cf = {:.3})", output.shared.pressure_psf, output.shared.pressure.shape_factor);
    println!("  P  = {:.0} lb line, {:.0} lb terminal", output.shared.load_per_post_lb, output.shared.terminal_load_per_post_lb);
    println!();
    print_post_block("Line post", &output.line);
    println!();
    print_post_block("Terminal post", &output.terminal);

    if let Some(q) = &output.quantities {
        println!();
        println!("Quantities:");
        println!(
            "  Posts:    {} ({} line, {} terminal, {} corner, {} gate)",
            q.total_posts, q.num_line_posts, q.num_terminal_posts, q.num_corner_posts, q.num_gate_posts
        );
        println!("  Concrete: {:.1} cf ({:.2} cy)", q.total_concrete_cf, q.total_concrete_cy);
    }

    if !output.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for w in &output.warnings {
            println!("  - {}", w);
        }
    }

    println!();
    println!("═══════════════════════════════════════");
    println!("  RESULT: {}", status_banner(output.overall_status));
    for reason in &output.status_reasons {
        println!("    {}", reason);
    }
    println!("═══════════════════════════════════════");
}

fn print_project(output: &ProjectOutput) {
    println!("═══════════════════════════════════════");
    println!("  PROJECT: {}", output.name);
    println!("═══════════════════════════════════════");
    for segment in &output.segments {
        let e = &segment.estimate;
        println!(
            "  {:<20} {:>6.2} psf  line {:<14} terminal {:<14} {}",
            segment.label,
            e.shared.pressure_psf,
            e.line.selection.recommended.post_label,
            e.terminal.selection.recommended.post_label,
            e.overall_status
        );
    }
    let q = &output.total_quantities;
    println!();
    println!("Totals:");
    println!("  Posts:     {}", q.total_posts);
    println!("  Top rail:  {:.0} lf", q.total_top_rail_lf);
    println!("  Fabric:    {:.0} sf", q.total_fabric_sf);
    println!("  Concrete:  {:.1} cf ({:.2} cy)", q.total_concrete_cf, q.total_concrete_cy);
    println!();
    println!("═══════════════════════════════════════");
    println!("  RESULT: {}", status_banner(output.overall_status));
    println!("═══════════════════════════════════════");
}

fn print_concrete(output: &ConcreteResult) {
    println!("Concrete takeoff:");
    for row in &output.rows {
        println!(
            "  {:<16} {:>3} x {:.0}\" dia x {:.0}\" deep = {:.2} cf ({} bags)",
            row.post_type, row.hole_count, row.hole_diameter_in, row.hole_depth_in, row.total_volume_cf, row.bags_60lb
        );
    }
    if output.waste_percent > 0.0 {
        println!("  Waste {:.0}%: {:.2} cf", output.waste_percent, output.waste_volume_cf);
    }
    println!(
        "  Total: {:.2} cf ({:.2} cy), {} x 60 lb bags",
        output.total_volume_cf, output.total_volume_cy, output.bags_60lb
    );
    for w in &output.warnings {
        println!("  Warning: {}", w);
    }
}

fn print_posts(catalog: &PostCatalog, posts: &[&windcalc_core::materials::PostSpec]) {
    println!("{:<24} {:<8} {:>4} {:>10} {:>10} {:>12}", "Key", "Group", "Rank", "S (in³)", "I (in⁴)", "M_allow (ft-lb)");
    for post in posts {
        println!(
            "{:<24} {:<8} {:>4} {:>10.3} {:>10.3} {:>12.0}",
            post.key,
            post.group(),
            post.rank,
            post.section.section_modulus().value(),
            post.section.moment_of_inertia().value(),
            catalog.allowable_moment(post).value() / 12.0
        );
    }
}

/// JSON view of the loaded tables
#[derive(Serialize)]
struct TableSummary {
    table_dir: Option<PathBuf>,
    tables: Vec<TableInfo>,
}

#[derive(Serialize)]
struct TableInfo {
    wind_speed_mph: u32,
    rows: usize,
    heights_ft: Vec<f64>,
}

impl TableSummary {
    fn new(dir: Option<&Path>, tables: &SpacingTableStore) -> Self {
        TableSummary {
            table_dir: dir.map(Path::to_path_buf),
            tables: tables
                .wind_speeds()
                .into_iter()
                .map(|mph| TableInfo {
                    wind_speed_mph: mph,
                    rows: tables.rows(mph).len(),
                    heights_ft: tables.heights(mph),
                })
                .collect(),
        }
    }
}

fn print_tables(dir: Option<&Path>, tables: &SpacingTableStore) {
    match dir {
        Some(dir) => println!("Spacing tables from {}", dir.display()),
        None => println!("No table directory configured (set --table-dir or WINDCALC_TABLE_DIR)"),
    }
    for mph in tables.wind_speeds() {
        let heights: Vec<String> = tables.heights(mph).iter().map(|h| format!("{}", h)).collect();
        println!("  {} mph: {} rows, heights [{}] ft", mph, tables.rows(mph).len(), heights.join(", "));
    }
}
