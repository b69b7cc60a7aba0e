use anyhow::{bail, Context};
use api_client::{BankIqClient, ReportingApi};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use comparison::forms::F810_COLUMNS;
use comparison::{ComparisonSession, FormOrchestrator, IndicatorOrchestrator, ResultMatrix};
use configuration::{init_tracing, load_settings, Settings, SettingsArgs};
use core_types::{Bank, Indicator, IndicatorValue, ReportForm, YearMonth};
use indicatif::{ProgressBar, ProgressStyle};
use persistence::JsonFileStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use table_view::{
    format_number, rate_table, shape_statistic, ColumnSelection, ExpandableRows, YearRange,
    PLACEHOLDER,
};

/// The main entry point for the BankIQ command-line application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // BANKIQ__* overrides may live in a .env file; it is optional.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let settings = load_settings(&cli.settings.config_path)?;
    let _log_guard = init_tracing(&settings.logging)?;
    let app = App::new(&settings)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Banks(args) => handle_banks(&app, args).await,
        Commands::Indicators(args) => handle_indicators(&app, args).await,
        Commands::Select(args) => handle_select(&app, args).await,
        Commands::Compare(args) => handle_compare(&app, args).await,
        Commands::Form(args) => handle_form(&app, args).await,
        Commands::Rates(args) => handle_rates(&app, args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Compare Russian banks' regulatory reporting indicators side by side.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the bank directory.
    Banks(BanksArgs),
    /// List the Form 101 indicator catalogue.
    Indicators(IndicatorsArgs),
    /// Change the persisted selection of banks and indicators.
    Select(SelectArgs),
    /// Compare the selected indicators across the selected banks.
    Compare(CompareArgs),
    /// Compare a fixed-schema form (123 or 810) across the selected banks.
    Form(FormArgs),
    /// Show an interest-rate statistic table.
    Rates(RatesArgs),
}

#[derive(Parser)]
struct BanksArgs {
    /// Only show banks whose name, BIC or registration number contains this text.
    #[arg(long)]
    search: Option<String>,
}

#[derive(Parser)]
struct IndicatorsArgs {
    /// Only show indicators whose code or name contains this text.
    #[arg(long)]
    search: Option<String>,
}

#[derive(Parser)]
struct SelectArgs {
    /// Registration numbers of banks to add.
    #[arg(long, num_args = 1..)]
    add: Vec<String>,

    /// BICs of banks to remove.
    #[arg(long, num_args = 1..)]
    remove: Vec<String>,

    /// Replace the indicator selection with these Form 101 codes.
    #[arg(long, num_args = 1..)]
    indicators: Vec<String>,

    /// Drop every selected bank.
    #[arg(long)]
    clear_banks: bool,
}

#[derive(Parser)]
struct CompareArgs {
    /// First month of the period (YYYY-MM).
    #[arg(long)]
    from: Option<YearMonth>,

    /// Last month of the period (YYYY-MM).
    #[arg(long)]
    to: Option<YearMonth>,

    /// Compare a single month instead of a period.
    #[arg(long, conflicts_with = "dynamics")]
    no_dynamics: bool,

    /// Compare over the whole period.
    #[arg(long)]
    dynamics: bool,
}

#[derive(Parser)]
struct FormArgs {
    /// The form to compare: f123 or f810.
    #[arg(long)]
    form: ReportForm,

    /// The reporting month (YYYY-MM). Defaults to the previous month.
    #[arg(long)]
    month: Option<YearMonth>,

    /// List the reporting dates the first selected bank has for this form.
    #[arg(long)]
    dates: bool,
}

#[derive(Parser)]
struct RatesArgs {
    /// Which table to show.
    #[arg(long, value_enum, default_value_t = RateTableArg::Summary)]
    table: RateTableArg,

    #[arg(long)]
    from_year: Option<String>,

    #[arg(long)]
    to_year: Option<String>,

    /// Only show these columns.
    #[arg(long, num_args = 1..)]
    columns: Option<Vec<String>>,

    /// Show every row instead of the first few.
    #[arg(long)]
    all: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum RateTableArg {
    Summary,
    Territorial,
    ByActivity,
    DepositsSummary,
    DepositsTerritorial,
}

impl RateTableArg {
    fn id(self) -> &'static str {
        match self {
            RateTableArg::Summary => "summary",
            RateTableArg::Territorial => "territorial",
            RateTableArg::ByActivity => "by-activity",
            RateTableArg::DepositsSummary => "deposits-summary",
            RateTableArg::DepositsTerritorial => "deposits-territorial",
        }
    }
}

// ==============================================================================
// Application Wiring
// ==============================================================================

/// Everything the commands share: one client, one store, one cache per orchestrator.
struct App {
    api: Arc<dyn ReportingApi>,
    store: Arc<JsonFileStore>,
    stale_after: Duration,
}

impl App {
    fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = BankIqClient::new(&settings.api).context("Failed to build the HTTP client")?;
        tracing::info!(base_url = client.base_url(), "Using reporting backend.");
        Ok(Self {
            api: Arc::new(client),
            store: Arc::new(JsonFileStore::new(settings.persistence.path.clone())),
            stale_after: settings.cache.stale_after(),
        })
    }

    fn session(&self, today: NaiveDate) -> ComparisonSession {
        ComparisonSession::open(self.store.clone(), today)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn new_table(header: Vec<String>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// ==============================================================================
// Directory Commands
// ==============================================================================

async fn handle_banks(app: &App, args: BanksArgs) -> anyhow::Result<()> {
    let banks = app.api.fetch_all_banks().await?;
    let session = app.session(today());

    let mut table = new_table(vec![
        "".to_string(),
        "Reg. No.".to_string(),
        "BIC".to_string(),
        "Name".to_string(),
    ]);
    let mut shown = 0;
    for bank in &banks {
        if let Some(search) = &args.search {
            let matches = contains_ci(&bank.name, search)
                || bank.bic.contains(search.as_str())
                || bank.reg_number.contains(search.as_str());
            if !matches {
                continue;
            }
        }
        let selected = session
            .selected_banks()
            .iter()
            .any(|b| b.reg_number == bank.reg_number);
        table.add_row(vec![
            if selected { "*".to_string() } else { String::new() },
            bank.reg_number.clone(),
            bank.bic.clone(),
            bank.name.clone(),
        ]);
        shown += 1;
    }

    println!("{table}");
    println!("{shown} of {} banks. * marks the current selection.", banks.len());
    Ok(())
}

async fn handle_indicators(app: &App, args: IndicatorsArgs) -> anyhow::Result<()> {
    let catalog = app.api.fetch_unique_indicators().await?;

    let mut table = new_table(vec!["Code".to_string(), "Name".to_string()]);
    for indicator in &catalog {
        if let Some(search) = &args.search {
            if !indicator.ind_code.contains(search.as_str()) && !contains_ci(&indicator.name, search) {
                continue;
            }
        }
        table.add_row(vec![indicator.ind_code.clone(), indicator.name.clone()]);
    }
    println!("{table}");
    Ok(())
}

async fn handle_select(app: &App, args: SelectArgs) -> anyhow::Result<()> {
    let mut session = app.session(today());

    if args.clear_banks {
        session.set_banks(Vec::new());
    }
    for bic in &args.remove {
        session.remove_bank(bic);
    }
    if !args.add.is_empty() {
        let directory = app.api.fetch_all_banks().await?;
        let mut found = Vec::new();
        for reg_number in &args.add {
            match directory.iter().find(|bank| &bank.reg_number == reg_number) {
                Some(bank) => found.push(bank.clone()),
                None => tracing::warn!(%reg_number, "No bank with this registration number."),
            }
        }
        session.add_banks(found);
    }
    if !args.indicators.is_empty() {
        let catalog = app.api.fetch_unique_indicators().await?;
        let indicators = args
            .indicators
            .iter()
            .map(|code| {
                catalog
                    .iter()
                    .find(|indicator| &indicator.ind_code == code)
                    .cloned()
                    .unwrap_or_else(|| Indicator::new(code.as_str(), code.as_str()))
            })
            .collect();
        session.set_indicators(indicators);
    }

    print_selection(&session);
    Ok(())
}

fn print_selection(session: &ComparisonSession) {
    let mut banks = new_table(vec!["Reg. No.".to_string(), "BIC".to_string(), "Bank".to_string()]);
    for bank in session.selected_banks() {
        banks.add_row(vec![bank.reg_number.clone(), bank.bic.clone(), bank.name.clone()]);
    }
    println!("{banks}");

    let counts = session.indicator_code_counts();
    let mut indicators = new_table(vec!["Code".to_string(), "Indicator".to_string()]);
    for indicator in session.selected_indicators() {
        let code = match counts.get(&indicator.ind_code) {
            Some(n) if *n > 1 => format!("{} (x{n})", indicator.ind_code),
            _ => indicator.ind_code.clone(),
        };
        indicators.add_row(vec![code, indicator.name.clone()]);
    }
    println!("{indicators}");
}

// ==============================================================================
// Comparison Commands
// ==============================================================================

/// Selects the default banks on first use, so a fresh install has something to compare.
async fn ensure_banks(app: &App, session: &mut ComparisonSession) -> anyhow::Result<()> {
    if session.selected_banks().is_empty() {
        let directory = app.api.fetch_all_banks().await?;
        if session.apply_default_banks(&directory) {
            tracing::info!(banks = session.selected_banks().len(), "Selected the default banks.");
        }
    }
    Ok(())
}

async fn handle_compare(app: &App, args: CompareArgs) -> anyhow::Result<()> {
    let today = today();
    let mut session = app.session(today);

    if let Some(from) = args.from {
        session.set_from_month(Some(from.to_string()));
    }
    if let Some(to) = args.to {
        session.set_to_month(Some(to.to_string()));
    }
    if args.no_dynamics {
        session.set_show_dynamics(false);
    } else if args.dynamics {
        session.set_show_dynamics(true);
    }
    session.normalize_months(today);
    ensure_banks(app, &mut session).await?;

    if session.selected_banks().is_empty() || session.selected_indicators().is_empty() {
        bail!("Nothing to compare: select banks and indicators first (see `bankiq select`).");
    }

    let orchestrator = IndicatorOrchestrator::new(app.api.clone(), app.stale_after);
    let progress = spinner("Querying indicators...")?;
    let matrix = session.run(&orchestrator, today).await;
    progress.finish_and_clear();

    let range = session.effective_range(today);
    if let (Some(from), Some(to)) = (range.from, range.to) {
        println!("Period: {} .. {}", from.date(), to.date());
    }
    print_indicator_matrix(&session, &matrix);
    report_failures(&matrix);
    Ok(())
}

fn indicator_cell(value: Option<&IndicatorValue>, show_dynamics: bool) -> String {
    let Some(value) = value else {
        return PLACEHOLDER.to_string();
    };
    if !show_dynamics {
        return format_number(value.value_at_end);
    }
    let change = match value.change() {
        Some(change) if change > Decimal::ZERO => format!(" (+{})", format_number(Some(change))),
        Some(change) => format!(" ({})", format_number(Some(change))),
        None => String::new(),
    };
    format!(
        "{} → {}{change}",
        format_number(value.value_at_start),
        format_number(value.value_at_end)
    )
}

fn print_indicator_matrix(session: &ComparisonSession, matrix: &ResultMatrix<IndicatorValue>) {
    let mut header = vec!["Bank".to_string()];
    header.extend(
        session
            .selected_indicators()
            .iter()
            .map(|indicator| format!("{} {}", indicator.ind_code, indicator.name)),
    );
    let mut table = new_table(header);

    for bank in session.selected_banks() {
        let mut row = vec![bank_label(bank)];
        for indicator in session.selected_indicators() {
            let cell = if matrix.is_error(&bank.reg_number, &indicator.ind_code) {
                "error".to_string()
            } else {
                indicator_cell(
                    matrix.value(&bank.reg_number, &indicator.ind_code),
                    session.show_dynamics(),
                )
            };
            row.push(cell);
        }
        table.add_row(row);
    }
    println!("{table}");
}

fn bank_label(bank: &Bank) -> String {
    format!("{} ({})", bank.name, bank.reg_number)
}

fn report_failures<V>(matrix: &ResultMatrix<V>) {
    let failed = matrix.failed_cells();
    if failed.is_empty() {
        return;
    }
    eprintln!("{} cell(s) could not be loaded:", failed.len());
    for (reg_number, code, error) in failed {
        eprintln!("  {reg_number} / {code}: {error}");
    }
}

async fn handle_form(app: &App, args: FormArgs) -> anyhow::Result<()> {
    if !args.form.is_fixed_schema() {
        bail!("Form {} has no fixed schema; use `bankiq compare` instead.", args.form);
    }
    let today = today();
    let mut session = app.session(today);
    ensure_banks(app, &mut session).await?;

    if args.dates {
        let Some(bank) = session.selected_banks().first() else {
            bail!("No bank selected.");
        };
        let dates = app.api.fetch_supported_dates(args.form, &bank.reg_number).await?;
        println!("{} reports of {}:", args.form, bank_label(bank));
        for date in dates {
            println!("  {}", date.format("%Y-%m"));
        }
        return Ok(());
    }

    let month = args
        .month
        .unwrap_or_else(|| YearMonth::from_date(today).previous())
        .to_string();
    let orchestrator = FormOrchestrator::new(app.api.clone(), app.stale_after);
    let progress = spinner(&format!("Querying form {}...", args.form))?;
    let matrix = orchestrator
        .compare(args.form, session.selected_banks(), Some(&month))
        .await?;
    progress.finish_and_clear();

    let mut header = vec![format!("{} / {month}", args.form)];
    header.extend(session.selected_banks().iter().map(bank_label));
    let mut table = new_table(header);

    for key in comparison::forms::vocabulary(args.form) {
        let label = F810_COLUMNS
            .iter()
            .find(|column| column.key == key)
            .map_or(key, |column| column.label);
        let mut row = vec![label.to_string()];
        for bank in session.selected_banks() {
            let cell = if matrix.is_error(&bank.reg_number, key) {
                "error".to_string()
            } else {
                format_number(matrix.value(&bank.reg_number, key).copied())
            };
            row.push(cell);
        }
        table.add_row(row);
    }
    println!("{table}");
    report_failures(&matrix);
    Ok(())
}

// ==============================================================================
// Statistic Commands
// ==============================================================================

async fn handle_rates(app: &App, args: RatesArgs) -> anyhow::Result<()> {
    let Some(preset) = rate_table(args.table.id()) else {
        bail!("Unknown rate table: {}", args.table.id());
    };
    let default_from = preset.default_from_year.to_string();
    let default_to = preset.default_to_year.to_string();
    let range = YearRange::validate(
        Some(args.from_year.as_deref().unwrap_or(&default_from)),
        Some(args.to_year.as_deref().unwrap_or(&default_to)),
        preset.min_year,
        today().year(),
    )?;

    let progress = spinner("Loading rates...")?;
    let response = app
        .api
        .fetch_statistic(preset.kind, &preset.params(range.from, range.to))
        .await?;
    progress.finish_and_clear();

    if let Some(bounds) = YearRange::bounds_of(&response.date_ranges) {
        tracing::debug!(from = bounds.from, to = bounds.to, "Backend reports data for these years.");
    }

    let shaped = shape_statistic(&response);
    let available: Vec<String> = shaped.columns().into_iter().map(str::to_string).collect();
    let mut selection = ColumnSelection::new();
    selection.sync(&available);
    let columns: Vec<&str> = selection
        .active(args.columns.as_deref())
        .iter()
        .map(String::as_str)
        .collect();

    let mut rows = ExpandableRows::new();
    if args.all {
        rows.toggle();
    }
    let dates: Vec<&str> = shaped.dates().collect();

    let mut header = vec!["Date".to_string()];
    header.extend(columns.iter().map(|column| column.to_string()));
    let mut table = new_table(header);
    for date in rows.displayed_rows(&dates) {
        let mut row = vec![date.to_string()];
        row.extend(shaped.normalized_row(date, &columns, PLACEHOLDER).unwrap_or_default());
        table.add_row(row);
    }

    println!("{}", preset.title);
    println!("{table}");
    if rows.show_toggle(dates.len()) && !rows.is_expanded() {
        println!(
            "Showing {} of {} rows; pass --all to see every row.",
            ExpandableRows::COLLAPSED_ROW_LIMIT,
            dates.len()
        );
    }
    Ok(())
}
