// tripane CLI - headless grid operations

mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};

use tripane_engine::controller::{SheetController, SheetSnapshot};
use tripane_engine::events::SheetObserver;
use tripane_engine::grid::Grid;
use tripane_engine::store::FileStore;
use tripane_viewport::geometry::{PaneGeometry, DEFAULT_LENGTH};
use tripane_viewport::pane::RecordingPane;
use tripane_viewport::sync::ViewportSync;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;
/// General error - store unavailable, worker gone.
pub const EXIT_ERROR: u8 = 1;
/// Usage error - arguments that cannot fit the sheet.
pub const EXIT_USAGE: u8 = 2;

#[derive(Parser)]
#[command(name = "tripane")]
#[command(about = "Excel-like grid with synchronized panes (CLI mode, headless)")]
#[command(version)]
struct Cli {
    /// Sheet file to load and save (defaults to the per-user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the sheet with header and row labels
    Show,

    /// Write text into one cell and save the sheet
    Set {
        row: usize,
        col: usize,
        text: String,
    },

    /// Move the selection to one cell (session-only, not saved)
    Select { row: usize, col: usize },

    /// Blank every cell and save the sheet
    Clear,

    /// Run a scripted edit session showing the notification pacing
    Demo,

    /// Feed scroll deltas through the viewport coordinator
    #[command(after_help = "\
Examples:
  tripane scroll --band --dx 50 --dx 36
  tripane scroll --cell-width 72 --dx 140 --dy 65")]
    Scroll {
        /// Reserve a corner band ahead of the content columns
        #[arg(long)]
        band: bool,

        /// Uniform content cell width in logical pixels
        #[arg(long, default_value_t = DEFAULT_LENGTH)]
        cell_width: i32,

        /// Horizontal delta, repeatable, applied in order
        #[arg(long = "dx", value_name = "PX", allow_negative_numbers = true)]
        dx: Vec<i32>,

        /// Vertical delta, repeatable, applied in order
        #[arg(long = "dy", value_name = "PX", allow_negative_numbers = true)]
        dy: Vec<i32>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Show => cmd_show(cli.store),
        Commands::Set { row, col, text } => cmd_set(cli.store, row, col, text),
        Commands::Select { row, col } => cmd_select(cli.store, row, col),
        Commands::Clear => cmd_clear(cli.store),
        Commands::Demo => cmd_demo(cli.store),
        Commands::Scroll {
            band,
            cell_width,
            dx,
            dy,
        } => cmd_scroll(band, cell_width, dx, dy),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(err.code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            code: EXIT_ERROR,
            message: message.into(),
            hint: None,
        }
    }

    fn usage(message: impl Into<String>) -> Self {
        Self {
            code: EXIT_USAGE,
            message: message.into(),
            hint: None,
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn open_store(path: Option<PathBuf>) -> Result<Arc<FileStore>, CliError> {
    let path = match path {
        Some(path) => path,
        None => FileStore::default_path().ok_or_else(|| {
            CliError::new("no config directory available for the default sheet file")
                .with_hint("pass --store <path> to pick a sheet file explicitly")
        })?,
    };
    Ok(Arc::new(FileStore::new(path)))
}

/// Load the sheet and hand back a controller that already holds it.
fn load_sheet(store: Option<PathBuf>) -> Result<SheetController, CliError> {
    let controller = SheetController::new(open_store(store)?);
    controller.load();
    Ok(controller)
}

fn snapshot_of(controller: &SheetController) -> Result<SheetSnapshot, CliError> {
    controller
        .snapshot()
        .ok_or_else(|| CliError::new("sheet worker unavailable"))
}

fn ensure_in_bounds(grid: &Grid, row: usize, col: usize) -> Result<(), CliError> {
    if !grid.contains(row, col) {
        return Err(CliError::usage(format!(
            "cell ({}, {}) is outside the {}x{} sheet",
            row,
            col,
            grid.rows(),
            grid.cols()
        ))
        .with_hint("rows and columns are zero-based"));
    }
    Ok(())
}

fn cmd_show(store: Option<PathBuf>) -> Result<(), CliError> {
    let controller = load_sheet(store)?;
    let snapshot = snapshot_of(&controller)?;
    print!("{}", render::render_sheet(&snapshot));
    Ok(())
}

fn cmd_set(store: Option<PathBuf>, row: usize, col: usize, text: String) -> Result<(), CliError> {
    let controller = load_sheet(store)?;
    let snapshot = snapshot_of(&controller)?;
    ensure_in_bounds(&snapshot.grid, row, col)?;

    controller.edit_cell(Some(text), row, col);
    controller.save();
    let snapshot = snapshot_of(&controller)?;
    print!("{}", render::render_sheet(&snapshot));
    Ok(())
}

fn cmd_select(store: Option<PathBuf>, row: usize, col: usize) -> Result<(), CliError> {
    let controller = load_sheet(store)?;
    let snapshot = snapshot_of(&controller)?;
    ensure_in_bounds(&snapshot.grid, row, col)?;

    controller.select_cell(row, col);
    let snapshot = snapshot_of(&controller)?;
    print!("{}", render::render_sheet(&snapshot));
    Ok(())
}

fn cmd_clear(store: Option<PathBuf>) -> Result<(), CliError> {
    let controller = load_sheet(store)?;
    controller.clear();
    controller.save();
    let snapshot = snapshot_of(&controller)?;
    print!("{}", render::render_sheet(&snapshot));
    Ok(())
}

/// Observer that narrates deliveries with their arrival time.
struct PrintingObserver {
    started: Instant,
}

impl SheetObserver for PrintingObserver {
    fn on_sheet_loaded(&self, header_labels: &[String], row_labels: &[String], grid: &Grid) {
        println!(
            "[{:>5} ms] loaded: {} columns, {} rows, grid {}x{}",
            self.started.elapsed().as_millis(),
            header_labels.len(),
            row_labels.len(),
            grid.rows(),
            grid.cols(),
        );
    }

    fn on_cells_refreshed(&self, grid: &Grid) {
        println!(
            "[{:>5} ms] refreshed: grid {}x{}",
            self.started.elapsed().as_millis(),
            grid.rows(),
            grid.cols(),
        );
    }
}

fn cmd_demo(store: Option<PathBuf>) -> Result<(), CliError> {
    let started = Instant::now();
    let submitted = |what: &str| {
        println!("[{:>5} ms] submit {}", started.elapsed().as_millis(), what);
    };

    let mut controller = SheetController::new(open_store(store)?);
    controller.add_observer(Arc::new(PrintingObserver { started }));

    submitted("load()        (announcement lags by a second)");
    controller.load();
    thread::sleep(Duration::from_millis(1400));

    submitted("edit_cell(\"42\", 1, 2)");
    controller.edit_cell(Some("42".to_string()), 1, 2);
    thread::sleep(Duration::from_millis(300));

    submitted("select_cell(1, 2)");
    controller.select_cell(1, 2);
    thread::sleep(Duration::from_millis(300));

    submitted("save()");
    controller.save();
    thread::sleep(Duration::from_millis(300));

    submitted("edit_cell(\"scratch\", 1, 2)   (not saved)");
    controller.edit_cell(Some("scratch".to_string()), 1, 2);
    thread::sleep(Duration::from_millis(300));

    submitted("reload()      (store wins, announcement lags again)");
    controller.reload();
    thread::sleep(Duration::from_millis(1400));

    let snapshot = snapshot_of(&controller)?;
    println!(
        "[{:>5} ms] cell (1, 2) now reads {:?}",
        started.elapsed().as_millis(),
        snapshot.grid.get(1, 2).and_then(|cell| cell.text.as_deref()),
    );

    controller.stop();
    println!("[{:>5} ms] stopped", started.elapsed().as_millis());
    Ok(())
}

fn cmd_scroll(band: bool, cell_width: i32, dx: Vec<i32>, dy: Vec<i32>) -> Result<(), CliError> {
    let geometry = PaneGeometry {
        cell_width,
        ..PaneGeometry::default()
    };
    let mut sync = ViewportSync::new(geometry);
    sync.set_has_band(band);

    // Stand-ins for the four pane roles: header and content move together
    // horizontally, the label pane and every visible row pane together
    // vertically.
    let mut header = RecordingPane::new();
    let mut content = RecordingPane::new();
    let mut labels = RecordingPane::new();
    let mut row = RecordingPane::new();

    for delta in dx {
        match sync.scroll_by(delta) {
            Some(update) => {
                update.apply_to(&mut header);
                update.apply_to(&mut content);
                println!("dx {:+} -> {}", delta, render::describe_horizontal(&update));
            }
            None => println!("dx {:+} -> no update (zero delta)", delta),
        }
    }
    for delta in dy {
        match sync.on_column_scroll(delta) {
            Some(update) => {
                update.apply_to(&mut labels);
                update.apply_to(&mut row);
                println!("dy {:+} -> {}", delta, render::describe_vertical(&update));
            }
            None => println!("dy {:+} -> no update (zero delta)", delta),
        }
    }

    println!("axes: x={} y={}", sync.axis_x(), sync.axis_y());
    println!("header pane:  {}", render::describe_seat(header.last_seat()));
    println!("content pane: {}", render::describe_seat(content.last_seat()));
    println!("label pane:   {}", render::describe_seat(labels.last_seat()));
    println!("row pane:     {}", render::describe_seat(row.last_seat()));
    Ok(())
}
