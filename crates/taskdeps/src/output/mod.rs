//! Output formatting for CLI commands.
//!
//! Every printer has a text form for humans and a JSON form for scripts.
//! Text writers take any `Write` so they can be tested against a buffer.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors, icons)

pub mod color;

use crate::domain::{DependencyEdge, TaskId};
use crate::graph::{CycleReport, IntegrityWarning, ProjectDependencyView, TaskDependencyEntry};
use crate::storage::LoadWarning;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, success, warning};

use color::{arrow, bold, colored_status_icon, colorize_id, colorize_status, dimmed, flag_badges};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 100;

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with explicit values.
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `TASKDEPS_MAX_WIDTH`: Maximum content width (default: 100)
    /// - `TASKDEPS_ASCII`: Set to "1" or "true" for ASCII-only icons
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `TASKDEPS_COLOR`: Set to "0" or "false" to disable colors
    pub fn from_env() -> Self {
        let max_width = match env::var("TASKDEPS_MAX_WIDTH") {
            Ok(s) if !s.is_empty() => s.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    env_var = "TASKDEPS_MAX_WIDTH",
                    value = %s,
                    default = DEFAULT_MAX_CONTENT_WIDTH,
                    "Invalid value, using default"
                );
                DEFAULT_MAX_CONTENT_WIDTH
            }),
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_ascii = env::var("TASKDEPS_ASCII")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        // https://no-color.org/
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("TASKDEPS_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Usable content width: the terminal width capped at `max_width`
    fn content_width(&self) -> usize {
        let terminal = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(DEFAULT_TERMINAL_WIDTH as usize);
        terminal.min(self.max_width)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a single edge, e.g. after `add`
pub fn print_edge(edge: &DependencyEdge, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => write_edge(&mut handle, edge, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, edge),
    }
}

/// Print a list of edges
pub fn print_edges(edges: &[DependencyEdge], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => write_edges(&mut handle, edges, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, &edges),
    }
}

/// Print a project dependency view
pub fn print_view(view: &ProjectDependencyView, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => write_view(&mut handle, view, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, view),
    }
}

/// Print a cycle report
pub fn print_cycles(report: &CycleReport, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => write_cycles(&mut handle, report, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, report),
    }
}

/// Direct neighbors of one task, as printed by `deps`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNeighbors {
    /// The task
    pub task_id: TaskId,
    /// Its level within its project
    pub level: usize,
    /// Tasks it depends on
    pub dependencies: Vec<TaskId>,
    /// Tasks that depend on it
    pub dependents: Vec<TaskId>,
}

/// Print a task's dependencies and dependents
pub fn print_neighbors(neighbors: &TaskNeighbors, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => write_neighbors(&mut handle, neighbors, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, neighbors),
    }
}

/// Print load warnings to stderr (text mode only)
pub fn print_load_warnings(warnings: &[LoadWarning]) -> io::Result<()> {
    let stderr = io::stderr();
    let mut handle = stderr.lock();
    let config = OutputConfig::from_env();
    for w in warnings {
        writeln!(handle, "{} {w}", warning("warning:", &config))?;
    }
    Ok(())
}

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

// ============================================================================
// Writers
// ============================================================================

fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

fn write_edge<W: Write>(w: &mut W, edge: &DependencyEdge, config: &OutputConfig) -> io::Result<()> {
    writeln!(
        w,
        "{}  {} {} {}",
        colorize_id(edge.id.as_str(), config),
        edge.task_id,
        arrow(config),
        edge.depends_on_task_id
    )
}

fn write_edges<W: Write>(
    w: &mut W,
    edges: &[DependencyEdge],
    config: &OutputConfig,
) -> io::Result<()> {
    if edges.is_empty() {
        return writeln!(w, "No dependencies found.");
    }
    for edge in edges {
        write_edge(w, edge, config)?;
    }
    Ok(())
}

fn write_view<W: Write>(
    w: &mut W,
    view: &ProjectDependencyView,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} ({} task(s))",
        bold(&format!("Project {}", view.project_id), config),
        view.tasks.len()
    )?;

    let width = config.content_width();
    let mut current_level = None;
    for entry in &view.tasks {
        if current_level != Some(entry.level) {
            current_level = Some(entry.level);
            writeln!(w)?;
            writeln!(w, "{}", bold(&format!("Level {}", entry.level), config))?;
        }
        write_entry(w, entry, width, config)?;
    }

    if !view.cycles.is_empty() {
        writeln!(w)?;
        write_cycles(w, &view.cycles, config)?;
    }

    if !view.warnings.is_empty() {
        writeln!(w)?;
        write_integrity_warnings(w, &view.warnings, config)?;
    }

    Ok(())
}

fn write_entry<W: Write>(
    w: &mut W,
    entry: &TaskDependencyEntry,
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    let badges = flag_badges(entry.is_blocking, entry.is_critical, config);
    let prefix = format!(
        "  {} {} ",
        colored_status_icon(entry.status, config),
        colorize_id(entry.id.as_str(), config)
    );

    // Wrap against the visible width of the prefix, not its escape codes.
    let visible = entry.id.as_str().chars().count() + 5;
    let mut lines = textwrap::wrap(&entry.title, width.saturating_sub(visible).max(20)).into_iter();
    let first = lines.next().unwrap_or_default();

    if badges.is_empty() {
        writeln!(w, "{prefix}{first}")?;
    } else {
        writeln!(w, "{prefix}{first} {badges}")?;
    }
    for line in lines {
        writeln!(w, "{}{line}", " ".repeat(visible))?;
    }

    writeln!(
        w,
        "      {} {}",
        dimmed("status:", config),
        colorize_status(entry.status, config)
    )?;
    if !entry.dependencies.is_empty() {
        writeln!(
            w,
            "      {} {}",
            dimmed("depends on:", config),
            join_ids(&entry.dependencies)
        )?;
    }
    if !entry.dependents.is_empty() {
        writeln!(
            w,
            "      {} {}",
            dimmed("needed by:", config),
            join_ids(&entry.dependents)
        )?;
    }
    Ok(())
}

fn write_cycles<W: Write>(w: &mut W, report: &CycleReport, config: &OutputConfig) -> io::Result<()> {
    if report.is_empty() {
        return writeln!(w, "{}", success("No cycles found.", config));
    }

    writeln!(
        w,
        "{}",
        error(&format!("Found {} cycle(s):", report.len()), config)
    )?;
    let separator = format!(" {} ", arrow(config));
    for cycle in report.cycles() {
        let mut ids: Vec<&str> = cycle.iter().map(TaskId::as_str).collect();
        if let Some(first) = cycle.first() {
            ids.push(first.as_str());
        }
        writeln!(w, "  {}", ids.join(&separator))?;
    }
    Ok(())
}

fn write_integrity_warnings<W: Write>(
    w: &mut W,
    warnings: &[IntegrityWarning],
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{}", warning("Warnings:", config))?;
    for item in warnings {
        writeln!(w, "  {item}")?;
    }
    Ok(())
}

fn write_neighbors<W: Write>(
    w: &mut W,
    neighbors: &TaskNeighbors,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}",
        colorize_id(neighbors.task_id.as_str(), config),
        dimmed(&format!("(level {})", neighbors.level), config)
    )?;
    writeln!(
        w,
        "  {} {}",
        dimmed("depends on:", config),
        or_none(&neighbors.dependencies)
    )?;
    writeln!(
        w,
        "  {} {}",
        dimmed("needed by:", config),
        or_none(&neighbors.dependents)
    )
}

fn join_ids(ids: &[TaskId]) -> String {
    ids.iter().map(TaskId::as_str).collect::<Vec<_>>().join(", ")
}

fn or_none(ids: &[TaskId]) -> String {
    if ids.is_empty() {
        "(none)".to_string()
    } else {
        join_ids(ids)
    }
}
