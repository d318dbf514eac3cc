use std::fmt::Write as _;
use std::path::PathBuf;

use crate::config::{DuplicatePolicy, RepairConfig};
use crate::content::{
    check_root, repair_root, ChapterOutcome, RepairAction, RunTotals, ValidationSeverity,
};
use crate::error::RepairError;

const USAGE: &str =
    "usage: concept-map-repair <fix|check> [ROOT] [--duplicates=reuse|error] [--json]";
const BANNER_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Fix,
    Check,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("fix") => Some(Command::Fix),
        Some("check") => Some(Command::Check),
        _ => None,
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    root: Option<PathBuf>,
    duplicates: Option<DuplicatePolicy>,
    json: bool,
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    for arg in args.iter().skip(2) {
        if let Some(raw) = arg.strip_prefix("--duplicates=") {
            let policy = raw.parse().map_err(|err: RepairError| err.to_string())?;
            options.duplicates = Some(policy);
        } else if arg == "--json" {
            options.json = true;
        } else if arg.starts_with("--") {
            return Err(format!("unknown flag '{arg}'"));
        } else if options.root.is_none() {
            options.root = Some(PathBuf::from(arg));
        } else {
            return Err(format!("unexpected argument '{arg}'"));
        }
    }
    Ok(options)
}

/// Environment first, then command-line overrides.
fn build_config(options: &Options) -> Result<RepairConfig, RepairError> {
    let mut config = RepairConfig::from_env()?;
    if let Some(root) = &options.root {
        config.root = root.clone();
    }
    if let Some(duplicates) = options.duplicates {
        config.duplicates = duplicates;
    }
    Ok(config)
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Fix) => handle_fix(args),
        Some(Command::Check) => handle_check(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn load_options(args: &[String]) -> Result<(Options, RepairConfig), i32> {
    let options = parse_options(args).map_err(|msg| {
        eprintln!("{msg}");
        eprintln!("{USAGE}");
        2
    })?;
    let config = build_config(&options).map_err(|err| {
        eprintln!("{err}");
        2
    })?;
    Ok((options, config))
}

fn handle_fix(args: &[String]) -> i32 {
    let (options, config) = match load_options(args) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    if options.json {
        eprintln!("--json is only supported by check");
        return 2;
    }

    println!("Starting concept-map.yml repair process...");
    match repair_root(&config, |outcome| print!("{}", render_chapter(outcome))) {
        Ok(totals) => {
            print!("{}", render_summary(&totals));
            0
        }
        Err(err) => {
            tracing::error!(error = %err, "repair aborted");
            eprintln!("repair failed: {err}");
            1
        }
    }
}

fn handle_check(args: &[String]) -> i32 {
    let (options, config) = match load_options(args) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let report = match check_root(&config) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("check failed: {err}");
            return 1;
        }
    };

    if options.json {
        match serde_json::to_string_pretty(&report) {
            Ok(payload) => println!("{payload}"),
            Err(err) => {
                eprintln!("failed to serialize check report: {err}");
                return 1;
            }
        }
    } else {
        for diag in &report.diagnostics {
            println!("- {diag}");
        }
        println!(
            "checked {} chapter(s): {} path(s) to fix, {} stub(s) to create",
            report.chapters_checked, report.pending_fixes, report.pending_stubs
        );
    }

    if report.needs_attention() {
        let issues = report
            .diagnostics
            .iter()
            .filter(|diag| diag.severity <= ValidationSeverity::Warning)
            .count();
        eprintln!("check failed: {issues} issue(s)");
        1
    } else {
        if !options.json {
            println!("check passed: {}", config.root.display());
        }
        0
    }
}

fn banner() -> String {
    "=".repeat(BANNER_WIDTH)
}

pub fn render_chapter(outcome: &ChapterOutcome) -> String {
    let mut out = String::new();
    match outcome {
        ChapterOutcome::Skipped { chapter_dir, .. } => {
            let _ = writeln!(out, "❌ No concept-map.yml in {}", chapter_dir.display());
        }
        ChapterOutcome::Repaired(report) => {
            let _ = writeln!(out, "\n{}", banner());
            let _ = writeln!(out, "Processing: {}", report.chapter);
            let _ = writeln!(out, "{}", banner());
            for action in &report.actions {
                match action {
                    RepairAction::Rewrite { from, to, .. } => {
                        let _ = writeln!(out, "  ✏️  Fixing path: {from} -> {to}");
                    }
                    RepairAction::CreateStub { reference, .. } => {
                        let _ = writeln!(out, "  📝 Creating stub: {reference}");
                    }
                }
            }
            if report.document_written {
                let _ = writeln!(out, "\n✅ Updated {}", report.concept_map.display());
            } else {
                let _ = writeln!(out, "\n⏭️  No path updates needed");
            }
            let _ = writeln!(
                out,
                "📊 Stats: {} paths fixed, {} stubs created",
                outcome.fixed_count(),
                outcome.stub_count()
            );
        }
    }
    out
}

pub fn render_summary(totals: &RunTotals) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", banner());
    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "{}", banner());
    let _ = writeln!(out, "Chapters processed: {}", totals.chapters);
    let _ = writeln!(out, "Total paths fixed: {}", totals.fixed);
    let _ = writeln!(out, "Total stubs created: {}", totals.created);
    let _ = writeln!(out, "✅ Done!");
    out
}
