use clap::Parser;
use std::io::Write;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod affected;
mod analysis;
mod cli;
mod normalize;
mod report;
mod vcs;

use analysis::AnalysisError;
use cli::Args;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,impact_detector={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args, out: &mut impl Write) -> Result<(), AnalysisError> {
    let options = args.analysis_options()?;
    let root = affected::canonical_root(&args.repo)?;

    let changes = match (&args.commit, &args.changes) {
        (Some(commit), _) => vcs::changed_files(&root, commit)?,
        (None, Some(list)) => vcs::read_change_list(list)?,
        (None, None) => {
            return Err(AnalysisError::Config("either --commit or --changes is required".into()))
        }
    };
    info!(count = changes.len(), "found changed files");
    for change in &changes {
        debug!(path = %change.path.display(), kind = %change.kind, "changed");
    }

    if changes.is_empty() {
        report::render_no_changes(out, args.format)?;
        return Ok(());
    }

    let analysis = analysis::analyze(&root, &changes, &options)?;

    if let Some(path) = &args.dump_graph {
        let adjacency = analysis.built.graph.to_adjacency(&analysis.built.root);
        report::write_graph(path, &adjacency)?;
        info!(path = %path.display(), "wrote dependency graph");
    }

    report::render(out, &analysis.report, args.format)?;
    Ok(())
}

#[allow(clippy::print_stderr)]
fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = run(&args, &mut out) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Arguments for analyzing the change list `changes` in `repo`.
    fn args(repo: &Path, changes: &Path, extra: &[&str]) -> Args {
        let mut list: Vec<OsString> = vec!["impact_detector".into(), "--repo".into()];
        list.push(repo.as_os_str().to_owned());
        list.push("--changes".into());
        list.push(changes.as_os_str().to_owned());
        list.extend(extra.iter().map(OsString::from));
        Args::try_parse_from(list).unwrap()
    }

    fn run_to_string(args: &Args) -> Result<String, AnalysisError> {
        let mut buf = Vec::new();
        run(args, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap())
    }

    #[test]
    fn change_list_run_prints_json_report() {
        let repo = tempdir().unwrap();
        write(repo.path(), "src/util.ts", "export const one = 1;");
        write(repo.path(), "src/util.spec.ts", "import { one } from './util';");
        let work = tempdir().unwrap();
        let list = work.path().join("changes.json");
        fs::write(&list, r#"[{"path": "src/util.ts", "kind": "modified"}]"#).unwrap();
        let graph = work.path().join("graph.json");

        let extra = ["--format", "json", "--dump-graph", graph.to_str().unwrap()];
        let args = args(repo.path(), &list, &extra);
        let output = run_to_string(&args).unwrap();

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["impactedTests"][0]["testName"], "src/util.spec.ts");
        assert_eq!(json["impactedTests"][0]["changeType"], "modified");

        let dumped: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&graph).unwrap()).unwrap();
        assert_eq!(dumped["src/util.ts"], serde_json::json!(["src/util.spec.ts"]));
    }

    #[test]
    fn empty_change_list_prints_notice() {
        let repo = tempdir().unwrap();
        let list = repo.path().join("changes.json");
        fs::write(&list, "[]").unwrap();

        let args = args(repo.path(), &list, &[]);
        let output = run_to_string(&args).unwrap();
        assert!(output.contains("No changed files found."));
    }

    #[test]
    fn missing_repo_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let args = args(&missing, &dir.path().join("changes.json"), &[]);
        assert!(matches!(run_to_string(&args), Err(AnalysisError::Build(_))));
    }
}
