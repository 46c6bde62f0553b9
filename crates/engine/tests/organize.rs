//! End-to-end runs through the public API: collect, analyze, plan, execute.

use arrange_engine::{
    AnalyzeOptions, CollectOptions, ExecuteOptions, Executor, LinkKind, Mode, Normalizer, PlanBuilder,
    SidecarAnalyzer, Status, Summary, analyze_all, collect,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

struct Workspace {
    _dir: TempDir,
    input: PathBuf,
    output: PathBuf,
}

fn workspace(files: &[(&str, &str)]) -> Workspace {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input");
    for (relative, contents) in files {
        let path = input.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    let output = dir.path().join("output");
    Workspace { _dir: dir, input, output }
}

fn snapshot(root: &Path) -> HashMap<PathBuf, Vec<u8>> {
    let mut files = HashMap::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.insert(path.clone(), fs::read(path).unwrap());
            }
        }
    }
    files
}

fn destinations(plan: &arrange_engine::Plan) -> Vec<&Path> {
    plan.operations().iter().map(|op| op.destination()).collect()
}

#[tokio::test]
async fn duplicate_names_in_type_mode() {
    let ws = workspace(&[("q1/report.pdf", "first"), ("q2/report.pdf", "second")]);
    let collection = collect(&[ws.input.clone()], &CollectOptions::default()).await.unwrap();
    let plan = PlanBuilder::new().build(&collection.files, &*Mode::Type.strategy(Normalizer::default()));
    assert_eq!(
        destinations(&plan),
        [Path::new("text_files/pdf_files/report.pdf"), Path::new("text_files/pdf_files/report_1.pdf")]
    );

    let plan = Executor::new(&ws.output, ExecuteOptions::default()).unwrap().execute(plan).await.unwrap();
    assert!(plan.operations().iter().all(|op| op.status() == &Status::Succeeded));
    assert_eq!(fs::read_to_string(ws.output.join("text_files/pdf_files/report.pdf")).unwrap(), "first");
    assert_eq!(fs::read_to_string(ws.output.join("text_files/pdf_files/report_1.pdf")).unwrap(), "second");
}

#[tokio::test]
async fn duplicate_names_at_the_length_limit() {
    let name = format!("{}.pdf", "x".repeat(251));
    let ws = workspace(&[(&format!("a/{name}"), "first"), (&format!("b/{name}"), "second")]);
    let collection = collect(&[ws.input.clone()], &CollectOptions::default()).await.unwrap();
    let plan = PlanBuilder::new().build(&collection.files, &*Mode::Type.strategy(Normalizer::default()));
    for op in plan.operations() {
        assert!(op.destination().file_name().unwrap().len() <= arrange_engine::MAX_COMPONENT_BYTES);
    }

    let plan = Executor::new(&ws.output, ExecuteOptions::default()).unwrap().execute(plan).await.unwrap();
    assert!(Summary::from(&plan).is_complete());
}

#[tokio::test]
async fn null_analysis_in_content_mode() {
    let ws = workspace(&[("IMG_0001.jpg", "a"), ("IMG_0002.jpg", "b"), ("tax.pdf", "c")]);
    let sidecar = r#"{
        "IMG_0001.jpg": { "category": "Beach Holidays", "description": "A photo of people on a sunny beach" },
        "IMG_0002.jpg": null,
        "tax.pdf": { "category": "Taxes", "suggested_name": "Tax Return 2023" }
    }"#;
    let analyzer = SidecarAnalyzer::from_json(sidecar, &ws.input).unwrap();

    let collection = collect(&[ws.input.clone()], &CollectOptions::default()).await.unwrap();
    let outcome = analyze_all(collection.files, &analyzer, &AnalyzeOptions::default()).await;
    assert_eq!(outcome.diagnostics.len(), 1);

    let strategy = Mode::Content.strategy(Normalizer::default());
    let plan = PlanBuilder::new().diagnostics(outcome.diagnostics).build(&outcome.files, &*strategy);
    assert_eq!(
        destinations(&plan),
        [
            Path::new("Beach_Holidays/people_sunny_beach.jpg"),
            Path::new("Others/IMG_0002.jpg"),
            Path::new("Taxes/tax_return_2023.pdf"),
        ]
    );
    assert_eq!(Summary::from(&plan).degraded, 1);
}

#[tokio::test]
async fn date_mode_groups_by_month() {
    let ws = workspace(&[("scan.png", "x")]);
    let modified = filetime::FileTime::from_unix_time(1_710_000_000, 0); // 2024-03-09 UTC
    filetime::set_file_mtime(ws.input.join("scan.png"), modified).unwrap();
    let collection = collect(&[ws.input.clone()], &CollectOptions::default()).await.unwrap();
    let plan = PlanBuilder::new().build(&collection.files, &*Mode::Date.strategy(Normalizer::default()));
    assert_eq!(destinations(&plan), [Path::new("2024/March/scan.png")]);
}

#[tokio::test]
async fn planning_is_idempotent() {
    let ws = workspace(&[("a.txt", "1"), ("b/a.txt", "2"), ("c/A.TXT", "3"), ("d.bin", "4")]);
    let collection = collect(&[ws.input.clone()], &CollectOptions::default()).await.unwrap();
    for mode in [Mode::Content, Mode::Date, Mode::Type] {
        let strategy = mode.strategy(Normalizer::default());
        let first = PlanBuilder::new().build(&collection.files, &*strategy);
        let second = PlanBuilder::new().build(&collection.files, &*strategy);
        assert_eq!(first, second);
    }
}

#[tokio::test]
async fn sources_are_never_modified() {
    let ws = workspace(&[("a.txt", "alpha"), ("nested/b.md", "beta"), ("c.xyz", "gamma")]);
    let before = snapshot(&ws.input);
    let collection = collect(&[ws.input.clone()], &CollectOptions::default()).await.unwrap();

    for link in [LinkKind::Hardlink, LinkKind::Copy] {
        let output = ws.output.join(link.to_string());
        let plan = PlanBuilder::new().link(link).build(&collection.files, &*Mode::Type.strategy(Normalizer::default()));
        let options = ExecuteOptions { verify_copies: true };
        let plan = Executor::new(&output, options).unwrap().execute(plan).await.unwrap();
        assert!(Summary::from(&plan).is_complete());
    }
    assert_eq!(snapshot(&ws.input), before);
}

#[tokio::test]
async fn rerun_avoids_existing_files() {
    let ws = workspace(&[("a.txt", "1")]);
    let collection = collect(&[ws.input.clone()], &CollectOptions::default()).await.unwrap();
    let strategy = Mode::Type.strategy(Normalizer::default());
    let executor = Executor::new(&ws.output, ExecuteOptions::default()).unwrap();

    let first = executor.execute(PlanBuilder::new().build(&collection.files, &*strategy)).await.unwrap();
    let second = PlanBuilder::new().with_existing(&ws.output).await.unwrap().build(&collection.files, &*strategy);
    assert_eq!(destinations(&first), [Path::new("text_files/plain_text_files/a.txt")]);
    assert_eq!(destinations(&second), [Path::new("text_files/plain_text_files/a_1.txt")]);
    let second = executor.execute(second).await.unwrap();
    assert!(Summary::from(&second).is_complete());
}

#[tokio::test]
async fn cancelled_before_start_applies_nothing() {
    let ws = workspace(&[("a.txt", "1"), ("b.txt", "2")]);
    let collection = collect(&[ws.input.clone()], &CollectOptions::default()).await.unwrap();
    let plan = PlanBuilder::new().build(&collection.files, &*Mode::Type.strategy(Normalizer::default()));
    let executor = Executor::new(&ws.output, ExecuteOptions::default()).unwrap();
    executor.cancellation().cancel();
    let plan = executor.execute(plan).await.unwrap();
    let summary = Summary::from(&plan);
    assert_eq!((summary.succeeded, summary.pending), (0, 2));
    assert!(!plan.is_spent());
}
