//! End-to-end runs over a data project on disk with the real adapters.

use std::fs;
use std::path::Path;

use gantry_adapters::{LocalFilesystem, MiniJinjaRenderer, OverridingTemplateResolver, SymbolTypeSource};
use gantry_core::prelude::*;

const DATA: &str = r#"
    #[db_context]
    pub struct AppDb {
        pub people: DbSet<Person>,
        pub cases: DbSet<Case>,
    }

    #[read(allow_anonymous)]
    pub struct Person {
        pub person_id: i32,
        pub first_name: String,
        #[read("HR")]
        pub salary: Option<f64>,
        pub cases: Vec<Case>,
    }

    impl Person {
        #[method]
        pub fn change_name(&mut self, first_name: String) -> Person {
            todo!()
        }
    }

    #[delete(deny_all)]
    pub struct Case {
        pub case_id: i64,
        pub title: String,
        pub status: Status,
        #[foreign_key("AssignedTo")]
        pub assigned_to_id: Option<i32>,
        pub assigned_to: Option<Person>,
    }

    pub enum Status { Open, Closed }

    pub struct OpenCases;
    impl DataSource<Case> for OpenCases {}
"#;

fn project(dir: &Path) -> std::path::PathBuf {
    let data = dir.join("data");
    fs::create_dir_all(data.join("src")).unwrap();
    fs::write(data.join("src/lib.rs"), DATA).unwrap();
    data
}

fn service(overrides: Option<&Path>) -> GenerationService {
    let resolver = match overrides {
        Some(dir) => OverridingTemplateResolver::with_overrides(dir),
        None => OverridingTemplateResolver::new(),
    };
    GenerationService::new(
        Box::new(LocalFilesystem::new()),
        Box::new(resolver.clone()),
        Box::new(MiniJinjaRenderer::with_resolver(resolver)),
    )
}

fn tree(data: &Path) -> GeneratorNode {
    tree_with(data, &TreeOptions::default())
}

fn tree_with(data: &Path, options: &TreeOptions) -> GeneratorNode {
    let source = SymbolTypeSource::load(data).unwrap();
    let analysis = AnalysisService::new(Box::new(source)).analyze(None).unwrap();
    build_tree(&analysis, options).unwrap()
}

#[test]
fn embedded_templates_render_the_whole_tree() {
    let dir = tempfile::tempdir().unwrap();
    let data = project(dir.path());
    let web = dir.path().join("web");

    let report = service(None)
        .run(&tree(&data), &web, &GenerationOptions::default(), &CancellationToken::new())
        .unwrap();

    assert!(report.failures.is_empty(), "{:?}", report.failures);
    for file in [
        "src/generated/person_controller.g.rs",
        "src/generated/case_dto.g.rs",
        "src/generated/metadata.g.json",
        "src/generated/models.g.ts",
        "src/generated/viewmodels.g.ts",
        "scripts/generated/ko.Case.g.ts",
        "scripts/generated/ko.PersonList.g.ts",
    ] {
        assert!(web.join(file).is_file(), "{file} was not written");
    }

    let controller = fs::read_to_string(web.join("src/generated/case_controller.g.rs")).unwrap();
    assert!(controller.contains("pub struct CaseListParameters"));
    assert!(controller.contains("\"/api/case/save\""));
    assert!(!controller.contains("/api/case/delete"));

    let person = fs::read_to_string(web.join("src/generated/person_controller.g.rs")).unwrap();
    assert!(person.contains("#[allow_anonymous]"));
    assert!(person.contains("pub async fn change_name"));

    let models = fs::read_to_string(web.join("src/generated/models.g.ts")).unwrap();
    assert!(models.contains("export enum Status"));
    assert!(models.contains("class OpenCases"));
}

#[test]
fn second_run_is_a_no_op_and_stale_files_go() {
    let dir = tempfile::tempdir().unwrap();
    let data = project(dir.path());
    let web = dir.path().join("web");
    let tree = tree(&data);
    let options = GenerationOptions::default();

    service(None)
        .run(&tree, &web, &options, &CancellationToken::new())
        .unwrap();
    fs::write(web.join("src/generated/old_controller.g.rs"), "// stale").unwrap();
    fs::write(web.join("src/generated/old-clients.g.ts"), "// stale").unwrap();
    fs::write(web.join("src/generated/notes.md"), "scratch").unwrap();
    fs::create_dir_all(web.join("src/generated/custom")).unwrap();
    fs::write(web.join("src/generated/custom/hand_written.rs"), "// mine").unwrap();

    let report = service(None)
        .run(&tree, &web, &options, &CancellationToken::new())
        .unwrap();

    assert!(report.generated.is_empty(), "{:?}", report.generated);
    assert!(!report.unchanged.is_empty());
    assert!(!web.join("src/generated/old_controller.g.rs").exists());
    assert!(!web.join("src/generated/old-clients.g.ts").exists());
    assert!(web.join("src/generated/notes.md").exists());
    assert_eq!(report.deleted.len(), 2);
    assert!(web.join("src/generated/custom/hand_written.rs").exists());
}

#[test]
fn broken_override_fails_only_its_leaves() {
    let dir = tempfile::tempdir().unwrap();
    let data = project(dir.path());
    let web = dir.path().join("web");
    let overrides = dir.path().join("templates");
    let tree = tree(&data);

    service(None)
        .run(&tree, &web, &GenerationOptions::default(), &CancellationToken::new())
        .unwrap();
    let before = fs::read_to_string(web.join("src/generated/person_dto.g.rs")).unwrap();

    fs::create_dir_all(overrides.join("server")).unwrap();
    fs::write(overrides.join("server/dto.rs.j2"), "{{ no_such_field.name }}").unwrap();

    let report = service(Some(&overrides))
        .run(&tree, &web, &GenerationOptions::default(), &CancellationToken::new())
        .unwrap();

    assert!(!report.failures.is_empty());
    assert!(report.failures.iter().all(|f| f.generator.ends_with("Dto")));
    assert_eq!(
        fs::read_to_string(web.join("src/generated/person_dto.g.rs")).unwrap(),
        before
    );
    assert!(report.deleted.is_empty());
}

#[test]
fn single_suite_run_keeps_the_other_suites_output() {
    let dir = tempfile::tempdir().unwrap();
    let data = project(dir.path());
    let web = dir.path().join("web");
    let options = GenerationOptions::default();

    service(None)
        .run(&tree(&data), &web, &options, &CancellationToken::new())
        .unwrap();

    let server_only = tree_with(
        &data,
        &TreeOptions {
            suites: vec![SuiteKind::Server],
            ..TreeOptions::default()
        },
    );
    let report = service(None)
        .run(&server_only, &web, &options, &CancellationToken::new())
        .unwrap();
    assert!(report.deleted.is_empty(), "{:?}", report.deleted);

    let without_vue = GenerationOptions {
        disabled: ["Vue".to_string()].into(),
        ..GenerationOptions::default()
    };
    let report = service(None)
        .run(&tree(&data), &web, &without_vue, &CancellationToken::new())
        .unwrap();
    assert!(report.deleted.is_empty(), "{:?}", report.deleted);

    for file in ["models.g.ts", "api-clients.g.ts", "viewmodels.g.ts", "metadata.g.ts"] {
        assert!(web.join("src/generated").join(file).is_file(), "{file} was removed");
    }
}

#[cfg(unix)]
#[test]
fn cleanup_never_follows_links_out_of_the_output() {
    let dir = tempfile::tempdir().unwrap();
    let data = project(dir.path());
    let web = dir.path().join("web");
    let outside = dir.path().join("precious");
    fs::create_dir_all(&outside).unwrap();
    fs::write(outside.join("thesis.g.ts"), "irreplaceable").unwrap();

    let tree = tree(&data);
    service(None)
        .run(&tree, &web, &GenerationOptions::default(), &CancellationToken::new())
        .unwrap();
    let link = web.join("scripts/generated/link");
    std::os::unix::fs::symlink(&outside, &link).unwrap();

    let report = service(None)
        .run(&tree, &web, &GenerationOptions::default(), &CancellationToken::new())
        .unwrap();

    assert!(report.deleted.is_empty(), "{:?}", report.deleted);
    assert!(outside.join("thesis.g.ts").is_file());
    assert!(fs::symlink_metadata(&link).is_ok());
}

#[test]
fn override_can_extend_the_embedded_template() {
    let dir = tempfile::tempdir().unwrap();
    let data = project(dir.path());
    let web = dir.path().join("web");
    let overrides = dir.path().join("templates");
    fs::create_dir_all(overrides.join("knockout")).unwrap();
    fs::write(
        overrides.join("knockout/viewmodel.g.ts.j2"),
        "{% extends \"embedded/knockout/viewmodel.g.ts.j2\" %}\n{% block header %}\n// House header\n{% endblock %}\n",
    )
    .unwrap();

    let report = service(Some(&overrides))
        .run(&tree(&data), &web, &GenerationOptions::default(), &CancellationToken::new())
        .unwrap();

    assert!(report.failures.is_empty(), "{:?}", report.failures);
    let case = fs::read_to_string(web.join("scripts/generated/ko.Case.g.ts")).unwrap();
    assert!(case.starts_with("// House header\n"), "{case}");
    assert!(case.contains("export class Case extends Gantry.BaseViewModel"));
    assert!(!case.contains("Do not edit"));
}
