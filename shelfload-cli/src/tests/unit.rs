//! Focused unit tests covering ingest CLI configuration validation.

use super::helpers::write_utf8;
use super::*;
use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::MergeComposer;
use rstest::{fixture, rstest};
use serde_json::json;
use tempfile::TempDir;

#[fixture]
fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

fn full_args() -> IngestArgs {
    IngestArgs {
        authors_dump: Some(Utf8PathBuf::from("authors.txt")),
        works_dump: Some(Utf8PathBuf::from("works.txt")),
        database: Some(Utf8PathBuf::from("shelf.db")),
        json: false,
    }
}

#[derive(Debug, Copy, Clone)]
enum MissingField {
    AuthorsDump,
    WorksDump,
    Database,
}

#[rstest]
#[case(MissingField::AuthorsDump, ARG_AUTHORS_DUMP, ENV_AUTHORS_DUMP)]
#[case(MissingField::WorksDump, ARG_WORKS_DUMP, ENV_WORKS_DUMP)]
#[case(MissingField::Database, ARG_DATABASE, ENV_DATABASE)]
fn converting_without_required_fields_errors(
    #[case] missing_field: MissingField,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let mut args = full_args();
    match missing_field {
        MissingField::AuthorsDump => args.authors_dump = None,
        MissingField::WorksDump => args.works_dump = None,
        MissingField::Database => args.database = None,
    }

    let err = IngestConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn missing_argument_message_names_flag_and_variable() {
    let err = CliError::MissingArgument {
        field: ARG_WORKS_DUMP,
        env: ENV_WORKS_DUMP,
    };
    assert_eq!(
        err.to_string(),
        "missing works-dump (set --works-dump or SHELFLOAD_CMDS_INGEST_WORKS_DUMP)"
    );
}

#[rstest]
fn validate_sources_reports_missing_files(workspace: (TempDir, Utf8PathBuf)) {
    let (_tmp, root) = workspace;
    let config = IngestConfig {
        authors_dump: root.join("missing-authors"),
        works_dump: root.join("missing-works"),
        database: root.join("shelf.db"),
        json: false,
    };

    let err = config.validate_sources().expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field, path } => {
            assert_eq!(field, ARG_AUTHORS_DUMP);
            assert_eq!(path, root.join("missing-authors"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn validate_sources_rejects_directories(workspace: (TempDir, Utf8PathBuf)) {
    let (_tmp, root) = workspace;
    let authors = root.join("authors.txt");
    write_utf8(&authors, "");
    let config = IngestConfig {
        authors_dump: authors,
        works_dump: root.clone(),
        database: root.join("shelf.db"),
        json: false,
    };

    let err = config
        .validate_sources()
        .expect_err("expected directory rejection");
    match err {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_WORKS_DUMP),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "authors_dump": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence(workspace: (TempDir, Utf8PathBuf)) {
    let (_tmp, root) = workspace;
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "authors_dump": root.join("file-authors.txt").as_str(),
            "works_dump": root.join("file-works.txt").as_str(),
            "database": root.join("file.db").as_str(),
            "json": true,
        }),
        None,
    );
    composer.push_environment(json!({
        "works_dump": root.join("env-works.txt").as_str(),
        "database": root.join("env.db").as_str(),
    }));
    composer.push_cli(json!({
        "database": root.join("cli.db").as_str(),
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.authors_dump, root.join("file-authors.txt"));
    assert_eq!(config.works_dump, root.join("env-works.txt"));
    assert_eq!(config.database, root.join("cli.db"));
    assert!(config.json);
}

#[rstest]
fn plan_carries_both_dump_paths() {
    let config = IngestConfig::try_from(full_args()).expect("complete args convert");
    let plan = config.plan();
    assert_eq!(plan.authors_dump, Utf8PathBuf::from("authors.txt"));
    assert_eq!(plan.works_dump, Utf8PathBuf::from("works.txt"));
}

#[rstest]
fn cli_parses_ingest_flags() {
    let cli = Cli::try_parse_from([
        "shelfload",
        "ingest",
        "--authors-dump",
        "a.txt.gz",
        "--works-dump",
        "w.txt.gz",
        "--database",
        "shelf.db",
        "--json",
    ])
    .expect("flags should parse");

    let Command::Ingest(args) = cli.command;
    assert_eq!(args.authors_dump.as_deref(), Some(Utf8Path::new("a.txt.gz")));
    assert_eq!(args.works_dump.as_deref(), Some(Utf8Path::new("w.txt.gz")));
    assert_eq!(args.database.as_deref(), Some(Utf8Path::new("shelf.db")));
    assert!(args.json);
}
