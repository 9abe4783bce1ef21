//! Test helpers for composing ingest datasets and layered overrides.

use super::*;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

pub(super) const AUTHORS_DUMP: &str = concat!(
    "/type/author\t/authors/OL1A\t1\t2008-04-01T03:28:50.625462\t",
    "{\"key\":\"/authors/OL1A\",\"name\":\"Jane Doe\"}\n",
    "/type/author\t/authors/OL2A\t1\t2008-04-01T03:28:50.625462\t",
    "{\"key\":\"/authors/OL2A\",\"name\":\"John Roe\"}\n",
);

pub(super) const WORKS_DUMP: &str = concat!(
    "/type/work\t/works/OL1W\t2\t2009-10-15T11:34:21.437031\t",
    "{\"key\":\"/works/OL1W\",\"title\":\"Sample\",\"covers\":[101],",
    "\"authors\":[{\"author\":{\"key\":\"/authors/OL1A\"}}],",
    "\"created\":{\"type\":\"/type/datetime\",\"value\":\"2009-10-15T11:34:21.437031\"}}\n",
    "/type/work\t/works/OL2W\t1\t2009-10-15T11:34:21.437031\tnot json\n",
);

pub(super) fn write_utf8(path: &Utf8Path, contents: &str) {
    fs::write(path, contents).unwrap_or_else(|err| panic!("failed to write {path}: {err}"));
}

#[derive(Debug, Clone, Default)]
pub(super) struct LayerOverrides {
    pub(super) authors_dump: Option<Utf8PathBuf>,
    pub(super) works_dump: Option<Utf8PathBuf>,
    pub(super) database: Option<Utf8PathBuf>,
}

/// Dumps on disk for each configuration layer, plus a database location.
#[derive(Debug)]
pub(super) struct DatasetFiles {
    _dir: TempDir,
    root: Utf8PathBuf,
    cli_authors: Utf8PathBuf,
    cli_works: Utf8PathBuf,
    config_authors: Utf8PathBuf,
    config_works: Utf8PathBuf,
    env_works: Utf8PathBuf,
}

impl DatasetFiles {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root =
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp directory");
        let cli_authors = root.join("cli_authors.txt");
        let cli_works = root.join("cli_works.txt");
        let config_authors = root.join("config_authors.txt");
        let config_works = root.join("config_works.txt");
        let env_works = root.join("env_works.txt");
        for path in [&cli_authors, &config_authors] {
            write_utf8(path, AUTHORS_DUMP);
        }
        for path in [&cli_works, &config_works, &env_works] {
            write_utf8(path, WORKS_DUMP);
        }
        Self {
            _dir: dir,
            root,
            cli_authors,
            cli_works,
            config_authors,
            config_works,
            env_works,
        }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn authors(&self) -> &Utf8Path {
        &self.cli_authors
    }

    pub(super) fn works(&self) -> &Utf8Path {
        &self.cli_works
    }

    pub(super) fn config_authors(&self) -> &Utf8Path {
        &self.config_authors
    }

    pub(super) fn config_works(&self) -> &Utf8Path {
        &self.config_works
    }

    pub(super) fn env_works(&self) -> &Utf8Path {
        &self.env_works
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.root.join("catalogue").join("shelf.db")
    }
}

pub(super) fn merge_layers(
    mut cli_args: IngestArgs,
    file_layer: Option<LayerOverrides>,
    env_layer: Option<LayerOverrides>,
) -> Result<IngestConfig, CliError> {
    merge_field(
        &mut cli_args.authors_dump,
        extract_field(&env_layer, |layer| &layer.authors_dump),
        extract_field(&file_layer, |layer| &layer.authors_dump),
    );
    merge_field(
        &mut cli_args.works_dump,
        extract_field(&env_layer, |layer| &layer.works_dump),
        extract_field(&file_layer, |layer| &layer.works_dump),
    );
    merge_field(
        &mut cli_args.database,
        extract_field(&env_layer, |layer| &layer.database),
        extract_field(&file_layer, |layer| &layer.database),
    );
    resolve_ingest_config(cli_args)
}

fn merge_field<T: Clone>(target: &mut Option<T>, env_value: Option<T>, file_value: Option<T>) {
    if target.is_none()
        && let Some(value) = env_value.or(file_value)
    {
        *target = Some(value);
    }
}

fn extract_field<T: Clone>(
    layer: &Option<LayerOverrides>,
    accessor: fn(&LayerOverrides) -> &Option<T>,
) -> Option<T> {
    layer.as_ref().and_then(|entry| accessor(entry).clone())
}
