//! Resource extraction from directories of documents.
//!
//! One extraction pass turns a set of documents into an insertion-ordered map from
//! [`Identifier`] to decoded record. Per-document problems (unreadable file, malformed XML, no
//! matching resource, resource without id) are recorded as [`DocumentIssue`]s and logged; they
//! never abort the remaining documents.
//!
//! Ordering rules:
//! - directory entries are visited in file-name order
//! - Bundle entries are visited in document order
//! - a repeated identifier overwrites the earlier record in place (last write wins)

use crate::config::CoreConfig;
use crate::error::{DocumentIssue, IssueKind};
use crate::{ExtractError, ExtractResult};
use fhir::{
    locate, ConditionData, DiagnosticReportData, FhirResource, Identifier, ObservationData,
    Resolver, Resource, ResourceKind, SourceDocument,
};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};

/// The outcome of one extraction pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extraction<R> {
    /// Records keyed by id, in first-seen order.
    pub records: IndexMap<Identifier, R>,

    /// Problems with individual documents.
    pub issues: Vec<DocumentIssue>,

    /// Number of documents visited, including those that produced issues.
    pub documents: usize,
}

impl<R> Extraction<R> {
    pub fn new() -> Self {
        Self {
            records: IndexMap::new(),
            issues: Vec::new(),
            documents: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.get(id)
    }

    /// Issues that lost a document outright (unreadable or malformed).
    pub fn failures(&self) -> impl Iterator<Item = &DocumentIssue> {
        self.issues.iter().filter(|issue| issue.is_failure())
    }

    /// Fold a later pass into this one. Records from `other` win on identifier clashes.
    pub fn merge(&mut self, other: Extraction<R>) {
        self.records.extend(other.records);
        self.issues.extend(other.issues);
        self.documents += other.documents;
    }

    /// Convert every record, keeping ids, order and issues.
    pub fn map_records<T>(self, mut f: impl FnMut(R) -> T) -> Extraction<T> {
        Extraction {
            records: self
                .records
                .into_iter()
                .map(|(id, record)| (id, f(record)))
                .collect(),
            issues: self.issues,
            documents: self.documents,
        }
    }
}

impl<R> Default for Extraction<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts typed records from documents.
#[derive(Clone, Copy, Debug)]
pub struct Extractor<'cfg> {
    config: &'cfg CoreConfig,
}

impl<'cfg> Extractor<'cfg> {
    pub fn new(config: &'cfg CoreConfig) -> Self {
        Self { config }
    }

    /// List the documents in `dir` that carry the configured extension, sorted by file name.
    ///
    /// Sub-directories are not descended into.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::DirectoryRead`] if `dir` cannot be listed.
    pub fn document_paths(&self, dir: &Path) -> ExtractResult<Vec<PathBuf>> {
        let read_err = |source| ExtractError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            if !path.is_file() {
                continue;
            }
            if !self.config.is_document(&path) {
                tracing::debug!("skipping non-document file: {}", path.display());
                continue;
            }
            paths.push(path);
        }
        paths.sort();
        Ok(paths)
    }

    /// Extract every resource of kind `R` from the documents in `dir`.
    ///
    /// # Errors
    ///
    /// Only fails if `dir` itself cannot be listed; document-level problems become issues.
    pub fn extract_dir<R: FhirResource>(&self, dir: &Path) -> ExtractResult<Extraction<R>> {
        let paths = self.document_paths(dir)?;
        let extraction = self.extract_paths::<R>(&paths);
        tracing::info!(
            "extracted {} {} record(s) from {} document(s) in {} ({} issue(s), {} skipped)",
            extraction.len(),
            R::KIND,
            extraction.documents,
            dir.display(),
            extraction.issues.len(),
            extraction.failures().count()
        );
        Ok(extraction)
    }

    /// Extract from several directories in order; later directories win identifier clashes.
    pub fn extract_dirs<R, P>(&self, dirs: &[P]) -> ExtractResult<Extraction<R>>
    where
        R: FhirResource,
        P: AsRef<Path>,
    {
        let mut extraction = Extraction::new();
        for dir in dirs {
            extraction.merge(self.extract_dir::<R>(dir.as_ref())?);
        }
        Ok(extraction)
    }

    /// Extract from explicit document paths, in the given order.
    pub fn extract_paths<R: FhirResource>(&self, paths: &[PathBuf]) -> Extraction<R> {
        let namespace = self.config.namespace();
        let resolver = Resolver::new(namespace);
        let mut extraction = Extraction::new();

        for path in paths {
            extraction.documents += 1;
            match SourceDocument::read(path) {
                Ok(source) => Self::extract_source(&resolver, &source, &mut extraction),
                Err(err) => {
                    tracing::warn!("skipping document: {err}");
                    extraction
                        .issues
                        .push(DocumentIssue::new(path, IssueKind::from(&err)));
                }
            }
        }

        extraction
    }

    /// Extract from documents that are already in memory, in the given order.
    pub fn extract_sources<R: FhirResource>(&self, sources: &[SourceDocument]) -> Extraction<R> {
        let resolver = Resolver::new(self.config.namespace());
        let mut extraction = Extraction::new();
        for source in sources {
            extraction.documents += 1;
            Self::extract_source(&resolver, source, &mut extraction);
        }
        extraction
    }

    /// Extract resources of a kind chosen at runtime.
    pub fn extract_kind(&self, dir: &Path, kind: ResourceKind) -> ExtractResult<Extraction<Resource>> {
        Ok(match kind {
            ResourceKind::DiagnosticReport => self
                .extract_dir::<DiagnosticReportData>(dir)?
                .map_records(Resource::DiagnosticReport),
            ResourceKind::Condition => self
                .extract_dir::<ConditionData>(dir)?
                .map_records(Resource::Condition),
            ResourceKind::Observation => self
                .extract_dir::<ObservationData>(dir)?
                .map_records(Resource::Observation),
        })
    }

    fn extract_source<R: FhirResource>(
        resolver: &Resolver<'_>,
        source: &SourceDocument,
        extraction: &mut Extraction<R>,
    ) {
        let path = source.path();
        let doc = match source.parse() {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!("skipping malformed document: {err}");
                extraction
                    .issues
                    .push(DocumentIssue::new(path, IssueKind::from(&err)));
                return;
            }
        };

        let nodes = locate(resolver, &doc, R::KIND);
        if nodes.is_empty() {
            tracing::debug!("no {} resource in {}", R::KIND, path.display());
            extraction
                .issues
                .push(DocumentIssue::new(path, IssueKind::NoMatchingResource(R::KIND)));
            return;
        }

        for node in nodes {
            let record = R::decode(resolver, node);
            let id = match record.id().as_deref().map(Identifier::new) {
                Some(Ok(id)) => id,
                _ => {
                    tracing::warn!("{} without id in {} skipped", R::KIND, path.display());
                    extraction
                        .issues
                        .push(DocumentIssue::new(path, IssueKind::MissingIdentifier(R::KIND)));
                    continue;
                }
            };
            if extraction.records.insert(id.clone(), record).is_some() {
                tracing::debug!(
                    "{} {id} redefined in {}, keeping the later record",
                    R::KIND,
                    path.display()
                );
            }
        }
    }
}
