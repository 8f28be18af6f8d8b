use anyhow::Result;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::externals::ExternalLibraryCollector;
use super::graph::build_dependency_graph;
use super::module_map::ModuleMap;
use super::scanner::{FileScanner, SourceFile};
use super::{AnalysisResult, FileEntity};
use crate::config::Config;
use crate::parsers::{cache::ParseCache, python::PythonParser, LanguageParser};

enum ParseOutcome {
    Cached(FileEntity),
    Parsed(FileEntity),
    Failed { path: String, message: String },
}

/// Runs the whole pipeline: scan, parse, map modules, resolve, count externals.
pub struct ProjectAnalyzer {
    root_directory: PathBuf,
    root_namespace: String,
    internal_prefixes: Vec<String>,
    file_scanner: FileScanner,
    parser: PythonParser,
    parse_cache: Option<ParseCache>,
}

impl ProjectAnalyzer {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            root_directory: config.root_directory.clone(),
            root_namespace: config.root_namespace.clone(),
            internal_prefixes: config.internal_prefixes.clone(),
            file_scanner: FileScanner::new(&config.ignore_patterns)?,
            parser: PythonParser::new()?,
            parse_cache: None,
        })
    }

    pub fn with_cache(mut self, parse_cache: ParseCache) -> Self {
        self.parse_cache = Some(parse_cache);
        self
    }

    pub fn analyze(&self) -> Result<AnalysisResult> {
        info!("scanning {}", self.root_directory.display());
        let sources = self.file_scanner.scan_directory(&self.root_directory)?;
        info!("found {} python files", sources.len());

        // Collecting an indexed parallel iterator keeps discovery order.
        let outcomes: Vec<ParseOutcome> = sources
            .par_iter()
            .map(|source| self.parse_source_file(source))
            .collect();

        let mut result = AnalysisResult::new();
        let mut cached_count = 0usize;
        for outcome in outcomes {
            match outcome {
                ParseOutcome::Cached(file) => {
                    cached_count += 1;
                    result.insert_file(file);
                }
                ParseOutcome::Parsed(file) => result.insert_file(file),
                ParseOutcome::Failed { path, message } => {
                    warn!("skipping {}: {}", path, message);
                    result.warn(path, message);
                }
            }
        }
        info!(
            "parsed {} files ({} from cache, {} skipped)",
            result.files.len(),
            cached_count,
            result.warnings.len()
        );

        let modules = ModuleMap::from_files(&result.files, &self.root_namespace);
        debug!("module map holds {} names", modules.len());

        let stats = build_dependency_graph(&mut result, &modules);
        info!(
            "resolved {} dependency edges ({} from imports, {} from usage)",
            stats.total_edges(),
            stats.import_edges,
            stats.usage_edges
        );

        result.external_libraries = ExternalLibraryCollector::new(&self.internal_prefixes)
            .with_modules(&modules)
            .collect(result.files.values());
        info!(
            "found {} external libraries",
            result.external_libraries.len()
        );

        Ok(result)
    }

    fn parse_source_file(&self, source: &SourceFile) -> ParseOutcome {
        if let Some(cache) = &self.parse_cache {
            match cache.needs_update(&source.path) {
                Ok(false) => {
                    if let Some(file) = cache.get(&source.path, &source.relative_path) {
                        return ParseOutcome::Cached(file);
                    }
                }
                Ok(true) => {}
                Err(err) => debug!(
                    "failed to validate cache entry for {}: {}",
                    source.relative_path, err
                ),
            }
        }

        match self.parser.parse_file(&source.path, &source.relative_path) {
            Ok(file) => {
                if let Some(cache) = &self.parse_cache {
                    if let Err(err) = cache.store(&source.path, &file) {
                        debug!("failed to cache {}: {}", source.relative_path, err);
                    }
                }
                ParseOutcome::Parsed(file)
            }
            Err(err) => ParseOutcome::Failed {
                path: source.relative_path.clone(),
                message: err.to_string(),
            },
        }
    }
}
