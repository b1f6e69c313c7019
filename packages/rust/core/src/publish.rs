//! End-to-end publish pipeline: authored source → article, brief, media.
//!
//! Stages run strictly in order for one stem at a time: copy or convert,
//! excerpt, relocate media, rasterize formulas. Formula rasterization is
//! always last so relocation never touches freshly written formula
//! references. Any stage error fails the stem and skips the rest.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

use pressrun_content as content;
use pressrun_shared::{
    PressrunConfig, PressrunError, PublishPaths, PublishStage, Result, SourceKind, Stem,
};
use pressrun_tools::{FormulaRasterizer, NotebookConverter, ToolRunner};

use crate::media;

// ---------------------------------------------------------------------------
// Publish config & result
// ---------------------------------------------------------------------------

/// Configuration for the publish pipeline.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Directory layout.
    pub paths: PublishPaths,
    /// Notebook converter program.
    pub converter: String,
    /// Formula rasterizer program.
    pub rasterizer: String,
    /// Scratch directory the rasterizer writes into.
    pub scratch_dir: PathBuf,
    /// Per-invocation deadline for external tools.
    pub timeout: Duration,
}

impl PublishConfig {
    /// Build the runtime pipeline config from the loaded application config.
    pub fn from_config(config: &PressrunConfig) -> Self {
        Self {
            paths: PublishPaths::from(config),
            converter: config.tools.converter.clone(),
            rasterizer: config.tools.rasterizer.clone(),
            scratch_dir: config.tools.scratch_dir(),
            timeout: Duration::from_secs(config.tools.timeout_secs),
        }
    }
}

/// Result of publishing one stem.
#[derive(Debug)]
pub struct PublishReport {
    /// The published stem.
    pub stem: Stem,
    /// Kind of source document.
    pub kind: SourceKind,
    /// Path of the written article.
    pub article_path: PathBuf,
    /// Path of the written brief.
    pub brief_path: PathBuf,
    /// Figures copied into the media directory (exported + staged).
    pub figures_copied: usize,
    /// Formula markers rasterized and substituted.
    pub formulas_rasterized: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Result of a batch run over the sources directory.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successfully published stems, in name order.
    pub reports: Vec<PublishReport>,
    /// Sources that failed, with their errors. The batch keeps going.
    pub failures: Vec<(PathBuf, PressrunError)>,
}

/// Progress callback for reporting pipeline status.
pub trait PublishProgress: Send + Sync {
    /// Called when a stem reaches a stage.
    fn stage(&self, stem: &Stem, stage: PublishStage);
    /// Called when a stem finishes publishing.
    fn done(&self, report: &PublishReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl PublishProgress for SilentProgress {
    fn stage(&self, _stem: &Stem, _stage: PublishStage) {}
    fn done(&self, _report: &PublishReport) {}
}

// ---------------------------------------------------------------------------
// Publish pipeline
// ---------------------------------------------------------------------------

/// Publish one source document end to end.
///
/// 1. Copy (plain) or convert (notebook) into the articles directory
/// 2. Write the brief from the excerpted document body
/// 3. Relocate media references and copy figures into place
/// 4. Rasterize formula markers (always last)
///
/// Artifacts are regenerated from the source on every run; nothing is
/// rolled back on failure, and re-publishing the stem is the recovery
/// path.
#[instrument(skip_all, fields(source = %source.display()))]
pub fn publish(
    config: &PublishConfig,
    runner: &dyn ToolRunner,
    source: &Path,
    progress: &dyn PublishProgress,
) -> Result<PublishReport> {
    let start = Instant::now();

    if !source.is_file() {
        return Err(PressrunError::source_not_found(source));
    }
    let stem = Stem::from_path(source)?;
    let kind = SourceKind::from_path(source)?;

    info!(%stem, kind = kind.as_str(), "starting publish");

    media::ensure_dir(&config.paths.articles)?;
    media::ensure_dir(&config.paths.briefs)?;
    media::ensure_dir(&config.paths.media)?;

    // Stale stem-owned media goes first so regeneration cannot leave
    // orphans from a previous version of the document.
    media::clean_stem_media(&config.paths.media, &stem)?;

    let article_path = config
        .paths
        .articles
        .join(format!("{stem}.{}", kind.article_extension()));
    let brief_path = config.paths.briefs.join(format!("{stem}.md"));

    // --- Stage 1+2: copy/convert, then excerpt ---
    let mut figures_copied = 0;
    match kind {
        SourceKind::Plain => {
            let body = media::read_document(source)?;
            media::write_document(&article_path, &body)?;
            progress.stage(&stem, PublishStage::Copied);

            media::write_document(&brief_path, &content::excerpt(&body))?;
            progress.stage(&stem, PublishStage::Excerpted);
        }
        SourceKind::Notebook => {
            figures_copied +=
                convert_notebook(config, runner, source, &stem, &brief_path, progress)?;
        }
    }

    // --- Stage 3: media relocation ---
    if kind == SourceKind::Notebook {
        media::rewrite_document(&article_path, |text| {
            content::relocate_figures(text, stem.as_str(), &config.paths.media_url_prefix)
        })?;
    }
    figures_copied +=
        media::copy_staged_figures(&config.paths.raw_media, &config.paths.media, &stem)?;
    media::rewrite_document(&article_path, |text| {
        content::relocate_media_lines(text, &config.paths.media_url_prefix)
    })?;
    progress.stage(&stem, PublishStage::MediaRelocated);

    // --- Stage 4: formula rasterization, always last ---
    let formulas_rasterized = rasterize_formulas(config, runner, &article_path, &stem)?;
    progress.stage(&stem, PublishStage::FormulaRasterized);

    let report = PublishReport {
        stem: stem.clone(),
        kind,
        article_path,
        brief_path,
        figures_copied,
        formulas_rasterized,
        elapsed: start.elapsed(),
    };
    progress.stage(&stem, PublishStage::Done);
    progress.done(&report);

    info!(
        %stem,
        kind = kind.as_str(),
        figures = report.figures_copied,
        formulas = report.formulas_rasterized,
        elapsed_ms = report.elapsed.as_millis(),
        "publish complete"
    );

    Ok(report)
}

/// Publish every recognized source in the sources directory, in name
/// order. A failing stem is recorded and the batch keeps going.
#[instrument(skip_all, fields(sources = %config.paths.sources.display()))]
pub fn publish_all(
    config: &PublishConfig,
    runner: &dyn ToolRunner,
    progress: &dyn PublishProgress,
) -> Result<BatchReport> {
    let sources_dir = &config.paths.sources;
    let entries =
        std::fs::read_dir(sources_dir).map_err(|e| PressrunError::io(sources_dir, e))?;

    let mut sources: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PressrunError::io(sources_dir, e))?;
        let path = entry.path();
        if path.is_file() && SourceKind::from_path(&path).is_ok() {
            sources.push(path);
        } else {
            debug!(path = %path.display(), "skipping non-source entry");
        }
    }
    sources.sort();

    let mut batch = BatchReport::default();
    for source in sources {
        match publish(config, runner, &source, progress) {
            Ok(report) => batch.reports.push(report),
            Err(e) => {
                warn!(source = %source.display(), error = %e, "publish failed, continuing batch");
                batch.failures.push((source, e));
            }
        }
    }

    info!(
        published = batch.reports.len(),
        failed = batch.failures.len(),
        "batch publish complete"
    );
    Ok(batch)
}

// ---------------------------------------------------------------------------
// Notebook rendering
// ---------------------------------------------------------------------------

/// Render a notebook: HTML article into the articles directory, Markdown
/// intermediate into a per-run workspace for excerpting, exported
/// figures into the media directory.
///
/// The workspace is destroyed when `workspace` drops, on every exit path.
fn convert_notebook(
    config: &PublishConfig,
    runner: &dyn ToolRunner,
    source: &Path,
    stem: &Stem,
    brief_path: &Path,
    progress: &dyn PublishProgress,
) -> Result<usize> {
    let converter = NotebookConverter::new(runner, config.converter.as_str(), config.timeout);

    converter.to_html(source, &config.paths.articles)?;

    media::ensure_dir(&config.paths.workspace)?;
    let workspace = TempDir::new_in(&config.paths.workspace)
        .map_err(|e| PressrunError::io(&config.paths.workspace, e))?;

    converter.to_markdown(source, workspace.path())?;
    progress.stage(stem, PublishStage::Converted);

    let intermediate = workspace.path().join(format!("{stem}.md"));
    let body = media::read_document(&intermediate)?;
    media::write_document(brief_path, &content::excerpt(&body))?;
    progress.stage(stem, PublishStage::Excerpted);

    let figures_dir = workspace.path().join(stem.figures_dirname());
    let copied = media::copy_dir_files(&figures_dir, &config.paths.media)?;
    debug!(%stem, copied, "collected exported figures");

    Ok(copied)
}

// ---------------------------------------------------------------------------
// Formula rasterization
// ---------------------------------------------------------------------------

/// Replace each formula marker in the article with an image reference,
/// regenerating the numbered PNG for each occurrence in document order.
///
/// Every substitution is applied in one pass after all rasterizations
/// have succeeded: a failing tool leaves the article unrewritten (the
/// already regenerated images stay and are reclaimed by the next run).
fn rasterize_formulas(
    config: &PublishConfig,
    runner: &dyn ToolRunner,
    article_path: &Path,
    stem: &Stem,
) -> Result<usize> {
    let text = media::read_document(article_path)?;
    let matches = content::scan_formulas(&text);
    if matches.is_empty() {
        return Ok(0);
    }

    let rasterizer = FormulaRasterizer::new(runner, config.rasterizer.as_str(), config.timeout);
    media::ensure_dir(&config.scratch_dir)?;

    let mut replacements = Vec::with_capacity(matches.len());
    for (index, found) in matches.iter().enumerate() {
        let image = stem.formula_image(index);
        let published = config.paths.media.join(&image);
        media::remove_if_present(&published)?;

        let scratch = config.scratch_dir.join(&image);
        rasterizer.rasterize(&found.formula, &scratch)?;
        media::move_file(&scratch, &published)?;

        replacements.push(format!(
            "\n![formula]({}{image})\n",
            config.paths.media_url_prefix
        ));
    }

    let rewritten = content::substitute_formulas(&text, &matches, &replacements);
    media::write_document(article_path, &rewritten)?;

    info!(%stem, count = matches.len(), "formulas rasterized");
    Ok(matches.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
