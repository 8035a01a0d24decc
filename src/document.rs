//! Pattern documents
//!
//! A document is the host-side container the engines never see: a page, a
//! set of guides and the figures drawn on it. It owns the relationships the
//! engines only describe, such as which seams belong to which piece.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use patternkit_core::DEFAULT_PX_PER_CM;
use patternkit_geometry::{
    is_stale, refresh_seam, validate, Figure, Guide, OffsetOptions, SnapContext, SnapOptions,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Newest document format this build reads and writes.
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSettings {
    pub width_cm: f64,
    pub height_cm: f64,
    pub px_per_cm: f64,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            width_cm: 150.0,
            height_cm: 100.0,
            px_per_cm: DEFAULT_PX_PER_CM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternDocument {
    pub version: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub page: PageSettings,
    #[serde(default)]
    pub guides: Vec<Guide>,
    #[serde(default)]
    pub figures: Vec<Figure>,
}

impl Default for PatternDocument {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl PatternDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            name: name.into(),
            page: PageSettings::default(),
            guides: Vec::new(),
            figures: Vec::new(),
        }
    }

    /// Reads a JSON document. Malformed figures are kept and logged; the
    /// engines reject them when they are used.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read document {}", path.display()))?;
        let doc: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid pattern document {}", path.display()))?;
        if doc.version > DOCUMENT_VERSION {
            bail!(
                "Document {} has version {}, newest supported is {}",
                path.display(),
                doc.version,
                DOCUMENT_VERSION
            );
        }
        for figure in &doc.figures {
            if let Err(e) = validate(figure) {
                warn!("Figure {} in {} is malformed: {}", figure.id, path.display(), e);
            }
        }
        debug!("Loaded {} figures from {}", doc.figures.len(), path.display());
        Ok(doc)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("Failed to serialize document")?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write document {}", path.display()))?;
        Ok(())
    }

    pub fn figure(&self, id: &str) -> Option<&Figure> {
        self.figures.iter().find(|f| f.id == id)
    }

    /// Like [`figure`](Self::figure) but fails with a readable message.
    pub fn require_figure(&self, id: &str) -> Result<&Figure> {
        self.figure(id)
            .with_context(|| format!("No figure '{}' in document '{}'", id, self.name))
    }

    /// Inserts `figure` or replaces the figure with the same id in place.
    /// Returns `true` when an existing figure was replaced.
    pub fn upsert_figure(&mut self, figure: Figure) -> bool {
        match self.figures.iter_mut().find(|f| f.id == figure.id) {
            Some(slot) => {
                *slot = figure;
                true
            }
            None => {
                self.figures.push(figure);
                false
            }
        }
    }

    /// Removes a figure and every seam derived from it, transitively.
    /// Returns the removed figures, the requested one first.
    pub fn remove_figure(&mut self, id: &str) -> Vec<Figure> {
        let mut doomed: HashSet<String> = HashSet::new();
        if self.figure(id).is_none() {
            return Vec::new();
        }
        doomed.insert(id.to_string());
        loop {
            let children: Vec<String> = self
                .figures
                .iter()
                .filter(|f| !doomed.contains(&f.id))
                .filter(|f| f.parent_id().is_some_and(|p| doomed.contains(p)))
                .map(|f| f.id.clone())
                .collect();
            if children.is_empty() {
                break;
            }
            doomed.extend(children);
        }

        let (mut removed, kept): (Vec<Figure>, Vec<Figure>) = std::mem::take(&mut self.figures)
            .into_iter()
            .partition(|f| doomed.contains(&f.id));
        self.figures = kept;
        if let Some(pos) = removed.iter().position(|f| f.id == id) {
            removed.swap(0, pos);
        }
        debug!("Removed {} figures starting at {}", removed.len(), id);
        removed
    }

    /// Seams whose parent changed since they were computed.
    pub fn stale_seams(&self) -> Vec<&Figure> {
        self.figures
            .iter()
            .filter(|seam| {
                seam.parent_id()
                    .and_then(|p| self.figure(p))
                    .is_some_and(|parent| is_stale(seam, parent))
            })
            .collect()
    }

    /// Offset options with the page scale applied.
    pub fn offset_options(&self, base: &OffsetOptions) -> OffsetOptions {
        OffsetOptions {
            px_per_cm: self.page.px_per_cm,
            ..*base
        }
    }

    /// Recomputes stale seams in place until none is left.
    /// Returns the ids of the refreshed seams.
    pub fn refresh_seams(&mut self, options: &OffsetOptions) -> Result<Vec<String>> {
        let options = self.offset_options(options);
        let mut refreshed = Vec::new();
        // a refreshed seam can make its own seams stale
        for _ in 0..=self.figures.len() {
            let stale: Vec<(Figure, Figure)> = self
                .stale_seams()
                .into_iter()
                .filter_map(|seam| {
                    let parent = self.figure(seam.parent_id()?)?;
                    Some((seam.clone(), parent.clone()))
                })
                .collect();
            if stale.is_empty() {
                if !refreshed.is_empty() {
                    info!("Refreshed {} seams", refreshed.len());
                }
                return Ok(refreshed);
            }
            for (seam, parent) in stale {
                let fresh = refresh_seam(&seam, &parent, &options)
                    .with_context(|| format!("Failed to refresh seam {} of {}", seam.id, parent.id))?;
                self.upsert_figure(fresh);
                refreshed.push(seam.id);
            }
        }
        bail!("Seam derivations in '{}' form a cycle", self.name)
    }

    /// Snap targets from every figure and guide on the page.
    pub fn snap_context(
        &self,
        exclude: Option<(&str, &str)>,
        options: SnapOptions,
        zoom: f64,
    ) -> SnapContext {
        SnapContext::from_figures(&self.figures, exclude, options, zoom)
            .with_guides(self.guides.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patternkit_geometry::offset_figure_with;

    fn options() -> OffsetOptions {
        OffsetOptions::default()
    }

    fn doc_with_seam() -> PatternDocument {
        let mut doc = PatternDocument::new("test");
        let front = Figure::rectangle("front", 0.0, 0.0, 200.0, 300.0);
        let seam = offset_figure_with(&front, 1.0, &doc.offset_options(&options())).unwrap();
        doc.upsert_figure(front);
        doc.upsert_figure(seam);
        doc
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut doc = PatternDocument::new("test");
        assert!(!doc.upsert_figure(Figure::rectangle("a", 0.0, 0.0, 1.0, 1.0)));
        assert!(!doc.upsert_figure(Figure::rectangle("b", 0.0, 0.0, 1.0, 1.0)));
        assert!(doc.upsert_figure(Figure::rectangle("a", 0.0, 0.0, 5.0, 5.0)));
        assert_eq!(doc.figures.len(), 2);
        assert_eq!(doc.figures[0].id, "a");
        assert_eq!(doc.figures[0].nodes[1].x, 5.0);
    }

    #[test]
    fn test_remove_cascades_to_seams() {
        let mut doc = doc_with_seam();
        doc.upsert_figure(Figure::rectangle("back", 0.0, 0.0, 10.0, 10.0));
        let removed = doc.remove_figure("front");
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0].id, "front");
        assert_eq!(doc.figures.len(), 1);
        assert!(doc.remove_figure("front").is_empty());
    }

    #[test]
    fn test_stale_and_refresh() {
        let mut doc = doc_with_seam();
        assert!(doc.stale_seams().is_empty());

        let mut front = doc.figure("front").unwrap().clone();
        front.nodes[2].x = 250.0;
        doc.upsert_figure(front);
        assert_eq!(doc.stale_seams().len(), 1);

        let refreshed = doc.refresh_seams(&options()).unwrap();
        assert_eq!(refreshed.len(), 1);
        assert!(doc.stale_seams().is_empty());
        assert_eq!(doc.figures.len(), 2);
    }

    #[test]
    fn test_snap_context_includes_guides() {
        let mut doc = doc_with_seam();
        doc.guides.push(Guide {
            id: "waist".into(),
            line: patternkit_geometry::GuideLine::Horizontal { y: 500.0 },
        });
        let ctx = doc.snap_context(None, SnapOptions::default(), 1.0);
        assert_eq!(ctx.guides.len(), 1);
        assert_eq!(ctx.nodes.len(), 8);
    }
}
