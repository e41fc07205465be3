//! Geometry classification
//!
//! Builds annotated blocks from extracted pages: assigns each block a column
//! index via the configured [`ColumnEstimator`] and flags header/footer
//! candidates by vertical band position.
//!
//! Header/footer detection is a per-page geometric signal only. Cross-page
//! corroboration (the same band populated on a minimum share of pages,
//! `header_footer_min_pages_ratio` in config) is a stated follow-up; the
//! single-page band is the implemented behavior.

use lector_core::{BBox, Block, Page, Policy, Role};

use crate::columns::{nearest, BicKMeans, ColumnEstimator};

/// Classifier tuning knobs, ratios of page dimensions.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Cluster centers closer than this ratio of page width merge.
    pub column_min_spacing_ratio: f32,
    /// Top/bottom band height as a ratio of page height.
    pub header_footer_height_ratio: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            column_min_spacing_ratio: 0.15,
            header_footer_height_ratio: 0.15,
        }
    }
}

/// Per-page geometry classifier.
pub struct GeometryClassifier {
    config: ClassifierConfig,
    estimator: Box<dyn ColumnEstimator>,
}

impl GeometryClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        let estimator = Box::new(BicKMeans::new(config.column_min_spacing_ratio));
        Self { config, estimator }
    }

    /// Swap in a different column estimation strategy.
    pub fn with_estimator(config: ClassifierConfig, estimator: Box<dyn ColumnEstimator>) -> Self {
        Self { config, estimator }
    }

    /// Build annotated blocks for all pages.
    ///
    /// Every raw block becomes exactly one [`Block`]; nothing is dropped here.
    /// Role starts as `Body` (header/footer candidates resolved by position),
    /// policy starts as `Read`.
    pub fn classify(&self, pages: &[Page]) -> Vec<Block> {
        let mut blocks = Vec::new();
        for page in pages {
            let centers: Vec<f32> = page.blocks.iter().map(|b| b.bbox.center_x()).collect();
            let columns = self.estimator.estimate(&centers, page.width);

            for (i, raw) in page.blocks.iter().enumerate() {
                let column = if columns.is_empty() {
                    0
                } else {
                    nearest(&columns, raw.bbox.center_x())
                };
                let role = if self.is_header_footer_candidate(&raw.bbox, page.height) {
                    // Tie-break by vertical half of the page.
                    if raw.bbox.center_y() < page.height / 2.0 {
                        Role::Header
                    } else {
                        Role::Footer
                    }
                } else {
                    Role::Body
                };
                blocks.push(Block {
                    id: Block::make_id(page.index, i),
                    page: page.index,
                    bbox: raw.bbox,
                    column,
                    role,
                    text: raw.text.clone(),
                    sentences: Vec::new(),
                    policy: Policy::Read,
                    confidence: 1.0,
                });
            }
        }
        tracing::info!(count = blocks.len(), "Classified blocks");
        blocks
    }

    /// True when the bbox lies entirely within the top or bottom band.
    /// A block straddling the band boundary is not a candidate.
    pub fn is_header_footer_candidate(&self, bbox: &BBox, page_height: f32) -> bool {
        let band = self.config.header_footer_height_ratio * page_height;
        bbox.y1 < band || bbox.y0 > page_height - band
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lector_core::RawBlock;

    fn page_with(blocks: Vec<(f32, f32, f32, f32)>) -> Page {
        Page {
            index: 0,
            width: 600.0,
            height: 800.0,
            rotation: 0,
            blocks: blocks
                .into_iter()
                .map(|(x0, y0, x1, y1)| RawBlock {
                    bbox: BBox::new(x0, y0, x1, y1),
                    text: "text".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_block_in_top_band_is_header() {
        let classifier = GeometryClassifier::new(ClassifierConfig::default());
        // Top 15% of an 800pt page is y < 120.
        let blocks = classifier.classify(&[page_with(vec![(100.0, 20.0, 500.0, 50.0)])]);
        assert_eq!(blocks[0].role, Role::Header);
    }

    #[test]
    fn test_block_in_bottom_band_is_footer() {
        let classifier = GeometryClassifier::new(ClassifierConfig::default());
        let blocks = classifier.classify(&[page_with(vec![(100.0, 700.0, 500.0, 780.0)])]);
        assert_eq!(blocks[0].role, Role::Footer);
    }

    #[test]
    fn test_straddling_block_is_not_candidate() {
        let classifier = GeometryClassifier::new(ClassifierConfig::default());
        // Starts inside the top band (y0 = 100 < 120) but ends below it.
        let blocks = classifier.classify(&[page_with(vec![(100.0, 100.0, 500.0, 200.0)])]);
        assert_eq!(blocks[0].role, Role::Body);
    }

    #[test]
    fn test_column_assignment() {
        let classifier = GeometryClassifier::new(ClassifierConfig::default());
        let page = page_with(vec![
            (100.0, 200.0, 200.0, 220.0),
            (100.0, 240.0, 200.0, 260.0),
            (400.0, 200.0, 500.0, 220.0),
            (400.0, 240.0, 500.0, 260.0),
        ]);
        let blocks = classifier.classify(&[page]);
        assert_eq!(blocks[0].column, 0);
        assert_eq!(blocks[1].column, 0);
        assert_eq!(blocks[2].column, 1);
        assert_eq!(blocks[3].column, 1);
    }

    #[test]
    fn test_ids_are_stable() {
        let classifier = GeometryClassifier::new(ClassifierConfig::default());
        let blocks = classifier.classify(&[page_with(vec![
            (100.0, 200.0, 200.0, 220.0),
            (100.0, 240.0, 200.0, 260.0),
        ])]);
        assert_eq!(blocks[0].id, "p0_b0");
        assert_eq!(blocks[1].id, "p0_b1");
    }
}
