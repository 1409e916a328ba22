use crate::{TemplateSegment, TerrainTemplate};
use std::rc::Rc;

/// The template-catalog collaborator contract required by this core:
/// an enumerable set of [TerrainTemplate]s and the
/// [TemplateSegment]s that paint them.
pub trait TemplateCatalog {
    fn templates(&self) -> &[TerrainTemplate];
    fn segments(&self) -> &[TemplateSegment];

    /// The template painted by `segment`.
    ///
    /// # Panics
    ///
    /// If `segment.template_id()` does not name a template in this
    /// catalog — a malformed catalog, a programmer error.
    fn template_for(&self, segment: &TemplateSegment) -> &TerrainTemplate {
        self.templates()
            .iter()
            .find(|t| t.id() == segment.template_id())
            .expect("template segment references an unknown template id")
    }
}

/// The three role-sets a search draws segments from: those usable at
/// the very start of a tiling, in its interior, and at its very end.
/// `All = Start ∪ Inner ∪ End`; a segment may appear in more than one
/// set.
///
/// Segments are stored by index into the catalog's `segments()` slice
/// rather than cloned, matching the ownership note: all
/// `TilingPath`s sharing a `PermittedSegments` share one read-only
/// reference to the catalog.
pub struct PermittedSegments<C: TemplateCatalog> {
    catalog: Rc<C>,
    start: Vec<usize>,
    inner: Vec<usize>,
    end: Vec<usize>,
}

// Written by hand rather than `#[derive(Clone)]`: a derived impl would
// add a spurious `C: Clone` bound even though the only `C`-typed field
// is behind an `Rc`, which is `Clone` unconditionally.
impl<C: TemplateCatalog> Clone for PermittedSegments<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: Rc::clone(&self.catalog),
            start: self.start.clone(),
            inner: self.inner.clone(),
            end: self.end.clone(),
        }
    }
}

impl<C: TemplateCatalog> PermittedSegments<C> {
    /// Build the three sets by testing every segment in `catalog`
    /// against the given terminal/inner type labels: a segment joins
    /// `start` if `has_start_type` matches any of `start_labels`, and
    /// symmetrically for `inner`/`end`.
    #[must_use]
    pub fn by_labels(
        catalog: Rc<C>,
        start_labels: &[&str],
        inner_labels: &[&str],
        end_labels: &[&str],
    ) -> Self {
        let mut start = Vec::new();
        let mut inner = Vec::new();
        let mut end = Vec::new();
        for (i, seg) in catalog.segments().iter().enumerate() {
            if start_labels.iter().any(|l| seg.has_start_type(l)) {
                start.push(i);
            }
            if inner_labels.iter().any(|l| seg.has_inner_type(l)) {
                inner.push(i);
            }
            if end_labels.iter().any(|l| seg.has_end_type(l)) {
                end.push(i);
            }
        }
        Self {
            catalog,
            start,
            inner,
            end,
        }
    }

    /// Build a `PermittedSegments` from explicit index sets, e.g. when
    /// a caller already knows exactly which catalog segments should
    /// play each role.
    #[must_use]
    pub fn from_indices(
        catalog: Rc<C>,
        start: Vec<usize>,
        inner: Vec<usize>,
        end: Vec<usize>,
    ) -> Self {
        Self {
            catalog,
            start,
            inner,
            end,
        }
    }

    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// A cheap `Rc` clone of the catalog, used by the search engine to
    /// keep catalog-borrowed segment/template references alive inside
    /// a [crate::search::SearchScratch] independent of `self`'s own
    /// borrow.
    #[inline]
    #[must_use]
    pub fn catalog_rc(&self) -> Rc<C> {
        Rc::clone(&self.catalog)
    }

    #[must_use]
    pub fn start(&self) -> impl Iterator<Item = &TemplateSegment> {
        self.start.iter().map(|&i| &self.catalog.segments()[i])
    }

    #[must_use]
    pub fn inner(&self) -> impl Iterator<Item = &TemplateSegment> {
        self.inner.iter().map(|&i| &self.catalog.segments()[i])
    }

    #[must_use]
    pub fn end(&self) -> impl Iterator<Item = &TemplateSegment> {
        self.end.iter().map(|&i| &self.catalog.segments()[i])
    }

    /// Every segment touchable by a search over this permitted set:
    /// the union of `start`, `inner`, and `end`, without duplicates.
    #[must_use]
    pub fn all(&self) -> Vec<&TemplateSegment> {
        let mut indices: Vec<usize> = self
            .start
            .iter()
            .chain(self.inner.iter())
            .chain(self.end.iter())
            .copied()
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices.into_iter().map(|i| &self.catalog.segments()[i]).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::CellVec;

    struct TestCatalog {
        templates: Vec<TerrainTemplate>,
        segments: Vec<TemplateSegment>,
    }

    impl TemplateCatalog for TestCatalog {
        fn templates(&self) -> &[TerrainTemplate] {
            &self.templates
        }
        fn segments(&self) -> &[TemplateSegment] {
            &self.segments
        }
    }

    fn straight_h() -> TemplateSegment {
        TemplateSegment::new(
            "Beach.R",
            "Beach.R",
            vec![
                CellVec::new(0, 0),
                CellVec::new(1, 0),
                CellVec::new(2, 0),
                CellVec::new(3, 0),
            ],
            vec!["Beach".to_string()],
            0,
        )
        .unwrap()
    }

    fn bend() -> TemplateSegment {
        TemplateSegment::new(
            "Beach.R",
            "Beach.D",
            vec![
                CellVec::new(0, 0),
                CellVec::new(1, 0),
                CellVec::new(1, -1),
                CellVec::new(1, -2),
            ],
            vec!["Beach".to_string()],
            1,
        )
        .unwrap()
    }

    fn test_catalog() -> Rc<TestCatalog> {
        Rc::new(TestCatalog {
            templates: vec![
                TerrainTemplate::new(0, 4, 1, vec![Some(0); 4], CellVec::ZERO),
                TerrainTemplate::new(1, 2, 3, vec![Some(1); 6], CellVec::ZERO),
            ],
            segments: vec![straight_h(), bend()],
        })
    }

    #[test]
    fn test_by_labels_partitions_by_terminal() {
        let catalog = test_catalog();
        let permitted =
            PermittedSegments::by_labels(catalog, &["Beach.R"], &["Beach"], &["Beach.R", "Beach.D"]);
        assert_eq!(permitted.start().count(), 2);
        assert_eq!(permitted.inner().count(), 2);
        assert_eq!(permitted.end().count(), 2);
        assert_eq!(permitted.all().len(), 2);
    }

    #[test]
    fn test_by_labels_can_exclude_a_segment() {
        let catalog = test_catalog();
        let permitted = PermittedSegments::by_labels(catalog, &["Beach.R"], &["Beach"], &["Beach.D"]);
        // Only the bend ends in Beach.D
        assert_eq!(permitted.end().count(), 1);
        assert_eq!(permitted.end().next().unwrap().template_id(), 1);
    }
}
