//! Select executor
//!
//! One select call is one strictly sequential pipeline:
//! 1. Assemble the plan; no usable search term resolves empty here
//! 2. Acquire the collection handle for the request
//! 3. Run the primary query
//! 4. Tree selects only: run the descendant query derived from the
//!    primary results and link descendants to their ancestors
//! 5. Return the forest
//!
//! Every failure is final. Nothing is retried and nothing partial is
//! returned; the store driver owns timeouts.

use std::sync::Arc;

use serde_json::Value;
use tracing::Instrument;

use crate::compiler::{OperatorRegistry, TermCompiler};
use crate::config::SelectConfig;
use crate::observability::{select_span, Event, MetricsRegistry};
use crate::planner::{Assembly, QueryAssembler, QueryPlan};
use crate::selector::SelectQuery;
use crate::skeleton::Record;
use crate::store::{Collection, CollectionFactory, RequestContext};
use crate::tree::{NestedSetTreeQuery, TreeQueryGenerator, TreeReconstructor};

use super::errors::{SelectError, SelectResult};
use super::materializer::ResultMaterializer;
use super::result::ResultNode;

/// Compiles and runs select queries against an injected store
///
/// Holds no per-call state; one selector serves any number of concurrent
/// calls.
pub struct Selector {
    factory: Arc<dyn CollectionFactory>,
    assembler: QueryAssembler,
    reconstructor: TreeReconstructor,
    config: SelectConfig,
    metrics: Arc<MetricsRegistry>,
}

impl Selector {
    /// Creates a selector using the nested-set tree query generator
    pub fn new(factory: Arc<dyn CollectionFactory>, config: SelectConfig) -> Self {
        let generator = Arc::new(NestedSetTreeQuery::new(&config));
        Self::with_generator(factory, generator, config)
    }

    /// Creates a selector with an injected tree query generator
    pub fn with_generator(
        factory: Arc<dyn CollectionFactory>,
        generator: Arc<dyn TreeQueryGenerator>,
        config: SelectConfig,
    ) -> Self {
        let compiler = TermCompiler::new(OperatorRegistry::new(&config));
        Self {
            factory,
            assembler: QueryAssembler::new(compiler.clone(), &config),
            reconstructor: TreeReconstructor::new(compiler, generator, &config),
            config,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Shares an existing metrics registry
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Returns the metrics registry
    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Returns the plan a query would run, None if it resolves empty
    pub fn plan(&self, query: &SelectQuery) -> Option<QueryPlan> {
        match self.assembler.assemble(query) {
            Assembly::Plan { plan, .. } => Some(plan),
            Assembly::Empty { .. } => None,
        }
    }

    /// Runs a select query.
    ///
    /// Resolves with the primary results in store order; for tree selects
    /// each carries its linked descendants.
    pub async fn select(
        &self,
        ctx: &RequestContext,
        query: &SelectQuery,
    ) -> SelectResult<Vec<ResultNode>> {
        let span = select_span(ctx.request_id);
        async {
            tracing::debug!(
                event = %Event::SelectStart,
                search_terms = query.query.search.len(),
                skeleton_terms = query.query.skeleton.len(),
                "select start"
            );

            let result = self.run(ctx, query).await;
            match &result {
                Ok(forest) => tracing::debug!(
                    event = %Event::SelectComplete,
                    roots = forest.len(),
                    elapsed_ms = ctx.elapsed_ms() as u64,
                    "select complete"
                ),
                Err(err) => {
                    self.metrics.increment_selects_failed();
                    tracing::warn!(
                        event = %Event::SelectFailed,
                        code = err.code().code(),
                        stage = err.code().stage(),
                        error = %err,
                        "select failed"
                    );
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        query: &SelectQuery,
    ) -> SelectResult<Vec<ResultNode>> {
        let assembly = self.assembler.assemble(query);

        let dropped = assembly.dropped_terms();
        if dropped > 0 {
            self.metrics.add_terms_dropped(dropped as u64);
            tracing::debug!(event = %Event::TermsDropped, dropped, "unregistered operators dropped");
        }

        let plan = match assembly {
            Assembly::Plan { plan, .. } => plan,
            Assembly::Empty { .. } => {
                self.metrics.increment_selects_short_circuited();
                tracing::debug!(event = %Event::SelectShortCircuit, "no usable search terms");
                return Ok(Vec::new());
            }
        };

        let collection = self
            .factory
            .collection(ctx)
            .await
            .map_err(SelectError::acquisition_failed)?;
        self.metrics.increment_selects_executed();

        let materializer = ResultMaterializer::new(collection.as_ref());

        self.metrics.increment_primary_queries();
        let results = materializer
            .primary(&plan)
            .await
            .map_err(SelectError::primary_query_failed)?;
        tracing::debug!(
            event = %Event::PrimaryQueryComplete,
            results = results.len(),
            "primary query complete"
        );

        let expand = plan.include_children && plan.projection.is_full() && !results.is_empty();
        if !expand {
            return Ok(results.into_iter().map(ResultNode::leaf).collect());
        }

        self.expand(collection.as_ref(), results).await
    }

    async fn expand(
        &self,
        collection: &dyn Collection,
        results: Vec<Value>,
    ) -> SelectResult<Vec<ResultNode>> {
        let primary = results
            .into_iter()
            .map(|doc| {
                Record::from_document(doc, &self.config).ok_or_else(|| {
                    SelectError::malformed_record(format!(
                        "result without a usable {} skeleton",
                        self.config.skeleton_key
                    ))
                })
            })
            .collect::<SelectResult<Vec<Record>>>()?;

        let filter = match self.reconstructor.descendant_filter(&primary) {
            Some(filter) => filter,
            None => {
                return Ok(primary
                    .into_iter()
                    .map(|r| ResultNode::leaf(r.into_document()))
                    .collect())
            }
        };

        self.metrics.increment_descendant_queries();
        let fetched = ResultMaterializer::new(collection)
            .descendants(&filter)
            .await
            .map_err(SelectError::descendant_query_failed)?;
        tracing::debug!(
            event = %Event::DescendantQueryComplete,
            descendants = fetched.len(),
            "descendant query complete"
        );

        // A descendant without a skeleton cannot name its parent
        let fetched_count = fetched.len();
        let descendants: Vec<Record> = fetched
            .into_iter()
            .filter_map(|doc| Record::from_document(doc, &self.config))
            .collect();
        let undecodable = fetched_count - descendants.len();

        let linked = self.reconstructor.link(&primary, &descendants);
        let orphaned = linked.orphaned + undecodable;

        self.metrics.add_descendants_attached(linked.attached as u64);
        tracing::debug!(
            event = %Event::TreeMerged,
            roots = linked.forest.len(),
            attached = linked.attached,
            "descendants linked"
        );
        if orphaned > 0 {
            self.metrics.add_descendants_orphaned(orphaned as u64);
            tracing::debug!(
                event = %Event::DescendantsOrphaned,
                orphaned,
                "descendants not reachable from a primary result"
            );
        }

        Ok(linked.forest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{Modifier, TermNode};
    use crate::store::{InMemoryCollection, InMemoryFactory, StoreError};
    use crate::executor::SelectErrorCode;
    use serde_json::json;

    fn item(id: i64, parent: Option<i64>, left: i64, right: i64, kind: &str) -> Value {
        let mut skeleton = json!({"diggerid": id, "left": left, "right": right});
        if let Some(parent) = parent {
            skeleton["diggerparentid"] = json!(parent);
        }
        json!({"kind": kind, "_digger": skeleton})
    }

    fn warehouse() -> Arc<InMemoryCollection> {
        Arc::new(InMemoryCollection::with_documents(vec![
            item(1, None, 1, 10, "folder"),
            item(2, Some(1), 2, 5, "shelf"),
            item(3, Some(2), 3, 4, "box"),
            item(4, Some(1), 6, 9, "shelf"),
            item(5, None, 11, 12, "folder"),
        ]))
    }

    fn selector(collection: Arc<InMemoryCollection>) -> (Selector, InMemoryFactory) {
        let factory = InMemoryFactory::new(collection);
        let selector = Selector::new(Arc::new(factory.clone()), SelectConfig::default());
        (selector, factory)
    }

    fn folders() -> SelectQuery {
        SelectQuery::new([TermNode::leaf("kind", "=", "folder")])
    }

    #[tokio::test]
    async fn test_flat_select() {
        let (selector, _) = selector(warehouse());
        let query = folders().with_modifier(Modifier::laststep());

        let forest = selector.select(&RequestContext::new(), &query).await.unwrap();
        assert_eq!(forest.len(), 2);
        assert!(forest.iter().all(ResultNode::is_leaf));
        assert_eq!(forest[0].document["kind"], "folder");
    }

    #[tokio::test]
    async fn test_skeleton_projection_without_laststep() {
        let (selector, _) = selector(warehouse());

        let forest = selector.select(&RequestContext::new(), &folders()).await.unwrap();
        assert_eq!(forest.len(), 2);
        for node in &forest {
            let doc = node.document.as_object().unwrap();
            assert_eq!(doc.len(), 1);
            assert!(doc.contains_key("_digger"));
        }
    }

    #[tokio::test]
    async fn test_tree_select_links_two_levels() {
        let (selector, _) = selector(warehouse());
        let query = SelectQuery::new([TermNode::leaf("_digger.diggerid", "=", 1)])
            .with_modifier(Modifier::tree());

        let forest = selector.select(&RequestContext::new(), &query).await.unwrap();
        assert_eq!(forest.len(), 1);

        let root = &forest[0];
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].document["kind"], "shelf");
        assert_eq!(root.children[0].children.len(), 1);
        assert_eq!(root.children[0].children[0].document["kind"], "box");
        assert_eq!(root.subtree_size(), 4);

        let snapshot = selector.metrics().snapshot();
        assert_eq!(snapshot.primary_queries, 1);
        assert_eq!(snapshot.descendant_queries, 1);
        assert_eq!(snapshot.descendants_attached, 3);
    }

    #[tokio::test]
    async fn test_metrics_count_surfaced_descendants_only() {
        let collection = warehouse();
        collection.insert(item(8, Some(99), 7, 8, "crate")).unwrap();
        let (selector, _) = selector(collection);
        let query = SelectQuery::new([TermNode::leaf("_digger.diggerid", "=", 1)])
            .with_modifier(Modifier::tree());

        let forest = selector.select(&RequestContext::new(), &query).await.unwrap();
        assert_eq!(forest[0].subtree_size(), 4);

        let snapshot = selector.metrics().snapshot();
        assert_eq!(snapshot.descendants_attached, 3);
        assert_eq!(snapshot.descendants_orphaned, 1);
    }

    #[tokio::test]
    async fn test_empty_search_never_touches_store() {
        let (selector, factory) = selector(warehouse());
        let query = SelectQuery::new([TermNode::leaf("kind", "~~", "folder")]);

        let forest = selector.select(&RequestContext::new(), &query).await.unwrap();
        assert!(forest.is_empty());
        assert_eq!(factory.acquisition_count(), 0);
        assert_eq!(factory.inner().find_count(), 0);

        let snapshot = selector.metrics().snapshot();
        assert_eq!(snapshot.selects_short_circuited, 1);
        assert_eq!(snapshot.terms_dropped, 1);
    }

    #[tokio::test]
    async fn test_acquisition_failure() {
        let factory = InMemoryFactory::unavailable("connection refused");
        let selector = Selector::new(Arc::new(factory), SelectConfig::default());

        let err = selector
            .select(&RequestContext::new(), &folders())
            .await
            .unwrap_err();
        assert_eq!(err.code(), SelectErrorCode::AcquisitionFailed);
        assert!(matches!(err.store_error(), Some(StoreError::Unavailable(_))));
        assert_eq!(selector.metrics().snapshot().selects_failed, 1);
    }

    #[tokio::test]
    async fn test_descendant_failure_returns_nothing() {
        let collection = warehouse();
        collection.fail_find(1).unwrap();
        let (selector, _) = selector(collection);

        let err = selector
            .select(&RequestContext::new(), &folders().with_modifier(Modifier::tree()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), SelectErrorCode::DescendantQueryFailed);
    }

    #[tokio::test]
    async fn test_malformed_primary_record_fails_tree_select() {
        let collection = Arc::new(InMemoryCollection::with_documents(vec![
            json!({"kind": "folder"}),
        ]));
        let (selector, factory) = selector(collection);

        let err = selector
            .select(&RequestContext::new(), &folders().with_modifier(Modifier::tree()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), SelectErrorCode::MalformedRecord);
        assert_eq!(factory.inner().find_count(), 1);
    }

    #[test]
    fn test_plan_preview() {
        let (selector, _) = selector(warehouse());
        let plan = selector
            .plan(&folders().with_modifier(Modifier::default().with_limit(7).with_first()))
            .unwrap();
        assert_eq!(plan.options.limit, Some(1));
        assert!(selector.plan(&SelectQuery::default()).is_none());
    }
}
