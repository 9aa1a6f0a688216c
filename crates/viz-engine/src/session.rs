//! Session state machine
//!
//! A session is either empty or shows one version out of its
//! [`VersionStack`]. Generation replaces the stack; refinement, manual edits
//! and customizations append after the cursor; undo and redo move the
//! cursor. Every failure leaves the stack and the displayed version exactly
//! as they were.

use crate::constants::defaults;
use crate::customize::Customization;
use crate::error::{Result, VizError};
use crate::generator::{GenerationRequest, Generator};
use crate::history::{HistoryEntry, HistoryPersistence, HistoryStore};
use crate::types::VisualizationResult;
use crate::undo::VersionStack;
use crate::validation::parse_edited_source;

/// One user's working session over generated visualizations
pub struct Session<G: Generator, P: HistoryPersistence> {
    generator: G,
    versions: VersionStack,
    /// Decoded copy of the version under the cursor
    active: Option<VisualizationResult>,
    history: HistoryStore<P>,
}

impl<G: Generator, P: HistoryPersistence> Session<G, P> {
    pub fn new(generator: G, history: HistoryStore<P>) -> Self {
        Self {
            generator,
            versions: VersionStack::default(),
            active: None,
            history,
        }
    }

    /// The displayed visualization
    pub fn current(&self) -> Option<&VisualizationResult> {
        self.active.as_ref()
    }

    /// Cursor into the version stack, `None` when the session is empty
    pub fn index(&self) -> Option<usize> {
        self.versions.index()
    }

    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    pub fn can_undo(&self) -> bool {
        self.versions.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.versions.can_redo()
    }

    pub fn history(&self) -> &HistoryStore<P> {
        &self.history
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Generate a fresh visualization, replacing the whole version stack
    pub async fn generate(&mut self, prompt: &str) -> Result<&VisualizationResult> {
        let prompt = require_prompt(prompt)?;
        log::info!("Generating visualization for prompt ({} chars)", prompt.len());

        let request = GenerationRequest::new(prompt);
        let result = self.call_generator(&request).await?;
        let result = prepare(result, prompt);

        self.versions.replace(&result)?;
        self.remember(&result, prompt);
        Ok(self.activate(result))
    }

    /// Revise the displayed visualization, dropping any redo versions
    pub async fn refine(&mut self, prompt: &str) -> Result<&VisualizationResult> {
        let prompt = require_prompt(prompt)?;
        let current = self.active.as_ref().ok_or(VizError::NoActiveVisualization)?;
        log::info!(
            "Refining '{}' ({} of {})",
            current.title,
            self.versions.index().map_or(0, |idx| idx + 1),
            self.versions.len()
        );

        let request = GenerationRequest::refinement(prompt, current)?;
        let result = self.call_generator(&request).await?;
        let result = prepare(result, prompt);

        self.versions.push(&result)?;
        self.remember(&result, prompt);
        Ok(self.activate(result))
    }

    /// Replace the displayed source with hand-edited text
    pub fn edit_source(&mut self, text: &str) -> Result<&VisualizationResult> {
        let current = self.active.as_ref().ok_or(VizError::NoActiveVisualization)?;

        let content = parse_edited_source(current.kind(), text)?;
        let mut edited = current.clone();
        edited.content = content;

        self.versions.push(&edited)?;
        log::debug!("Applied manual edit as version {}", self.versions.len());
        Ok(self.activate(edited))
    }

    /// Apply a local customization as a new version
    pub fn customize(&mut self, customization: &Customization) -> Result<&VisualizationResult> {
        let current = self.active.as_ref().ok_or(VizError::NoActiveVisualization)?;

        let customized = customization.apply(current)?;

        self.versions.push(&customized)?;
        log::debug!("Applied {:?}", customization);
        Ok(self.activate(customized))
    }

    /// Step back one version. `Ok(None)` when already at the oldest.
    pub fn undo(&mut self) -> Result<Option<&VisualizationResult>> {
        match self.versions.undo() {
            Some(result) => Ok(Some(self.activate(result?))),
            None => Ok(None),
        }
    }

    /// Step forward one version. `Ok(None)` when already at the newest.
    pub fn redo(&mut self) -> Result<Option<&VisualizationResult>> {
        match self.versions.redo() {
            Some(result) => Ok(Some(self.activate(result?))),
            None => Ok(None),
        }
    }

    /// Back to the empty state
    pub fn reset(&mut self) {
        self.versions.clear();
        self.active = None;
    }

    /// Start a new version stack from a history entry
    pub fn open_history(&mut self, id: &str) -> Result<&VisualizationResult> {
        let entry = self
            .history
            .get(id)
            .ok_or_else(|| VizError::HistoryEntryNotFound(id.to_string()))?;
        let visualization = entry.visualization.clone();

        self.versions.replace(&visualization)?;
        Ok(self.activate(visualization))
    }

    /// Forget a history entry; resets the session if it is on screen
    pub fn delete_history(&mut self, id: &str) -> Result<()> {
        self.history
            .remove(id)?
            .ok_or_else(|| VizError::HistoryEntryNotFound(id.to_string()))?;

        let displayed = self
            .active
            .as_ref()
            .and_then(|active| active.id.as_deref())
            .is_some_and(|active_id| active_id == id);
        if displayed {
            log::info!("Deleted history entry {} is displayed, resetting session", id);
            self.reset();
        }
        Ok(())
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.history.clear()
    }

    async fn call_generator(&self, request: &GenerationRequest) -> Result<VisualizationResult> {
        match self.generator.generate(request).await {
            Ok(result) => Ok(result),
            Err(e) => {
                log::warn!("Generation failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// History write failures don't undo a successful generation
    fn remember(&mut self, result: &VisualizationResult, prompt: &str) {
        if let Err(e) = self.history.record(HistoryEntry::new(result.clone(), prompt)) {
            log::warn!("Failed to save history: {}", e);
        }
    }

    fn activate(&mut self, result: VisualizationResult) -> &VisualizationResult {
        self.active.insert(result)
    }
}

fn require_prompt(prompt: &str) -> Result<&str> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(VizError::validation("Enter a prompt first."));
    }
    Ok(prompt)
}

/// Fill in what the model leaves out: id, originating prompt, title
fn prepare(mut result: VisualizationResult, prompt: &str) -> VisualizationResult {
    if result.id.is_none() {
        result.id = Some(uuid::Uuid::new_v4().to_string());
    }
    result.prompt = Some(prompt.to_string());
    if result.title.trim().is_empty() {
        result.title = defaults::UNTITLED.to_string();
    }
    result
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::error::GenerationError;
    use crate::history::MemoryPersistence;
    use crate::types::{ChartKind, VisualizationContent};

    /// Replays canned responses and records the requests it saw
    #[derive(Default)]
    struct ScriptedGenerator {
        responses: Mutex<VecDeque<std::result::Result<VisualizationResult, GenerationError>>>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedGenerator {
        fn push(&self, response: std::result::Result<VisualizationResult, GenerationError>) {
            self.responses.lock().unwrap().push_back(response);
        }

        fn requests(&self) -> Vec<GenerationRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> std::result::Result<VisualizationResult, GenerationError> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GenerationError::EmptyResponse))
        }
    }

    type TestSession = Session<Arc<ScriptedGenerator>, Arc<MemoryPersistence>>;

    fn diagram(title: &str) -> VisualizationResult {
        VisualizationResult::new(
            title,
            VisualizationContent::Diagram {
                mermaid_code: format!("graph TD\n  A[\"{title}\"]"),
            },
        )
    }

    fn session() -> (TestSession, Arc<ScriptedGenerator>, Arc<MemoryPersistence>) {
        let generator = Arc::new(ScriptedGenerator::default());
        let persistence = Arc::new(MemoryPersistence::new());
        let session = Session::new(generator.clone(), HistoryStore::open(persistence.clone()));
        (session, generator, persistence)
    }

    async fn session_with_versions(titles: &[&str]) -> (TestSession, Arc<ScriptedGenerator>) {
        let (mut session, generator, _) = session();
        for title in titles {
            generator.push(Ok(diagram(title)));
        }
        let mut titles = titles.iter();
        if let Some(first) = titles.next() {
            session.generate(&format!("make {first}")).await.unwrap();
        }
        for title in titles {
            session.refine(&format!("make {title}")).await.unwrap();
        }
        (session, generator)
    }

    fn current_title(session: &TestSession) -> Option<String> {
        session.current().map(|c| c.title.clone())
    }

    #[tokio::test]
    async fn test_generate_replaces_stack() {
        let (mut session, generator) = session_with_versions(&["one", "two"]).await;
        assert_eq!(session.version_count(), 2);

        generator.push(Ok(diagram("fresh")));
        let result = session.generate("  something new ").await.unwrap();
        assert_eq!(result.title, "fresh");
        assert_eq!(result.prompt.as_deref(), Some("something new"));
        assert!(result.id.is_some());

        assert_eq!(session.version_count(), 1);
        assert_eq!(session.index(), Some(0));
        assert!(!session.can_undo());
    }

    #[tokio::test]
    async fn test_generate_failure_keeps_previous_content() {
        let (mut session, generator) = session_with_versions(&["one"]).await;

        generator.push(Err(GenerationError::RateLimited));
        let err = session.generate("again").await.unwrap_err();
        assert!(matches!(err, VizError::Generation(GenerationError::RateLimited)));

        assert_eq!(current_title(&session).as_deref(), Some("one"));
        assert_eq!(session.version_count(), 1);
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_prompt_is_rejected_without_a_call() {
        let (mut session, generator, _) = session();
        assert!(matches!(
            session.generate("   ").await,
            Err(VizError::Validation(_))
        ));
        assert!(generator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_refine_sends_current_as_context() {
        let (session, generator) = session_with_versions(&["one", "two"]).await;

        let requests = generator.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].context.is_none());
        let context: VisualizationResult =
            serde_json::from_str(requests[1].context.as_deref().unwrap()).unwrap();
        assert_eq!(context.title, "one");

        assert_eq!(session.index(), Some(1));
        assert_eq!(current_title(&session).as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_refine_requires_active_visualization() {
        let (mut session, generator, _) = session();
        assert!(matches!(
            session.refine("change it").await,
            Err(VizError::NoActiveVisualization)
        ));
        assert!(generator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_refine_after_undo_discards_redo_versions() {
        let (mut session, generator) = session_with_versions(&["a", "b", "c", "d"]).await;
        session.undo().unwrap();
        session.undo().unwrap();
        assert_eq!(session.index(), Some(1));

        generator.push(Ok(diagram("e")));
        session.refine("make e").await.unwrap();

        assert_eq!(session.version_count(), 3);
        assert_eq!(session.index(), Some(2));
        assert!(!session.can_redo());

        let mut seen = Vec::new();
        while let Some(result) = session.undo().unwrap() {
            seen.push(result.title.clone());
        }
        assert_eq!(seen, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_undo_redo_round_trip_for_every_index() {
        let (mut session, _) = session_with_versions(&["a", "b", "c", "d"]).await;
        let n = session.version_count();

        for i in 0..n {
            while session.index() > Some(i) {
                session.undo().unwrap();
            }
            while session.index() < Some(i) {
                session.redo().unwrap();
            }
            let before = session.current().cloned();

            if session.undo().unwrap().is_some() {
                session.redo().unwrap();
            }

            assert_eq!(session.index(), Some(i));
            assert_eq!(session.current().cloned(), before);
        }
    }

    #[tokio::test]
    async fn test_undo_redo_at_bounds_are_noops() {
        let (mut session, _, _) = session();
        assert!(session.undo().unwrap().is_none());
        assert!(session.redo().unwrap().is_none());
        assert_eq!(session.index(), None);

        let (mut session, _) = session_with_versions(&["a"]).await;
        assert!(session.undo().unwrap().is_none());
        assert!(session.redo().unwrap().is_none());
        assert_eq!(current_title(&session).as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_edit_source_appends_without_network() {
        let (mut session, generator) = session_with_versions(&["a"]).await;
        let calls = generator.requests().len();

        let edited = session.edit_source("graph LR\n  X[Edited]").unwrap();
        assert_eq!(
            edited.content,
            VisualizationContent::Diagram {
                mermaid_code: "graph LR\n  X[\"Edited\"]".to_string()
            }
        );
        assert_eq!(session.version_count(), 2);
        assert_eq!(generator.requests().len(), calls);
    }

    #[tokio::test]
    async fn test_invalid_chart_edit_leaves_stack_unchanged() {
        let (mut session, generator, _) = session();
        let chart: VisualizationResult = serde_json::from_value(json!({
            "title": "Sales",
            "visualizationType": "chart",
            "chartConfig": {"type": "bar", "data": [], "series": [{"dataKey": "v"}]}
        }))
        .unwrap();
        generator.push(Ok(chart));
        session.generate("sales").await.unwrap();
        let before = session.current().cloned();

        let err = session.edit_source("{ not json").unwrap_err();
        assert!(matches!(err, VizError::Validation(_)));
        assert_eq!(session.version_count(), 1);
        assert_eq!(session.current().cloned(), before);

        let customized = session
            .customize(&Customization::ChartKind(ChartKind::Line))
            .unwrap();
        let VisualizationContent::Chart { chart_config } = &customized.content else {
            panic!("expected chart");
        };
        assert_eq!(chart_config.kind, ChartKind::Line);
        assert_eq!(session.version_count(), 2);
    }

    #[tokio::test]
    async fn test_reset_empties_session() {
        let (mut session, _) = session_with_versions(&["a", "b"]).await;
        session.reset();
        assert!(session.current().is_none());
        assert_eq!(session.index(), None);
        assert_eq!(session.version_count(), 0);
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_history_is_recorded_and_bounded() {
        let (mut session, generator, persistence) = session();
        for i in 0..6 {
            generator.push(Ok(diagram(&format!("d{i}"))));
            session.generate(&format!("prompt {i}")).await.unwrap();
        }

        let history = session.history();
        assert_eq!(history.len(), 5);
        assert_eq!(history.entries()[0].visualization.title, "d5");
        assert_eq!(history.entries()[0].prompt, "prompt 5");
        assert_eq!(history.entries()[4].visualization.title, "d1");
        assert_eq!(persistence.saved().len(), 5);
    }

    #[tokio::test]
    async fn test_delete_displayed_history_entry_resets() {
        let (mut session, _) = session_with_versions(&["a", "b"]).await;
        let displayed_id = session.current().and_then(|c| c.id.clone()).unwrap();
        let other_id = session.history().entries()[1].id.clone();

        session.delete_history(&other_id).unwrap();
        assert_eq!(current_title(&session).as_deref(), Some("b"));

        session.delete_history(&displayed_id).unwrap();
        assert!(session.current().is_none());
        assert!(session.history().is_empty());

        assert!(matches!(
            session.delete_history("missing"),
            Err(VizError::HistoryEntryNotFound(_))
        ));
    }

    /// Memory storage whose saves can be switched off
    #[derive(Default)]
    struct FlakyPersistence {
        inner: MemoryPersistence,
        fail: AtomicBool,
    }

    impl HistoryPersistence for FlakyPersistence {
        fn load(&self) -> Result<Vec<HistoryEntry>> {
            self.inner.load()
        }

        fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(std::io::Error::other("read-only file system").into());
            }
            self.inner.save(entries)
        }
    }

    #[tokio::test]
    async fn test_failed_history_delete_changes_nothing() {
        let generator = Arc::new(ScriptedGenerator::default());
        let persistence = Arc::new(FlakyPersistence::default());
        let mut session = Session::new(generator.clone(), HistoryStore::open(persistence.clone()));
        generator.push(Ok(diagram("a")));
        session.generate("make a").await.unwrap();
        let id = session.current().and_then(|c| c.id.clone()).unwrap();

        persistence.fail.store(true, Ordering::SeqCst);
        assert!(matches!(session.delete_history(&id), Err(VizError::Io(_))));

        assert!(session.history().get(&id).is_some());
        assert_eq!(persistence.inner.saved().len(), 1);
        assert_eq!(session.current().map(|c| c.title.as_str()), Some("a"));

        persistence.fail.store(false, Ordering::SeqCst);
        session.delete_history(&id).unwrap();
        assert!(session.current().is_none());
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_open_history_starts_new_stack() {
        let (mut session, _) = session_with_versions(&["a", "b", "c"]).await;
        let oldest = session.history().entries()[2].id.clone();

        let opened = session.open_history(&oldest).unwrap();
        assert_eq!(opened.title, "a");
        assert_eq!(session.version_count(), 1);
        assert!(session.open_history("missing").is_err());
    }

    #[tokio::test]
    async fn test_pie_chart_end_to_end() {
        let (mut session, generator, _) = session();
        let response: VisualizationResult = serde_json::from_value(json!({
            "title": "Mobile OS Market Share",
            "explanation": "Android leads with 70%.",
            "visualizationType": "chart",
            "chartConfig": {
                "type": "pie",
                "data": [
                    {"name": "Android", "value": 70},
                    {"name": "iOS", "value": 28},
                    {"name": "Other", "value": 2}
                ],
                "series": [{"dataKey": "value", "name": "Share"}]
            }
        }))
        .unwrap();
        generator.push(Ok(response));

        session
            .generate("Pie chart of mobile OS market share: Android 70%, iOS 28%, Other 2%")
            .await
            .unwrap();

        let stored = &session.history().entries()[0].visualization;
        let VisualizationContent::Chart { chart_config } = &stored.content else {
            panic!("expected chart");
        };
        assert_eq!(chart_config.kind, ChartKind::Pie);
        assert_eq!(chart_config.data.len(), 3);
        assert_eq!(chart_config.series_total(&chart_config.series[0].data_key), 100.0);
    }
}
