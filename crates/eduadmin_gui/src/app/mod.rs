//! Quiz editor: composes the selector widgets around one quiz draft.
//!
//! The draft is the single owner of form values. Widgets emit
//! [`SelectionChange`] / [`ModalOutcome`] values and the editor folds them in.

mod seed;
mod style;

use crate::backend::spawn_backend;
use crate::widgets::{
    AsyncMultiSelect, AsyncSelect, FetchBridge, FetchDriven, ModalOutcome, OptionBuilderPanel,
    RecordSelectorModal,
};
use eduadmin_client::HttpListSource;
use eduadmin_core::builder::{OptionBuilder, QuestionKind};
use eduadmin_core::selection::{merge_committed, SelectionChange};
use eduadmin_core::{
    AppError, Config, Filter, ListSource, OptionQuery, PagerConfig, Record, RecordId,
};
use eframe::egui;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub(crate) const DEFAULT_WINDOW_SIZE: [f32; 2] = [960.0, 760.0];
pub(crate) const MIN_WINDOW_SIZE: [f32; 2] = [640.0, 480.0];

const SUBJECTS: &str = "subjects";
const TOPICS: &str = "topics";
const QUESTIONS: &str = "questions";
const MAX_TOPICS: usize = 5;
const QUESTION_TITLE_FIELD: &str = "title";
const BUSY_REPAINT_INTERVAL: Duration = Duration::from_millis(50);

/// Form values for the quiz being edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizDraft {
    pub subject: Option<RecordId>,
    pub topics: Vec<RecordId>,
    pub questions: Vec<Record>,
}

pub struct QuizEditorApp {
    bridge: FetchBridge,
    option_limit: usize,
    draft: QuizDraft,
    subject: AsyncSelect,
    topics: AsyncMultiSelect,
    question_picker: RecordSelectorModal,
    answers: OptionBuilderPanel,
    status: Option<String>,
    style_applied: bool,
}

fn topics_query(subject: Option<&RecordId>, limit: usize) -> OptionQuery {
    let mut filter = Filter::new();
    if let Some(subject) = subject {
        filter.insert("subject", subject.to_json());
    }
    OptionQuery::new(TOPICS)
        .with_filter(filter)
        .with_limit(limit)
}

impl QuizEditorApp {
    /// Build the editor against the configured API, or the built-in sample
    /// data when `config.offline` is set.
    ///
    /// # Errors
    /// Returns an error when the HTTP client or a selector cannot be built.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let source: Arc<dyn ListSource> = if config.offline {
            info!("offline mode: serving built-in sample data");
            Arc::new(seed::offline_source())
        } else {
            info!(api_url = config.api_url.as_str(), "using content API");
            Arc::new(HttpListSource::from_config(&config)?)
        };
        Self::with_source(source, &config)
    }

    /// # Errors
    /// Returns an error when a selector rejects its configuration.
    pub fn with_source(source: Arc<dyn ListSource>, config: &Config) -> Result<Self, AppError> {
        let mut bridge = FetchBridge::new(spawn_backend(source));
        let subject = AsyncSelect::new(
            bridge.register(),
            "Subject",
            OptionQuery::new(SUBJECTS).with_limit(config.option_limit),
            None,
        )?
        .with_placeholder("Select a subject");
        let topics = AsyncMultiSelect::new(
            bridge.register(),
            "Topics",
            topics_query(None, config.option_limit),
            Vec::new(),
            Some(MAX_TOPICS),
        )?
        .with_placeholder("No topics selected");
        let mut question_picker = RecordSelectorModal::new(
            bridge.register(),
            "Add questions",
            PagerConfig::new(QUESTIONS).with_per_page(config.page_size),
            QUESTION_TITLE_FIELD,
        )?;
        if config.offline {
            question_picker =
                question_picker.with_owner("author", RecordId::from(seed::OFFLINE_USER_ID));
        }

        Ok(Self {
            bridge,
            option_limit: config.option_limit,
            draft: QuizDraft::default(),
            subject,
            topics,
            question_picker,
            answers: OptionBuilderPanel::new(OptionBuilder::new(QuestionKind::SingleChoice)),
            status: None,
            style_applied: false,
        })
    }

    pub fn draft(&self) -> &QuizDraft {
        &self.draft
    }

    pub fn subject(&self) -> &AsyncSelect {
        &self.subject
    }

    pub fn topics(&self) -> &AsyncMultiSelect {
        &self.topics
    }

    pub fn question_picker(&self) -> &RecordSelectorModal {
        &self.question_picker
    }

    pub fn question_picker_mut(&mut self) -> &mut RecordSelectorModal {
        &mut self.question_picker
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Route every pending worker reply to its widget.
    ///
    /// # Returns
    /// How many replies a widget accepted.
    pub fn poll_backend(&mut self) -> usize {
        let mut applied = 0;
        for event in self.bridge.poll() {
            let mut widgets: [&mut dyn FetchDriven; 3] = [
                &mut self.subject,
                &mut self.topics,
                &mut self.question_picker,
            ];
            if FetchBridge::dispatch(event, &mut widgets) {
                applied += 1;
            }
        }
        applied
    }

    /// Let every widget queue the fetch it needs.
    pub fn pump_fetches(&mut self) {
        self.subject.pump(&self.bridge);
        self.topics.pump(&self.bridge);
        self.question_picker.pump(&self.bridge);
    }

    /// Whether a reply or debounce is outstanding.
    pub fn is_busy(&self) -> bool {
        self.subject.cache().is_loading()
            || self.topics.cache().is_loading()
            || self.question_picker.pager().is_fetching()
            || self.question_picker.is_open()
    }

    /// Fold a subject change into the draft and narrow topics to it.
    ///
    /// # Errors
    /// Propagates topic query validation failures.
    pub fn apply_subject_change(&mut self, change: SelectionChange) -> Result<(), AppError> {
        let SelectionChange::Single(subject) = change else {
            return Ok(());
        };
        if self
            .topics
            .set_query(topics_query(subject.as_ref(), self.option_limit))?
        {
            debug!(subject = ?subject, "topic options invalidated");
        }
        self.draft.subject = subject;
        Ok(())
    }

    pub fn apply_topics_change(&mut self, change: SelectionChange) {
        if let SelectionChange::Multi(topics) = change {
            self.draft.topics = topics;
        }
    }

    /// Open the question picker scoped to the chosen subject.
    pub fn open_question_picker(&mut self) {
        self.bridge.invalidate_cache();
        let mut filter = Filter::new();
        if let Some(subject) = &self.draft.subject {
            filter.insert("subject", subject.to_json());
        }
        self.question_picker.open(&self.draft.questions, filter);
    }

    pub fn handle_modal_outcome(&mut self, outcome: ModalOutcome) {
        match outcome {
            ModalOutcome::Committed(records) => {
                let added = merge_committed(&mut self.draft.questions, records);
                info!(added, total = self.draft.questions.len(), "questions added to quiz");
                self.status = Some(format!("Added {} question(s)", added));
            }
            ModalOutcome::Cancelled => debug!("question picker cancelled"),
        }
    }

    pub fn remove_question(&mut self, index: usize) -> Option<Record> {
        (index < self.draft.questions.len()).then(|| self.draft.questions.remove(index))
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        if let Some(change) = self.subject.show(ui) {
            if let Err(err) = self.apply_subject_change(change) {
                warn!("subject change rejected: {}", err);
                self.status = Some(err.to_string());
            }
        }
        ui.add_space(8.0);
        if let Some(change) = self.topics.show(ui) {
            self.apply_topics_change(change);
        }

        ui.separator();
        let count = self.draft.questions.len();
        let open_picker = ui
            .horizontal(|ui| {
                ui.strong(format!("Questions ({})", count));
                ui.button("Add questions...").clicked()
            })
            .inner;
        if open_picker {
            self.open_question_picker();
        }
        let mut remove = None;
        for (index, question) in self.draft.questions.iter().enumerate() {
            ui.horizontal(|ui| {
                ui.label(question.display_or_id(QUESTION_TITLE_FIELD));
                if ui.small_button("Remove").clicked() {
                    remove = Some(index);
                }
            });
        }
        if let Some(index) = remove {
            self.remove_question(index);
        }

        ui.separator();
        egui::CollapsingHeader::new("New question answers")
            .default_open(true)
            .show(ui, |ui| {
                self.answers.show(ui);
            });
    }
}

impl eframe::App for QuizEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_style(ctx);
        self.poll_backend();
        self.pump_fetches();

        egui::TopBottomPanel::bottom("status-bar").show(ctx, |ui| {
            match self.status.as_deref() {
                Some(status) => ui.colored_label(style::COLOR_STATUS_OK, status),
                None => ui.weak("Ready"),
            };
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Quiz editor");
            egui::ScrollArea::vertical().show(ui, |ui| self.show_form(ui));
        });
        if let Some(outcome) = self.question_picker.show(ctx) {
            self.handle_modal_outcome(outcome);
        }

        if self.is_busy() {
            ctx.request_repaint_after(BUSY_REPAINT_INTERVAL);
        }
    }
}
