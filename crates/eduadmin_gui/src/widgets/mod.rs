//! egui widgets wrapping the core selector state machines.
//!
//! Widgets never perform I/O. Each frame the app calls [`FetchDriven::pump`]
//! so a widget can hand its pending request to the [`FetchBridge`], then
//! routes worker replies back by [`WidgetId`] through
//! [`FetchBridge::dispatch`].

mod async_select;
mod multi_select;
mod option_builder;
mod selector_modal;

pub use async_select::AsyncSelect;
pub use multi_select::AsyncMultiSelect;
pub use option_builder::OptionBuilderPanel;
pub use selector_modal::{ModalOutcome, RecordSelectorModal, SEARCH_DEBOUNCE};

use crate::backend::{BackendHandle, FetchCmd, FetchEvent, Ticket, WidgetId};
use eduadmin_core::{AppError, ListPage, ListRequest};
use eframe::egui;
use tracing::debug;

pub(crate) const OPTIONS_MAX_HEIGHT: f32 = 220.0;

/// A click landed this frame somewhere outside `area`.
pub(crate) fn clicked_outside(ui: &egui::Ui, area: egui::Rect) -> bool {
    ui.input(|input| {
        input.pointer.any_click()
            && input
                .pointer
                .interact_pos()
                .is_some_and(|pos| !area.contains(pos))
    })
}

/// Something that issues list fetches and accepts their results.
pub trait FetchDriven {
    fn widget_id(&self) -> WidgetId;

    /// Send whatever fetch the widget currently needs, if any.
    fn pump(&mut self, bridge: &FetchBridge);

    /// Apply a worker reply.
    ///
    /// # Returns
    /// `false` when the reply was stale and dropped.
    fn apply(&mut self, generation: u64, result: Result<ListPage, AppError>) -> bool;
}

/// UI-side end of the fetch worker.
pub struct FetchBridge {
    backend: BackendHandle,
    next_widget: u64,
}

impl FetchBridge {
    pub fn new(backend: BackendHandle) -> Self {
        Self {
            backend,
            next_widget: 1,
        }
    }

    /// Allocate an id for a new widget instance.
    pub fn register(&mut self) -> WidgetId {
        let id = WidgetId(self.next_widget);
        self.next_widget += 1;
        id
    }

    /// Queue `request` on the worker.
    ///
    /// # Errors
    /// Returns [`AppError::Internal`] when the worker has shut down.
    pub fn request(&self, ticket: Ticket, request: ListRequest) -> Result<(), AppError> {
        debug!(
            owner = ticket.owner.0,
            generation = ticket.generation,
            resource = request.resource.as_str(),
            page = request.params.page,
            "queue list fetch"
        );
        self.backend
            .cmd_tx
            .send(FetchCmd::List {
                ticket,
                resource: request.resource,
                params: request.params,
            })
            .map_err(|_| AppError::Internal("fetch worker is not running".to_string()))
    }

    /// Ask the worker to drop its short-lived page cache.
    pub fn invalidate_cache(&self) {
        let _ = self.backend.cmd_tx.send(FetchCmd::InvalidateCache);
    }

    /// Every reply that has arrived since the last poll.
    pub fn poll(&self) -> Vec<FetchEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.backend.evt_rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Route `event` to the widget that asked for it.
    ///
    /// # Returns
    /// `true` when a widget accepted the reply.
    pub fn dispatch(event: FetchEvent, widgets: &mut [&mut dyn FetchDriven]) -> bool {
        let (ticket, result) = event.into_parts();
        match widgets
            .iter_mut()
            .find(|widget| widget.widget_id() == ticket.owner)
        {
            Some(widget) => widget.apply(ticket.generation, result),
            None => {
                debug!(owner = ticket.owner.0, "no widget for fetch reply");
                false
            }
        }
    }
}

/// Send `request` or, when the worker is gone, fail it immediately so the
/// widget leaves its loading state.
pub(crate) fn send_or_fail<W: FetchDriven + ?Sized>(
    widget: &mut W,
    bridge: &FetchBridge,
    generation: u64,
    request: ListRequest,
) {
    let ticket = Ticket {
        owner: widget.widget_id(),
        generation,
    };
    if let Err(err) = bridge.request(ticket, request) {
        widget.apply(generation, Err(err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::spawn_backend;
    use eduadmin_core::{ListSource, OptionQuery, Record, StaticListSource};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn bridge() -> FetchBridge {
        let source = StaticListSource::new().with_table(
            "subjects",
            vec![
                Record::new(1u64).with_field("name", "Maths"),
                Record::new(2u64).with_field("name", "Physics"),
            ],
        );
        FetchBridge::new(spawn_backend(Arc::new(source) as Arc<dyn ListSource>))
    }

    fn wait_for_events(bridge: &FetchBridge, count: usize) -> Vec<FetchEvent> {
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut events = Vec::new();
        while events.len() < count && Instant::now() < deadline {
            events.extend(bridge.poll());
            std::thread::sleep(Duration::from_millis(5));
        }
        events
    }

    #[test]
    fn register_hands_out_distinct_ids() {
        let mut bridge = bridge();
        let first = bridge.register();
        let second = bridge.register();
        assert_ne!(first, second);
    }

    #[test]
    fn dispatch_routes_by_owner() {
        let mut bridge = bridge();
        let mut subjects = AsyncSelect::new(
            bridge.register(),
            "Subject",
            OptionQuery::new("subjects"),
            None,
        )
        .expect("select");
        let mut other = AsyncSelect::new(
            bridge.register(),
            "Other",
            OptionQuery::new("subjects"),
            None,
        )
        .expect("select");

        subjects.pump(&bridge);
        let events = wait_for_events(&bridge, 1);
        assert_eq!(events.len(), 1);
        for event in events {
            let mut widgets: [&mut dyn FetchDriven; 2] = [&mut other, &mut subjects];
            assert!(FetchBridge::dispatch(event, &mut widgets));
        }
        assert_eq!(subjects.cache().records().len(), 2);
        assert!(other.cache().records().is_empty());
    }

    #[test]
    fn dispatch_without_owner_is_ignored() {
        let bridge = bridge();
        let event = FetchEvent::Listed {
            ticket: Ticket {
                owner: WidgetId(99),
                generation: 1,
            },
            page: ListPage::default(),
        };
        let mut none: [&mut dyn FetchDriven; 0] = [];
        assert!(!FetchBridge::dispatch(event, &mut none));
        drop(bridge);
    }
}
