//! Fetch worker wiring.
//!
//! This module exposes the command/event protocol plus the worker spawn helper
//! used by the egui UI thread.

mod protocol;
mod worker;

pub use protocol::{FetchCmd, FetchEvent, Ticket, WidgetId};
pub use worker::{spawn_backend, BackendHandle};

#[cfg(test)]
mod tests {
    use super::*;
    use eduadmin_core::{
        AppError, Filter, ListParams, ListSource, Record, SortOrder, StaticListSource,
    };
    use std::sync::Arc;
    use std::time::Duration;

    fn recv_event(rx: &crossbeam_channel::Receiver<FetchEvent>) -> FetchEvent {
        rx.recv_timeout(Duration::from_secs(2))
            .expect("expected backend event")
    }

    fn topics() -> Arc<StaticListSource> {
        Arc::new(StaticListSource::new().with_table(
            "topics",
            vec![
                Record::new(1u64).with_field("name", "Algebra"),
                Record::new(2u64).with_field("name", "Geometry"),
            ],
        ))
    }

    fn params() -> ListParams {
        ListParams {
            page: 1,
            per_page: 20,
            sort_field: "name".to_string(),
            sort_order: SortOrder::Asc,
            filter: Filter::new(),
        }
    }

    fn list(ticket: Ticket, resource: &str) -> FetchCmd {
        FetchCmd::List {
            ticket,
            resource: resource.to_string(),
            params: params(),
        }
    }

    const TICKET: Ticket = Ticket {
        owner: WidgetId(7),
        generation: 3,
    };

    #[test]
    fn backend_lists_and_echoes_ticket() {
        let source = topics();
        let backend = spawn_backend(source.clone() as Arc<dyn ListSource>);
        backend.cmd_tx.send(list(TICKET, "topics")).expect("send list");

        match recv_event(&backend.evt_rx) {
            FetchEvent::Listed { ticket, page } => {
                assert_eq!(ticket, TICKET);
                let names: Vec<String> = page
                    .data
                    .iter()
                    .filter_map(|record| record.display("name"))
                    .collect();
                assert_eq!(names, vec!["Algebra", "Geometry"]);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn repeated_request_within_max_age_is_served_from_cache() {
        let source = topics();
        let backend = spawn_backend(source.clone() as Arc<dyn ListSource>);
        backend.cmd_tx.send(list(TICKET, "topics")).expect("send first");
        let _ = recv_event(&backend.evt_rx);
        let second = Ticket {
            owner: WidgetId(8),
            generation: 1,
        };
        backend.cmd_tx.send(list(second, "topics")).expect("send second");

        match recv_event(&backend.evt_rx) {
            FetchEvent::Listed { ticket, page } => {
                assert_eq!(ticket, second);
                assert_eq!(page.data.len(), 2);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(source.request_count(), 1);
    }

    #[test]
    fn invalidate_and_expiry_force_refetch() {
        let source = topics();
        let backend = spawn_backend(source.clone() as Arc<dyn ListSource>);
        backend.cmd_tx.send(list(TICKET, "topics")).expect("send first");
        let _ = recv_event(&backend.evt_rx);

        backend
            .cmd_tx
            .send(FetchCmd::InvalidateCache)
            .expect("send invalidate");
        backend.cmd_tx.send(list(TICKET, "topics")).expect("send second");
        let _ = recv_event(&backend.evt_rx);
        assert_eq!(source.request_count(), 2);

        std::thread::sleep(worker::LIST_CACHE_MAX_AGE + Duration::from_millis(50));
        backend.cmd_tx.send(list(TICKET, "topics")).expect("send third");
        let _ = recv_event(&backend.evt_rx);
        assert_eq!(source.request_count(), 3);
    }

    #[test]
    fn failures_are_reported_and_not_cached() {
        let source = topics();
        source.fail_next(1);
        let backend = spawn_backend(source.clone() as Arc<dyn ListSource>);
        backend.cmd_tx.send(list(TICKET, "topics")).expect("send failing");

        let (ticket, result) = recv_event(&backend.evt_rx).into_parts();
        assert_eq!(ticket, TICKET);
        assert!(result.is_err());

        backend.cmd_tx.send(list(TICKET, "topics")).expect("send retry");
        let (_, retry) = recv_event(&backend.evt_rx).into_parts();
        assert_eq!(retry.expect("retry succeeds").data.len(), 2);
    }

    #[test]
    fn unknown_resource_surfaces_as_failed_event() {
        let backend = spawn_backend(topics() as Arc<dyn ListSource>);
        backend.cmd_tx.send(list(TICKET, "lessons")).expect("send list");
        match recv_event(&backend.evt_rx) {
            FetchEvent::Failed { ticket, error } => {
                assert_eq!(ticket, TICKET);
                assert!(matches!(error, AppError::UnknownResource(_)));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
