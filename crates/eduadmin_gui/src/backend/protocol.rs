//! Protocol types for the GUI fetch worker.

use eduadmin_core::{AppError, ListPage, ListParams};

/// Identifies the widget instance that issued a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub u64);

/// Routing tag echoed back with every reply.
///
/// `generation` is the widget's own counter at request time; the widget
/// drops replies whose generation it has moved past.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub owner: WidgetId,
    pub generation: u64,
}

/// Commands issued by the UI thread for the fetch worker to execute.
#[derive(Debug)]
pub enum FetchCmd {
    /// Fetch one bounded page of `resource`.
    List {
        ticket: Ticket,
        resource: String,
        params: ListParams,
    },
    /// Forget every cached page, e.g. after the user asks for a refresh.
    InvalidateCache,
}

/// Events produced by the fetch worker and polled by the UI thread.
#[derive(Debug)]
pub enum FetchEvent {
    Listed { ticket: Ticket, page: ListPage },
    Failed { ticket: Ticket, error: AppError },
}

impl FetchEvent {
    pub fn ticket(&self) -> Ticket {
        match self {
            Self::Listed { ticket, .. } | Self::Failed { ticket, .. } => *ticket,
        }
    }

    /// Split into the routing ticket and the fetch outcome.
    pub fn into_parts(self) -> (Ticket, Result<ListPage, AppError>) {
        match self {
            Self::Listed { ticket, page } => (ticket, Ok(page)),
            Self::Failed { ticket, error } => (ticket, Err(error)),
        }
    }
}
