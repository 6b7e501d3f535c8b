use std::collections::VecDeque;

use hatvenn_shared::{ChunkId, Cursor, Destination, OwnerTag, SubmitRequest};

use crate::backoff::Backoff;
use crate::board::Board;
use crate::config::CHAT_HISTORY_LEN;
use crate::dispatch::dispatch;
use crate::transfer::{PlaceRequest, TransferCoordinator};
use crate::waiter::{StopReason, WaitResponse, WaitStep};

/// Which panel the page shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Waiting,
    /// Server notice (HTML), e.g. the waiting room or the end card.
    Notice(String),
    Clue,
    Venn,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClueView {
    pub text: String,
    pub answer: Option<String>,
}

/// The most recent chat lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatLog {
    lines: VecDeque<String>,
}

impl ChatLog {
    pub fn push(&mut self, line: String) {
        while self.lines.len() >= CHAT_HISTORY_LEN {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(String::as_str)
    }
}

/// Everything one page load knows about the game. Created once at startup and shared by
/// the waiter and the UI event handlers.
#[derive(Debug, Clone)]
pub struct ClientSession {
    cursor: Cursor,
    backoff: Backoff,
    pub(crate) board: Board,
    pub(crate) transfer: TransferCoordinator,
    pub(crate) chat: ChatLog,
    pub(crate) screen: Screen,
    pub(crate) clue: ClueView,
}

impl ClientSession {
    pub fn new(local: OwnerTag, cursor: Cursor) -> Self {
        Self {
            cursor,
            backoff: Backoff::new(),
            board: Board::new(local),
            transfer: TransferCoordinator::default(),
            chat: ChatLog::default(),
            screen: Screen::default(),
            clue: ClueView::default(),
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn clue(&self) -> &ClueView {
        &self.clue
    }

    pub fn pending_transfer(&self) -> Option<&ChunkId> {
        self.transfer.pending()
    }

    /// Apply the outcome of one wait request and decide what the waiter does next.
    /// A batch is dispatched in array order and the cursor only moves once all of it
    /// has been applied.
    pub fn apply_wait_response(&mut self, response: WaitResponse) -> WaitStep {
        match response {
            WaitResponse::Batch(entries) => {
                self.backoff.reset();
                let last_cursor = entries.last().map(|entry| entry.cursor);
                for entry in entries {
                    dispatch(self, entry.message);
                }
                if let Some(last) = last_cursor {
                    self.cursor = self.cursor.max(last);
                }
                WaitStep::Jitter
            }
            WaitResponse::Retry(reason) => {
                let delay_ms = self.backoff.record_failure();
                WaitStep::Backoff {
                    delay_ms,
                    attempt: self.backoff.consecutive_failures(),
                    reason,
                }
            }
            WaitResponse::Expired => WaitStep::Stop(StopReason::SessionExpired),
            WaitResponse::Protocol(error) => WaitStep::Stop(StopReason::Protocol(error)),
        }
    }

    pub fn begin_transfer(&mut self, chunk: ChunkId) {
        self.transfer.begin(chunk);
    }

    pub fn cancel_transfer(&mut self) {
        self.transfer.cancel();
    }

    /// Drop the dragged chunk on `destination`. Moves it locally right away and returns
    /// the placement request to send, or `None` when nothing is being dragged.
    pub fn complete_transfer(&mut self, destination: Destination) -> Option<PlaceRequest> {
        let chunk = self.transfer.take()?;
        self.board.move_local(&chunk, destination);
        Some(PlaceRequest {
            chunk,
            owner: self.board.local().clone(),
            destination,
        })
    }

    pub fn placement_acknowledged(&mut self, request: &PlaceRequest) {
        self.board
            .placement_acknowledged(&request.chunk, request.destination);
    }

    pub fn placement_rejected(&mut self, request: &PlaceRequest) {
        self.board
            .placement_rejected(&request.chunk, request.destination);
    }
}

/// Build a submission, or `None` for an empty answer.
pub fn prepare_submission(answer: &str, who: &str) -> Option<SubmitRequest> {
    if answer.is_empty() {
        return None;
    }
    Some(SubmitRequest {
        answer: answer.to_string(),
        who: who.to_string(),
    })
}
