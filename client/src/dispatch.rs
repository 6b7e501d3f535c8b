use hatvenn_shared::Message;

use crate::board::SnapshotOutcome;
use crate::log;
use crate::session::{ClientSession, ClueView, Screen};

/// Apply one server message. Runs to completion before the next message is applied.
pub fn dispatch(session: &mut ClientSession, message: Message) {
    match message {
        Message::AddChat { text } => session.chat.push(text),
        Message::ShowMessage { text } => session.screen = Screen::Notice(text),
        Message::ShowClue { clue } => {
            session.screen = Screen::Clue;
            session.clue = ClueView {
                text: clue,
                answer: None,
            };
            session.board.reset_for_clue();
            session.transfer.cancel();
        }
        Message::ShowAnswer { answer } => session.clue.answer = Some(answer),
        Message::VennState(state) => {
            session.screen = Screen::Venn;
            if let SnapshotOutcome::Ignored(stage) = session.board.apply_snapshot(&state) {
                log::info(&format!("venn_state ignored in stage {stage:?}"));
            }
        }
        Message::VennComplete { targets } => {
            session.screen = Screen::Venn;
            session.board.complete_venn(targets);
            session.transfer.cancel();
        }
        Message::CenterComplete { targets, answer } => {
            session.screen = Screen::Venn;
            session.board.complete_center(targets, answer);
            session.transfer.cancel();
        }
    }
}
