//! Text rendering for the host console.

use std::fmt::Write;

use quizbuzz_core::Question;
use quizbuzz_engine::{RoundState, SessionEvent, SessionSnapshot};
use quizbuzz_storage::QuestionRecord;

/// One line (or block) per event; `None` for events the host need not see.
pub fn event(event: &SessionEvent) -> Option<String> {
    let text = match event {
        SessionEvent::SessionStarted { questions } => {
            format!("Session started with {questions} enabled question(s).")
        }
        SessionEvent::QuestionPresented {
            number,
            question,
            manual,
            ..
        } => {
            let mut text = format!("\nQuestion {number}: {}", question_block(question));
            if *manual {
                text.push_str("\n(host decides: use `declare <player>`)");
            }
            text
        }
        SessionEvent::FloorGranted { contestant } => format!(">> {contestant} has the floor"),
        SessionEvent::AnswerJudged {
            contestant,
            option,
            correct: true,
            points,
        } => format!("{contestant} chose {}: correct! +{points}", option + 1),
        SessionEvent::AnswerJudged {
            contestant, option, ..
        } => format!("{contestant} chose {}: wrong", option + 1),
        SessionEvent::LockedOut { contestant } => format!("{contestant} is locked out"),
        SessionEvent::RoundReset => "Round reset, buzzers open.".to_string(),
        SessionEvent::RoundResolved { outcome } => format!("Round over: {outcome}."),
        SessionEvent::GameOver { report } => format!("\n=== GAME OVER ===\n{report}"),
        SessionEvent::SessionReset => "Session discarded.".to_string(),
        _ => return None,
    };
    Some(text)
}

fn question_block(question: &Question) -> String {
    let mut text = question.text.clone();
    for (i, option) in question.options.iter().enumerate() {
        let _ = write!(text, "\n  {}) {option}", i + 1);
    }
    text
}

pub fn snapshot(snapshot: &SessionSnapshot) -> String {
    let mut text = match snapshot.state {
        RoundState::Idle if snapshot.finished => "Game finished.".to_string(),
        RoundState::Idle => "No session. Type `start`.".to_string(),
        RoundState::AwaitingBuzz => "Waiting for a buzz.".to_string(),
        RoundState::ManualWinner => "Waiting for the host to declare a winner.".to_string(),
        RoundState::AwaitingAnswer(holder) => format!("{holder} is answering."),
        RoundState::Resolved(outcome) => format!("Round over: {outcome}. Type `next`."),
    };

    if let (Some(index), Some(question)) = (snapshot.question_index, &snapshot.question) {
        let _ = write!(
            text,
            "\n[{}/{}] {}",
            index + 1,
            snapshot.question_count,
            question_block(question)
        );
    }

    text.push_str("\nScores:");
    for status in &snapshot.contestants {
        let _ = write!(text, " {}={}", status.id, status.score);
        if status.locked_out {
            text.push_str("(out)");
        }
        if status.has_floor {
            text.push('*');
        }
    }
    text
}

pub fn record(number: usize, record: &QuestionRecord) -> String {
    let mark = if record.enabled { "x" } else { " " };
    let title = if record.question.trim().is_empty() {
        "(empty)"
    } else {
        record.question.as_str()
    };
    let mut text = format!("{number:>3}. [{mark}] {title}");
    for (slot, answer) in record.answers.iter().enumerate() {
        let correct = if usize::from(record.correct) == slot {
            "*"
        } else {
            " "
        };
        let _ = write!(text, "\n       {correct}{}) {answer}", slot + 1);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizbuzz_core::ContestantId;
    use quizbuzz_engine::RoundOutcome;

    fn p(i: u8) -> ContestantId {
        ContestantId::new(i, 4).unwrap()
    }

    #[test]
    fn test_judged_answers_show_one_based_options() {
        let right = SessionEvent::AnswerJudged {
            contestant: p(0),
            option: 2,
            correct: true,
            points: 50,
        };
        assert_eq!(event(&right).unwrap(), "P1 chose 3: correct! +50");

        let wrong = SessionEvent::AnswerJudged {
            contestant: p(3),
            option: 0,
            correct: false,
            points: 0,
        };
        assert_eq!(event(&wrong).unwrap(), "P4 chose 1: wrong");
    }

    #[test]
    fn test_manual_question_prompts_host() {
        let question = Question::host_adjudicated("Sing something");
        let text = event(&SessionEvent::QuestionPresented {
            number: 1,
            index: 0,
            question,
            manual: true,
        })
        .unwrap();
        assert!(text.contains("Question 1: Sing something"));
        assert!(text.contains("declare"));
    }

    #[test]
    fn test_snapshot_marks_floor_and_lockouts() {
        let mut snap = SessionSnapshot::idle(3);
        snap.state = RoundState::AwaitingAnswer(p(1));
        snap.contestants[0].locked_out = true;
        snap.contestants[1].has_floor = true;
        snap.contestants[2].score = 100;

        let text = snapshot(&snap);
        assert!(text.starts_with("P2 is answering."));
        assert!(text.ends_with("Scores: P1=0(out) P2=0* P3=100"));
    }

    #[test]
    fn test_snapshot_resolved_prompts_next() {
        let mut snap = SessionSnapshot::idle(2);
        snap.state = RoundState::Resolved(RoundOutcome::Exhausted);
        assert!(snapshot(&snap).starts_with("Round over: nobody answered correctly. Type `next`."));
    }

    #[test]
    fn test_record_listing() {
        let record = QuestionRecord::new("2 + 2?", ["3", "4", "", ""], 1);
        let text = super::record(1, &record);
        assert!(text.starts_with("  1. [x] 2 + 2?"));
        assert!(text.contains("*2) 4"));
        assert!(text.contains(" 1) 3"));
    }
}
