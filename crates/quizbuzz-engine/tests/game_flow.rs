//! End-to-end games driven through the session controller.
//!
//! Buzzers are a mock panel read by the background poller, so these tests
//! exercise the same mailbox path as a real deployment. Tokio time is
//! paused; the poller's cadence advances instantly.
//!
//! Run with: cargo test --package quizbuzz-engine --test game_flow

use std::time::Duration;

use quizbuzz_core::ContestantId;
use quizbuzz_engine::{
    AdvancePolicy, BuzzMailbox, GameConfig, RoundOutcome, RoundState, SessionController,
    SessionEvent,
};
use quizbuzz_hardware::mock::{MockBuzzerHandle, MockBuzzerPanel, MockFault};
use quizbuzz_storage::{MemoryStore, QuestionBank, QuestionRecord, default_records};

fn p(i: u8) -> ContestantId {
    ContestantId::new(i, 4).unwrap()
}

fn bank(questions: Vec<QuestionRecord>) -> QuestionBank<MemoryStore> {
    let mut records = default_records();
    for (i, record) in questions.into_iter().enumerate() {
        records[i] = record;
    }
    QuestionBank::new(MemoryStore::with_records(records))
}

struct Game {
    controller: SessionController<MemoryStore>,
    mailbox: BuzzMailbox,
    buttons: MockBuzzerHandle,
}

impl Game {
    async fn new(questions: Vec<QuestionRecord>, advance: AdvancePolicy) -> Self {
        let config = GameConfig::default().advance_policy(advance);
        let mut controller = SessionController::new(bank(questions), config).unwrap();
        controller.start_session().await.unwrap();

        let (panel, buttons) = MockBuzzerPanel::new(4);
        let mailbox = controller.attach_poller(panel.into()).await.unwrap();

        Self {
            controller,
            mailbox,
            buttons,
        }
    }

    /// Hold `index` until the engine grants someone the floor, then let go.
    async fn buzz(&mut self, index: usize) -> Option<ContestantId> {
        self.buttons.press(index);
        let holder = loop {
            let buzz = self.mailbox.recv().await.expect("poller stopped");
            let reply = self.controller.handle_buzz(buzz).unwrap();
            if let Some(holder) = reply.snapshot.floor_holder() {
                break Some(holder);
            }
        };
        self.buttons.release(index);
        holder
    }
}

#[tokio::test(start_paused = true)]
async fn test_wrong_then_correct_answer_scenario() {
    let question = QuestionRecord::new("Which is prime?", ["4", "6", "7", "9"], 2);
    let mut game = Game::new(vec![question], AdvancePolicy::HostPaced).await;

    assert_eq!(game.buzz(1).await, Some(p(1)));
    let reply = game.controller.submit_answer(p(1), 0).unwrap();
    assert!(reply.snapshot.contestants[1].locked_out);
    assert_eq!(reply.snapshot.score(1), 0);

    assert_eq!(game.buzz(0).await, Some(p(0)));
    let reply = game.controller.submit_answer(p(0), 2).unwrap();
    assert_eq!(reply.snapshot.score(0), 50);
    assert_eq!(
        reply.snapshot.state,
        RoundState::Resolved(RoundOutcome::Correct {
            contestant: p(0),
            points: 50
        })
    );

    let reply = game.controller.advance().unwrap();
    assert!(reply.snapshot.finished);
    assert_eq!(reply.snapshot.winners(), &[p(0)]);

    game.controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_manual_question_ignores_buzzers() {
    let open_question = QuestionRecord::new("Hum a tune", ["", "", "", ""], 0);
    let mut game = Game::new(vec![open_question], AdvancePolicy::HostPaced).await;
    assert_eq!(game.controller.snapshot().state, RoundState::ManualWinner);

    game.buttons.press(0);
    tokio::time::sleep(Duration::from_millis(550)).await;
    assert!(game.mailbox.try_recv().is_none());
    assert_eq!(game.buttons.poll_count(), 0);

    let reply = game.controller.declare_manual_winner(p(3)).unwrap();
    assert_eq!(reply.snapshot.score(3), 100);

    let reply = game.controller.advance().unwrap();
    assert_eq!(reply.snapshot.winners(), &[p(3)]);
    game.controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_flaky_link_does_not_disturb_the_round() {
    let question = QuestionRecord::new("Red planet?", ["Venus", "Mars", "", ""], 1);
    let mut game = Game::new(vec![question], AdvancePolicy::Immediate).await;

    for _ in 0..5 {
        game.buttons.inject_fault(MockFault::Timeout);
    }
    let before = game.controller.snapshot();
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(game.controller.snapshot(), before);

    assert_eq!(game.buzz(2).await, Some(p(2)));
    assert!(game.buttons.poll_count() > 5);

    let reply = game.controller.submit_answer(p(2), 1).unwrap();
    assert!(reply.snapshot.finished);
    assert_eq!(reply.snapshot.score(2), 100);
    game.controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_everyone_wrong_then_next_question() {
    let first = QuestionRecord::new("Hardest question", ["a", "b", "c", "d"], 3);
    let second = QuestionRecord::new("Easy question", ["yes", "no", "", ""], 0);
    let mut game = Game::new(vec![first, second], AdvancePolicy::Immediate).await;
    let mut events = game.controller.subscribe();

    for c in 0..4u8 {
        assert_eq!(game.buzz(usize::from(c)).await, Some(p(c)));
        game.controller.submit_answer(p(c), 0).unwrap();
    }

    let snapshot = game.controller.snapshot();
    assert_eq!(snapshot.state, RoundState::Resolved(RoundOutcome::Exhausted));
    assert_eq!(snapshot.scores(), vec![0, 0, 0, 0]);

    let mut saw_exhausted = false;
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::RoundResolved {
            outcome: RoundOutcome::Exhausted,
        } = event
        {
            saw_exhausted = true;
        }
    }
    assert!(saw_exhausted);

    let reply = game.controller.advance().unwrap();
    assert_eq!(reply.snapshot.question.unwrap().text, "Easy question");
    assert!(reply.snapshot.contestants.iter().all(|c| !c.locked_out));

    assert_eq!(game.buzz(3).await, Some(p(3)));
    game.controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_simultaneous_presses_go_to_lowest_index() {
    let question = QuestionRecord::new("Q", ["a", "b", "", ""], 0);
    let mut game = Game::new(vec![question], AdvancePolicy::HostPaced).await;

    game.buttons.press(3);
    game.buttons.press(1);
    game.buttons.press(2);
    let buzz = game.mailbox.recv().await.unwrap();
    let reply = game.controller.handle_buzz(buzz).unwrap();

    assert_eq!(reply.snapshot.floor_holder(), Some(p(1)));
    assert_eq!(
        reply
            .snapshot
            .contestants
            .iter()
            .filter(|c| c.has_floor)
            .count(),
        1
    );
    game.controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_reset_session_disarms_poller() {
    let question = QuestionRecord::new("Q", ["a", "b", "", ""], 0);
    let mut game = Game::new(vec![question], AdvancePolicy::HostPaced).await;

    game.controller.reset_session().unwrap();
    let polls = game.buttons.poll_count();

    game.buttons.press(0);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(game.mailbox.try_recv().is_none());
    assert_eq!(game.buttons.poll_count(), polls);
    assert_eq!(game.controller.snapshot().state, RoundState::Idle);

    // A new session re-arms the same poller.
    game.controller.start_session().await.unwrap();
    let buzz = game.mailbox.recv().await.unwrap();
    let reply = game.controller.handle_buzz(buzz).unwrap();
    assert_eq!(reply.snapshot.floor_holder(), Some(p(0)));
    game.controller.shutdown().await;
}
