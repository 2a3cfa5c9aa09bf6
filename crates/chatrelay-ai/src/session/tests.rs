use super::*;
use crate::model::ModelVariant;
use crate::{Role, Turn};

fn session() -> ChatSession {
    ChatSession::new("be brief", ModelVariant::Gpt4Omni)
}

#[test]
fn request_starts_with_system_role() {
    let mut s = session();
    s.append_user_turn("hello");
    s.append_assistant_turn("hi", 10);

    let msgs = s.messages_for_request();
    assert_eq!(msgs.len(), 3);
    assert_eq!(msgs[0], Turn::system("be brief"));
    assert_eq!(msgs[1].role, Role::User);
    assert_eq!(msgs[2].role, Role::Assistant);
}

#[test]
fn empty_session_still_sends_system_role() {
    let msgs = ChatSession::default().messages_for_request();
    assert_eq!(msgs, vec![Turn::system("")]);
}

#[test]
fn under_budget_keeps_everything() {
    let mut s = session();
    s.append_user_turn("q1");
    s.append_assistant_turn("a1", 3840);
    assert_eq!(s.turn_count(), 2);
    assert_eq!(s.total_tokens(), 3840);
}

#[test]
fn over_budget_evicts_exactly_one_oldest_turn_per_exchange() {
    let mut s = session();
    s.append_user_turn("q1");
    s.append_assistant_turn("a1", 2000);
    s.append_user_turn("q2");
    s.append_assistant_turn("a2", 2000);

    // 4000 > 3840: "q1" goes, nothing else.
    assert_eq!(s.turn_count(), 3);
    let texts: Vec<&str> = s.turns().map(|t| t.content.text()).collect();
    assert_eq!(texts, vec!["a1", "q2", "a2"]);

    s.append_user_turn("q3");
    s.append_assistant_turn("a3", 5000);
    assert_eq!(s.turn_count(), 4);
    assert_eq!(s.turns().next().unwrap().content.text(), "q2");
}

#[test]
fn eviction_never_touches_system_role() {
    let mut s = session().with_token_budget(1);
    for i in 0..10 {
        s.append_user_turn(format!("q{i}"));
        s.append_assistant_turn(format!("a{i}"), 100);
    }
    let msgs = s.messages_for_request();
    assert_eq!(msgs[0], Turn::system("be brief"));
    // One eviction per exchange: the log grows by one each round.
    assert_eq!(s.turn_count(), 10);
}

#[test]
fn set_system_role_replaces_without_touching_history() {
    let mut s = session();
    s.append_user_turn("q1");
    s.set_system_role("speak like a pirate");
    assert_eq!(s.system_role(), "speak like a pirate");
    assert_eq!(s.turn_count(), 1);
    assert_eq!(s.messages_for_request()[0], Turn::system("speak like a pirate"));
}

#[test]
fn switch_model_cycles_the_ring() {
    let mut s = session();
    assert_eq!(s.switch_model(), "gpt-4-turbo");
    assert_eq!(s.switch_model(), "gpt-4-vision-preview");
    assert_eq!(s.switch_model(), "gpt-4o");
    assert_eq!(s.model(), ModelVariant::Gpt4Omni);
}

#[test]
fn reset_clears_turns_but_keeps_token_total() {
    let mut s = session();
    s.append_user_turn("q1");
    s.append_assistant_turn("a1", 1234);
    s.switch_model();

    s.reset();

    assert_eq!(s.turn_count(), 0);
    assert_eq!(s.total_tokens(), 1234);
    assert_eq!(s.system_role(), "be brief");
    assert_eq!(s.model(), ModelVariant::Gpt4Turbo);
}

#[test]
fn token_total_kept_after_reset_triggers_eviction_sooner() {
    let mut s = session();
    s.append_user_turn("q1");
    s.append_assistant_turn("a1", 3800);
    s.reset();

    s.append_user_turn("q2");
    s.append_assistant_turn("a2", 100);
    assert_eq!(s.turn_count(), 1);
    assert_eq!(s.turns().next().unwrap().content.text(), "a2");
}

#[test]
fn rollback_removes_most_recent_turn() {
    let mut s = session();
    s.append_user_turn("q1");
    s.append_assistant_turn("a1", 1);
    s.append_user_turn("q2");

    let removed = s.rollback_last_turn().unwrap();
    assert_eq!(removed.content.text(), "q2");
    assert_eq!(s.turn_count(), 2);

    let mut empty = ChatSession::default();
    assert!(empty.rollback_last_turn().is_none());
}
