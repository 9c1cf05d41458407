//! Unit tests for answer joining and loop data types.

use planwright::conversation::{join_answers, TurnOutcome, ANSWER_SEPARATOR};

#[test]
fn answers_join_with_the_fixed_separator_in_order() {
    let answers = vec!["first".to_owned(), "second".to_owned(), "third".to_owned()];
    assert_eq!(
        join_answers(&answers),
        format!("first{ANSWER_SEPARATOR}second{ANSWER_SEPARATOR}third")
    );
}

#[test]
fn single_answer_has_no_separator() {
    assert_eq!(join_answers(&["only".to_owned()]), "only");
}

#[test]
fn empty_answer_list_joins_to_empty_input() {
    assert_eq!(join_answers(&[]), "");
}

#[test]
fn turn_outcomes_compare_by_content() {
    assert_eq!(
        TurnOutcome::Completed("done".into()),
        TurnOutcome::Completed("done".into())
    );
    assert_ne!(
        TurnOutcome::Completed("done".into()),
        TurnOutcome::NeedsAnswers(vec![])
    );
}
