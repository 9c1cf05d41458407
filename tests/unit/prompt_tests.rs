//! Unit tests for prompt assembly, knowledge loading, and plan output.

use std::fs;

use planwright::prompt::{build_prompt, load_knowledge, write_plan_output};

#[test]
fn prompt_contains_all_parts() {
    let prompt = build_prompt(
        "agent prompt",
        &[("file.md".to_owned(), "knowledge".to_owned())],
        "spec content",
    );
    assert!(prompt.contains("agent prompt"));
    assert!(prompt.contains("knowledge"));
    assert!(prompt.contains("file.md"));
    assert!(prompt.contains("spec content"));
}

/// Instructions appear before knowledge, knowledge before the spec.
#[test]
fn prompt_ordering_is_instructions_knowledge_spec() {
    let prompt = build_prompt(
        "AGENT",
        &[("k.md".to_owned(), "KNOWLEDGE".to_owned())],
        "SPEC",
    );
    let agent = prompt.find("AGENT").expect("AGENT present");
    let knowledge = prompt.find("KNOWLEDGE").expect("KNOWLEDGE present");
    let spec = prompt.find("SPEC").expect("SPEC present");
    assert!(agent < knowledge, "instructions must precede knowledge");
    assert!(knowledge < spec, "knowledge must precede the spec");
}

#[test]
fn prompt_without_knowledge_still_has_both_ends() {
    let prompt = build_prompt("agent", &[], "spec");
    assert!(prompt.contains("agent"));
    assert!(prompt.contains("spec"));
}

#[test]
fn knowledge_loads_sorted_with_relative_paths() {
    let temp = tempfile::tempdir().expect("tempdir");
    let knowledge_dir = temp.path().join(".planwright/knowledge");
    fs::create_dir_all(knowledge_dir.join("nested")).expect("mkdir");
    fs::write(knowledge_dir.join("b.md"), "bee").expect("write b");
    fs::write(knowledge_dir.join("a.md"), "ay").expect("write a");
    fs::write(knowledge_dir.join("nested/c.md"), "sea").expect("write c");
    fs::write(knowledge_dir.join("ignored.txt"), "nope").expect("write txt");

    let corpus = load_knowledge(temp.path()).expect("knowledge loads");

    let names: Vec<&str> = corpus.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["a.md", "b.md", "nested/c.md"]);
    assert_eq!(corpus[0].1, "ay");
}

#[test]
fn missing_knowledge_dir_yields_empty_corpus() {
    let temp = tempfile::tempdir().expect("tempdir");
    let corpus = load_knowledge(temp.path()).expect("absent dir is fine");
    assert!(corpus.is_empty());
}

#[test]
fn plan_output_is_written_to_plan_md() {
    let temp = tempfile::tempdir().expect("tempdir");
    let plan_dir = temp.path().join("plans/demo");

    write_plan_output(&plan_dir, "# The Plan\n").expect("plan writes");

    let written = fs::read_to_string(plan_dir.join("plan.md")).expect("plan.md exists");
    assert_eq!(written, "# The Plan\n");
}
