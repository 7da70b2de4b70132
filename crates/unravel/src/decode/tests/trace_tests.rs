use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{DecodeInfo, Decoder, Level, TraceCallback, TraceTree, Tracer};

#[test]
fn trees_mirror_the_recursion() {
    let mut tree = TraceTree::new();
    let mut target: Vec<String> = Vec::new();

    Decoder::new()
        .decode_traced(Level::ValueList, "a,b", &mut target, &mut [&mut tree])
        .expect("decodes");

    insta::assert_snapshot!(tree.render(), @r#"
    decode trace
      [value list] "a,b" => alloc::vec::Vec<alloc::string::String> (list)
        [value] "a" => alloc::string::String (text)
        [value] "b" => alloc::string::String (text)
    "#);
}

#[test]
fn callbacks_observe_every_mark() {
    let mut seen: Vec<(Level, String)> = Vec::new();
    {
        let mut callback =
            TraceCallback::new(|info: &DecodeInfo| seen.push((info.level, info.input.clone())));
        let mut target: Vec<String> = Vec::new();
        Decoder::new()
            .decode_traced(Level::ValueList, "a,b", &mut target, &mut [&mut callback])
            .expect("decodes");
    }

    assert_eq!(
        seen,
        [
            (Level::ValueList, "a,b".to_string()),
            (Level::Value, "a".to_string()),
            (Level::Value, "b".to_string()),
        ]
    );
}

#[test]
fn decoder_marks_run_alongside_caller_sinks() {
    let marks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&marks);
    let decoder = Decoder::builder()
        .with_mark(move |_info| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .build()
        .expect("valid configuration");

    let mut tree = TraceTree::new();
    let mut target = String::new();
    decoder
        .decode_traced(Level::Value, "abc", &mut target, &mut [&mut tree])
        .expect("decodes");

    assert_eq!(marks.load(Ordering::Relaxed), 1);
    assert!(tree.render().contains(r#"[value] "abc""#));
}

#[test]
fn failed_decodes_keep_their_partial_trace() {
    let mut tree = TraceTree::new();
    let mut target: Vec<u32> = Vec::new();

    Decoder::new()
        .decode_traced(Level::ValueList, "1,x,3", &mut target, &mut [&mut tree])
        .expect_err("x is not a number");

    let rendered = tree.render();
    assert!(rendered.contains(r#"[value] "1""#));
    assert!(rendered.contains(r#"[value] "x""#));
    assert!(!rendered.contains(r#"[value] "3""#));
}

#[test]
fn multiple_sinks_fork_in_lockstep() {
    let mut tree_a = TraceTree::new();
    let mut tree_b = TraceTree::new();
    let mut target = String::new();

    Decoder::new()
        .decode_traced(
            Level::Value,
            "abc",
            &mut target,
            &mut [&mut tree_a as &mut dyn Tracer, &mut tree_b as &mut dyn Tracer],
        )
        .expect("decodes");

    assert_eq!(tree_a.render(), tree_b.render());
}
