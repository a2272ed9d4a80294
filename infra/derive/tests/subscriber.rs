#[test]
fn subscriber_ui() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/ui/subscriber_trait_impl.rs");
    t.compile_fail("tests/ui/subscriber_bad_event_signature.rs");
}
