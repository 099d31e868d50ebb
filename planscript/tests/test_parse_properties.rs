use indexmap::IndexSet;
use planscript::analyze;
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

/// Where a generated CALL is placed.
#[derive(Debug, Clone, Copy)]
enum Placement {
    TopLevel,
    ThenBranch,
    ElseBranch,
    LoopBody,
}

fn arb_call() -> impl Strategy<Value = (&'static str, Placement)> {
    let name = prop::sample::select(vec!["fetch", "store", "notify", "search.web", "audit_log"]);
    let placement = prop_oneof![
        Just(Placement::TopLevel),
        Just(Placement::ThenBranch),
        Just(Placement::ElseBranch),
        Just(Placement::LoopBody),
    ];
    (name, placement)
}

fn render(calls: &[(&str, Placement)]) -> String {
    let mut source = String::new();
    for (i, (name, placement)) in calls.iter().enumerate() {
        let call = format!("CALL {} id={} -> r{}", name, i, i);
        match placement {
            Placement::TopLevel => source.push_str(&format!("{}\n", call)),
            Placement::ThenBranch => {
                source.push_str(&format!("IF $r0 == null: {{\n  {}\n}}\n", call))
            }
            Placement::ElseBranch => source.push_str(&format!(
                "IF $r0 != null:: {{\n  LET skip = 1\n}} ELSE: {{\n  {}\n}}\n",
                call
            )),
            Placement::LoopBody => source.push_str(&format!(
                "FOR item IN [1, 2]: {{\n  IF $item > 1: {{\n    {}\n  }}\n}}\n",
                call
            )),
        }
    }
    source
}

proptest! {
    #![proptest_config(ProptestConfig {
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn parse_is_deterministic(calls in prop::collection::vec(arb_call(), 0..12)) {
        let source = render(&calls);
        let first = analyze(&source).unwrap();
        let second = analyze(&source).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn required_capabilities_are_first_occurrence_deduplicated(
        calls in prop::collection::vec(arb_call(), 0..12)
    ) {
        let source = render(&calls);
        let analysis = analyze(&source).unwrap();

        let names: Vec<String> = calls.iter().map(|(name, _)| name.to_string()).collect();
        let expected: Vec<String> = names.iter().cloned().collect::<IndexSet<_>>().into_iter().collect();

        let invoked: Vec<String> = analysis.invocations.iter().map(|c| c.name.clone()).collect();
        prop_assert_eq!(invoked, names);
        prop_assert_eq!(analysis.required_capabilities, expected);
    }
}
