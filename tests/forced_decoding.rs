//! Forced-decoding tests: pruning the beam with a gold constant profile
//! and enumerating the derivations that reach the gold logical form.

use semparse::{
    collect_constants, parse_expr, semantic_eq, DictKb, Expr, Ontology, Parser, ParserConfig,
    UniformModel,
};

// ===== Test Helpers =====

fn geo_ontology() -> Ontology {
    let mut ont = Ontology::new();
    ont.register("t");
    ont.register("e");
    ont.add_subtype("e", "city").unwrap();
    ont
}

/// Lexicon with an adversarial second reading for "austin": the gold
/// expression never mentions houston, so the profile filter must reject
/// every partial derivation that shifts it.
fn adversarial_kb() -> DictKb {
    let mut kb = DictKb::new();
    kb.add("capital", parse_expr("capital:<city,t>").unwrap());
    kb.add("austin", parse_expr("austin:city").unwrap());
    kb.add("austin", parse_expr("houston:city").unwrap());
    kb
}

fn exhaustive() -> ParserConfig {
    ParserConfig {
        beam_width: 0,
        dp_merge: true,
        timeout: None,
    }
}

fn final_exprs(chart: &semparse::Chart) -> Vec<Expr> {
    chart
        .final_beam()
        .iter()
        .filter_map(|&id| chart.state(id).expr.clone())
        .collect()
}

// ===== Profile filtering =====

#[test]
fn test_filter_rejects_out_of_profile_constants() {
    let ont = geo_ontology();
    let kb = adversarial_kb();
    let model = UniformModel;
    let parser = Parser::new(&ont, &kb, &model, exhaustive());

    let gold = parse_expr("(capital:<city,t> austin:city)").unwrap();
    let profile = collect_constants(&gold);
    let filter = |candidate: &Expr| profile.allows(candidate);

    let chart = parser
        .parse("capital/NN austin/NN", Some(&filter))
        .unwrap();
    let finals = final_exprs(&chart);
    assert!(!finals.is_empty(), "gold derivation was filtered out");

    // Every surviving candidate draws its constants from the gold profile.
    for expr in &finals {
        let candidate = collect_constants(expr);
        assert!(
            candidate.unigrams.is_subset(&profile.unigrams),
            "out-of-profile candidate survived: {}",
            expr,
        );
    }
    assert!(finals.iter().all(|e| !e.to_string().contains("houston")));
}

#[test]
fn test_adversarial_reading_survives_without_filter() {
    let ont = geo_ontology();
    let kb = adversarial_kb();
    let model = UniformModel;
    let parser = Parser::new(&ont, &kb, &model, exhaustive());

    // Control: with no filter the houston reading reaches the final beam,
    // so the filtered run above really exercised the pruning.
    let chart = parser.parse("capital/NN austin/NN", None).unwrap();
    let finals = final_exprs(&chart);
    assert!(finals.iter().any(|e| e.to_string().contains("houston")));
}

#[test]
fn test_match_count_against_gold() {
    let ont = geo_ontology();
    let kb = adversarial_kb();
    let model = UniformModel;
    let parser = Parser::new(&ont, &kb, &model, exhaustive());

    let gold = parse_expr("(capital:<city,t> austin:city)").unwrap();
    let profile = collect_constants(&gold);
    let filter = |candidate: &Expr| profile.allows(candidate);

    let chart = parser
        .parse("capital/NN austin/NN", Some(&filter))
        .unwrap();

    // The profile is a necessary condition only; semantic equality against
    // the gold form is the authority for counting matches.
    let matches: Vec<_> = chart
        .final_beam()
        .iter()
        .filter(|&&id| {
            chart
                .state(id)
                .expr
                .as_ref()
                .is_some_and(|e| semantic_eq(e, &gold))
        })
        .copied()
        .collect();
    assert_eq!(matches.len(), 1);

    // The matching derivations dump as a self-contained hypergraph.
    let graph = chart.hypergraph(&matches);
    assert!(graph
        .values()
        .any(|node| node.matched.as_deref() == Some("austin")));
    assert!(graph
        .values()
        .all(|node| node.matched.as_deref() != Some("houston")));
}

// ===== Filter is conservative =====

#[test]
fn test_gold_subexpressions_always_pass_the_filter() {
    let gold =
        parse_expr("(and:<t*,t> (big:<e,t> austin:city) (wet:<e,t> austin:city))").unwrap();
    let profile = collect_constants(&gold);

    // Partial results on the way to the gold expression stay in profile.
    for partial in [
        "austin:city",
        "big:<e,t>",
        "(big:<e,t> austin:city)",
        "(wet:<e,t> austin:city)",
        "(lambda $0:e (big:<e,t> $0))",
    ] {
        let expr = parse_expr(partial).unwrap();
        assert!(
            profile.allows(&expr),
            "gold-compatible partial rejected: {}",
            partial,
        );
    }
}
