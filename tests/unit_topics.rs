// Unit tests for corpus preparation and LDA training.
//
// Tests isolated pieces of the topic stack: Vocabulary pruning and
// bag-of-words conversion, Prior parsing, and invariant properties of
// a trained GibbsLda model that hold regardless of sampling outcome.

use watchword::topics::corpus::Vocabulary;
use watchword::topics::lda::{GibbsLda, ModelOptions, Prior};

fn docs(raw: &[&str]) -> Vec<Vec<String>> {
    raw.iter()
        .map(|doc| doc.split_whitespace().map(str::to_string).collect())
        .collect()
}

// ============================================================
// Vocabulary: pruning and renumbering
// ============================================================

#[test]
fn vocabulary_of_no_documents_is_empty() {
    let vocabulary = Vocabulary::build(&[]);
    assert!(vocabulary.is_empty());
    assert!(vocabulary.doc2bow(&["wire".to_string()]).is_empty());
}

#[test]
fn filter_extremes_keeps_terms_exactly_on_the_boundaries() {
    // Four documents: "edge" sits on both bounds (df 2 with no_below 2,
    // and df 2 equals the 0.5 cap), "wire" exceeds the cap at df 3.
    let mut vocabulary = Vocabulary::build(&docs(&["edge wire", "edge", "wire", "wire"]));
    vocabulary.filter_extremes(2, 0.5);

    assert_eq!(vocabulary.len(), 1);
    assert_eq!(vocabulary.id("edge"), Some(0));
    assert_eq!(vocabulary.id("wire"), None);
}

#[test]
fn doc2bow_uses_renumbered_ids_after_pruning() {
    let mut vocabulary =
        Vocabulary::build(&docs(&["cash wire", "cash wire", "zebra cash"]));
    vocabulary.filter_extremes(2, 1.0);

    // "zebra" is gone, so "cash" and "wire" hold ids 0 and 1.
    let doc = docs(&["zebra wire cash cash"]).remove(0);
    assert_eq!(vocabulary.doc2bow(&doc), vec![(0, 2), (1, 1)]);
}

#[test]
fn document_frequency_counts_documents_not_occurrences() {
    // "cash" appears four times but only in one document, so no_below 2
    // prunes it.
    let mut vocabulary = Vocabulary::build(&docs(&["cash cash cash cash", "wire", "wire"]));
    vocabulary.filter_extremes(2, 1.0);

    assert_eq!(vocabulary.id("cash"), None);
    assert_eq!(vocabulary.id("wire"), Some(0));
}

// ============================================================
// Prior: parsing
// ============================================================

#[test]
fn prior_parses_auto_case_insensitively() {
    assert_eq!("auto".parse::<Prior>().unwrap(), Prior::Auto);
    assert_eq!("AUTO".parse::<Prior>().unwrap(), Prior::Auto);
}

#[test]
fn prior_parses_positive_numbers() {
    assert_eq!("0.5".parse::<Prior>().unwrap(), Prior::Value(0.5));
    assert_eq!("50".parse::<Prior>().unwrap(), Prior::Value(50.0));
}

#[test]
fn prior_rejects_nonpositive_and_junk_input() {
    assert!("0".parse::<Prior>().is_err());
    assert!("-1".parse::<Prior>().is_err());
    assert!("beta".parse::<Prior>().is_err());
}

#[test]
fn model_options_defaults() {
    let options = ModelOptions::default();
    assert_eq!(options.num_topics, 5);
    assert_eq!(options.passes, 5);
    assert_eq!(options.alpha, Prior::Auto);
    assert_eq!(options.eta, Prior::Auto);
    assert_eq!(options.seed, None);
}

// ============================================================
// GibbsLda: invariants that hold for any sampling outcome
// ============================================================

fn small_corpus() -> Vec<Vec<(u32, u32)>> {
    vec![
        vec![(0, 2), (1, 1)],
        vec![(1, 2), (2, 1)],
        vec![(0, 1), (2, 2)],
    ]
}

fn quick_options(num_topics: usize) -> ModelOptions {
    ModelOptions {
        num_topics,
        passes: 10,
        alpha: Prior::Auto,
        eta: Prior::Auto,
        seed: Some(1),
    }
}

#[test]
fn single_topic_model_assigns_everything_to_topic_zero() {
    let model = GibbsLda::fit(&small_corpus(), 3, &quick_options(1)).unwrap();
    for doc in 0..3 {
        assert_eq!(model.document_topics(doc), vec![(0, 1.0)]);
    }
}

#[test]
fn document_topics_lists_topics_in_ascending_order() {
    let model = GibbsLda::fit(&small_corpus(), 3, &quick_options(2)).unwrap();
    let ids: Vec<usize> = model.document_topics(0).iter().map(|&(t, _)| t).collect();
    assert_eq!(ids, vec![0, 1]);
}

#[test]
fn document_topics_out_of_range_is_empty() {
    let model = GibbsLda::fit(&small_corpus(), 3, &quick_options(2)).unwrap();
    assert!(model.document_topics(99).is_empty());
}

#[test]
fn top_words_cover_the_whole_vocabulary_and_sum_to_one() {
    let model = GibbsLda::fit(&small_corpus(), 3, &quick_options(2)).unwrap();

    let ranked = model.top_words(0, 99);
    assert_eq!(ranked.len(), 3, "limit beyond the vocabulary caps at it");

    let total: f64 = ranked.iter().map(|&(_, p)| p).sum();
    assert!(
        (total - 1.0).abs() < 1e-9,
        "term probabilities of a topic should sum to 1, got {total}"
    );
}

#[test]
fn top_words_out_of_range_topic_is_empty() {
    let model = GibbsLda::fit(&small_corpus(), 3, &quick_options(2)).unwrap();
    assert!(model.top_words(2, 3).is_empty());
}

#[test]
fn fit_rejects_nonpositive_priors() {
    let options = ModelOptions {
        alpha: Prior::Value(-0.5),
        ..quick_options(2)
    };
    let err = GibbsLda::fit(&small_corpus(), 3, &options).unwrap_err();
    assert!(
        err.to_string().contains("priors must be positive"),
        "unexpected error: {err}"
    );
}
