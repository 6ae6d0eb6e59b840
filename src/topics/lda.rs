// Latent Dirichlet allocation via collapsed Gibbs sampling.
//
// Trains directly on the sparse bag-of-words corpus. Counts live in
// ndarray matrices; each pass walks every token of every document and
// resamples its topic proportionally to
//
//   (doc-topic count + alpha) * (topic-word count + eta) / (topic size + eta * V)
//
// Smoothed estimates over the final counts serve as the document-topic
// and topic-word distributions.

use std::cmp::Ordering;
use std::str::FromStr;

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::corpus::Bow;

/// Topic-word prior used when eta is left on auto.
const DEFAULT_ETA: f64 = 0.01;

/// A Dirichlet prior: either a concrete value or "auto", which resolves
/// to 1/K for alpha and [`DEFAULT_ETA`] for eta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prior {
    Auto,
    Value(f64),
}

impl Prior {
    fn resolve(self, auto_default: f64) -> f64 {
        match self {
            Prior::Auto => auto_default,
            Prior::Value(v) => v,
        }
    }
}

impl FromStr for Prior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Prior::Auto);
        }
        match s.parse::<f64>() {
            Ok(v) if v > 0.0 => Ok(Prior::Value(v)),
            Ok(_) => Err("prior must be positive".to_string()),
            Err(_) => Err(format!("expected 'auto' or a positive number, got '{s}'")),
        }
    }
}

/// Training knobs for [`GibbsLda::fit`].
#[derive(Debug, Clone)]
pub struct ModelOptions {
    pub num_topics: usize,
    /// Full Gibbs sweeps over the corpus.
    pub passes: usize,
    pub alpha: Prior,
    pub eta: Prior,
    /// Fixed seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            num_topics: 5,
            passes: 5,
            alpha: Prior::Auto,
            eta: Prior::Auto,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GibbsLda {
    num_topics: usize,
    num_terms: usize,
    alpha: f64,
    eta: f64,
    /// Topic-word counts: num_topics x num_terms.
    topic_word: Array2<f64>,
    /// Document-topic counts: num_docs x num_topics.
    doc_topic: Array2<f64>,
    /// Token totals per topic.
    topic_totals: Array1<f64>,
}

impl GibbsLda {
    /// Train a model over `corpus`. Every term id in the bags must be
    /// below `num_terms`.
    pub fn fit(corpus: &[Bow], num_terms: usize, options: &ModelOptions) -> Result<Self> {
        if options.num_topics == 0 {
            bail!("number of topics must be at least 1");
        }
        if corpus.is_empty() {
            bail!("corpus is empty, nothing to train on");
        }
        let num_topics = options.num_topics;
        let alpha = options.alpha.resolve(1.0 / num_topics as f64);
        let eta = options.eta.resolve(DEFAULT_ETA);
        if alpha <= 0.0 || eta <= 0.0 {
            bail!("priors must be positive (alpha {alpha}, eta {eta})");
        }

        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        // A bag of (term, count) unrolls into `count` token instances so
        // each occurrence carries its own topic assignment.
        let doc_tokens: Vec<Vec<u32>> = corpus
            .iter()
            .map(|bow| {
                bow.iter()
                    .flat_map(|&(term, count)| std::iter::repeat(term).take(count as usize))
                    .collect()
            })
            .collect();

        let mut topic_word = Array2::<f64>::zeros((num_topics, num_terms));
        let mut doc_topic = Array2::<f64>::zeros((corpus.len(), num_topics));
        let mut topic_totals = Array1::<f64>::zeros(num_topics);

        // Random initial assignment.
        let mut assignments: Vec<Vec<usize>> = Vec::with_capacity(doc_tokens.len());
        for (doc, tokens) in doc_tokens.iter().enumerate() {
            let mut assigned = Vec::with_capacity(tokens.len());
            for &term in tokens {
                let topic = rng.random_range(0..num_topics);
                topic_word[[topic, term as usize]] += 1.0;
                doc_topic[[doc, topic]] += 1.0;
                topic_totals[topic] += 1.0;
                assigned.push(topic);
            }
            assignments.push(assigned);
        }

        let eta_sum = eta * num_terms as f64;
        let mut weights = vec![0.0; num_topics];

        let pb = ProgressBar::new(options.passes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  Training [{bar:30}] {pos}/{len} ({eta})")
                .unwrap(),
        );

        for _pass in 0..options.passes {
            for (doc, tokens) in doc_tokens.iter().enumerate() {
                for (pos, &term) in tokens.iter().enumerate() {
                    let term = term as usize;
                    let old = assignments[doc][pos];

                    // Take the token out of the counts, resample, put it back.
                    topic_word[[old, term]] -= 1.0;
                    doc_topic[[doc, old]] -= 1.0;
                    topic_totals[old] -= 1.0;

                    let mut total = 0.0;
                    for (topic, weight) in weights.iter_mut().enumerate() {
                        *weight = (doc_topic[[doc, topic]] + alpha)
                            * (topic_word[[topic, term]] + eta)
                            / (topic_totals[topic] + eta_sum);
                        total += *weight;
                    }

                    let threshold = rng.random::<f64>() * total;
                    let mut cumulative = 0.0;
                    let mut next = num_topics - 1;
                    for (topic, &weight) in weights.iter().enumerate() {
                        cumulative += weight;
                        if cumulative >= threshold {
                            next = topic;
                            break;
                        }
                    }

                    topic_word[[next, term]] += 1.0;
                    doc_topic[[doc, next]] += 1.0;
                    topic_totals[next] += 1.0;
                    assignments[doc][pos] = next;
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        debug!(
            topics = num_topics,
            documents = corpus.len(),
            terms = num_terms,
            passes = options.passes,
            "Finished Gibbs sampling"
        );

        Ok(Self {
            num_topics,
            num_terms,
            alpha,
            eta,
            topic_word,
            doc_topic,
            topic_totals,
        })
    }

    pub fn num_topics(&self) -> usize {
        self.num_topics
    }

    /// Smoothed topic distribution for one training document, in ascending
    /// topic order. Empty when the document contributed no tokens, which
    /// happens when its text was fully pruned from the vocabulary.
    pub fn document_topics(&self, doc: usize) -> Vec<(usize, f64)> {
        if doc >= self.doc_topic.nrows() {
            return Vec::new();
        }
        let total = self.doc_topic.row(doc).sum();
        if total == 0.0 {
            return Vec::new();
        }
        let denom = total + self.num_topics as f64 * self.alpha;
        (0..self.num_topics)
            .map(|topic| (topic, (self.doc_topic[[doc, topic]] + self.alpha) / denom))
            .collect()
    }

    /// Heaviest terms of a topic as (term id, probability), descending.
    /// Ties keep ascending term id, so output is fully deterministic.
    pub fn top_words(&self, topic: usize, limit: usize) -> Vec<(u32, f64)> {
        if topic >= self.num_topics || self.num_terms == 0 {
            return Vec::new();
        }
        let denom = self.topic_totals[topic] + self.eta * self.num_terms as f64;
        let mut ranked: Vec<(u32, f64)> = (0..self.num_terms)
            .map(|term| {
                (
                    term as u32,
                    (self.topic_word[[topic, term]] + self.eta) / denom,
                )
            })
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(limit);
        ranked
    }
}
