// Vocabulary and bag-of-words corpus.
//
// Maps normalized tokens to stable integer ids and documents to sparse
// (id, count) bags. Term ids are assigned in alphabetical order so a
// given document set always produces the same vocabulary, independent of
// hash iteration order.

use std::collections::{HashMap, HashSet};

/// Sparse bag-of-words for one document: (term id, count) pairs sorted
/// by term id.
pub type Bow = Vec<(u32, u32)>;

#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: Vec<String>,
    ids: HashMap<String, u32>,
    doc_freq: Vec<u32>,
    num_docs: usize,
}

impl Vocabulary {
    /// Collect every distinct token across `documents`, recording how many
    /// documents each one appears in.
    pub fn build(documents: &[Vec<String>]) -> Self {
        let mut freq: HashMap<&str, u32> = HashMap::new();
        for doc in documents {
            let seen: HashSet<&str> = doc.iter().map(String::as_str).collect();
            for term in seen {
                *freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut terms: Vec<String> = freq.keys().map(|term| term.to_string()).collect();
        terms.sort_unstable();

        let doc_freq = terms.iter().map(|term| freq[term.as_str()]).collect();
        let ids = terms
            .iter()
            .enumerate()
            .map(|(id, term)| (term.clone(), id as u32))
            .collect();

        Self {
            terms,
            ids,
            doc_freq,
            num_docs: documents.len(),
        }
    }

    /// Drop terms seen in fewer than `no_below` documents or in more than
    /// `no_above` (a fraction) of all documents. Surviving terms are
    /// renumbered but keep their alphabetical order.
    pub fn filter_extremes(&mut self, no_below: u32, no_above: f64) {
        let cap = no_above * self.num_docs as f64;
        let keep: Vec<bool> = self
            .doc_freq
            .iter()
            .map(|&df| df >= no_below && df as f64 <= cap)
            .collect();

        let mut terms = Vec::new();
        let mut doc_freq = Vec::new();
        for (i, term) in self.terms.drain(..).enumerate() {
            if keep[i] {
                doc_freq.push(self.doc_freq[i]);
                terms.push(term);
            }
        }
        self.terms = terms;
        self.doc_freq = doc_freq;
        self.ids = self
            .terms
            .iter()
            .enumerate()
            .map(|(id, term)| (term.clone(), id as u32))
            .collect();
    }

    /// Count occurrences of known terms in `doc`. Tokens outside the
    /// vocabulary are ignored, so a fully pruned document yields an
    /// empty bag.
    pub fn doc2bow(&self, doc: &[String]) -> Bow {
        let mut counts: HashMap<u32, u32> = HashMap::new();
        for term in doc {
            if let Some(&id) = self.ids.get(term.as_str()) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        let mut bow: Bow = counts.into_iter().collect();
        bow.sort_unstable_by_key(|&(id, _)| id);
        bow
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term(&self, id: u32) -> Option<&str> {
        self.terms.get(id as usize).map(String::as_str)
    }

    pub fn id(&self, term: &str) -> Option<u32> {
        self.ids.get(term).copied()
    }
}
