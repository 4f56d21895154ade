//! Block-matching similarity ratio.
//!
//! `ratio = 2 * M / (len(a) + len(b))`, where `M` counts the characters in
//! matching blocks found by repeatedly taking the longest common contiguous
//! block and recursing on the unmatched left and right remainders.
//!
//! The block choice (earliest in `a`, then earliest in `b`, among equally long
//! blocks) affects `M`, so callers must keep the argument order fixed. The
//! fuzzy threshold is tuned against this exact metric; an edit-distance ratio
//! is not a substitute.

use std::collections::HashMap;

/// `b` length at which over-frequent characters stop seeding blocks.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Matcher for one right-hand sequence against many left-hand ones.
///
/// Index the token once as `b`, then score each candidate as `a`.
#[derive(Debug, Clone)]
pub struct BlockMatcher {
    b: Vec<char>,
    /// char → ascending positions in `b`, popular chars excluded
    b2j: HashMap<char, Vec<usize>>,
    /// char → occurrence count in `b`
    b_counts: HashMap<char, usize>,
}

impl BlockMatcher {
    pub fn new(b: &str) -> Self {
        let b: Vec<char> = b.chars().collect();

        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }
        let b_counts = b2j.iter().map(|(&c, js)| (c, js.len())).collect();

        let n = b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            b2j.retain(|_, js| js.len() <= ntest);
        }

        Self { b, b2j, b_counts }
    }

    /// Cheap upper bound from lengths alone.
    pub fn real_quick_ratio(&self, a: &str) -> f64 {
        let la = a.chars().count();
        let lb = self.b.len();
        calculate_ratio(la.min(lb), la + lb)
    }

    /// Upper bound from the multiset intersection of characters.
    pub fn quick_ratio(&self, a: &str) -> f64 {
        let mut avail: HashMap<char, usize> = HashMap::new();
        let mut matches = 0;
        let mut la = 0;
        for c in a.chars() {
            la += 1;
            let left = avail
                .entry(c)
                .or_insert_with(|| self.b_counts.get(&c).copied().unwrap_or(0));
            if *left > 0 {
                *left -= 1;
                matches += 1;
            }
        }
        calculate_ratio(matches, la + self.b.len())
    }

    /// Exact block-matching ratio of `a` against the indexed `b`.
    pub fn ratio(&self, a: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let matches = self.matched_chars(&a);
        calculate_ratio(matches, a.len() + self.b.len())
    }

    fn matched_chars(&self, a: &[char]) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, a.len(), 0, self.b.len())];
        let mut scratch = Scratch::new(self.b.len());

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(a, alo, ahi, blo, bhi, &mut scratch);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        total
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` within the given ranges.
    fn find_longest_match(
        &self,
        a: &[char],
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
        scratch: &mut Scratch,
    ) -> (usize, usize, usize) {
        let b = &self.b;
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);

        // prev[j + 1] = length of the block ending at a[i - 1], b[j]
        scratch.reset();
        for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
            if let Some(js) = self.b2j.get(c) {
                for &j in js {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = scratch.prev[j] + 1;
                    scratch.set(j + 1, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            scratch.advance();
        }

        // Popular characters never seed a block but may still extend one
        while besti > alo && bestj > blo && a[besti - 1] == b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi && bestj + bestsize < bhi && a[besti + bestsize] == b[bestj + bestsize] {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }
}

/// Two rows of block lengths, with the touched cells tracked for cheap reset.
#[derive(Debug)]
struct Scratch {
    prev: Vec<usize>,
    cur: Vec<usize>,
    prev_touched: Vec<usize>,
    cur_touched: Vec<usize>,
}

impl Scratch {
    fn new(lb: usize) -> Self {
        Self {
            prev: vec![0; lb + 1],
            cur: vec![0; lb + 1],
            prev_touched: Vec::new(),
            cur_touched: Vec::new(),
        }
    }

    fn set(&mut self, idx: usize, len: usize) {
        self.cur[idx] = len;
        self.cur_touched.push(idx);
    }

    /// Current row becomes the previous one; the new current row is zeroed.
    fn advance(&mut self) {
        for &idx in &self.prev_touched {
            self.prev[idx] = 0;
        }
        self.prev_touched.clear();
        std::mem::swap(&mut self.prev, &mut self.cur);
        std::mem::swap(&mut self.prev_touched, &mut self.cur_touched);
    }

    fn reset(&mut self) {
        for &idx in self.prev_touched.iter().chain(&self.cur_touched) {
            self.prev[idx] = 0;
            self.cur[idx] = 0;
        }
        self.prev_touched.clear();
        self.cur_touched.clear();
    }
}

fn calculate_ratio(matches: usize, length: usize) -> f64 {
    if length == 0 {
        return 1.0;
    }
    2.0 * matches as f64 / length as f64
}

/// Similarity of `a` (dataset candidate) against `b` (OCR token), in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    BlockMatcher::new(b).ratio(a)
}
