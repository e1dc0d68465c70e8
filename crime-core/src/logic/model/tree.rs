//! Decision Tree - CART classifier
//!
//! Array-based node storage: children are indices into `nodes`,
//! leaves carry a sparse class distribution.
//!
//! Splits minimise weighted Gini impurity; `value <= threshold` goes left,
//! thresholds are midpoints between adjacent distinct values.

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Feature marker for leaf nodes
pub const LEAF: i32 = -2;
/// Child marker for leaf nodes
pub const NO_CHILD: i32 = -1;

// ============================================================================
// PARAMETERS
// ============================================================================

/// Number of candidate features examined per split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    Sqrt,
    All,
    Count(usize),
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Count(k) => k,
        };
        k.clamp(1, n_features.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
        }
    }
}

// ============================================================================
// TREE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Feature index to split on (`LEAF` for leaf nodes)
    pub feature: i32,
    pub threshold: f32,
    pub left_child: i32,
    pub right_child: i32,
    /// `(class, fraction)` pairs of the training samples reaching this leaf
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distribution: Vec<(usize, f32)>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.feature < 0
    }

    fn leaf(counts: &[usize]) -> Self {
        let total: usize = counts.iter().sum();
        let distribution = counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(class, &c)| (class, c as f32 / total.max(1) as f32))
            .collect();

        Self {
            feature: LEAF,
            threshold: 0.0,
            left_child: NO_CHILD,
            right_child: NO_CHILD,
            distribution,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
    n_features: usize,
    n_classes: usize,
}

struct Split {
    feature: usize,
    threshold: f32,
    impurity: f64,
}

impl DecisionTree {
    /// Fit on the rows of `x` listed in `samples` (duplicates allowed,
    /// which is how bootstrap samples are passed in).
    pub fn fit(
        x: ArrayView2<f32>,
        y: &[usize],
        samples: Vec<usize>,
        n_classes: usize,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let n_features = x.ncols();
        let max_features = params.max_features.resolve(n_features);
        let mut nodes = vec![placeholder()];
        let mut work = vec![(0usize, samples, 0usize)];

        while let Some((node_idx, samples, depth)) = work.pop() {
            let counts = class_counts(y, &samples, n_classes);

            let depth_reached = params.max_depth.map_or(false, |max| depth >= max);
            let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
            let too_small = samples.len() < params.min_samples_split.max(2);

            let split = if depth_reached || pure || too_small {
                None
            } else {
                best_split(x, y, &samples, n_classes, max_features, params.min_samples_leaf, rng)
            };

            let Some(split) = split else {
                nodes[node_idx] = TreeNode::leaf(&counts);
                continue;
            };

            let (left, right): (Vec<usize>, Vec<usize>) = samples
                .into_iter()
                .partition(|&s| x[[s, split.feature]] <= split.threshold);

            let left_idx = nodes.len();
            nodes.push(placeholder());
            let right_idx = nodes.len();
            nodes.push(placeholder());

            nodes[node_idx] = TreeNode {
                feature: split.feature as i32,
                threshold: split.threshold,
                left_child: left_idx as i32,
                right_child: right_idx as i32,
                distribution: Vec::new(),
            };

            work.push((right_idx, right, depth + 1));
            work.push((left_idx, left, depth + 1));
        }

        Self { nodes, n_features, n_classes }
    }

    /// Add this tree's leaf distribution for `row` into `acc`
    pub fn accumulate_proba(&self, row: &[f32], acc: &mut [f32]) {
        let leaf = self.leaf_for(row);
        for &(class, fraction) in &leaf.distribution {
            if let Some(slot) = acc.get_mut(class) {
                *slot += fraction;
            }
        }
    }

    pub fn predict(&self, row: &[f32]) -> usize {
        let mut proba = vec![0.0f32; self.n_classes];
        self.accumulate_proba(row, &mut proba);
        argmax(&proba)
    }

    fn leaf_for(&self, row: &[f32]) -> &TreeNode {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                return node;
            }
            let value = row.get(node.feature as usize).copied().unwrap_or(0.0);
            idx = if value <= node.threshold {
                node.left_child as usize
            } else {
                node.right_child as usize
            };
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Longest root-to-leaf path
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(idx) else { continue };
            if node.is_leaf() {
                max_depth = max_depth.max(depth);
            } else {
                stack.push((node.left_child as usize, depth + 1));
                stack.push((node.right_child as usize, depth + 1));
            }
        }
        max_depth
    }

    /// Structural check for trees read from disk: every split points at
    /// existing nodes further down the array, and features are in range
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                if node.distribution.iter().any(|(c, _)| *c >= self.n_classes) {
                    return Err(format!("node {} references an unknown class", i));
                }
                continue;
            }
            if node.feature as usize >= self.n_features {
                return Err(format!("node {} splits on feature {} of {}", i, node.feature, self.n_features));
            }
            for child in [node.left_child, node.right_child] {
                if child <= i as i32 || child as usize >= self.nodes.len() {
                    return Err(format!("node {} has invalid child {}", i, child));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn placeholder() -> TreeNode {
    TreeNode {
        feature: LEAF,
        threshold: 0.0,
        left_child: NO_CHILD,
        right_child: NO_CHILD,
        distribution: Vec::new(),
    }
}

fn class_counts(y: &[usize], samples: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &s in samples {
        counts[y[s]] += 1;
    }
    counts
}

fn gini_sum(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let sum_sq: f64 = counts.iter().map(|&c| (c as f64) * (c as f64)).sum();
    1.0 - sum_sq / (total * total)
}

/// Lowest index wins ties
pub(crate) fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Examine features in random order; stop after `max_features` of them
/// once a valid split exists, otherwise keep looking through the rest.
fn best_split(
    x: ArrayView2<f32>,
    y: &[usize],
    samples: &[usize],
    n_classes: usize,
    max_features: usize,
    min_samples_leaf: usize,
    rng: &mut StdRng,
) -> Option<Split> {
    let mut features: Vec<usize> = (0..x.ncols()).collect();
    features.shuffle(rng);

    let min_leaf = min_samples_leaf.max(1);
    let n = samples.len();
    let mut best: Option<Split> = None;
    let mut pairs: Vec<(f32, usize)> = Vec::with_capacity(n);

    for (examined, &feature) in features.iter().enumerate() {
        if examined >= max_features && best.is_some() {
            break;
        }

        pairs.clear();
        pairs.extend(samples.iter().map(|&s| (x[[s, feature]], y[s])));
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        if pairs[0].0 == pairs[n - 1].0 {
            continue;
        }

        let mut left = vec![0usize; n_classes];
        let mut right = class_counts(y, samples, n_classes);

        for i in 0..n - 1 {
            let (value, class) = pairs[i];
            left[class] += 1;
            right[class] -= 1;

            let next = pairs[i + 1].0;
            if value == next {
                continue;
            }

            let n_left = i + 1;
            let n_right = n - n_left;
            if n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            let impurity = (n_left as f64 * gini_sum(&left, n_left)
                + n_right as f64 * gini_sum(&right, n_right))
                / n as f64;

            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                let mut threshold = value + (next - value) / 2.0;
                if threshold >= next {
                    threshold = value;
                }
                best = Some(Split { feature, threshold, impurity });
            }
        }
    }

    best
}
