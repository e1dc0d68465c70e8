//! Random Forest - bagged ensemble of CART trees
//!
//! Each tree is fit on a bootstrap sample with a random feature subset
//! per split. Prediction averages the trees' leaf distributions (soft
//! voting) and takes the most probable class, lowest index on ties.

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{argmax, DecisionTree, TreeParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub bootstrap: bool,
    pub tree: TreeParams,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            bootstrap: true,
            tree: TreeParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
}

/// Forest output for one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestVote {
    pub class: usize,
    /// Mean class probability across trees
    pub proba: Vec<f32>,
    /// Probability of the winning class
    pub confidence: f32,
}

impl RandomForest {
    /// Fit `params.n_estimators` trees. Same data + same seed → same forest.
    pub fn fit(
        x: ArrayView2<f32>,
        y: &[usize],
        n_classes: usize,
        params: &ForestParams,
        seed: u64,
    ) -> Result<Self, String> {
        let n_samples = x.nrows();
        if n_samples == 0 {
            return Err("cannot fit a forest on zero samples".into());
        }
        if y.len() != n_samples {
            return Err(format!("{} labels for {} samples", y.len(), n_samples));
        }
        if let Some(&bad) = y.iter().find(|&&c| c >= n_classes) {
            return Err(format!("label {} out of range for {} classes", bad, n_classes));
        }
        if params.n_estimators == 0 {
            return Err("n_estimators must be at least 1".into());
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut trees = Vec::with_capacity(params.n_estimators);

        for i in 0..params.n_estimators {
            let samples: Vec<usize> = if params.bootstrap {
                (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
            } else {
                (0..n_samples).collect()
            };

            let tree = DecisionTree::fit(x, y, samples, n_classes, &params.tree, &mut rng);
            log::debug!(
                "Tree {}/{} fit: {} nodes, depth {}",
                i + 1,
                params.n_estimators,
                tree.n_nodes(),
                tree.depth()
            );
            trees.push(tree);
        }

        Ok(Self { trees, n_features: x.ncols(), n_classes })
    }

    pub fn predict_with_votes(&self, row: &[f32]) -> ForestVote {
        let mut proba = vec![0.0f32; self.n_classes];
        for tree in &self.trees {
            tree.accumulate_proba(row, &mut proba);
        }

        let n_trees = self.trees.len().max(1) as f32;
        for p in proba.iter_mut() {
            *p /= n_trees;
        }

        let class = argmax(&proba);
        let confidence = proba.get(class).copied().unwrap_or(0.0);

        ForestVote { class, proba, confidence }
    }

    pub fn predict(&self, row: &[f32]) -> usize {
        self.predict_with_votes(row).class
    }

    pub fn predict_batch(&self, x: ArrayView2<f32>) -> Vec<usize> {
        x.rows()
            .into_iter()
            .map(|row| {
                let row = row.to_vec();
                self.predict(&row)
            })
            .collect()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn total_nodes(&self) -> usize {
        self.trees.iter().map(DecisionTree::n_nodes).sum()
    }

    pub fn avg_depth(&self) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: usize = self.trees.iter().map(DecisionTree::depth).sum();
        total as f64 / self.trees.len() as f64
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("empty forest".into());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            if tree.n_features() != self.n_features || tree.n_classes() != self.n_classes {
                return Err(format!("tree {} has a different shape than the forest", i));
            }
            tree.validate().map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }
}
