//! Weighted CART decision tree for binary classification.
//!
//! Trees are grown greedily: at each node a random subset of features is
//! examined, every midpoint between consecutive distinct values is a candidate
//! threshold, and the split with the lowest weighted Gini impurity wins.
//! Nodes are stored in a flat vector; children always have a larger index
//! than their parent.

use crate::error::{EligibilityError, Result};
use ndarray::{Array2, ArrayView1};
use rand::seq::index::sample;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Growth limits for a single tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Number of features examined per split.
    pub max_features: usize,
}

/// One node of a fitted tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Rows with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Weighted class fractions `[not_eligible, eligible]`.
    Leaf { proba: [f64; 2] },
}

/// A fitted decision tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

#[derive(Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

fn gini(w0: f64, w1: f64) -> f64 {
    let total = w0 + w1;
    if total <= 0.0 {
        return 0.0;
    }
    let (p0, p1) = (w0 / total, w1 / total);
    1.0 - p0 * p0 - p1 * p1
}

struct Grower<'a> {
    x: &'a Array2<f64>,
    y: &'a [usize],
    weights: &'a [f64],
    config: TreeConfig,
    nodes: Vec<Node>,
}

impl<'a> Grower<'a> {
    fn class_weights(&self, samples: &[usize]) -> (f64, f64) {
        samples.iter().fold((0.0, 0.0), |(w0, w1), &s| {
            if self.y[s] == 1 {
                (w0, w1 + self.weights[s])
            } else {
                (w0 + self.weights[s], w1)
            }
        })
    }

    fn grow<R: Rng>(&mut self, samples: &[usize], depth: usize, rng: &mut R) -> usize {
        let (w0, w1) = self.class_weights(samples);
        let total = w0 + w1;
        let proba = if total > 0.0 {
            [w0 / total, w1 / total]
        } else {
            [0.5, 0.5]
        };
        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf { proba });

        let n = samples.len();
        if depth >= self.config.max_depth
            || n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf
            || w0 == 0.0
            || w1 == 0.0
        {
            return idx;
        }

        let Some(split) = self.best_split(samples, (w0, w1), rng) else {
            return idx;
        };
        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&s| self.x[[s, split.feature]] <= split.threshold);
        if left.is_empty() || right.is_empty() {
            return idx;
        }

        let l = self.grow(&left, depth + 1, rng);
        let r = self.grow(&right, depth + 1, rng);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: l,
            right: r,
        };
        idx
    }

    fn best_split<R: Rng>(
        &self,
        samples: &[usize],
        (w0, w1): (f64, f64),
        rng: &mut R,
    ) -> Option<Split> {
        let n_features = self.x.ncols();
        let k = self.config.max_features.clamp(1, n_features);
        let min_leaf = self.config.min_samples_leaf;
        let total = w0 + w1;
        let mut best: Option<Split> = None;
        let mut sorted = samples.to_vec();

        for feature in sample(rng, n_features, k).into_iter() {
            sorted.sort_by(|&a, &b| self.x[[a, feature]].total_cmp(&self.x[[b, feature]]));

            let (mut l0, mut l1) = (0.0, 0.0);
            for i in 0..sorted.len() - 1 {
                let s = sorted[i];
                if self.y[s] == 1 {
                    l1 += self.weights[s];
                } else {
                    l0 += self.weights[s];
                }
                let n_left = i + 1;
                if n_left < min_leaf || sorted.len() - n_left < min_leaf {
                    continue;
                }
                let lo = self.x[[s, feature]];
                let hi = self.x[[sorted[i + 1], feature]];
                if lo == hi {
                    continue;
                }

                let (r0, r1) = (w0 - l0, w1 - l1);
                let impurity = ((l0 + l1) * gini(l0, l1) + (r0 + r1) * gini(r0, r1)) / total;
                if best.map_or(true, |b| impurity < b.impurity) {
                    let mid = lo + (hi - lo) / 2.0;
                    // adjacent floats: the midpoint may round up to `hi`
                    let threshold = if mid < hi { mid } else { lo };
                    best = Some(Split {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }
        best
    }
}

impl DecisionTree {
    /// Grow a tree over `samples` (row indices into `x`, repeats allowed).
    ///
    /// `y` holds class indices (0 or 1) and `weights` one weight per row of `x`.
    pub fn fit<R: Rng>(
        x: &Array2<f64>,
        y: &[usize],
        weights: &[f64],
        samples: &[usize],
        config: TreeConfig,
        rng: &mut R,
    ) -> Self {
        let mut grower = Grower {
            x,
            y,
            weights,
            config,
            nodes: Vec::new(),
        };
        grower.grow(samples, 0, rng);
        Self {
            nodes: grower.nodes,
        }
    }

    /// Class fractions of the leaf `row` falls into.
    pub fn predict_proba(&self, row: ArrayView1<'_, f64>) -> [f64; 2] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { proba } => return *proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Structural checks for a tree read from untrusted bytes.
    ///
    /// Every child index must point forward, which also rules out cycles, so
    /// `predict_proba` always terminates on a validated tree.
    pub fn validate(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(EligibilityError::InvalidInput("tree has no nodes".to_string()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features || !threshold.is_finite() {
                        return Err(EligibilityError::InvalidInput(format!(
                            "node {} splits on invalid feature {} / threshold {}",
                            i, feature, threshold
                        )));
                    }
                    for &child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(EligibilityError::InvalidInput(format!(
                                "node {} has out-of-order child {}",
                                i, child
                            )));
                        }
                    }
                }
                Node::Leaf { proba } => {
                    if proba.iter().any(|p| !(0.0..=1.0).contains(p)) {
                        return Err(EligibilityError::InvalidInput(format!(
                            "leaf {} has probabilities outside [0, 1]",
                            i
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config() -> TreeConfig {
        TreeConfig {
            max_depth: 4,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: 2,
        }
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(1.0, 0.0), 0.0);
        assert!((gini(1.0, 1.0) - 0.5).abs() < 1e-12);
        assert_eq!(gini(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_separable_data_is_learned() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [10.0, 0.0], [11.0, 0.0]];
        let y = [0, 0, 0, 1, 1];
        let w = [1.0; 5];
        let samples: Vec<usize> = (0..5).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let tree = DecisionTree::fit(&x, &y, &w, &samples, config(), &mut rng);

        assert_eq!(tree.depth(), 1);
        match &tree.nodes()[0] {
            Node::Split {
                feature, threshold, ..
            } => {
                assert_eq!(*feature, 0);
                assert_eq!(*threshold, 6.5);
            }
            other => panic!("expected split at root, got {:?}", other),
        }
        assert_eq!(tree.predict_proba(x.row(0)), [1.0, 0.0]);
        assert_eq!(tree.predict_proba(x.row(4)), [0.0, 1.0]);
        tree.validate(2).unwrap();
    }

    #[test]
    fn test_pure_node_is_leaf() {
        let x = array![[1.0], [2.0]];
        let y = [1, 1];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let tree = DecisionTree::fit(&x, &y, &[1.0, 1.0], &[0, 1], config(), &mut rng);
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.predict_proba(x.row(0)), [0.0, 1.0]);
    }

    #[test]
    fn test_weights_shift_leaf_fractions() {
        // constant feature: no split possible, root is the only leaf
        let x = array![[0.0], [0.0], [0.0]];
        let y = [0, 0, 1];
        let w = [1.0, 1.0, 2.0];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let tree = DecisionTree::fit(&x, &y, &w, &[0, 1, 2], config(), &mut rng);
        assert_eq!(tree.predict_proba(x.row(0)), [0.5, 0.5]);
    }

    #[test]
    fn test_depth_limit_respected() {
        let x = Array2::from_shape_fn((64, 1), |(i, _)| i as f64);
        let y: Vec<usize> = (0..64).map(|i| i % 2).collect();
        let samples: Vec<usize> = (0..64).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let tree = DecisionTree::fit(&x, &y, &[1.0; 64], &samples, config(), &mut rng);
        assert!(tree.depth() <= 4);
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let x = Array2::from_shape_fn((20, 1), |(i, _)| i as f64);
        let y: Vec<usize> = (0..20).map(|i| usize::from(i >= 17)).collect();
        let samples: Vec<usize> = (0..20).collect();
        let cfg = TreeConfig {
            min_samples_leaf: 5,
            ..config()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let tree = DecisionTree::fit(&x, &y, &[1.0; 20], &samples, cfg, &mut rng);
        // best unconstrained split (16.5) would leave 3 rows on the right
        if let Node::Split { threshold, .. } = &tree.nodes()[0] {
            assert!(*threshold <= 14.5);
        }
    }

    #[test]
    fn test_validate_rejects_backward_child() {
        let tree = DecisionTree {
            nodes: vec![
                Node::Split {
                    feature: 0,
                    threshold: 1.0,
                    left: 0,
                    right: 1,
                },
                Node::Leaf { proba: [1.0, 0.0] },
            ],
        };
        assert!(tree.validate(1).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_feature() {
        let tree = DecisionTree {
            nodes: vec![
                Node::Split {
                    feature: 3,
                    threshold: 1.0,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { proba: [1.0, 0.0] },
                Node::Leaf { proba: [0.0, 1.0] },
            ],
        };
        assert!(tree.validate(2).is_err());
        assert!(tree.validate(4).is_ok());
    }
}
