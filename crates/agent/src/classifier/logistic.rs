//! Multinomial logistic regression
//!
//! Softmax model with an L2 penalty on the weights (not the intercepts)
//! and balanced class weights, fitted by full-batch gradient descent from
//! zero. Training has no randomness, so the same data always yields the
//! same weights.

use serde::{Deserialize, Serialize};

use super::tfidf::SparseVector;

pub const DEFAULT_MAX_ITER: usize = 1000;
pub const DEFAULT_C: f64 = 1.0;

/// Stop once the largest gradient component drops below this
const GRADIENT_TOLERANCE: f64 = 1e-5;

/// Fitting options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticConfig {
    /// Inverse regularization strength
    pub c: f64,
    pub max_iter: usize,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            c: DEFAULT_C,
            max_iter: DEFAULT_MAX_ITER,
        }
    }
}

/// Fitted model: one weight row and intercept per class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Class labels, sorted
    pub classes: Vec<String>,
    /// `coef[class][feature]`
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    /// Gradient steps taken during fitting
    #[serde(default)]
    pub n_iter: usize,
}

impl LogisticRegression {
    /// Fit on sparse rows `x` with string labels `y`.
    ///
    /// Minimizes `0.5 * |W|^2 + C * sum_i w_i * CE_i` (scaled by `1 / (C n)`),
    /// where `w_i` is the balanced weight of the sample's class.
    pub fn fit(
        x: &[SparseVector],
        y: &[String],
        num_features: usize,
        config: LogisticConfig,
    ) -> Self {
        let mut classes: Vec<String> = y.to_vec();
        classes.sort();
        classes.dedup();

        let k = classes.len();
        let n = x.len();
        let mut coef = vec![vec![0.0; num_features]; k];
        let mut intercept = vec![0.0; k];

        if n == 0 || k == 0 {
            return Self {
                classes,
                coef,
                intercept,
                n_iter: 0,
            };
        }

        let targets: Vec<usize> = y
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or(0))
            .collect();

        // Balanced weights: n / (k * count(class))
        let mut counts = vec![0usize; k];
        for &t in &targets {
            counts[t] += 1;
        }
        let class_weight: Vec<f64> = counts
            .iter()
            .map(|&c| n as f64 / (k as f64 * c.max(1) as f64))
            .collect();

        let n_f = n as f64;
        let l2 = 1.0 / (config.c * n_f);
        let max_sample_weight = class_weight.iter().cloned().fold(0.0, f64::max);
        // Rows are L2-normalized and the intercept adds one unit column, so
        // the loss gradient is Lipschitz with constant at most max weight + l2
        let learning_rate = 1.0 / (max_sample_weight + l2);

        let mut n_iter = 0;
        let mut grad_w = vec![vec![0.0; num_features]; k];
        let mut grad_b = vec![0.0; k];

        for _ in 0..config.max_iter {
            n_iter += 1;
            for row in grad_w.iter_mut() {
                row.iter_mut().for_each(|g| *g = 0.0);
            }
            grad_b.iter_mut().for_each(|g| *g = 0.0);

            for (row, &target) in x.iter().zip(&targets) {
                let probs = softmax_scores(&coef, &intercept, row);
                let weight = class_weight[target] / n_f;
                for (class, p) in probs.iter().enumerate() {
                    let residual = weight * (p - if class == target { 1.0 } else { 0.0 });
                    grad_b[class] += residual;
                    for &(feature, value) in row {
                        grad_w[class][feature] += residual * value;
                    }
                }
            }

            let mut max_grad: f64 = 0.0;
            for class in 0..k {
                for feature in 0..num_features {
                    let g = grad_w[class][feature] + l2 * coef[class][feature];
                    grad_w[class][feature] = g;
                    max_grad = max_grad.max(g.abs());
                }
                max_grad = max_grad.max(grad_b[class].abs());
            }

            if max_grad < GRADIENT_TOLERANCE {
                break;
            }

            for class in 0..k {
                for feature in 0..num_features {
                    coef[class][feature] -= learning_rate * grad_w[class][feature];
                }
                intercept[class] -= learning_rate * grad_b[class];
            }
        }

        tracing::debug!(classes = k, samples = n, n_iter, "Fitted logistic regression");

        Self {
            classes,
            coef,
            intercept,
            n_iter,
        }
    }

    /// Posterior per class, in `classes` order; sums to 1
    pub fn predict_proba(&self, row: &SparseVector) -> Vec<f64> {
        softmax_scores(&self.coef, &self.intercept, row)
    }

    /// Most probable class and its posterior
    pub fn predict(&self, row: &SparseVector) -> Option<(&str, f64)> {
        let probs = self.predict_proba(row);
        probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(index, &p)| (self.classes[index].as_str(), p))
    }

    pub fn num_features(&self) -> usize {
        self.coef.first().map(Vec::len).unwrap_or(0)
    }
}

fn softmax_scores(coef: &[Vec<f64>], intercept: &[f64], row: &SparseVector) -> Vec<f64> {
    let logits: Vec<f64> = coef
        .iter()
        .zip(intercept)
        .map(|(weights, b)| {
            b + row
                .iter()
                .map(|&(feature, value)| weights.get(feature).copied().unwrap_or(0.0) * value)
                .sum::<f64>()
        })
        .collect();

    let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::tfidf::TfidfVectorizer;

    fn fit_small() -> (TfidfVectorizer, LogisticRegression) {
        let docs = [
            "check my balance",
            "show account balance",
            "balance please",
            "transfer money to friend",
            "send money",
            "transfer funds",
        ];
        let labels: Vec<String> = [
            "check_balance",
            "check_balance",
            "check_balance",
            "transfer_money",
            "transfer_money",
            "transfer_money",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let vectorizer = TfidfVectorizer::fit(&docs, 5000);
        let x = vectorizer.transform_all(&docs);
        let model = LogisticRegression::fit(
            &x,
            &labels,
            vectorizer.num_features(),
            LogisticConfig::default(),
        );
        (vectorizer, model)
    }

    #[test]
    fn test_separates_classes() {
        let (vectorizer, model) = fit_small();

        let (label, confidence) = model.predict(&vectorizer.transform("balance")).unwrap();
        assert_eq!(label, "check_balance");
        assert!(confidence > 0.5);

        let (label, _) = model.predict(&vectorizer.transform("transfer money")).unwrap();
        assert_eq!(label, "transfer_money");
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (vectorizer, model) = fit_small();
        for text in ["balance", "money", "unrelated words", ""] {
            let probs = model.predict_proba(&vectorizer.transform(text));
            assert_eq!(probs.len(), 2);
            assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        }
    }

    #[test]
    fn test_fitting_is_deterministic() {
        let (_, first) = fit_small();
        let (_, second) = fit_small();
        assert_eq!(first, second);
    }

    #[test]
    fn test_classes_sorted() {
        let (_, model) = fit_small();
        assert_eq!(model.classes, vec!["check_balance", "transfer_money"]);
        assert_eq!(model.coef.len(), 2);
        assert_eq!(model.intercept.len(), 2);
    }
}
