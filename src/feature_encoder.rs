//! Feature encoding for the loan approval classifier.
//!
//! Produces the vector layout the XGBoost model was trained on: the seven
//! numeric application fields followed by the categorical blocks for loan
//! purpose and employment type.

use crate::types::application::LoanApplication;

/// Loan purpose categories, in training order.
pub const LOAN_PURPOSES: [&str; 5] = ["debt", "home", "other", "personal", "vehicle"];

/// Employment type categories, in training order.
pub const EMPLOYMENT_TYPES: [&str; 4] = ["full", "part", "self", "retired"];

const NUMERIC_FIELDS: [&str; 7] = [
    "amount",
    "term",
    "all_active_acc",
    "acc_opened_12m",
    "acc_age",
    "balance",
    "no_of_defaults",
];

/// Encoder that turns loan applications into model input features.
///
/// Categorical fields are expanded one block per category: a category that
/// does not match the application's value contributes `[1, 0, ..]`, the
/// matching one contributes a one-hot block with the 1 at its own index.
/// The model was trained on vectors built this way, so the layout is kept
/// as is. A value outside the category list matches nothing and every block
/// takes the no-match form.
pub struct FeatureEncoder;

impl FeatureEncoder {
    /// Create a new feature encoder.
    pub fn new() -> Self {
        Self
    }

    /// Encode an application into a feature vector.
    pub fn encode(&self, app: &LoanApplication) -> Vec<f32> {
        let mut features = Vec::with_capacity(self.feature_count());

        features.push(app.amount as f32);
        features.push(app.term as f32);
        features.push(app.all_active_acc as f32);
        features.push(app.acc_opened_12m as f32);
        features.push(app.acc_age as f32);
        features.push(app.balance as f32);
        features.push(app.no_of_defaults as f32);

        append_category_blocks(&mut features, &LOAN_PURPOSES, &app.loan_purpose);
        append_category_blocks(&mut features, &EMPLOYMENT_TYPES, &app.employment_type);

        features
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        NUMERIC_FIELDS.len()
            + LOAN_PURPOSES.len() * LOAN_PURPOSES.len()
            + EMPLOYMENT_TYPES.len() * EMPLOYMENT_TYPES.len()
    }

    /// Get feature names, one per slot of the encoded vector.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = NUMERIC_FIELDS.iter().map(|n| n.to_string()).collect();
        names.extend(block_names("loan_purpose", &LOAN_PURPOSES));
        names.extend(block_names("employment_type", &EMPLOYMENT_TYPES));
        names
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn append_category_blocks(features: &mut Vec<f32>, categories: &[&str], value: &str) {
    let width = categories.len();
    for (index, category) in categories.iter().enumerate() {
        let hot = if *category == value { index } else { 0 };
        features.extend((0..width).map(|slot| if slot == hot { 1.0 } else { 0.0 }));
    }
}

fn block_names(field: &str, categories: &[&str]) -> Vec<String> {
    categories
        .iter()
        .flat_map(|category| {
            (0..categories.len()).map(move |slot| format!("{field}[{category}][{slot}]"))
        })
        .collect()
}
