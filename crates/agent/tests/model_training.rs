//! Train, persist and serve an intent model end to end

use std::io::Write;
use std::sync::Arc;

use bank_assistant_agent::{
    ClassifierError, ConversationContextStore, Dataset, IntentClassifier, QueryAnalyzer,
    TrainedModel, Trainer, TrainingConfig, TrainingError,
};
use bank_assistant_config::ClassifierConfig;
use bank_assistant_core::{AnalysisMethod, Intent};
use bank_assistant_text_processing::ChitchatMatcher;

const DATASET: &str = "text,intent
What's my balance?,check_balance
show my account balance,check_balance
balance enquiry please,check_balance
check my savings balance,check_balance
what is the balance in my account,check_balance
current balance,check_balance
Transfer 5000 to my friend,transfer_money
transfer funds to another account,transfer_money
transfer money to my brother,transfer_money
make a transfer of 2000,transfer_money
i want to transfer rupees,transfer_money
transfer to account 9876543210,transfer_money
I lost my credit card,lost_card
my debit card was stolen,lost_card
lost card please block it,lost_card
card stolen yesterday,lost_card
i lost my atm card,lost_card
block my stolen card,lost_card
Apply for home loan,apply_loan
i need a personal loan,apply_loan
loan application for a car,apply_loan
how do i apply for a loan,apply_loan
education loan details,apply_loan
want a business loan,apply_loan
Show branch details,get_branch_details
nearest branch location,get_branch_details
branch address in mumbai,get_branch_details
where is your branch,get_branch_details
branch ifsc code,get_branch_details
find a branch near me,get_branch_details
";

fn write_dataset(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("intents.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(DATASET.as_bytes()).unwrap();
    path
}

fn config() -> TrainingConfig {
    TrainingConfig {
        max_iter: 500,
        ..TrainingConfig::default()
    }
}

#[test]
fn test_train_save_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::from_csv(write_dataset(&dir)).unwrap();
    assert_eq!(dataset.len(), 30);

    let output = dir.path().join("models").join("intent_model.json");
    let (trained, report) = Trainer::new(config())
        .train_and_save(&dataset, &output)
        .unwrap();

    assert_eq!(report.train_size + report.test_size, 30);
    assert_eq!(report.test_size, 6);
    assert!((0.0..=1.0).contains(&report.accuracy));
    assert_eq!(report.intent_counts.len(), 5);
    assert_eq!(trained.metadata.total_samples, 30);

    let loaded = TrainedModel::load(&output).unwrap();
    assert_eq!(loaded.classes(), trained.classes());

    let query = "check my savings balance";
    let (expected, expected_p) = trained.predict(query).unwrap();
    let (actual, actual_p) = loaded.predict(query).unwrap();
    assert_eq!(expected, actual);
    assert!((expected_p - actual_p).abs() < 1e-12);

    let total: f64 = loaded.predict_proba(query).iter().map(|(_, p)| p).sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn test_analyzer_serves_trained_model() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::from_csv(write_dataset(&dir)).unwrap();
    let output = dir.path().join("intent_model.json");
    Trainer::new(config()).train_and_save(&dataset, &output).unwrap();

    let classifier = IntentClassifier::from_config(&ClassifierConfig {
        model_path: output.display().to_string(),
        min_confidence: 0.0,
        ..ClassifierConfig::default()
    });
    assert!(classifier.is_ml());

    let analyzer = QueryAnalyzer::new(
        classifier,
        ChitchatMatcher::builtin(true),
        Arc::new(ConversationContextStore::default()),
    );
    let result = analyzer.analyze("what is my account balance", Some("ml"));

    assert_eq!(result.method, AnalysisMethod::Ml);
    assert_eq!(result.intent, Intent::CheckBalance);
    assert!((0.0..=1.0).contains(&result.confidence));
}

#[test]
fn test_low_posterior_becomes_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::from_csv(write_dataset(&dir)).unwrap();
    let (model, _) = Trainer::new(config()).train(&dataset).unwrap();

    // Five classes can never put a posterior above 1.0
    let classifier = IntentClassifier::ml(model, 1.01);
    let result = classifier.classify("xyz qwerty");

    assert_eq!(result.intent, Intent::Fallback);
    assert_eq!(result.method, AnalysisMethod::Fallback);
    assert!(result.confidence > 0.0 && result.confidence <= 1.0);
}

#[test]
fn test_missing_model_falls_back_to_rules() {
    let classifier = IntentClassifier::from_config(&ClassifierConfig {
        model_path: "/nonexistent/intent_model.json".to_string(),
        ..ClassifierConfig::default()
    });
    assert!(!classifier.is_ml());

    assert!(matches!(
        TrainedModel::load("/nonexistent/intent_model.json").unwrap_err(),
        ClassifierError::ModelNotFound(_)
    ));
}

#[test]
fn test_failed_training_leaves_existing_model() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("intent_model.json");
    std::fs::write(&output, "previous").unwrap();

    let single_class = Dataset::from_pairs([
        ("what's my balance", "check_balance"),
        ("balance please", "check_balance"),
    ]);
    let err = Trainer::new(config())
        .train_and_save(&single_class, &output)
        .unwrap_err();

    assert!(matches!(err, TrainingError::SingleClass(_)));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous");
}
