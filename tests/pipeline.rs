use loan_eligibility::dataset::{generate, label_applicant, LabeledDataset, LoanCriteria};
use loan_eligibility::model::ForestConfig;
use loan_eligibility::preprocessing::{fit_transform, transform};
use loan_eligibility::rules;
use loan_eligibility::{
    ApplicantRecord, DecisionEngine, Eligibility, EligibilityError, EmploymentStatus, LoanType,
    OverrideRule, TrainedPipeline, Trainer, TrainingConfig,
};

fn small_config() -> TrainingConfig {
    TrainingConfig::default().with_samples(500).with_forest(
        ForestConfig::default()
            .with_n_estimators(12)
            .with_min_samples_split(10)
            .with_min_samples_leaf(4),
    )
}

fn train() -> TrainedPipeline {
    Trainer::builder(small_config()).build().unwrap().run().unwrap()
}

fn rec(income: f64, credit: u32, e: EmploymentStatus, l: LoanType) -> ApplicantRecord {
    ApplicantRecord::new(income, credit, e, l).unwrap()
}

fn demo_applicants() -> Vec<ApplicantRecord> {
    vec![
        rec(35_000.0, 580, EmploymentStatus::Unemployed, LoanType::Car),
        rec(150_000.0, 820, EmploymentStatus::Employed, LoanType::Home),
        rec(60_000.0, 700, EmploymentStatus::SelfEmployed, LoanType::Education),
        rec(48_000.0, 655, EmploymentStatus::Employed, LoanType::Car),
    ]
}

#[test]
fn test_transform_reapplies_fit_exactly() {
    let rows: Vec<ApplicantRecord> = generate(300, 3)
        .unwrap()
        .into_iter()
        .map(|r| r.applicant)
        .collect();
    let (fitted, state) = fit_transform(&rows).unwrap();
    assert_eq!(transform(&rows, &state).unwrap(), fitted);

    for r in demo_applicants() {
        let (one, state) = fit_transform(std::slice::from_ref(&r)).unwrap();
        assert_eq!(transform(std::slice::from_ref(&r), &state).unwrap(), one);
    }
}

#[test]
fn test_saved_artifact_predicts_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loan_eligibility_model.bin");
    let pipeline = train();
    pipeline.save(&path).unwrap();

    let engine = DecisionEngine::open(&path).unwrap();
    for r in demo_applicants() {
        let in_memory = pipeline.predict(&r).unwrap();
        assert_eq!(engine.predict(&r).unwrap(), (in_memory.label, in_memory.probability));
        assert_eq!(engine.decide(&r, None).unwrap(), in_memory);
    }
    assert_eq!(engine.metadata(), pipeline.metadata());
}

#[test]
fn test_low_credit_home_loan_always_rejected() {
    let pipeline = train();
    for e in EmploymentStatus::ALL {
        for income in [20_000.0, 90_000.0, 500_000.0] {
            let r = rec(income, 450, e, LoanType::Home);
            for predicted in Eligibility::CLASSES {
                assert_eq!(rules::apply(&r, predicted).0, Eligibility::NotEligible);
            }
            assert_eq!(pipeline.predict(&r).unwrap().label, Eligibility::NotEligible);
        }
    }
}

#[test]
fn test_exceptional_profile_always_accepted() {
    let pipeline = train();
    for l in LoanType::ALL {
        let r = rec(200_000.0, 820, EmploymentStatus::Employed, l);
        for predicted in Eligibility::CLASSES {
            assert_eq!(
                rules::apply(&r, predicted),
                (Eligibility::Eligible, Some(OverrideRule::ExceptionalProfile))
            );
        }
    }
    for l in [LoanType::Home, LoanType::Education, LoanType::Car] {
        let r = rec(200_000.0, 820, EmploymentStatus::Employed, l);
        assert_eq!(pipeline.predict(&r).unwrap().label, Eligibility::Eligible);
    }
}

#[test]
fn test_generator_is_deterministic() {
    let a = generate(1000, 1234).unwrap();
    let b = generate(1000, 1234).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, generate(1000, 1235).unwrap());
}

#[test]
fn test_exact_minimums_reach_scoring_branch() {
    for l in [LoanType::Home, LoanType::Education, LoanType::Car] {
        let c = LoanCriteria::default_for(l).unwrap();
        // At the minimums the score is exactly the employment bonus, 0.5.
        let at_min = rec(c.min_income, c.min_credit, EmploymentStatus::Employed, l);
        assert_eq!(label_applicant(&at_min, &c), Eligibility::NotEligible);
        // Raising only income, still above both minimums, flips the label,
        // which a hard reject would never allow.
        let richer = rec(c.min_income * 1.6, c.min_credit, EmploymentStatus::Employed, l);
        assert_eq!(label_applicant(&richer, &c), Eligibility::Eligible);
        let below = rec(c.min_income - 1.0, c.min_credit, EmploymentStatus::Employed, l);
        assert_eq!(label_applicant(&below, &c), Eligibility::NotEligible);
    }
}

#[test]
fn test_unseen_loan_type_is_rejected() {
    let pipeline = train();
    for l in [LoanType::Personal, LoanType::Business] {
        let r = rec(80_000.0, 720, EmploymentStatus::Employed, l);
        match pipeline.predict(&r) {
            Err(EligibilityError::UnknownCategory { column, value }) => {
                assert_eq!(column, "loan_type");
                assert_eq!(value, l.label());
            }
            other => panic!("expected UnknownCategory, got {:?}", other),
        }
    }
}

#[test]
fn test_corpus_csv_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.csv");
    let dataset = LabeledDataset::new(generate(200, 11).unwrap()).unwrap();
    dataset.write_csv(&path).unwrap();
    let back = LabeledDataset::read_csv(&path).unwrap();
    assert_eq!(back.rows(), dataset.rows());
}

#[test]
fn test_missing_artifact_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.bin");
    assert!(!DecisionEngine::is_artifact_available(&path));
    assert!(matches!(
        DecisionEngine::open(&path),
        Err(EligibilityError::ArtifactLoad(_))
    ));
}
