use clap::Args;
use intake_assist::error::AppError;
use intake_assist::workflows::intake::{
    IntakeField, IntakeFieldSet, IntakeScore, IntakeScorer, ModerationCategories,
    ModerationResult, RiskClassifier, RiskFlag, ENOUGH_DATA_THRESHOLD, MAX_INTAKE_SCORE,
};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Path to a JSON object of intake answers (e.g. {"symptoms": "low mood"})
    #[arg(long)]
    pub(crate) fields: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ClassifyArgs {
    /// The moderation provider flagged the message
    #[arg(long)]
    pub(crate) flagged: bool,
    #[arg(long)]
    pub(crate) self_harm: bool,
    #[arg(long)]
    pub(crate) self_harm_intent: bool,
    #[arg(long)]
    pub(crate) violence: bool,
    #[arg(long)]
    pub(crate) harassment_threatening: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let raw = std::fs::read(&args.fields)?;
    let value: Value = serde_json::from_slice(&raw)?;
    let Some(map) = value.as_object() else {
        return Err(AppError::Input(format!(
            "{} must hold a JSON object of intake fields",
            args.fields.display()
        )));
    };

    let fields = IntakeFieldSet::from_json_map(map);
    let outcome = IntakeScorer.score(&fields);
    render_score(&fields, &outcome);
    Ok(())
}

fn render_score(fields: &IntakeFieldSet, outcome: &IntakeScore) {
    println!("Intake progress");
    for field in IntakeField::ALL {
        let marker = if fields.is_answered(field) { "x" } else { " " };
        println!("- [{marker}] {field} (weight {})", field.weight());
    }
    println!(
        "\nScore: {}/{} (threshold {})",
        outcome.score, MAX_INTAKE_SCORE, ENOUGH_DATA_THRESHOLD
    );
    if outcome.enough_data {
        println!("Enough data collected to move on from intake");
    } else {
        println!("More intake answers needed");
    }
}

pub(crate) fn run_classify(args: ClassifyArgs) {
    let flag = classify_args(&args);
    println!(
        "Risk flag: {}",
        flag.map(|flag| flag.label()).unwrap_or("none")
    );
}

fn classify_args(args: &ClassifyArgs) -> Option<RiskFlag> {
    let verdict = ModerationResult {
        flagged: args.flagged,
        categories: ModerationCategories {
            self_harm: args.self_harm,
            self_harm_intent: args.self_harm_intent,
            violence: args.violence,
            harassment_threatening: args.harassment_threatening,
        },
    };
    RiskClassifier::standard().classify(&verdict)
}
