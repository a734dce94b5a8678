//! End-to-end scenarios: labels text → parsed variables → classified wave

use codebook_classify::{analyze_questionnaire, ScaleClassifier};
use codebook_common::labels::{atomize, parse_labels};
use codebook_common::{Polarity, ScaleType};

const WAVE: &str = "\
Variable: q38
  Question: q38. How easy or difficult is it to obtain the following services?  An identity document
  Value Labels:
     -1 = Missing
     1 = Very Difficult
     2 = Difficult
     3 = Easy
     4 = Very Easy
     5 = Never Tried
     8 = Can't choose
     9 = Decline to answer

Variable: q39
  Question: q39. A birth certificate
  Value Labels:
     -1 = Missing
     1 = Very Difficult
     2 = Difficult
     3 = Easy
     4 = Very Easy
     5 = Never Tried
     8 = Can't choose
     9 = Decline to answer

Variable: q90
  Question: q90. Overall, how satisfied are you with the way democracy works
  in your country?
  Value Labels:
     -1 = Missing  1 = Very Satisfied  2 = Satisfied  3 = Dissatisfied
     4 = Very Dissatisfied  8 = Don't know  9 = Refused

Variable: se5
  Question: se5. What is your main occupation?
  Value Labels:
     1 = Manager 2 = Professional 3 = Technician 4 = Clerk 5 = Service worker
     6 = Farmer 7 = Craft worker 8 = Operator 9 = Laborer 10 = Soldier
     11 = Student 12 = Homemaker 13 = Retired 14 = Self-employed 15 = Other

Variable: ir3
  Question: ir3. Interviewer remarks
";

#[test]
fn test_wave_classification() {
    let variables = atomize(parse_labels(WAVE).unwrap());
    let result = analyze_questionnaire(&ScaleClassifier::default(), variables);

    let find = |id: &str| {
        result
            .variables
            .iter()
            .find(|av| av.variable.variable_id == id)
            .unwrap()
    };

    let q39 = find("q39");
    assert!(q39.variable.question_text.starts_with("How easy or difficult"));
    assert!(q39.variable.question_text.ends_with("A birth certificate"));
    assert_eq!(q39.scale_analysis.scale_type, ScaleType::Likert5);
    assert_eq!(q39.scale_analysis.first_na_value, Some(8));
    assert!(!q39.scale_analysis.needs_reversal);

    let q90 = find("q90");
    assert!(q90.variable.question_text.contains("works in your country?"));
    assert_eq!(q90.scale_analysis.scale_type, ScaleType::Likert4);
    assert_eq!(q90.scale_analysis.first_na_value, Some(8));
    assert_eq!(q90.scale_analysis.value_1_polarity, Polarity::Positive);
    assert!(q90.scale_analysis.needs_reversal);

    let se5 = find("se5");
    assert_eq!(se5.scale_analysis.scale_type, ScaleType::Categorical);
    assert!(!se5.scale_analysis.needs_reversal);

    let ir3 = find("ir3");
    assert_eq!(ir3.scale_analysis.scale_type, ScaleType::Unknown);
    assert_eq!(ir3.scale_analysis.confidence, 0.0);

    assert_eq!(result.statistics.total, 5);
    assert_eq!(result.statistics.needs_reversal, 1);
}

#[test]
fn test_analyzed_json_shape() {
    let variables = parse_labels(WAVE).unwrap();
    let result = analyze_questionnaire(&ScaleClassifier::default(), variables);
    let json = serde_json::to_value(&result.variables[2]).unwrap();

    assert_eq!(json["variable_id"], "q90");
    assert_eq!(json["scale_analysis"]["scale_type"], "likert_4");
    assert_eq!(json["scale_analysis"]["value_1_polarity"], "positive");
    assert_eq!(json["scale_analysis"]["needs_reversal"], true);
    assert_eq!(json["value_labels"][0]["value"], -1);
}
