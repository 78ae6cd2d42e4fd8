use crate::models::{RiskLevel, SurveyRecord};

pub const HIGH_RISK_ADVICE: &str = "Immediate counseling and professional support required";
pub const MEDIUM_RISK_ADVICE: &str = "Regular monitoring and stress management advised";
pub const LOW_RISK_ADVICE: &str = "No immediate risk, maintain healthy lifestyle";

/// Midpoint of a self-reported CGPA bracket. Exact match only.
pub fn cgpa_midpoint(bracket: &str) -> Option<f64> {
    match bracket {
        "0 - 1.99" => Some(1.5),
        "2.00 - 2.49" => Some(2.25),
        "2.50 - 2.99" => Some(2.75),
        "3.00 - 3.49" => Some(3.25),
        "3.50 - 4.00" => Some(3.75),
        _ => None,
    }
}

pub fn is_yes(answer: &str) -> bool {
    answer == "Yes"
}

pub fn assign_risk(depression: bool, anxiety: bool, panic: bool) -> RiskLevel {
    if depression && anxiety {
        RiskLevel::High
    } else if depression || panic {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub fn risk_for_record(record: &SurveyRecord) -> RiskLevel {
    assign_risk(
        is_yes(&record.depression),
        is_yes(&record.anxiety),
        is_yes(&record.panic_attack),
    )
}

/// Anything that is not exactly "High" or "Medium" gets the low-risk advice.
pub fn recommendation_for(label: &str) -> &'static str {
    match label {
        "High" => HIGH_RISK_ADVICE,
        "Medium" => MEDIUM_RISK_ADVICE,
        _ => LOW_RISK_ADVICE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(depression: &str, anxiety: &str, panic: &str) -> SurveyRecord {
        SurveyRecord {
            gender: "Female".to_string(),
            age: 19.0,
            year_of_study: "year 1".to_string(),
            cgpa: 3.25,
            marital_status: "No".to_string(),
            depression: depression.to_string(),
            anxiety: anxiety.to_string(),
            panic_attack: panic.to_string(),
            sought_treatment: "No".to_string(),
        }
    }

    #[test]
    fn depression_with_anxiety_is_high_regardless_of_panic() {
        assert_eq!(assign_risk(true, true, true), RiskLevel::High);
        assert_eq!(assign_risk(true, true, false), RiskLevel::High);
    }

    #[test]
    fn depression_alone_is_medium() {
        assert_eq!(assign_risk(true, false, false), RiskLevel::Medium);
        assert_eq!(assign_risk(true, false, true), RiskLevel::Medium);
    }

    #[test]
    fn panic_without_depression_is_medium() {
        assert_eq!(assign_risk(false, false, true), RiskLevel::Medium);
        assert_eq!(assign_risk(false, true, true), RiskLevel::Medium);
    }

    #[test]
    fn no_flags_is_low() {
        assert_eq!(assign_risk(false, false, false), RiskLevel::Low);
        assert_eq!(assign_risk(false, true, false), RiskLevel::Low);
    }

    #[test]
    fn record_rule_matches_only_exact_yes() {
        assert_eq!(risk_for_record(&sample_record("Yes", "Yes", "No")), RiskLevel::High);
        assert_eq!(risk_for_record(&sample_record("yes", "Yes", "No")), RiskLevel::Low);
        assert_eq!(risk_for_record(&sample_record("No", "No", "Yes")), RiskLevel::Medium);
    }

    #[test]
    fn labelling_is_deterministic() {
        let record = sample_record("Yes", "No", "Yes");
        let first = risk_for_record(&record);
        for _ in 0..5 {
            assert_eq!(risk_for_record(&record), first);
        }
    }

    #[test]
    fn cgpa_brackets_map_to_midpoints() {
        assert_eq!(cgpa_midpoint("3.00 - 3.49"), Some(3.25));
        assert_eq!(cgpa_midpoint("0 - 1.99"), Some(1.5));
        assert_eq!(cgpa_midpoint("3.50 - 4.00"), Some(3.75));
        assert_eq!(cgpa_midpoint("3.50 - 4.00 "), None);
        assert_eq!(cgpa_midpoint(""), None);
    }

    #[test]
    fn recommendation_matches_label_exactly() {
        assert_eq!(recommendation_for("High"), HIGH_RISK_ADVICE);
        assert_eq!(recommendation_for("Medium"), MEDIUM_RISK_ADVICE);
        assert_eq!(recommendation_for("Low"), LOW_RISK_ADVICE);
        assert_eq!(recommendation_for("high"), LOW_RISK_ADVICE);
    }
}
