// JSON output module

use crate::report::SecurityAssessment;
use crate::Result;

/// Generate JSON output for a single assessment
pub fn generate_json(assessment: &SecurityAssessment, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(assessment)?)
    } else {
        Ok(serde_json::to_string(assessment)?)
    }
}

/// Generate JSON output for a batch of assessments
pub fn generate_json_batch(assessments: &[SecurityAssessment], pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(assessments)?)
    } else {
        Ok(serde_json::to_string(assessments)?)
    }
}
