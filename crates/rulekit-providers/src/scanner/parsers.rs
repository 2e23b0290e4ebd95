//! JSON report parsers for the supported scanners

use rulekit_domain::{Finding, Findings};
use serde::Deserialize;
use serde_json::Value;

use crate::constants::{CHECKOV_NAME, OPAL_NAME};

/// Parse a report produced by `tool`
pub fn parse_report(tool: &str, report: &str) -> Result<Findings, String> {
    if report.trim().is_empty() {
        return Err("empty report".to_string());
    }
    match tool {
        CHECKOV_NAME => parse_checkov(report),
        OPAL_NAME => parse_opal(report),
        other => Err(format!("no report parser for tool '{other}'")),
    }
}

#[derive(Debug, Deserialize)]
struct CheckovReport {
    #[serde(default)]
    results: Option<CheckovResults>,
}

#[derive(Debug, Default, Deserialize)]
struct CheckovResults {
    #[serde(default)]
    passed_checks: Vec<CheckovCheck>,
    #[serde(default)]
    failed_checks: Vec<CheckovCheck>,
}

#[derive(Debug, Deserialize)]
struct CheckovCheck {
    check_id: String,
    #[serde(default)]
    check_name: Option<String>,
    #[serde(default)]
    file_path: Option<String>,
}

impl CheckovCheck {
    fn into_finding(self, pass: bool) -> Finding {
        Finding {
            rule_id: self.check_id,
            pass,
            title: self.check_name,
            file: self.file_path,
        }
    }
}

/// Checkov emits one object per framework, or an array when several ran
pub fn parse_checkov(report: &str) -> Result<Findings, String> {
    let value: Value = serde_json::from_str(report).map_err(|e| e.to_string())?;
    let reports = match value {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        _ => return Err("checkov report must be an object or an array".to_string()),
    };

    let mut findings = Findings::new();
    for report in reports {
        let report: CheckovReport = serde_json::from_value(report).map_err(|e| e.to_string())?;
        let results = report.results.unwrap_or_default();
        for check in results.passed_checks {
            findings.push(check.into_finding(true));
        }
        for check in results.failed_checks {
            findings.push(check.into_finding(false));
        }
    }
    Ok(findings)
}

#[derive(Debug, Deserialize)]
struct OpalReport {
    #[serde(default)]
    rule_results: Vec<OpalRuleResults>,
}

#[derive(Debug, Deserialize)]
struct OpalRuleResults {
    #[serde(alias = "rule_id")]
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    results: Vec<OpalResult>,
}

#[derive(Debug, Deserialize)]
struct OpalResult {
    result: String,
    #[serde(default)]
    resource_id: Option<String>,
}

/// Opal groups results by rule; only `PASS` and `FAIL` results count
pub fn parse_opal(report: &str) -> Result<Findings, String> {
    let report: OpalReport = serde_json::from_str(report).map_err(|e| e.to_string())?;
    let mut findings = Findings::new();
    for rule in report.rule_results {
        for result in rule.results {
            let pass = match result.result.as_str() {
                "PASS" => true,
                "FAIL" => false,
                _ => continue,
            };
            findings.push(Finding {
                rule_id: rule.id.clone(),
                pass,
                title: rule.title.clone(),
                file: result.resource_id,
            });
        }
    }
    Ok(findings)
}
