//! Verification report generation.

use serde::Serialize;
use sha2::{Digest as _, Sha256};

use crate::fixtures::Scenario;
use crate::runner::VerificationResult;

/// Pass/fail tally over a result set.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl VerificationSummary {
    #[must_use]
    pub fn from_results(results: &[VerificationResult]) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// SHA-256 digest of a scenario's canonical JSON body.
#[derive(Debug, Clone, Serialize)]
pub struct FixtureDigest {
    pub name: String,
    pub sha256: String,
}

impl FixtureDigest {
    pub fn of(scenario: &Scenario) -> Result<Self, serde_json::Error> {
        let body = scenario.to_json()?;
        let digest = Sha256::digest(body.as_bytes());
        Ok(Self {
            name: scenario.name.clone(),
            sha256: format!("{digest:x}"),
        })
    }
}

/// Human-readable + machine-readable verification report.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub title: String,
    pub timestamp: String,
    /// Integrity digests of the scenarios that were run.
    pub fixtures: Vec<FixtureDigest>,
    pub summary: VerificationSummary,
    pub results: Vec<VerificationResult>,
}

impl ScenarioReport {
    #[must_use]
    pub fn to_markdown(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::new();
        let _ = writeln!(out, "# {}\n", self.title);
        let _ = writeln!(out, "Generated: {}\n", self.timestamp);
        let _ = writeln!(
            out,
            "Summary: {} total, {} passed, {} failed\n",
            self.summary.total, self.summary.passed, self.summary.failed
        );

        let _ = writeln!(out, "| Scenario | Step | Op | Status |");
        let _ = writeln!(out, "|---|---|---|---|");
        for result in &self.results {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} |",
                result.scenario,
                result.step,
                result.op,
                if result.passed { "pass" } else { "FAIL" }
            );
        }

        let failures: Vec<&VerificationResult> =
            self.results.iter().filter(|r| !r.passed).collect();
        if !failures.is_empty() {
            let _ = writeln!(out, "\n## Failures\n");
            for result in failures {
                let _ = writeln!(
                    out,
                    "- `{}` step {} ({}): expected `{}`, got `{}`",
                    result.scenario, result.step, result.op, result.expected, result.actual
                );
            }
        }

        let _ = writeln!(out, "\n## Fixture digests\n");
        for fixture in &self.fixtures {
            let _ = writeln!(out, "- `{}`: `{}`", fixture.name, fixture.sha256);
        }
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
