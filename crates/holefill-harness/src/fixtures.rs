//! Scenario fixture loading and the built-in scenario set.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use holefill_core::{BlockSnapshot, FitStrategy, HoleSnapshot};

/// Errors raised while loading a scenario fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed scenario json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Expected state after an operation, or the expected failure.
///
/// Absent fields are not checked; an absent `error` means the operation
/// must succeed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectSpec {
    /// Expected error kind label (e.g. `no_fitting_hole`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Expected blocks in address order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<BlockSnapshot>>,
    /// Expected holes in address order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holes: Option<Vec<HoleSnapshot>>,
}

/// One operation in a scenario script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OpSpec {
    Configure {
        total_size: usize,
        strategy: FitStrategy,
    },
    Allocate {
        id: u32,
        size: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect: Option<ExpectSpec>,
    },
    Deallocate {
        id: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect: Option<ExpectSpec>,
    },
    Compact {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect: Option<ExpectSpec>,
    },
}

impl OpSpec {
    /// Name used in reports and logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Configure { .. } => "configure",
            Self::Allocate { .. } => "allocate",
            Self::Deallocate { .. } => "deallocate",
            Self::Compact { .. } => "compact",
        }
    }
}

/// A named operation script with per-step expectations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Schema version.
    pub version: String,
    /// Scenario identifier.
    pub name: String,
    /// Operations in execution order.
    pub ops: Vec<OpSpec>,
}

impl Scenario {
    /// Load a scenario from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a scenario from a file path.
    pub fn from_file(path: &std::path::Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}

fn expect_layout(blocks: &[(u32, usize, usize)], holes: &[(usize, usize)]) -> Option<ExpectSpec> {
    Some(ExpectSpec {
        error: None,
        blocks: Some(
            blocks
                .iter()
                .map(|&(id, start, end)| BlockSnapshot { id, start, end })
                .collect(),
        ),
        holes: Some(
            holes
                .iter()
                .map(|&(start, end)| HoleSnapshot { start, end })
                .collect(),
        ),
    })
}

fn expect_error(kind: &str) -> Option<ExpectSpec> {
    Some(ExpectSpec {
        error: Some(kind.to_string()),
        blocks: None,
        holes: None,
    })
}

/// The shipped scenario set covering carving, hole splitting, coalescing,
/// best-fit selection, capacity exhaustion, and compaction.
#[must_use]
pub fn builtin_scenarios() -> Vec<Scenario> {
    let version = String::from("1");
    vec![
        Scenario {
            version: version.clone(),
            name: String::from("first_fit_carving"),
            ops: vec![
                OpSpec::Configure {
                    total_size: 100,
                    strategy: FitStrategy::FirstFit,
                },
                OpSpec::Allocate {
                    id: 0,
                    size: 30,
                    expect: expect_layout(&[(0, 0, 30)], &[(30, 100)]),
                },
                OpSpec::Allocate {
                    id: 1,
                    size: 20,
                    expect: expect_layout(&[(0, 0, 30), (1, 30, 50)], &[(50, 100)]),
                },
            ],
        },
        Scenario {
            version: version.clone(),
            name: String::from("free_leaves_separate_holes"),
            ops: vec![
                OpSpec::Configure {
                    total_size: 100,
                    strategy: FitStrategy::FirstFit,
                },
                OpSpec::Allocate {
                    id: 0,
                    size: 30,
                    expect: None,
                },
                OpSpec::Allocate {
                    id: 1,
                    size: 20,
                    expect: None,
                },
                OpSpec::Deallocate {
                    id: 0,
                    expect: expect_layout(&[(1, 30, 50)], &[(0, 30), (50, 100)]),
                },
            ],
        },
        Scenario {
            version: version.clone(),
            name: String::from("free_coalesces_both_neighbors"),
            ops: vec![
                OpSpec::Configure {
                    total_size: 100,
                    strategy: FitStrategy::FirstFit,
                },
                OpSpec::Allocate {
                    id: 0,
                    size: 30,
                    expect: None,
                },
                OpSpec::Allocate {
                    id: 1,
                    size: 20,
                    expect: None,
                },
                OpSpec::Deallocate { id: 0, expect: None },
                OpSpec::Deallocate {
                    id: 1,
                    expect: expect_layout(&[], &[(0, 100)]),
                },
            ],
        },
        Scenario {
            version: version.clone(),
            name: String::from("best_fit_picks_smallest_sufficient"),
            ops: vec![
                OpSpec::Configure {
                    total_size: 50,
                    strategy: FitStrategy::BestFit,
                },
                OpSpec::Allocate {
                    id: 0,
                    size: 10,
                    expect: None,
                },
                OpSpec::Allocate {
                    id: 1,
                    size: 5,
                    expect: None,
                },
                OpSpec::Deallocate {
                    id: 0,
                    expect: expect_layout(&[(1, 10, 15)], &[(0, 10), (15, 50)]),
                },
                OpSpec::Allocate {
                    id: 2,
                    size: 8,
                    expect: expect_layout(&[(2, 0, 8), (1, 10, 15)], &[(8, 10), (15, 50)]),
                },
            ],
        },
        Scenario {
            version: version.clone(),
            name: String::from("capacity_exhaustion_is_denied"),
            ops: vec![
                OpSpec::Configure {
                    total_size: 20,
                    strategy: FitStrategy::FirstFit,
                },
                OpSpec::Allocate {
                    id: 0,
                    size: 20,
                    expect: expect_layout(&[(0, 0, 20)], &[]),
                },
                OpSpec::Allocate {
                    id: 1,
                    size: 1,
                    expect: expect_error("insufficient_total_memory"),
                },
            ],
        },
        Scenario {
            version,
            name: String::from("compaction_slides_blocks_forward"),
            ops: vec![
                OpSpec::Configure {
                    total_size: 100,
                    strategy: FitStrategy::FirstFit,
                },
                OpSpec::Allocate {
                    id: 8,
                    size: 10,
                    expect: None,
                },
                OpSpec::Allocate {
                    id: 0,
                    size: 10,
                    expect: None,
                },
                OpSpec::Allocate {
                    id: 9,
                    size: 20,
                    expect: None,
                },
                OpSpec::Allocate {
                    id: 1,
                    size: 10,
                    expect: None,
                },
                OpSpec::Deallocate { id: 8, expect: None },
                OpSpec::Deallocate {
                    id: 9,
                    expect: expect_layout(
                        &[(0, 10, 20), (1, 40, 50)],
                        &[(0, 10), (20, 40), (50, 100)],
                    ),
                },
                OpSpec::Compact {
                    expect: expect_layout(&[(0, 0, 10), (1, 10, 20)], &[(20, 100)]),
                },
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_round_trips_through_json() {
        let scenarios = builtin_scenarios();
        for scenario in &scenarios {
            let json = scenario.to_json().expect("serialize");
            let back = Scenario::from_json(&json).expect("deserialize");
            assert_eq!(back.name, scenario.name);
            assert_eq!(back.ops.len(), scenario.ops.len());
        }
    }

    #[test]
    fn op_tags_use_snake_case() {
        let op = OpSpec::Allocate {
            id: 3,
            size: 16,
            expect: None,
        };
        let json = serde_json::to_string(&op).expect("serialize");
        assert!(json.contains(r#""op":"allocate""#), "unexpected tag: {json}");
    }

    #[test]
    fn expected_error_kinds_are_core_labels() {
        let scenarios = builtin_scenarios();
        let kinds: Vec<&str> = scenarios
            .iter()
            .flat_map(|s| &s.ops)
            .filter_map(|op| match op {
                OpSpec::Allocate { expect, .. }
                | OpSpec::Deallocate { expect, .. }
                | OpSpec::Compact { expect } => expect.as_ref(),
                OpSpec::Configure { .. } => None,
            })
            .filter_map(|e| e.error.as_deref())
            .collect();
        assert!(kinds.contains(&"insufficient_total_memory"));
    }
}
