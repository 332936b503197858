use serde::Serialize;

use crate::model::{TestCase, TestStatus};

#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub name: String,
    pub status: TestStatus,
    pub test_cases: Vec<TestCase>,
}

/// Groups test cases into one column per workflow status.
///
/// Cards are ordered by priority (critical first), then title. An `Unknown`
/// column is appended only when some case has an unrecognized status.
pub fn build_board(test_cases: &[TestCase]) -> Vec<BoardColumn> {
    let column = |status: TestStatus| {
        let mut cards: Vec<TestCase> = test_cases
            .iter()
            .filter(|c| c.status == status)
            .cloned()
            .collect();
        cards.sort_by(|a, b| {
            a.priority
                .sort_order()
                .cmp(&b.priority.sort_order())
                .then_with(|| a.title.cmp(&b.title))
        });
        BoardColumn {
            name: status.to_string(),
            status,
            test_cases: cards,
        }
    };

    let mut columns: Vec<BoardColumn> = TestStatus::WORKFLOW.into_iter().map(&column).collect();

    let unknown = column(TestStatus::Unknown);
    if !unknown.test_cases.is_empty() {
        columns.push(unknown);
    }
    columns
}
