pub mod board;
pub mod general;
pub mod integrations;
pub mod metrics;
pub mod reports;
pub mod test_cases;

pub use board::board;
pub use general::health_check;
pub use integrations::{sync_history, sync_integration};
pub use metrics::{dashboard_metrics, test_metrics};
pub use reports::{generate_report, list_reports};
pub use test_cases::{create_test_case, list_executions, list_test_cases, record_execution};
