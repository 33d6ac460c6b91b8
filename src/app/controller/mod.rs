mod assets;
mod clients;
mod contracts;
mod dashboard;
mod payments;
mod reports;

pub use assets::{AssetsApi, AssetsController};
pub use clients::{ClientsApi, ClientsController};
pub use contracts::{ContractsApi, ContractsController};
pub use dashboard::{DashboardApi, DashboardController};
pub use payments::{PaymentsApi, PaymentsController};
pub use reports::{ReportsApi, ReportsController};
