pub mod auth_service;
pub mod export_service;
pub mod grid_service;
pub mod record_source;
pub mod upsert_service;
pub mod view_service;

pub use auth_service::{random_session_id, CredentialStore};
pub use export_service::{export_csv, export_filename, export_xlsx, ExportFormat};
pub use grid_service::{apply_grid, parse_grid_form, GridChange, GridRow, GridSubmission};
pub use record_source::{load_initial_table, seed_records};
pub use upsert_service::{apply_stamps, failure_message, save_rows, SaveSummary};
pub use view_service::{append_blank_row, apply_filter, filter_options, status_line, FilterOptions};
