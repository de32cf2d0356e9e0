pub mod app_state;
pub mod current_user;
pub mod flash;
pub mod property_record;
pub mod role;
pub mod session;
pub mod view_filter;

pub use app_state::{AppState, SessionStore};
pub use current_user::CurrentUser;
pub use flash::{Flash, FlashLevel};
pub use property_record::{CellValue, PropertyRecord, COLUMNS};
pub use role::Role;
pub use session::Session;
pub use view_filter::{ViewFilter, ALL};
