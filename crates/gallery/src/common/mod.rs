mod error;
pub mod metrics;
mod origin;
mod result;
mod state;

pub use error::ApiError;
pub use origin::guard_origin;
pub use result::ApiResult;
pub use state::AppState;
