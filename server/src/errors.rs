use platform_api::ApiError;
use products_careers::GapError;

pub fn gap_error(err: GapError) -> ApiError {
    match err {
        GapError::UnknownRole(_) => ApiError::NotFound(err.to_string()),
        GapError::TargetBelowCurrent { .. } => ApiError::Rejected(err.to_string()),
    }
}
