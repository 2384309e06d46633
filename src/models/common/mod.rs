pub mod error_code;
pub mod pagination;
pub mod response;

pub use error_code::ErrorCode;
pub use pagination::{
    PaginatedResponse, PaginationInfo, PaginationQuery, deserialize_optional_from_str,
};
pub use response::ApiResponse;
