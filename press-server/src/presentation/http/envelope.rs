use serde::Serialize;
use utoipa::ToSchema;

/// Success envelope: `{ success: true, data, pagination? }`.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ApiResponse<T> {
    pub(crate) success: bool,
    pub(crate) data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) pagination: Option<PaginationDto>,
}

impl<T> ApiResponse<T> {
    pub(crate) fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            pagination: None,
        }
    }

    pub(crate) fn paginated(data: T, pagination: PaginationDto) -> Self {
        Self {
            success: true,
            data,
            pagination: Some(pagination),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PaginationDto {
    pub(crate) page: u32,
    pub(crate) limit: u32,
    pub(crate) total: i64,
    pub(crate) pages: u32,
}

/// Serializes as `{}`.
#[derive(Debug, Default, Serialize, ToSchema)]
pub(crate) struct EmptyDto {}
