pub mod records;
pub mod rules;

use datarules_core::entity::EntityKind;
use datarules_core::error::CoreError;

use crate::error::AppError;

/// Resolve an entity kind from a path or query segment.
pub(crate) fn parse_kind(value: &str) -> Result<EntityKind, AppError> {
    EntityKind::from_str_value(value)
        .map_err(|_| AppError::Core(CoreError::UnknownEntityType(value.to_string())))
}
