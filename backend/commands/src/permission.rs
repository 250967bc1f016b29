/// Permission gate.
use chatgate_core::{Caller, PermissionLevel};
use tracing::debug;

use crate::error::DispatchError;

/// Fail unless `caller` meets or exceeds `required`.
pub fn check_permission(caller: &Caller, required: PermissionLevel) -> Result<(), DispatchError> {
    if caller.permission.satisfies(required) {
        return Ok(());
    }
    debug!(
        uid = %caller.id,
        have = %caller.permission,
        need = %required,
        "Insufficient permissions"
    );
    Err(DispatchError::InsufficientPermission(required))
}
