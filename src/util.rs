// SPDX-License-Identifier: GPL-3.0-or-later
use tokio::task::JoinError;

use std::panic;

/// Collapse the result of a spawned fallible task into a single `Result`. Panics inside the task
/// are resumed on the current thread.
pub(crate) fn flatten_join_result<T, E>(
    join_result: Result<Result<T, E>, JoinError>,
) -> anyhow::Result<T>
where
    anyhow::Error: From<E>,
{
    match join_result {
        Ok(inner_result) => Ok(inner_result?),
        Err(join_error) if join_error.is_panic() => panic::resume_unwind(join_error.into_panic()),
        Err(join_error) => Err(join_error.into()),
    }
}
