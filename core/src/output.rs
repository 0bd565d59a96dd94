//! # Output Contract Analysis
//!
//! Validates and classifies the return values of endpoints and resolvers.

use crate::declaration::ParamDeclaration;
use crate::error::{AppError, AppResult};
use crate::plan::OutputContract;

/// Classifies `outputs` of the function `owner`.
///
/// * `[]` is `Neither`,
/// * `[error]` is `Error`, `[value]` is `Value`,
/// * `[value, error]` is `Both`,
/// * anything else is rejected.
///
/// Like parameters, return values may carry at most one pointer level.
pub fn analyze_outputs(owner: &str, outputs: &[ParamDeclaration]) -> AppResult<OutputContract> {
    if let Some(deep) = outputs.iter().find(|o| o.pointer_depth > 1) {
        return Err(AppError::PointerDepth {
            param: format!("<return of {}>", owner),
            depth: deep.pointer_depth,
        });
    }

    match outputs {
        [] => Ok(OutputContract::Neither),
        [single] if single.is_error() => Ok(OutputContract::Error),
        [_] => Ok(OutputContract::Value),
        [first, second] => {
            if first.is_error() {
                return Err(invalid(owner, "error must be the last return value"));
            }
            if !second.is_error() {
                return Err(invalid(
                    owner,
                    format!(
                        "second return value must be an error, found {}",
                        second.identity()
                    ),
                ));
            }
            Ok(OutputContract::Both)
        }
        more => Err(invalid(
            owner,
            format!("too many return values ({}), at most 2 are supported", more.len()),
        )),
    }
}

fn invalid(owner: &str, reason: impl Into<String>) -> AppError {
    AppError::InvalidSignature {
        owner: owner.to_string(),
        reason: reason.into(),
    }
}
