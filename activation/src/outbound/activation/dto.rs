//! Wire DTOs for the activation backend.
//!
//! Responses decode into these first, then map into domain records in one
//! pass so malformed identifiers surface as decode failures.

use serde::{Deserialize, Serialize};

use crate::domain::{ActivationStatus, ClaimReceipt, CodeStatus, UserId};

#[derive(Debug, Deserialize)]
pub(super) struct CodeStatusDto {
    pub(super) status: String,
    #[serde(rename = "ownerId", default)]
    pub(super) owner_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ClaimRequestDto<'a> {
    pub(super) code: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct ClaimResponseDto {
    pub(super) success: bool,
    #[serde(default)]
    pub(super) message: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorDto {
    #[serde(default)]
    pub(super) detail: Option<String>,
}

impl CodeStatusDto {
    pub(super) fn into_domain(self) -> Result<CodeStatus, String> {
        let owner_id = self
            .owner_id
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| {
                UserId::new(&raw).map_err(|error| format!("invalid ownerId {raw:?}: {error}"))
            })
            .transpose()?;
        Ok(CodeStatus {
            status: ActivationStatus::from(self.status),
            owner_id,
        })
    }
}

impl From<ClaimResponseDto> for ClaimReceipt {
    fn from(value: ClaimResponseDto) -> Self {
        Self {
            success: value.success,
            message: value.message,
        }
    }
}
