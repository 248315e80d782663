// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vision classifier capability for evidence images.

use async_trait::async_trait;

use crate::error::VeriflowError;
use crate::types::Classification;

/// External vision-capable model that labels an evidence image.
///
/// Implementations may fail; the pipeline wraps every call with a timeout
/// and degrades failures to a `REVIEW` verdict so a turn always resolves.
#[async_trait]
pub trait EvidenceClassifier: Send + Sync {
    /// Classifies the image behind `image_ref`, with the user's caption as
    /// additional context.
    async fn classify(
        &self,
        image_ref: &str,
        caption: &str,
    ) -> Result<Classification, VeriflowError>;
}
